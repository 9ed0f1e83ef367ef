use serde::{Deserialize, Serialize};

/// Display languages offered to subscribers.
///
/// Each language is identified on the wire by its keyboard button label and
/// in storage by a two-letter code.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    Russian,
    English,
    Polish,
    Spanish,
    German,
    French,
    Kazakh,
    Ukrainian,
}

/// Localized strings shown by the bot.
#[derive(Debug)]
pub struct Texts {
    pub subscribe_button: &'static str,
    pub unsubscribe_button: &'static str,
    pub welcome: &'static str,
    pub already_subscribed: &'static str,
    pub unsubscribed: &'static str,
    pub greeting: &'static str,
    pub marketing_prompt: &'static str,
    pub marketing_accept: &'static str,
    pub marketing_decline: &'static str,
    pub marketing_enabled: &'static str,
    pub marketing_disabled: &'static str,
}

impl Language {
    pub const ALL: [Language; 8] = [
        Language::Russian,
        Language::English,
        Language::Polish,
        Language::Spanish,
        Language::German,
        Language::French,
        Language::Kazakh,
        Language::Ukrainian,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::Russian => "ru",
            Language::English => "en",
            Language::Polish => "pl",
            Language::Spanish => "es",
            Language::German => "de",
            Language::French => "fr",
            Language::Kazakh => "kk",
            Language::Ukrainian => "uk",
        }
    }

    pub fn from_code(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.code() == value)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::Russian => "🇷🇺 Русский",
            Language::English => "🇬🇧 Английский",
            Language::Polish => "🇵🇱 Польский",
            Language::Spanish => "🇪🇸 Испанский",
            Language::German => "🇩🇪 Немецкий",
            Language::French => "🇫🇷 Французский",
            Language::Kazakh => "🇰🇿 Казахский",
            Language::Ukrainian => "🇺🇦 Украинский",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.label() == value)
    }

    pub fn texts(&self) -> &'static Texts {
        match self {
            Language::Russian => &RU,
            Language::English => &EN,
            Language::Polish => &PL,
            Language::Spanish => &ES,
            Language::German => &DE,
            Language::French => &FR,
            Language::Kazakh => &KK,
            Language::Ukrainian => &UK,
        }
    }
}

pub const CHOOSE_LANGUAGE_PROMPT: &str = "Выберите язык:";

static RU: Texts = Texts {
    subscribe_button: "✅ Подписаться",
    unsubscribe_button: "❌ Отписаться",
    welcome: "👋 Привет! Подпишитесь, чтобы получать уведомления.",
    already_subscribed: "Вы уже подписаны ✅",
    unsubscribed: "Вы отписались 🔕",
    greeting: "🇷🇺 Вы выбрали русский язык!\n\n\
        📦 Отправьте мне ссылку на товар — я буду отслеживать его цену и сообщу, когда она упадёт 💰\n\
        🕵️ Также я проверю этот товар на других сайтах, чтобы найти где дешевле!\n\n\
        Поддерживаемые сайты:\n\
        • Allegro\n• Temu\n• AliExpress\n• Banggood\n• Alibaba\n\n\
        Когда найду дешевле или цена упадёт — сразу уведомлю вас 📲",
    marketing_prompt: "Хотите получать рекламные предложения и партнерские ссылки? (можно изменить в любой момент)",
    marketing_accept: "✅ Да, хочу рекламные предложения",
    marketing_decline: "❌ Нет, только уведомления",
    marketing_enabled: "Вы будете получать рекламные предложения 📬",
    marketing_disabled: "Вы будете получать только уведомления 🔔",
};

static EN: Texts = Texts {
    subscribe_button: "✅ Subscribe",
    unsubscribe_button: "❌ Unsubscribe",
    welcome: "👋 Hi! Subscribe to receive notifications.",
    already_subscribed: "You are already subscribed ✅",
    unsubscribed: "You have unsubscribed 🔕",
    greeting: "🇬🇧 You selected English!\n\n\
        📦 Send me a product link — I’ll track its price and notify you when it drops 💰\n\
        🕵️ I’ll also check this product on other sites to find where it’s cheaper!\n\n\
        Supported sites:\n\
        • Allegro\n• Temu\n• AliExpress\n• Banggood\n• Alibaba\n\n\
        When I find a lower price or a drop — I’ll let you know 📲",
    marketing_prompt: "Would you like to receive promotional offers and partner links? (you can change this at any time)",
    marketing_accept: "✅ Yes, send me offers",
    marketing_decline: "❌ No, notifications only",
    marketing_enabled: "You will receive promotional offers 📬",
    marketing_disabled: "You will receive notifications only 🔔",
};

static PL: Texts = Texts {
    subscribe_button: "✅ Subskrybuj",
    unsubscribe_button: "❌ Anuluj subskrypcję",
    welcome: "👋 Cześć! Zasubskrybuj, aby otrzymywać powiadomienia.",
    already_subscribed: "Jesteś już subskrybentem ✅",
    unsubscribed: "Anulowałeś subskrypcję 🔕",
    greeting: "🇵🇱 Wybrałeś język polski!\n\n\
        📦 Wyślij mi link do produktu — będę śledzić jego cenę i dam znać, gdy spadnie 💰\n\
        🕵️ Sprawdzę też ten produkt na innych stronach, aby znaleźć tańszą ofertę!\n\n\
        Obsługiwane strony:\n\
        • Allegro\n• Temu\n• AliExpress\n• Banggood\n• Alibaba\n\n\
        Gdy znajdę niższą cenę lub spadek — natychmiast Cię powiadomię 📲",
    marketing_prompt: "Czy chcesz otrzymywać oferty promocyjne i linki partnerskie? (możesz to zmienić w każdej chwili)",
    marketing_accept: "✅ Tak, chcę oferty",
    marketing_decline: "❌ Nie, tylko powiadomienia",
    marketing_enabled: "Będziesz otrzymywać oferty promocyjne 📬",
    marketing_disabled: "Będziesz otrzymywać tylko powiadomienia 🔔",
};

static ES: Texts = Texts {
    subscribe_button: "✅ Suscribirse",
    unsubscribe_button: "❌ Darse de baja",
    welcome: "👋 ¡Hola! Suscríbete para recibir notificaciones.",
    already_subscribed: "Ya estás suscrito ✅",
    unsubscribed: "Te has dado de baja 🔕",
    greeting: "🇪🇸 ¡Has seleccionado Español!\n\n\
        📦 Envíame un enlace de producto — seguiré su precio y te avisaré cuando baje 💰\n\
        🕵️ También comprobaré este producto en otros sitios para ver dónde es más barato.\n\n\
        Sitios compatibles:\n\
        • Allegro\n• Temu\n• AliExpress\n• Banggood\n• Alibaba\n\n\
        Cuando encuentre un precio más bajo o una bajada — te lo notificaré 📲",
    marketing_prompt: "¿Quieres recibir ofertas promocionales y enlaces de socios? (puedes cambiarlo en cualquier momento)",
    marketing_accept: "✅ Sí, quiero ofertas",
    marketing_decline: "❌ No, solo notificaciones",
    marketing_enabled: "Recibirás ofertas promocionales 📬",
    marketing_disabled: "Solo recibirás notificaciones 🔔",
};

static DE: Texts = Texts {
    subscribe_button: "✅ Abonnieren",
    unsubscribe_button: "❌ Abbestellen",
    welcome: "👋 Hallo! Abonniere, um Benachrichtigungen zu erhalten.",
    already_subscribed: "Du bist bereits abonniert ✅",
    unsubscribed: "Du hast dich abgemeldet 🔕",
    greeting: "🇩🇪 Du hast Deutsch gewählt!\n\n\
        📦 Sende mir den Produktlink — ich verfolge den Preis und informiere dich, wenn er fällt 💰\n\
        🕵️ Außerdem überprüfe ich das Produkt auf anderen Websites, um den günstigsten Preis zu finden!\n\n\
        Unterstützte Seiten:\n\
        • Allegro\n• Temu\n• AliExpress\n• Banggood\n• Alibaba\n\n\
        Wenn ich einen besseren Preis finde oder der Preis sinkt — bekommst du sofort eine Benachrichtigung 📲",
    marketing_prompt: "Möchtest du Werbeangebote und Partnerlinks erhalten? (jederzeit änderbar)",
    marketing_accept: "✅ Ja, ich möchte Angebote",
    marketing_decline: "❌ Nein, nur Benachrichtigungen",
    marketing_enabled: "Du erhältst Werbeangebote 📬",
    marketing_disabled: "Du erhältst nur Benachrichtigungen 🔔",
};

static FR: Texts = Texts {
    subscribe_button: "✅ S’abonner",
    unsubscribe_button: "❌ Se désabonner",
    welcome: "👋 Bonjour ! Abonnez-vous pour recevoir des notifications.",
    already_subscribed: "Vous êtes déjà abonné ✅",
    unsubscribed: "Vous êtes désabonné 🔕",
    greeting: "🇫🇷 Vous avez choisi Français !\n\n\
        📦 Envoyez-moi un lien vers un produit — je suivrai son prix et vous informerai dès qu’il baisse 💰\n\
        🕵️ Je vérifierai aussi ce produit sur d’autres sites pour voir où il est moins cher !\n\n\
        Sites pris en charge :\n\
        • Allegro\n• Temu\n• AliExpress\n• Banggood\n• Alibaba\n\n\
        Dès que je trouve un meilleur prix ou une baisse — je vous le dirai 📲",
    marketing_prompt: "Souhaitez-vous recevoir des offres promotionnelles et des liens partenaires ? (modifiable à tout moment)",
    marketing_accept: "✅ Oui, je veux des offres",
    marketing_decline: "❌ Non, seulement les notifications",
    marketing_enabled: "Vous recevrez des offres promotionnelles 📬",
    marketing_disabled: "Vous ne recevrez que les notifications 🔔",
};

static KK: Texts = Texts {
    subscribe_button: "✅ Жазылу",
    unsubscribe_button: "❌ Жазылудан бас тарту",
    welcome: "👋 Сәлем! Хабарламалар алу үшін жазылыңыз.",
    already_subscribed: "Сіз жазылғансыз ✅",
    unsubscribed: "Сіз жазылудан бас тарттыңыз 🔕",
    greeting: "🇰🇿 Сіз қазақ тілін таңдадыңыз!\n\n\
        📦 Маған тауардың сілтемесін жіберіңіз — мен оның бағасын бақылаймын және арзандағанда хабарлаймын 💰\n\
        🕵️ Сондай-ақ мен бұл тауарды басқа сайттардан қарап, арзанырақ нұсқасын табуға тырысамын!\n\n\
        Қолдау көрсетілетін сайттар:\n\
        • Allegro\n• Temu\n• AliExpress\n• Banggood\n• Alibaba\n\n\
        Баға түссе немесе арзанырақ табылса — бірден хабарлаймын 📲",
    marketing_prompt: "Жарнамалық ұсыныстар мен серіктес сілтемелерін алғыңыз келе ме? (кез келген уақытта өзгертуге болады)",
    marketing_accept: "✅ Иә, ұсыныстар керек",
    marketing_decline: "❌ Жоқ, тек хабарламалар",
    marketing_enabled: "Сіз жарнамалық ұсыныстар аласыз 📬",
    marketing_disabled: "Сіз тек хабарламалар аласыз 🔔",
};

static UK: Texts = Texts {
    subscribe_button: "✅ Підписатися",
    unsubscribe_button: "❌ Відписатися",
    welcome: "👋 Привіт! Підпишіться, щоб отримувати сповіщення.",
    already_subscribed: "Ви вже підписані ✅",
    unsubscribed: "Ви відписалися 🔕",
    greeting: "🇺🇦 Ви обрали українську мову!\n\n\
        📦 Надішліть мені посилання на товар — я відстежуватиму його ціну та повідомлю, коли вона знизиться 💰\n\
        🕵️ Також я перевірю цей товар на інших сайтах, щоб знайти, де він дешевше!\n\n\
        Підтримувані сайти:\n\
        • Allegro\n• Temu\n• AliExpress\n• Banggood\n• Alibaba\n\n\
        Коли знайду нижчу ціну або зниження — одразу повідомлю вас 📲",
    marketing_prompt: "Бажаєте отримувати рекламні пропозиції та партнерські посилання? (можна змінити будь-коли)",
    marketing_accept: "✅ Так, хочу пропозиції",
    marketing_decline: "❌ Ні, лише сповіщення",
    marketing_enabled: "Ви отримуватимете рекламні пропозиції 📬",
    marketing_disabled: "Ви отримуватимете лише сповіщення 🔔",
};

/// Finds the language whose subscribe button carries this label.
pub fn subscribe_button_language(text: &str) -> Option<Language> {
    Language::ALL
        .into_iter()
        .find(|lang| lang.texts().subscribe_button == text)
}

pub fn unsubscribe_button_language(text: &str) -> Option<Language> {
    Language::ALL
        .into_iter()
        .find(|lang| lang.texts().unsubscribe_button == text)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn codes_and_labels_map_back() {
        for lang in Language::ALL {
            assert_eq!(Language::from_code(lang.code()), Some(lang));
            assert_eq!(Language::from_label(lang.label()), Some(lang));
        }
        assert_eq!(Language::from_code("xx"), None);
        assert_eq!(Language::from_label("Русский"), None);
    }

    #[test]
    fn button_labels_do_not_collide() {
        let mut seen = HashSet::new();
        for lang in Language::ALL {
            assert!(seen.insert(lang.label()));
            assert!(seen.insert(lang.texts().subscribe_button));
            assert!(seen.insert(lang.texts().unsubscribe_button));
        }
    }

    #[test]
    fn subscribe_buttons_resolve_in_every_language() {
        assert_eq!(
            subscribe_button_language("✅ Подписаться"),
            Some(Language::Russian)
        );
        assert_eq!(
            unsubscribe_button_language("❌ Unsubscribe"),
            Some(Language::English)
        );
        assert_eq!(subscribe_button_language("hello"), None);
    }
}
