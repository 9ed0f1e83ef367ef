pub mod broadcast;
pub mod conversation;
pub mod language;
pub mod subscriber;

pub use broadcast::{BroadcastReport, DeliveryFailure, DeliveryOutcome};
pub use conversation::{InboundEvent, InlineButton, Keyboard, OutgoingMessage};
pub use language::{Language, Texts};
pub use subscriber::{Audience, RecipientId, Subscriber};
