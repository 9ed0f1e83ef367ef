pub mod choose_language;
pub mod marketing_consent;
pub mod start_broadcast;
pub mod subscribe;
pub mod unsubscribe;
