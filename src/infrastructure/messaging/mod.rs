pub mod polling;
pub mod telegram;
