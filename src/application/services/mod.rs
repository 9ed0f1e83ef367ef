pub mod chunking;
pub mod commands;
pub mod keyboards;
pub mod messenger;
pub mod pacing;
