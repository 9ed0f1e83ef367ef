pub mod broadcast_dispatcher;
pub mod update_handler;
