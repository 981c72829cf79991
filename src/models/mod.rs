pub mod chat;
pub mod command;
pub mod envelope;
pub mod wire;
