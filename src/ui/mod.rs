pub mod chat_window;
pub mod message_row;
