pub mod conversation;
pub mod frame;
pub mod message;
pub mod user;
