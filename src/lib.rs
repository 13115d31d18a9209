pub mod cache;
pub mod client;
pub mod config;
pub mod gateway;
pub mod handlers;
pub mod http;
pub mod keepalive;
pub mod presence;
pub mod render;
pub mod transport;
pub mod types;
pub mod unread;
pub mod websocket;

#[cfg(test)]
pub(crate) mod test_utils;
