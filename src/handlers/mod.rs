pub mod message;
pub mod ping;
pub mod router;
pub mod traits;
pub mod typing;
