pub mod handlers;
pub mod token;
