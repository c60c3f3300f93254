pub mod client;
pub mod error;
pub mod mock;
pub mod progress;
pub mod request;
