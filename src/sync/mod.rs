mod client;
mod error;

pub use client::BridgeClient;
pub use error::BridgeError;
