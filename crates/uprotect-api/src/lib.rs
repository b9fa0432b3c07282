// uprotect-api: Async Rust client for the UniFi Protect NVR API

pub mod client;
pub mod error;
pub mod platform;
pub mod transport;
pub mod types;

mod auth;
mod bootstrap;
mod cameras;
mod events;

pub use client::ProtectClient;
pub use error::Error;
pub use platform::NvrPlatform;
pub use transport::{TlsMode, TransportConfig};
