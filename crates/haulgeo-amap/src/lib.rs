pub mod client;
pub mod error;
mod retry;
pub mod types;

pub use client::{AmapClient, DEFAULT_BASE_URL};
pub use error::AmapError;
