//! Data client implementations - the hosted REST API and an in-memory fallback.

mod memory;

pub use memory::InMemoryDataClient;

#[cfg(feature = "http")]
mod rest;
#[cfg(feature = "http")]
pub use rest::RestDataClient;
