//! # BlogSpace Shared
//!
//! Wire types exchanged with the hosted backend's REST and auth endpoints.

pub mod dto;
pub mod response;

pub use response::ErrorBody;
