//! # BlogSpace Core
//!
//! The domain layer of BlogSpace.
//! Records, slug and excerpt derivation, and the ports the hosted backend
//! is reached through. This crate performs no I/O.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::{DomainError, RepoError};
