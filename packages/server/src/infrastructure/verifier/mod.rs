//! Implementations of the credential verifier port.

pub mod inmemory;

pub use inmemory::StaticTokenVerifier;
