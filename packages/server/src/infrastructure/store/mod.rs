//! Implementations of the persistence service port.

pub mod inmemory;

pub use inmemory::InMemoryTaskStore;
