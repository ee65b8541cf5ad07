//! Vector storage contract and backends.
//!
//! Any backend that implements [`VectorDb`] can be plugged into a
//! [`RagApplicationBuilder`](crate::core::RagApplicationBuilder). The crate
//! ships [`InMemoryVectorDb`], a brute-force cosine store that needs no
//! external server.

#![allow(missing_docs)]

// Storage contract and the in-memory backend
pub mod vectorstore;

// Re-exports
pub use vectorstore::{InMemoryVectorDb, VectorDb};
