//! Application assembly
//!
//! - [`RagApplicationBuilder`] - fluent configuration with defaults
//! - [`RagApplication`] - the initialized application: ingestion, retrieval, answering

#![allow(missing_docs)]

pub mod application;
pub mod builder;

pub use application::{RagApplication, EMBEDDING_BATCH_SIZE};
pub use builder::{
    RagApplicationBuilder, DEFAULT_QUERY_TEMPLATE, DEFAULT_SEARCH_RESULT_COUNT,
    DEFAULT_TEMPERATURE, QUERY_PLACEHOLDER,
};
