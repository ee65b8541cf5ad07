//! Language model contract and clients
//!
//! - [`Model`] - The trait every language model implements
//! - [`SimpleModel`] - Named presets resolved to concrete models
//! - [`ModelSelection`] - Preset or custom model, as chosen on the builder
//! - [`OpenAi`] - OpenAI chat completions over HTTP
//!
//! # Example
//!
//! ```ignore
//! use ragloom::llm::{Model, SimpleModel};
//!
//! let model = SimpleModel::OpenAiGpt4.resolve(0.1);
//! let answer = model.generate("You are terse.", "What is 2+2?").await?;
//! ```

#![allow(missing_docs)]

/// Model trait, presets and selection.
pub mod client;
/// OpenAI chat completion model.
pub mod openai;

pub use client::{Model, ModelSelection, SimpleModel};
pub use openai::OpenAi;
