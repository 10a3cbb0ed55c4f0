//! Structura: structured output from hosted language models.
//!
//! The heart of the crate is [`extract`], which pulls every `` ```json ``
//! fenced block out of a model response and decodes it, all-or-nothing.
//! Around it sit a [`provider::ModelProvider`] seam with an
//! OpenAI-compatible client, structured-output helpers that either ask the
//! provider for schema-constrained JSON or fall back to prompt-and-parse,
//! prompt templates, and chains.
//!
//! # Quick Start
//!
//! ```
//! let values = structura::extract::extract("Sure:\n```json\n{\"a\": 1}\n```").unwrap();
//! assert_eq!(values, vec![serde_json::json!({"a": 1})]);
//! ```
//!
//! ```no_run
//! use structura::prelude::*;
//!
//! # async fn example() -> structura::error::Result<()> {
//! let config = StructuraConfig::load()?;
//! let text = structura::generation::generate(&config, "Hello!").await?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

pub mod chain;
pub mod config;
pub mod error;
pub mod extract;
pub mod generation;
pub mod models;
pub mod prelude;
pub mod prompt;
pub mod provider;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
