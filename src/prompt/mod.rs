//! Prompt templates.
//!
//! Templates use `{name}` placeholders; `{{` and `}}` produce literal braces.

pub mod few_shot;
pub mod template;

use std::collections::BTreeMap;

pub use few_shot::FewShotPromptTemplate;
pub use template::PromptTemplate;

use crate::error::Result;

/// Named string values flowing into templates and between chains.
pub type ChainValues = BTreeMap<String, String>;

/// Build [`ChainValues`] from key/value pairs.
pub fn values<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> ChainValues
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Anything that renders a prompt string from named inputs.
pub trait PromptFormatter: Send + Sync {
    /// Variables that must be supplied to [`format`](PromptFormatter::format).
    fn input_variables(&self) -> &[String];

    /// Render the prompt. Keys not named by the template are ignored.
    fn format(&self, values: &ChainValues) -> Result<String>;
}
