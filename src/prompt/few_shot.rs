//! Few-shot prompt templates.

use std::collections::BTreeSet;

use bon::bon;

use super::{ChainValues, PromptFormatter, PromptTemplate};
use crate::error::{Result, StructuraError};

/// A prompt built from a prefix, formatted examples, and a suffix.
///
/// Rendering joins `[prefix, example..., suffix]` with `example_separator`,
/// dropping the prefix when it is empty. Prefix and suffix are templates
/// rendered with the caller's inputs; each example is rendered with
/// `example_prompt` from its own values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FewShotPromptTemplate {
    examples: Vec<ChainValues>,
    example_prompt: PromptTemplate,
    prefix: PromptTemplate,
    suffix: PromptTemplate,
    input_variables: Vec<String>,
    example_separator: String,
}

#[bon]
impl FewShotPromptTemplate {
    /// Validates that `input_variables` are exactly the variables the prefix
    /// and suffix use, and that every example supplies what `example_prompt`
    /// needs.
    #[builder]
    pub fn new(
        examples: Vec<ChainValues>,
        example_prompt: PromptTemplate,
        #[builder(into, default)] prefix: String,
        #[builder(into)] suffix: String,
        input_variables: Vec<String>,
        #[builder(into, default = "\n\n".to_string())] example_separator: String,
    ) -> Result<Self> {
        let prefix = PromptTemplate::new(prefix)?;
        let suffix = PromptTemplate::new(suffix)?;

        let used: BTreeSet<&str> = prefix
            .input_variables()
            .iter()
            .chain(suffix.input_variables())
            .map(String::as_str)
            .collect();
        let declared: BTreeSet<&str> = input_variables.iter().map(String::as_str).collect();
        if used != declared {
            return Err(StructuraError::Template(format!(
                "declared variables {declared:?} do not match prefix/suffix variables {used:?}"
            )));
        }

        for (index, example) in examples.iter().enumerate() {
            if let Some(missing) = example_prompt
                .input_variables()
                .iter()
                .find(|name| !example.contains_key(*name))
            {
                return Err(StructuraError::Template(format!(
                    "example {index} is missing variable '{missing}'"
                )));
            }
        }

        Ok(Self {
            examples,
            example_prompt,
            prefix,
            suffix,
            input_variables,
            example_separator,
        })
    }

    pub fn examples(&self) -> &[ChainValues] {
        &self.examples
    }
}

impl PromptFormatter for FewShotPromptTemplate {
    fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    fn format(&self, values: &ChainValues) -> Result<String> {
        let mut pieces = Vec::with_capacity(self.examples.len() + 2);
        let prefix = self.prefix.format(values)?;
        if !prefix.is_empty() {
            pieces.push(prefix);
        }
        for example in &self.examples {
            pieces.push(self.example_prompt.format(example)?);
        }
        pieces.push(self.suffix.format(values)?);
        Ok(pieces.join(&self.example_separator))
    }
}
