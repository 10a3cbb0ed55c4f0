//! Single-string prompt templates.

use std::collections::BTreeSet;
use std::fmt;

use super::{ChainValues, PromptFormatter};
use crate::error::{Result, StructuraError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A prompt with `{variable}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
    segments: Vec<Segment>,
    input_variables: Vec<String>,
}

impl PromptTemplate {
    /// Parse a template, inferring input variables in order of first use.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        let segments = parse(&template)?;
        let mut input_variables: Vec<String> = Vec::new();
        for segment in &segments {
            if let Segment::Variable(name) = segment {
                if !input_variables.contains(name) {
                    input_variables.push(name.clone());
                }
            }
        }
        Ok(Self {
            template,
            segments,
            input_variables,
        })
    }

    /// Parse a template and check it uses exactly the declared variables.
    pub fn with_input_variables<S: AsRef<str>>(
        template: impl Into<String>,
        input_variables: &[S],
    ) -> Result<Self> {
        let parsed = Self::new(template)?;
        let declared: BTreeSet<&str> = input_variables.iter().map(AsRef::as_ref).collect();
        let used: BTreeSet<&str> = parsed.input_variables.iter().map(String::as_str).collect();
        if declared != used {
            return Err(StructuraError::Template(format!(
                "declared variables {declared:?} do not match template variables {used:?}"
            )));
        }
        Ok(parsed)
    }

    /// The template source.
    pub fn template(&self) -> &str {
        &self.template
    }
}

impl PromptFormatter for PromptTemplate {
    fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    fn format(&self, values: &ChainValues) -> Result<String> {
        let mut out = String::with_capacity(self.template.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Variable(name) => {
                    let value = values.get(name).ok_or_else(|| {
                        StructuraError::Template(format!("missing variable '{name}'"))
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

fn parse(template: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for inner in chars.by_ref() {
                    match inner {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => {
                            return Err(StructuraError::Template(format!(
                                "nested '{{' in placeholder of {template:?}"
                            )))
                        }
                        other => name.push(other),
                    }
                }
                if !closed {
                    return Err(StructuraError::Template(format!(
                        "unterminated placeholder in {template:?}"
                    )));
                }
                let name = name.trim();
                if name.is_empty() {
                    return Err(StructuraError::Template(format!(
                        "empty placeholder in {template:?}"
                    )));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(name.to_string()));
            }
            '}' => {
                return Err(StructuraError::Template(format!(
                    "unmatched '}}' in {template:?}"
                )))
            }
            other => literal.push(other),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}
