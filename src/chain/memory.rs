//! Conversation buffer memory.

use std::sync::{Arc, Mutex};

use bon::Builder;

use crate::error::{Result, StructuraError};
use crate::prompt::ChainValues;

/// Memory shared between a chain and whoever wants to read it afterwards.
pub type SharedMemory = Arc<Mutex<ConversationBufferMemory>>;

/// Remembers every exchange a chain has made, verbatim.
///
/// The buffer renders as alternating `Human: ...` / `AI: ...` lines and is
/// exposed to prompts under `memory_key`.
#[derive(Debug, Clone, Builder, PartialEq, Eq)]
pub struct ConversationBufferMemory {
    /// Which input holds the human turn. Needed when a chain has several inputs.
    #[builder(into)]
    input_key: Option<String>,
    /// Which output holds the AI turn. Needed when a chain has several outputs.
    #[builder(into)]
    output_key: Option<String>,
    #[builder(into, default = "history".to_string())]
    memory_key: String,
    #[builder(into, default = "Human".to_string())]
    human_prefix: String,
    #[builder(into, default = "AI".to_string())]
    ai_prefix: String,
    #[builder(skip)]
    turns: Vec<(String, String)>,
}

impl Default for ConversationBufferMemory {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ConversationBufferMemory {
    /// Wrap in an `Arc<Mutex<_>>` for use with chains.
    pub fn shared(self) -> SharedMemory {
        Arc::new(Mutex::new(self))
    }

    pub fn memory_key(&self) -> &str {
        &self.memory_key
    }

    /// The rendered conversation so far.
    pub fn buffer(&self) -> String {
        self.turns
            .iter()
            .map(|(human, ai)| {
                format!(
                    "{}: {human}\n{}: {ai}",
                    self.human_prefix, self.ai_prefix
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Variables to merge into a prompt's inputs.
    pub fn load(&self) -> ChainValues {
        let mut vars = ChainValues::new();
        vars.insert(self.memory_key.clone(), self.buffer());
        vars
    }

    /// Record one exchange.
    pub fn save(&mut self, inputs: &ChainValues, outputs: &ChainValues) -> Result<()> {
        let human = self.pick(inputs, self.input_key.as_deref(), "input")?;
        let ai = self.pick(outputs, self.output_key.as_deref(), "output")?;
        self.turns.push((human, ai));
        Ok(())
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    fn pick(&self, values: &ChainValues, key: Option<&str>, kind: &str) -> Result<String> {
        if let Some(key) = key {
            return values.get(key).cloned().ok_or_else(|| {
                StructuraError::InvalidArgument(format!("memory {kind} key '{key}' not found"))
            });
        }
        let mut candidates = values
            .iter()
            .filter(|(k, _)| k.as_str() != self.memory_key);
        match (candidates.next(), candidates.next()) {
            (Some((_, value)), None) => Ok(value.clone()),
            (None, _) => Err(StructuraError::InvalidArgument(format!(
                "memory has no {kind} to record"
            ))),
            (Some(_), Some(_)) => Err(StructuraError::InvalidArgument(format!(
                "memory {kind} is ambiguous; set {kind}_key"
            ))),
        }
    }
}
