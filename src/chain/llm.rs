//! A chain that formats a prompt and asks a model.

use std::sync::{Arc, PoisonError};

use async_trait::async_trait;
use bon::Builder;
use tracing::debug;

use super::{Chain, ChainValues, SharedMemory};
use crate::error::Result;
use crate::generation::generate_text;
use crate::prompt::PromptFormatter;
use crate::provider::ModelProvider;
use crate::types::{GenerationSettings, ModelMessage};

/// Prompt + model + optional memory.
///
/// The formatted prompt is sent as a single user message. When memory is
/// attached, its variables are merged into the inputs before formatting and
/// the exchange is recorded afterwards.
#[derive(Builder)]
pub struct LlmChain {
    provider: Arc<dyn ModelProvider>,
    prompt: Arc<dyn PromptFormatter>,
    #[builder(into, default = "text".to_string())]
    output_key: String,
    #[builder(default)]
    settings: GenerationSettings,
    memory: Option<SharedMemory>,
}

impl LlmChain {
    pub fn memory(&self) -> Option<&SharedMemory> {
        self.memory.as_ref()
    }

    fn memory_key(&self) -> Option<String> {
        self.memory.as_ref().map(|memory| {
            memory
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .memory_key()
                .to_string()
        })
    }
}

#[async_trait]
impl Chain for LlmChain {
    fn input_keys(&self) -> Vec<String> {
        let memory_key = self.memory_key();
        self.prompt
            .input_variables()
            .iter()
            .filter(|name| Some(name.as_str()) != memory_key.as_deref())
            .cloned()
            .collect()
    }

    fn output_keys(&self) -> Vec<String> {
        vec![self.output_key.clone()]
    }

    async fn call(&self, inputs: ChainValues) -> Result<ChainValues> {
        let mut values = inputs.clone();
        if let Some(memory) = &self.memory {
            let loaded = memory.lock().unwrap_or_else(PoisonError::into_inner).load();
            values.extend(loaded);
        }

        let prompt = self.prompt.format(&values)?;
        debug!(
            output_key = %self.output_key,
            prompt_len = prompt.len(),
            "llm chain step"
        );

        let result = generate_text(
            self.provider.as_ref(),
            vec![ModelMessage::user(prompt)],
            self.settings.clone(),
        )
        .await?;

        let mut outputs = ChainValues::new();
        outputs.insert(self.output_key.clone(), result.text);

        if let Some(memory) = &self.memory {
            memory
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .save(&inputs, &outputs)?;
        }
        Ok(outputs)
    }
}
