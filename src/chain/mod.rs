//! Chains: steps that map named string inputs to named string outputs.
//!
//! An [`LlmChain`] formats a prompt and calls a model; a
//! [`SequentialChain`] threads values through several chains by key; a
//! [`SimpleSequentialChain`] pipes a single string straight through.

pub mod llm;
pub mod memory;
pub mod sequential;

use async_trait::async_trait;

pub use llm::LlmChain;
pub use memory::{ConversationBufferMemory, SharedMemory};
pub use sequential::{SequentialChain, SimpleSequentialChain};

pub use crate::prompt::ChainValues;

use crate::error::{Result, StructuraError};

#[async_trait]
pub trait Chain: Send + Sync {
    /// Keys this chain reads.
    fn input_keys(&self) -> Vec<String>;
    /// Keys this chain produces.
    fn output_keys(&self) -> Vec<String>;

    /// Run the chain, returning only its outputs.
    async fn call(&self, inputs: ChainValues) -> Result<ChainValues>;

    /// Run a single-input, single-output chain on a plain string.
    async fn run(&self, input: &str) -> Result<String> {
        let input_keys = self.input_keys();
        let [input_key] = input_keys.as_slice() else {
            return Err(StructuraError::InvalidArgument(format!(
                "run() needs exactly one input key, chain has {input_keys:?}"
            )));
        };
        let output_keys = self.output_keys();
        let [output_key] = output_keys.as_slice() else {
            return Err(StructuraError::InvalidArgument(format!(
                "run() needs exactly one output key, chain has {output_keys:?}"
            )));
        };

        let mut inputs = ChainValues::new();
        inputs.insert(input_key.clone(), input.to_string());
        let mut outputs = self.call(inputs).await?;
        outputs.remove(output_key).ok_or_else(|| {
            StructuraError::InvalidArgument(format!("chain did not produce '{output_key}'"))
        })
    }
}
