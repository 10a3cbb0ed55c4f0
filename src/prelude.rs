//! Convenience re-exports for common use.

pub use crate::chain::{
    Chain, ConversationBufferMemory, LlmChain, SequentialChain, SimpleSequentialChain,
};
pub use crate::config::StructuraConfig;
pub use crate::error::{Result, StructuraError};
pub use crate::extract::{extract, extract_as, parse_payload, FenceExtractor, FenceMarkers};
pub use crate::generation::{OutputStrategy, StructuredRequest};
pub use crate::models::{LanguageModel, ModelCapabilities};
pub use crate::prompt::{ChainValues, FewShotPromptTemplate, PromptFormatter, PromptTemplate};
pub use crate::provider::ModelProvider;
pub use crate::types::{
    FinishReason, GenerateObjectResult, GenerateTextResult, GenerationSettings, ModelMessage,
    ResponseFormat, Role, Usage,
};
