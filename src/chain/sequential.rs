//! Chains of chains.

use std::collections::BTreeSet;

use async_trait::async_trait;
use tracing::debug;

use super::{Chain, ChainValues};
use crate::error::{Result, StructuraError};

/// Runs chains in order, passing values between them by key.
///
/// Each chain receives only the keys it declares; its outputs join the pool
/// of known values for later chains.
pub struct SequentialChain {
    chains: Vec<Box<dyn Chain>>,
    input_variables: Vec<String>,
    output_variables: Vec<String>,
    return_all: bool,
}

impl SequentialChain {
    /// Validate the wiring: every chain's inputs must be known by the time it
    /// runs, no chain may overwrite a known key, and every requested output
    /// must be produced.
    pub fn new(
        chains: Vec<Box<dyn Chain>>,
        input_variables: Vec<String>,
        output_variables: Vec<String>,
    ) -> Result<Self> {
        if chains.is_empty() {
            return Err(StructuraError::InvalidArgument(
                "sequential chain needs at least one chain".into(),
            ));
        }

        let mut known: BTreeSet<String> = input_variables.iter().cloned().collect();
        for (index, chain) in chains.iter().enumerate() {
            let missing: Vec<String> = chain
                .input_keys()
                .into_iter()
                .filter(|key| !known.contains(key))
                .collect();
            if !missing.is_empty() {
                return Err(StructuraError::InvalidArgument(format!(
                    "chain {index} is missing required input keys {missing:?}, only {known:?} are available"
                )));
            }
            for key in chain.output_keys() {
                if !known.insert(key.clone()) {
                    return Err(StructuraError::InvalidArgument(format!(
                        "chain {index} returns key '{key}' which is already in use"
                    )));
                }
            }
        }

        if let Some(missing) = output_variables.iter().find(|key| !known.contains(*key)) {
            return Err(StructuraError::InvalidArgument(format!(
                "output variable '{missing}' is not produced by any chain"
            )));
        }

        Ok(Self {
            chains,
            input_variables,
            output_variables,
            return_all: false,
        })
    }

    /// Return every value produced along the way, not just `output_variables`.
    pub fn with_return_all(mut self, return_all: bool) -> Self {
        self.return_all = return_all;
        self
    }

    fn produced_keys(&self) -> Vec<String> {
        self.chains
            .iter()
            .flat_map(|chain| chain.output_keys())
            .collect()
    }
}

#[async_trait]
impl Chain for SequentialChain {
    fn input_keys(&self) -> Vec<String> {
        self.input_variables.clone()
    }

    fn output_keys(&self) -> Vec<String> {
        if self.return_all {
            self.produced_keys()
        } else {
            self.output_variables.clone()
        }
    }

    async fn call(&self, inputs: ChainValues) -> Result<ChainValues> {
        if let Some(missing) = self
            .input_variables
            .iter()
            .find(|key| !inputs.contains_key(*key))
        {
            return Err(StructuraError::InvalidArgument(format!(
                "missing input '{missing}'"
            )));
        }

        let mut known = inputs;
        for (index, chain) in self.chains.iter().enumerate() {
            let step_inputs: ChainValues = chain
                .input_keys()
                .into_iter()
                .filter_map(|key| known.get(&key).cloned().map(|value| (key, value)))
                .collect();
            debug!(step = index, "sequential chain step");
            let outputs = chain.call(step_inputs).await?;
            known.extend(outputs);
        }

        let mut result = ChainValues::new();
        for key in self.output_keys() {
            if let Some(value) = known.remove(&key) {
                result.insert(key, value);
            }
        }
        Ok(result)
    }
}

/// Pipes one string through single-input, single-output chains.
///
/// Keys do not need to line up: each chain's only output becomes the next
/// chain's only input.
pub struct SimpleSequentialChain {
    chains: Vec<Box<dyn Chain>>,
    strip_outputs: bool,
}

impl SimpleSequentialChain {
    pub const INPUT_KEY: &'static str = "input";
    pub const OUTPUT_KEY: &'static str = "output";

    pub fn new(chains: Vec<Box<dyn Chain>>) -> Result<Self> {
        if chains.is_empty() {
            return Err(StructuraError::InvalidArgument(
                "simple sequential chain needs at least one chain".into(),
            ));
        }
        for (index, chain) in chains.iter().enumerate() {
            let (inputs, outputs) = (chain.input_keys(), chain.output_keys());
            if inputs.len() != 1 || outputs.len() != 1 {
                return Err(StructuraError::InvalidArgument(format!(
                    "chain {index} must have exactly one input and one output, has {inputs:?} -> {outputs:?}"
                )));
            }
        }
        Ok(Self {
            chains,
            strip_outputs: false,
        })
    }

    /// Trim whitespace from each intermediate output before passing it on.
    pub fn with_strip_outputs(mut self, strip: bool) -> Self {
        self.strip_outputs = strip;
        self
    }
}

#[async_trait]
impl Chain for SimpleSequentialChain {
    fn input_keys(&self) -> Vec<String> {
        vec![Self::INPUT_KEY.to_string()]
    }

    fn output_keys(&self) -> Vec<String> {
        vec![Self::OUTPUT_KEY.to_string()]
    }

    async fn call(&self, inputs: ChainValues) -> Result<ChainValues> {
        let mut current = inputs.get(Self::INPUT_KEY).cloned().ok_or_else(|| {
            StructuraError::InvalidArgument(format!("missing input '{}'", Self::INPUT_KEY))
        })?;
        for (index, chain) in self.chains.iter().enumerate() {
            debug!(step = index, "simple sequential chain step");
            current = chain.run(&current).await?;
            if self.strip_outputs {
                current = current.trim().to_string();
            }
        }
        let mut outputs = ChainValues::new();
        outputs.insert(Self::OUTPUT_KEY.to_string(), current);
        Ok(outputs)
    }
}
