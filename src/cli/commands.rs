//! Subcommand handlers.

use std::io::Read;
use std::sync::{Arc, PoisonError};

use super::{AskArgs, ChainArgs, ExtractArgs, ModelArgs, ObjectArgs, TemplateArgs};
use crate::chain::{Chain, ConversationBufferMemory, LlmChain, SequentialChain, SharedMemory};
use crate::config::StructuraConfig;
use crate::error::Result;
use crate::extract;
use crate::generation::{generate_object, generate_text, OutputStrategy, StructuredRequest};
use crate::prompt::{values, PromptFormatter, PromptTemplate};
use crate::provider::{create_provider, ModelProvider};
use crate::types::{GenerationSettings, ModelMessage};

/// `structura extract`: prints the extracted array as pretty JSON.
pub fn handle_extract(args: ExtractArgs) -> Result<()> {
    let text = match args.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let values = extract::extract(&text)?;
    println!("{}", serde_json::to_string_pretty(&values)?);
    Ok(())
}

pub async fn handle_ask(args: AskArgs) -> Result<()> {
    let (provider, settings) = connect(&args.model)?;
    let mut messages = Vec::new();
    if let Some(system) = args.system {
        messages.push(ModelMessage::system(system));
    }
    messages.push(ModelMessage::user(args.prompt));

    let result = generate_text(provider.as_ref(), messages, settings).await?;
    println!("{}", result.text);
    Ok(())
}

pub async fn handle_template(args: TemplateArgs) -> Result<()> {
    let template = PromptTemplate::new(args.template)?;
    let prompt = template.format(&values(args.vars))?;
    if args.dry_run {
        println!("{prompt}");
        return Ok(());
    }

    let (provider, settings) = connect(&args.model)?;
    let result = generate_text(provider.as_ref(), vec![ModelMessage::user(prompt)], settings).await?;
    println!("{}", result.text);
    Ok(())
}

pub async fn handle_chain(args: ChainArgs) -> Result<()> {
    let (provider, settings) = connect(&args.model)?;
    let topic = TopicChain::new(Arc::from(provider), settings)?;
    let outputs = topic.chain.call(values([("name", args.topic)])).await?;

    for key in ["person", "dob", "description"] {
        if let Some(value) = outputs.get(key) {
            println!("== {key}\n{}\n", value.trim());
        }
    }
    println!("== person history\n{}\n", buffer_of(&topic.person_memory));
    println!("== major events\n{}", buffer_of(&topic.description_memory));
    Ok(())
}

pub async fn handle_object(args: ObjectArgs) -> Result<()> {
    let schema: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&args.schema)?)?;
    let (provider, settings) = connect(&args.model)?;

    let strategy = args
        .strategy
        .resolve()
        .unwrap_or_else(|| OutputStrategy::for_capabilities(provider.capabilities()));
    let request = StructuredRequest::new(args.name, schema).with_strategy(strategy);

    let result = generate_object::<serde_json::Value>(
        provider.as_ref(),
        vec![ModelMessage::user(args.prompt)],
        settings,
        request,
    )
    .await?;
    println!("{}", serde_json::to_string_pretty(&result.object)?);
    Ok(())
}

/// The three-step research chain: topic -> birth date -> events that year.
///
/// Each step keeps its own conversation memory so the exchanges can be
/// shown afterwards.
pub struct TopicChain {
    pub chain: SequentialChain,
    pub person_memory: SharedMemory,
    pub dob_memory: SharedMemory,
    pub description_memory: SharedMemory,
}

impl TopicChain {
    pub fn new(provider: Arc<dyn ModelProvider>, settings: GenerationSettings) -> Result<Self> {
        let person_memory = memory("name", "person_history");
        let dob_memory = memory("person", "dob_history");
        let description_memory = memory("dob", "description_history");

        let step = |template: &str, output_key: &str, memory: &SharedMemory| -> Result<Box<dyn Chain>> {
            Ok(Box::new(
                LlmChain::builder()
                    .provider(provider.clone())
                    .prompt(Arc::new(PromptTemplate::new(template)?))
                    .output_key(output_key)
                    .settings(settings.clone())
                    .memory(memory.clone())
                    .build(),
            ))
        };

        let chain = SequentialChain::new(
            vec![
                step("Tell me about {name}", "person", &person_memory)?,
                step("When was {person} born", "dob", &dob_memory)?,
                step(
                    "Mention five major events in this {dob}",
                    "description",
                    &description_memory,
                )?,
            ],
            vec!["name".to_string()],
            vec![
                "person".to_string(),
                "dob".to_string(),
                "description".to_string(),
            ],
        )?;

        Ok(Self {
            chain,
            person_memory,
            dob_memory,
            description_memory,
        })
    }
}

fn memory(input_key: &str, memory_key: &str) -> SharedMemory {
    ConversationBufferMemory::builder()
        .input_key(input_key)
        .memory_key(memory_key)
        .build()
        .shared()
}

fn buffer_of(memory: &SharedMemory) -> String {
    memory.lock().unwrap_or_else(PoisonError::into_inner).buffer()
}

/// Resolve config (file, env, then CLI flags) and build a provider.
fn connect(args: &ModelArgs) -> Result<(Box<dyn ModelProvider>, GenerationSettings)> {
    let mut overrides = StructuraConfig::new();
    overrides.model = args.model.clone();
    overrides.temperature = args.temperature;
    overrides.max_tokens = args.max_tokens;

    let config = StructuraConfig::load()?.merged_with(overrides);
    let model = config.language_model()?;
    let provider = create_provider(&model, &config)?;
    Ok((provider, config.settings()))
}

