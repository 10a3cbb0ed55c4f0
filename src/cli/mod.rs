//! CLI entry point for Structura.

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::generation::OutputStrategy;

/// Structura CLI
#[derive(Parser, Debug)]
#[command(
    name = "structura",
    version,
    about = "Structura: structured output from language models"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print every ```json block in a file (or stdin) as a JSON array
    Extract(ExtractArgs),
    /// Send one prompt to the model
    Ask(AskArgs),
    /// Render a prompt template and send it
    Template(TemplateArgs),
    /// Look up a topic, then its birth date, then major events that year
    Chain(ChainArgs),
    /// Generate a JSON object matching a schema
    Object(ObjectArgs),
}

/// Model selection and sampling overrides shared by model-calling commands.
#[derive(Args, Debug, Default)]
pub struct ModelArgs {
    /// Model to use (format: provider:model, e.g., openai:gpt-4o)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Temperature (0.0 - 2.0)
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Max tokens
    #[arg(long)]
    pub max_tokens: Option<u32>,
}

/// Arguments for `structura extract`.
#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// File to read; stdin when omitted
    pub file: Option<PathBuf>,
}

/// Arguments for `structura ask`.
#[derive(Parser, Debug)]
pub struct AskArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// System prompt
    #[arg(short, long)]
    pub system: Option<String>,

    /// User prompt
    pub prompt: String,
}

/// Arguments for `structura template`.
#[derive(Parser, Debug)]
pub struct TemplateArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Template text with {variable} placeholders
    pub template: String,

    /// Variable assignment, repeatable (e.g. --var name=Ada)
    #[arg(long = "var", value_parser = parse_key_val)]
    pub vars: Vec<(String, String)>,

    /// Print the rendered prompt instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for `structura chain`.
#[derive(Parser, Debug)]
pub struct ChainArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Topic (usually a person) to research
    pub topic: String,
}

/// Arguments for `structura object`.
#[derive(Parser, Debug)]
pub struct ObjectArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Path to a JSON schema describing the object
    #[arg(long)]
    pub schema: PathBuf,

    /// Name of the object type
    #[arg(long, default_value = "Output")]
    pub name: String,

    /// How to ask for structured output
    #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
    pub strategy: StrategyArg,

    /// User prompt
    pub prompt: String,
}

/// CLI spelling of [`OutputStrategy`], plus `auto`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    /// Pick from the model's capabilities
    Auto,
    JsonSchema,
    JsonMode,
    PromptAndParse,
}

impl StrategyArg {
    /// `None` means "decide from capabilities".
    pub fn resolve(self) -> Option<OutputStrategy> {
        match self {
            Self::Auto => None,
            Self::JsonSchema => Some(OutputStrategy::JsonSchema),
            Self::JsonMode => Some(OutputStrategy::JsonMode),
            Self::PromptAndParse => Some(OutputStrategy::PromptAndParse),
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_extract_from_stdin() {
        let cli = Cli::try_parse_from(["structura", "extract"]).unwrap();
        match cli.command {
            Commands::Extract(args) => assert!(args.file.is_none()),
            other => panic!("expected Extract, got {other:?}"),
        }
    }

    #[test]
    fn parse_ask_with_all_options() {
        let cli = Cli::try_parse_from([
            "structura",
            "ask",
            "-m",
            "openai:gpt-4o",
            "-s",
            "You are a financial advisor",
            "-t",
            "0.8",
            "--max-tokens",
            "256",
            "Explain GDP",
        ])
        .unwrap();
        match cli.command {
            Commands::Ask(args) => {
                assert_eq!(args.model.model.as_deref(), Some("openai:gpt-4o"));
                assert_eq!(args.system.as_deref(), Some("You are a financial advisor"));
                assert!((args.model.temperature.unwrap() - 0.8).abs() < f64::EPSILON);
                assert_eq!(args.model.max_tokens, Some(256));
                assert_eq!(args.prompt, "Explain GDP");
            }
            other => panic!("expected Ask, got {other:?}"),
        }
    }

    #[test]
    fn parse_template_vars() {
        let cli = Cli::try_parse_from([
            "structura",
            "template",
            "Translate {sentence} into {target_language}",
            "--var",
            "sentence=Hello, how are you",
            "--var",
            "target_language=Telugu",
            "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Commands::Template(args) => {
                assert_eq!(
                    args.vars,
                    vec![
                        ("sentence".to_string(), "Hello, how are you".to_string()),
                        ("target_language".to_string(), "Telugu".to_string()),
                    ]
                );
                assert!(args.dry_run);
            }
            other => panic!("expected Template, got {other:?}"),
        }
    }

    #[test]
    fn value_may_contain_equals() {
        assert_eq!(
            parse_key_val("expr=a=b").unwrap(),
            ("expr".to_string(), "a=b".to_string())
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn parse_object_strategy_defaults_to_auto() {
        let cli = Cli::try_parse_from([
            "structura",
            "object",
            "--schema",
            "recipe.json",
            "a pasta recipe",
        ])
        .unwrap();
        match cli.command {
            Commands::Object(args) => {
                assert_eq!(args.strategy, StrategyArg::Auto);
                assert_eq!(args.strategy.resolve(), None);
                assert_eq!(args.name, "Output");
            }
            other => panic!("expected Object, got {other:?}"),
        }
    }

    #[test]
    fn parse_object_explicit_strategy() {
        let cli = Cli::try_parse_from([
            "structura",
            "object",
            "--schema",
            "s.json",
            "--strategy",
            "prompt-and-parse",
            "x",
        ])
        .unwrap();
        match cli.command {
            Commands::Object(args) => {
                assert_eq!(
                    args.strategy.resolve(),
                    Some(OutputStrategy::PromptAndParse)
                );
            }
            other => panic!("expected Object, got {other:?}"),
        }
    }

    #[test]
    fn parse_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["structura"]).is_err());
    }

    #[test]
    fn parse_chain_requires_topic() {
        assert!(Cli::try_parse_from(["structura", "chain"]).is_err());
    }
}
