//! Config file loading and layering.

use std::io::Write;

use pretty_assertions::assert_eq;
use structura::config::{StructuraConfig, DEFAULT_MODEL};
use structura::error::StructuraError;
use structura::models::LanguageModel;

#[test]
fn reads_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
api_key = "sk-file"
model = "openai-compatible:mistral"
base_url = "http://localhost:11434/v1"
temperature = 0.3
"#
    )
    .unwrap();

    let config = StructuraConfig::from_file(file.path()).unwrap();
    assert_eq!(config.api_key.as_deref(), Some("sk-file"));
    assert_eq!(config.temperature, Some(0.3));
    assert_eq!(config.max_tokens, None);
    assert_eq!(
        config.language_model().unwrap(),
        LanguageModel::OpenAiCompatible {
            model_id: "mistral".into(),
            base_url: None,
        }
    );
}

#[test]
fn malformed_file_is_configuration_error_naming_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "temperature = \"warm\"").unwrap();

    let err = StructuraConfig::from_file(&path).unwrap_err();
    match err {
        StructuraError::Configuration(message) => {
            assert!(message.contains("config.toml"), "message: {message}")
        }
        other => panic!("expected Configuration, got {other:?}"),
    }
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = StructuraConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, StructuraError::Io(_)));
}

#[test]
fn code_overrides_file_values() {
    let file = StructuraConfig::from_toml_str("api_key = \"sk-file\"\nmax_tokens = 100").unwrap();
    let code = StructuraConfig::new().with_max_tokens(500).with_model("gpt-4o");

    let config = file.merged_with(code);
    assert_eq!(config.api_key.as_deref(), Some("sk-file"));
    assert_eq!(config.max_tokens, Some(500));
    assert_eq!(config.settings().max_tokens, Some(500));
    assert_eq!(config.language_model().unwrap().to_string(), "openai:gpt-4o");
}

#[test]
fn default_model_when_unset() {
    let config = StructuraConfig::new();
    assert_eq!(
        config.language_model().unwrap().to_string(),
        DEFAULT_MODEL
    );
    assert!(!config.has_credentials());
}

#[test]
fn debug_output_hides_api_key() {
    let config = StructuraConfig::new().with_api_key("sk-very-secret");
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("sk-very-secret"));
    assert!(rendered.contains("redacted"));
}

// Kept in one test: these variables are process-wide.
#[test]
fn load_reads_explicit_file_and_env_wins() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "model = \"openai:gpt-4o\"\ntemperature = 0.3\nmax_tokens = 100").unwrap();

    std::env::remove_var("STRUCTURA_MODEL");
    std::env::remove_var("STRUCTURA_MAX_TOKENS");
    std::env::set_var("STRUCTURA_CONFIG", file.path());
    std::env::set_var("STRUCTURA_TEMPERATURE", "0.9");

    let config = StructuraConfig::load().unwrap();
    assert_eq!(config.model.as_deref(), Some("openai:gpt-4o"));
    assert_eq!(config.max_tokens, Some(100));
    assert_eq!(config.temperature, Some(0.9));

    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("STRUCTURA_CONFIG", dir.path().join("structura.toml"));
    let missing = StructuraConfig::load();

    std::env::remove_var("STRUCTURA_CONFIG");
    std::env::remove_var("STRUCTURA_TEMPERATURE");

    assert!(matches!(missing, Err(StructuraError::Io(_))));
}
