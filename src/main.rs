//! Structura CLI binary entry point.

use structura::cli::{commands, Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();

    let result = match cli.command {
        Commands::Extract(args) => commands::handle_extract(args),
        Commands::Ask(args) => commands::handle_ask(args).await,
        Commands::Template(args) => commands::handle_template(args).await,
        Commands::Chain(args) => commands::handle_chain(args).await,
        Commands::Object(args) => commands::handle_object(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        if let Some(text) = e.payload_text() {
            eprintln!("--- offending text ---\n{text}");
        }
        std::process::exit(1);
    }
}
