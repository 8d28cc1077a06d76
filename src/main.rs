//! pdfcrew - Main CLI Entry Point

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pdfcrew::{
    agent::Crew,
    cli::{Args, Commands, QuestionPrompt},
    config::Config,
    display::ConsoleDisplay,
    document::pdf,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(msg) = args.validate() {
        eprintln!("{}", msg);
        std::process::exit(2);
    }

    init_tracing(&args);

    let display = Arc::new(ConsoleDisplay::new(args.verbosity()));

    if let Err(e) = run(&args, display.clone()).await {
        display.show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Logs go to stderr; RUST_LOG overrides the verbosity flags
fn init_tracing(args: &Args) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.verbosity().log_filter())),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Defaults, then config file, then `.env` and environment, then flags
fn load_config(args: &Args) -> Result<Config> {
    Config::load_dotenv()?;

    let mut config = Config::load(args.config.as_deref())?;
    config.apply_env();
    args.apply_to(&mut config);
    config.validate()?;
    Ok(config)
}

async fn run(args: &Args, display: Arc<ConsoleDisplay>) -> Result<()> {
    let config = load_config(args)?;

    match &args.command {
        Some(Commands::Config) => {
            print!("{}", config.to_toml()?);
        }
        Some(Commands::Index) => {
            let index = Crew::refresh_index(&config).await?;
            display.show_info(&format!(
                "Indexed {} chunks from {} with {}",
                index.len(),
                index.source(),
                index.embedding_model()
            ));
        }
        None => {
            // Fail on a bad document path before asking anything
            pdf::check_readable(&config.document.pdf_path)?;

            let question = match &args.question {
                Some(q) => Some(q.clone()),
                None => QuestionPrompt::new()?.read()?,
            };
            let question = question.context("No question given")?;

            let crew = Crew::from_config(&config)
                .await?
                .with_observer(display.clone());

            let output = crew.kickoff(&question).await?;
            display.show_answer(output.answer.as_str());
            display.show_details(&output.telemetry.summary());
        }
    }

    Ok(())
}
