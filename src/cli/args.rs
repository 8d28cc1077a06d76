//! Command-line argument parsing for pdfcrew
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

/// pdfcrew - Ask questions about a PDF with a research, critique and writing crew
#[derive(Parser, Debug)]
#[command(name = "pdfcrew")]
#[command(version)]
#[command(about = "Answer questions about a PDF with a three-agent pipeline", long_about = None)]
pub struct Args {
    /// Question to ask (prompted for when omitted)
    #[arg(value_name = "QUESTION")]
    pub question: Option<String>,

    /// PDF document to search
    #[arg(long, value_name = "PATH")]
    pub pdf: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Completion model
    #[arg(short, long)]
    pub model: Option<String>,

    /// OpenAI-compatible completion endpoint
    #[arg(long)]
    pub base_url: Option<String>,

    /// Embedding model used for retrieval
    #[arg(long)]
    pub embedding_model: Option<String>,

    /// Do not read or write the index cache
    #[arg(long)]
    pub no_cache: bool,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress all output except the answer)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Build or refresh the cached document index
    Index,

    /// Display effective configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Reject flag combinations clap cannot express
    pub fn validate(&self) -> Result<(), String> {
        if self.command.is_some() && self.question.is_some() {
            return Err("Cannot specify a question with a subcommand.".to_string());
        }

        Ok(())
    }

    /// Apply command-line overrides on top of file and environment config
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(pdf) = &self.pdf {
            config.document.pdf_path = pdf.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(url) = &self.base_url {
            config.llm.base_url = url.clone();
        }
        if let Some(model) = &self.embedding_model {
            config.embedding.model = model.clone();
        }
        if self.no_cache {
            config.document.use_cache = false;
        }
    }
}

impl Verbosity {
    /// Default tracing filter when RUST_LOG is unset
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::VeryVerbose => "debug",
        }
    }

    /// Check if should show progress spinners
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show intermediate stage output
    pub fn show_events(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(parse(&["pdfcrew", "-q"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["pdfcrew"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["pdfcrew", "-v"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["pdfcrew", "-vv"]).verbosity(), Verbosity::VeryVerbose);
        assert_eq!(Verbosity::Verbose.log_filter(), "info");
        assert!(!Verbosity::Quiet.show_progress());
        assert!(Verbosity::VeryVerbose.show_events());
    }

    #[test]
    fn test_question_positional() {
        let args = parse(&["pdfcrew", "What is the main topic?"]);
        assert_eq!(args.question.as_deref(), Some("What is the main topic?"));
        assert!(args.command.is_none());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_subcommands() {
        assert_eq!(parse(&["pdfcrew", "index"]).command, Some(Commands::Index));
        assert_eq!(parse(&["pdfcrew", "config"]).command, Some(Commands::Config));
    }

    #[test]
    fn test_apply_overrides() {
        let args = parse(&[
            "pdfcrew",
            "--pdf",
            "report.pdf",
            "--model",
            "llama3",
            "--base-url",
            "http://gpu:11434/v1",
            "--embedding-model",
            "nomic-embed-text",
            "--no-cache",
        ]);

        let mut config = Config::default();
        args.apply_to(&mut config);

        assert_eq!(config.document.pdf_path, PathBuf::from("report.pdf"));
        assert_eq!(config.llm.model, "llama3");
        assert_eq!(config.llm.base_url, "http://gpu:11434/v1");
        assert_eq!(config.embedding.model, "nomic-embed-text");
        assert!(!config.document.use_cache);
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let mut config = Config::default();
        parse(&["pdfcrew"]).apply_to(&mut config);
        assert_eq!(config.llm.model, "crewai-llama3");
        assert!(config.document.use_cache);
    }

    #[test]
    fn test_no_cache_help_matches_behaviour() {
        use clap::CommandFactory;

        let cmd = Args::command();
        let flag = cmd
            .get_arguments()
            .find(|a| a.get_id() == "no_cache")
            .unwrap();
        assert_eq!(
            flag.get_help().unwrap().to_string(),
            "Do not read or write the index cache"
        );

        let mut config = Config::default();
        parse(&["pdfcrew", "--no-cache"]).apply_to(&mut config);
        assert!(!config.document.use_cache);
    }
}
