use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::analysis::OutputFormat;

#[derive(Parser)]
#[command(name = "kubesage")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Diagnose Kubernetes clusters and explain what is wrong")]
#[command(long_about = "Scans cluster resources with a set of analyzers, reports the problems found and can ask an AI backend to explain them. Sensitive names are masked before anything leaves the machine.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan the cluster and report problems
    Analyze(AnalyzeArgs),

    /// Manage the active analyzer filters
    Filters {
        #[command(subcommand)]
        command: FiltersCommand,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct AnalyzeArgs {
    /// Namespace to analyze, all namespaces when omitted
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Analyzers to run, overriding the active filters
    #[arg(short, long, value_delimiter = ',')]
    pub filter: Vec<String>,

    /// Ask the AI backend to explain the problems
    #[arg(short, long)]
    pub explain: bool,

    /// AI backend (openai, anthropic, noop)
    #[arg(short, long)]
    pub backend: Option<String>,

    /// Model used by the AI backend
    #[arg(long)]
    pub model: Option<String>,

    /// Language of the explanations
    #[arg(short, long)]
    pub language: Option<String>,

    /// Keep sensitive values masked in the explanations
    #[arg(short, long)]
    pub anonymize: bool,

    /// Output format (text, json or yaml)
    #[arg(short, long, default_value = "text")]
    pub output: OutputFormat,

    /// Do not read or write cached explanations
    #[arg(long)]
    pub no_cache: bool,

    /// Include Kubernetes documentation hints
    #[arg(short = 'd', long = "with-doc")]
    pub with_doc: bool,

    /// Maximum number of analyzers running at once
    #[arg(short, long)]
    pub max_concurrency: Option<usize>,

    /// Print per-analyzer timings
    #[arg(short = 's', long = "with-stats")]
    pub with_stats: bool,

    /// Kubeconfig context to use
    #[arg(long)]
    pub kube_context: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum FiltersCommand {
    /// List available and active filters
    List,

    /// Activate filters
    Add {
        #[arg(value_delimiter = ',', required = true)]
        filters: Vec<String>,
    },

    /// Deactivate filters
    Remove {
        #[arg(value_delimiter = ',', required = true)]
        filters: Vec<String>,
    },
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_flags() {
        let cli = Cli::parse_from([
            "kubesage", "-vv", "analyze", "-n", "prod", "-f", "Pod,Service", "-e", "-b", "noop",
            "-o", "json", "-m", "3", "--no-cache", "-a",
        ]);
        assert_eq!(cli.verbose, 2);
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.namespace.as_deref(), Some("prod"));
        assert_eq!(args.filter, vec!["Pod", "Service"]);
        assert!(args.explain && args.anonymize && args.no_cache);
        assert_eq!(args.output, OutputFormat::Json);
        assert_eq!(args.max_concurrency, Some(3));
    }

    #[test]
    fn test_unknown_output_format_is_rejected() {
        assert!(Cli::try_parse_from(["kubesage", "analyze", "-o", "xml"]).is_err());
    }

    #[test]
    fn test_filters_add() {
        let cli = Cli::parse_from(["kubesage", "filters", "add", "Ingress,Service"]);
        let Commands::Filters {
            command: FiltersCommand::Add { filters },
        } = cli.command
        else {
            panic!("expected filters add");
        };
        assert_eq!(filters, vec!["Ingress", "Service"]);
    }
}
