//! ooxml-fields CLI - Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use ooxml_fields::ElsePolicy;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "ooxml-fields")]
#[command(version)]
#[command(about = "Merge-field and IF-field templating for Word documents", long_about = None)]
struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print diagnostics as JSON instead of text
    #[arg(long, global = true)]
    diagnostics_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Describe the merge fields and IF fields of a document as JSON
    Extract {
        /// Input document.xml ('-' for stdin)
        input: String,

        /// Print compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Substitute merge fields and prune IF fields
    Process {
        /// Input document.xml ('-' for stdin)
        input: String,

        /// JSON file with the data context
        #[arg(short, long)]
        data: Option<String>,

        /// Write output to FILE (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Replacement text for merge-field results
        #[arg(long)]
        placeholder: Option<String>,

        /// Do not insert MERGEFIELD comments before substituted text
        #[arg(long)]
        no_merge_comments: bool,

        /// How a second %else% marker in one IF field is handled
        #[arg(long, value_enum, default_value_t = ElsePolicyArg::Reject)]
        else_policy: ElsePolicyArg,

        /// Only substitute merge fields
        #[arg(long, conflicts_with = "if_only")]
        merge_only: bool,

        /// Only prune IF fields
        #[arg(long)]
        if_only: bool,
    },

    /// Strip presentation-only markup and empty runs and paragraphs
    Simplify {
        /// Input document.xml ('-' for stdin)
        input: String,

        /// Write output to FILE (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print the text of every w:t element, one per line
    Text {
        /// Input document.xml ('-' for stdin)
        input: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ElsePolicyArg {
    Reject,
    Toggle,
}

impl From<ElsePolicyArg> for ElsePolicy {
    fn from(arg: ElsePolicyArg) -> Self {
        match arg {
            ElsePolicyArg::Reject => ElsePolicy::Reject,
            ElsePolicyArg::Toggle => ElsePolicy::Toggle,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for document output
    let default_filter = if cli.verbose {
        "ooxml_fields=debug"
    } else {
        "ooxml_fields=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let report = commands::ReportOptions {
        diagnostics_json: cli.diagnostics_json,
    };

    match cli.command {
        Commands::Extract { input, compact } => {
            commands::extract::execute(commands::extract::ExtractArgs { input, compact }, &report)
        }
        Commands::Process {
            input,
            data,
            output,
            placeholder,
            no_merge_comments,
            else_policy,
            merge_only,
            if_only,
        } => commands::process::execute(
            commands::process::ProcessArgs {
                input,
                data,
                output,
                placeholder,
                merge_comments: !no_merge_comments,
                else_policy: else_policy.into(),
                merge_fields: !if_only,
                if_fields: !merge_only,
            },
            &report,
        ),
        Commands::Simplify { input, output } => {
            commands::simplify::execute(commands::simplify::SimplifyArgs { input, output })
        }
        Commands::Text { input } => commands::text::execute(&input),
    }
}
