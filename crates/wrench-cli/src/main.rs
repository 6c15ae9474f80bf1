mod commands;
mod configuration;
mod error;
mod prompt;
mod session;

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use configuration::CliOverrides;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Model provider (overrides WRENCH_PROVIDER__TYPE)
    #[arg(short, long, global = true, value_enum)]
    provider: Option<CliProviderVariant>,

    /// Model name (overrides WRENCH_PROVIDER__MODEL)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Output token budget per model call (overrides WRENCH_PROVIDER__MAX_TOKENS)
    #[arg(long, global = true)]
    max_tokens: Option<i32>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliProviderVariant {
    Anthropic,
    #[value(name = "openai")]
    OpenAi,
}

impl CliProviderVariant {
    fn config_name(self) -> &'static str {
        match self {
            CliProviderVariant::Anthropic => "anthropic",
            CliProviderVariant::OpenAi => "openai",
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive session (the default)
    #[command(about = "Start an interactive session")]
    Session,

    /// Run a single instruction and exit
    #[command(about = "Run one instruction without interaction")]
    Run {
        /// Instruction text
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,

        /// File containing the instruction
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print the version
    #[command(about = "Display the current version")]
    Version,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            provider: self.provider.map(|p| p.config_name().to_string()),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let overrides = cli.overrides();

    let result = match cli.command {
        None | Some(Command::Session) => commands::session::execute(&overrides).await,
        Some(Command::Run { text, file }) => commands::run::execute(&overrides, text, file).await,
        Some(Command::Version) => commands::version::execute(),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}
