use clap::{Parser, Subcommand};

mod commands;
mod util;

#[derive(Parser)]
#[command(
    name = "exercise-agent",
    version,
    about = "Client for a running exercise recommendation agent"
)]
struct Cli {
    /// Agent base URL
    #[arg(long, env = "EXERCISE_AGENT_URL", default_value = "http://localhost:5000")]
    url: String,

    /// Print compact single-line JSON
    #[arg(long, global = true)]
    raw: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check agent health and generator readiness
    Health,
    /// Fetch the agent card
    Card,
    /// Ask the agent for exercise recommendations
    Ask {
        /// What to train (e.g. "legs", "something for my core")
        text: String,
        /// Send the legacy simple envelope instead of JSON-RPC
        #[arg(long)]
        simple: bool,
        /// JSON-RPC request id (generated if omitted)
        #[arg(long, conflicts_with = "simple")]
        id: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Health => commands::health::run(&cli.url, cli.raw).await,
        Commands::Card => commands::card::run(&cli.url, cli.raw).await,
        Commands::Ask { text, simple, id } => {
            commands::ask::run(&cli.url, &text, simple, id.as_deref(), cli.raw).await
        }
    };

    std::process::exit(code);
}
