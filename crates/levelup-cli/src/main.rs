use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "levelup", version, about = "Levelup CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show level and progress
    Level(commands::level::LevelArgs),
    /// Point ledger management
    Points {
        #[command(subcommand)]
        action: commands::points::PointsAction,
    },
    /// Challenge and quiz completions
    Challenge {
        #[command(subcommand)]
        action: commands::challenge::ChallengeAction,
    },
    /// Show the daily streak
    Streak(commands::UserArgs),
    /// Show today's challenges or quiz
    Daily(commands::daily::DailyArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Level(args) => commands::level::run(args),
        Commands::Points { action } => commands::points::run(action),
        Commands::Challenge { action } => commands::challenge::run(action),
        Commands::Streak(args) => commands::streak::run(args),
        Commands::Daily(args) => commands::daily::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
