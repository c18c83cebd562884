use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "journey-cli", version, about = "Learning Journey CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Learning goal management
    Goal {
        #[command(subcommand)]
        action: commands::goal::GoalAction,
    },
    /// Log today's activity
    Log {
        #[command(subcommand)]
        action: commands::log::LogAction,
    },
    /// Streak, quota and today's state as JSON
    Status,
    /// Week strip with each day's state
    Week {
        /// Weeks to move away from the current one (negative for the past)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i64,
    },
    /// Month grid and history span
    Calendar(commands::calendar::CalendarArgs),
    /// Clear the activity log
    Reset,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Goal { action } => commands::goal::run(action),
        Commands::Log { action } => commands::log::run(action),
        Commands::Status => commands::status::run(),
        Commands::Week { offset } => commands::week::run(offset),
        Commands::Calendar(args) => commands::calendar::run(args),
        Commands::Reset => commands::reset::run(),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
