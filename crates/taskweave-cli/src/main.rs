use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "taskweave-cli", version, about = "Taskweave CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Break a task down and schedule it into free calendar time
    Plan(commands::plan::PlanArgs),
    /// Show upcoming free slots
    Slots(commands::slots::SlotsArgs),
    /// Authentication management for the calendar collaborator
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Plan(args) => commands::plan::run(args),
        Commands::Slots(args) => commands::slots::run(args),
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
