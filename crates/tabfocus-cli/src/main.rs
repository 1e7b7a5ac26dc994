use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tabfocus-cli", version, about = "Tabfocus CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Saved-origin management
    Origins {
        #[command(subcommand)]
        action: commands::origins::OriginsAction,
    },
    /// Accessibility overlay flag
    Overlay {
        #[command(subcommand)]
        action: commands::overlay::FlagAction,
    },
    /// Timer panel visibility flag
    TimerUi {
        #[command(subcommand)]
        action: commands::overlay::FlagAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Live session against the simulated browser host
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Origins { action } => commands::origins::run(action).await,
        Commands::Overlay { action } => commands::overlay::run_overlay(action).await,
        Commands::TimerUi { action } => commands::overlay::run_timer_ui(action).await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Session { action } => commands::session::run(action).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
