use clap::{CommandFactory, Parser, Subcommand};
use vibetimer_core::Config;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "vibetimer", version, about = "Focus timer with Normal and Vibing modes")]
struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive timer session
    Run(commands::run::RunArgs),
    /// Show the rest earned by a vibing session of the given length
    Rest(commands::rest::RestArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Run(args) => {
            let config = Config::load()?;
            logging::init(cli.verbose, &config.log_level);
            commands::run::run(args, &config)
        }
        Commands::Rest(args) => {
            let config = Config::load()?;
            logging::init(cli.verbose, &config.log_level);
            commands::rest::run(args, &config)
        }
        Commands::Config { action } => {
            logging::init(cli.verbose, "warn");
            commands::config::run(action)
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "vibetimer", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
