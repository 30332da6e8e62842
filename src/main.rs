use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use scalynx_cli::config::API_URL_ENV;
use scalynx_cli::{App, BackendStatus, Config, Field, FieldPolicy, FormInput, Operation, OutputHandler};

#[derive(Parser)]
#[command(name = "scalynx")]
#[command(about = "Scalynx CLI - validate and analyze business ideas", long_about = None)]
struct Cli {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    verbose: bool,

    /// API endpoint to connect to (overrides config and SCALYNX_API_URL)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Accept validation with only the idea filled in
    #[arg(long, global = true)]
    idea_only: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill in the form interactively (default)
    Interactive,

    /// Validate an idea once and exit
    Validate {
        /// Business idea description
        #[arg(long)]
        idea: String,

        /// Target market
        #[arg(long, default_value = "")]
        market: String,

        /// Location
        #[arg(long, default_value = "")]
        location: String,
    },

    /// Analyze an idea once and exit
    Analyze {
        /// Business idea description
        #[arg(long)]
        idea: String,
    },

    /// Check that the backend is reachable
    Ping,

    /// Show the effective configuration
    Config {
        /// Write the effective configuration to ~/.scalynx/config.yaml
        #[arg(long)]
        init: bool,
    },
}

enum LoopControl {
    Continue,
    Quit,
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "scalynx_cli=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load_or_default().with_overrides(std::env::var(API_URL_ENV).ok(), cli.endpoint);
    if cli.idea_only {
        config.form.field_policy = FieldPolicy::IdeaOnly;
    }
    tracing::info!(endpoint = %config.api.base_url, "Starting scalynx");

    let mut output = OutputHandler::new().with_debug(cli.verbose);

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => run_interactive(&config, &mut output).await?,
        Commands::Validate { idea, market, location } => {
            let mut app = App::from_config(&config)?;
            app.input = FormInput::new(idea, market, location);
            app.validate();
            app.settle(Operation::Validate).await;
            output.print_view(&app.view())?;

            if app.validate_result().failure().is_some() {
                std::process::exit(1);
            }
        }
        Commands::Analyze { idea } => {
            let mut app = App::from_config(&config)?;
            app.input.set_idea(idea);
            app.analyze();
            app.settle(Operation::Analyze).await;
            output.print_view(&app.view())?;

            if app.analyze_result().success().is_none() {
                std::process::exit(1);
            }
        }
        Commands::Ping => {
            let mut app = App::from_config(&config)?;
            let status = app.check_backend().await.clone();
            output.print_backend_status(&status)?;

            if status == BackendStatus::Offline {
                std::process::exit(1);
            }
        }
        Commands::Config { init } => {
            if init {
                config.save()?;
                output.print_system(&format!(
                    "Wrote {}",
                    Config::get_config_path().display()
                ))?;
            }
            print!("{}", serde_yaml::to_string(&config)?);
        }
    }

    Ok(())
}

async fn run_interactive(config: &Config, output: &mut OutputHandler) -> Result<()> {
    let mut app = App::from_config(config)?;

    output.print_system(&format!("Scalynx idea checker - {}", config.api.base_url))?;
    let status = app.check_backend().await.clone();
    output.print_backend_status(&status)?;
    output.print_help()?;
    output.print_prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if let LoopControl::Quit = handle_line(&mut app, output, &line).await? {
                    break;
                }
                output.print_prompt()?;
            }
            (operation, accepted) = app.next_settlement() => {
                if accepted {
                    println!();
                    output.print_settled(operation)?;
                    output.print_view(&app.view())?;
                    output.print_prompt()?;
                } else if output.is_debug() {
                    println!();
                    output.print_system(&format!("Discarded stale {} result", operation))?;
                    output.print_prompt()?;
                }
            }
        }
    }

    Ok(())
}

async fn handle_line(app: &mut App, output: &mut OutputHandler, line: &str) -> Result<LoopControl> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(LoopControl::Continue);
    }

    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    match command.to_lowercase().as_str() {
        "validate" | "submit" => {
            app.validate();
            output.print_view(&app.view())?;
        }
        "analyze" => {
            app.analyze();
            output.print_view(&app.view())?;
        }
        "show" => {
            output.print_form(&app.input)?;
            output.print_view(&app.view())?;
        }
        "status" | "ping" => {
            let status = app.check_backend().await.clone();
            output.print_backend_status(&status)?;
        }
        "help" | "?" => output.print_help()?,
        "quit" | "exit" | "q" => return Ok(LoopControl::Quit),
        other => match other.parse::<Field>() {
            Ok(field) => {
                app.input.set(field, rest);
                tracing::debug!(field = %field, "Field updated");
            }
            Err(_) => {
                output.print_error(&format!("Unknown command '{}'. Type 'help' for commands.", other))?;
            }
        },
    }

    Ok(LoopControl::Continue)
}
