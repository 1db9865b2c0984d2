use std::sync::Arc;

use clap::{Parser, Subcommand};
use portal::app::{App, Flow, ShellCommand};
use portal::config::{Config, ConfigError, DEFAULT_BASE_URL};
use portal::net::error::ApiError;
use portal::notify::TerminalNotifier;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "portal", about = "Terminal front end for the BFF demo")]
struct Cli {
    #[arg(long, env = "PORTAL_BFF_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "PORTAL_TIMEOUT_SECS", help = "Per-request timeout; unset or 0 disables it")]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive shell reading commands from stdin (default).
    Shell,
    /// Print the BFF's status message.
    Ping,
    /// Check the session and render the home page.
    Home,
    /// Optionally log in, then render the dashboard.
    Dashboard {
        #[arg(long, requires = "password")]
        username: Option<String>,
        #[arg(long, requires = "username")]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("portal=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::new(&cli.base_url)?.with_timeout_secs(cli.timeout_secs);
    tracing::debug!(base_url = %config.base_url, "configured");

    let app = App::new(&config, Arc::new(TerminalNotifier))?;

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => {
            let mut stdout = tokio::io::stdout();
            app.run_shell(BufReader::new(tokio::io::stdin()), &mut stdout).await?;
        }
        Command::Ping => {
            if let Flow::Continue(output) = app.execute(ShellCommand::Ping).await {
                println!("{output}");
            }
        }
        Command::Home => println!("{}", app.start().await),
        Command::Dashboard { username, password } => {
            let credentials = username.as_deref().zip(password.as_deref());
            println!("{}", app.open_dashboard(credentials).await);
        }
    }
    Ok(())
}
