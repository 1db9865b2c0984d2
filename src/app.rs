//! Application context and the interactive shell's command set.
//!
//! DESIGN
//! ======
//! `App` owns the one `SessionStore` for the process and the shared
//! `ApiClient`; views receive them by reference instead of reaching for
//! globals. Commands are parsed into `ShellCommand` first so parsing is
//! testable without a server. The shell loop is generic over its reader and
//! writer; the binary hands it stdin and stdout.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::Config;
use crate::net::api::ApiClient;
use crate::net::error::ApiError;
use crate::net::types::{Item, NewItem};
use crate::notify::{self, Notifier};
use crate::pages::Route;
use crate::pages::dashboard::DashboardView;
use crate::pages::home::HomeView;
use crate::pages::login::LoginView;
use crate::state::auth::SessionStore;

const MAX_REDIRECTS: usize = 4;
const PROMPT: &[u8] = b"> ";

pub const HELP_TEXT: &str = "\
Commands:
  home                              show the home page
  dashboard                         show your items (requires login)
  go <path>                         open /, /dashboard or /login
  login <username> <password>       sign in
  logout                            sign out
  whoami                            show the current session
  item <id>                         fetch one item
  create <id> <name> [description]  add an item
  ping                              check the BFF is up
  help                              show this text
  quit                              exit";

// =============================================================================
// COMMANDS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Go(Route),
    Login { username: String, password: String },
    Logout,
    Whoami,
    Item(i64),
    Create(NewItem),
    Ping,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}`; try `help`")]
    Unknown(String),
    #[error("unknown page `{0}`")]
    UnknownRoute(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

impl ShellCommand {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` for unknown verbs or malformed arguments.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("help" | "?", _) => Self::Help,
            ("home", []) => Self::Go(Route::Home),
            ("dashboard", []) => Self::Go(Route::Dashboard),
            ("go", [path]) => Self::Go(Route::parse(path).ok_or_else(|| CommandError::UnknownRoute((*path).to_owned()))?),
            ("go", _) => return Err(CommandError::Usage("go <path>")),
            ("login", [username, password]) => {
                Self::Login { username: (*username).to_owned(), password: (*password).to_owned() }
            }
            ("login", _) => return Err(CommandError::Usage("login <username> <password>")),
            ("logout", []) => Self::Logout,
            ("whoami", []) => Self::Whoami,
            ("item", [id]) => Self::Item(parse_id(id, "item <id>")?),
            ("item", _) => return Err(CommandError::Usage("item <id>")),
            ("create", [id, name, description @ ..]) => Self::Create(Item {
                id: parse_id(id, "create <id> <name> [description]")?,
                name: (*name).to_owned(),
                description: (!description.is_empty()).then(|| description.join(" ")),
            }),
            ("create", _) => return Err(CommandError::Usage("create <id> <name> [description]")),
            ("ping", []) => Self::Ping,
            ("quit" | "exit", []) => Self::Quit,
            (other, _) => return Err(CommandError::Unknown(other.to_owned())),
        };
        Ok(Some(command))
    }
}

fn parse_id(raw: &str, usage: &'static str) -> Result<i64, CommandError> {
    raw.parse().map_err(|_| CommandError::Usage(usage))
}

/// What the shell should do after a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Quit,
}

// =============================================================================
// APP
// =============================================================================

pub struct App {
    client: Arc<ApiClient>,
    session: SessionStore,
    notifier: Arc<dyn Notifier>,
}

impl App {
    /// Wire the client, store, and notifier together.
    ///
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be built.
    pub fn new(config: &Config, notifier: Arc<dyn Notifier>) -> Result<Self, ApiError> {
        let client = Arc::new(ApiClient::new(config)?);
        let session = SessionStore::new(client.clone(), notifier.clone());
        Ok(Self { client, session, notifier })
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Run the startup session check and render the home page.
    pub async fn start(&self) -> String {
        self.session.initialize().await;
        self.render(Route::Home).await
    }

    /// Render `route`, following gating redirects.
    pub async fn render(&self, route: Route) -> String {
        let mut route = route;
        for _ in 0..MAX_REDIRECTS {
            let state = self.session.state();
            let next = match route {
                Route::Home => return HomeView::from_state(&state).to_string(),
                Route::Dashboard => {
                    match DashboardView::open(&state, self.client.as_ref(), self.notifier.as_ref()).await {
                        DashboardView::Redirect(to) => Route::parse(to).unwrap_or(Route::Login),
                        view => return view.to_string(),
                    }
                }
                Route::Login => match LoginView::open(&state) {
                    LoginView::Redirect(to) => to,
                    view => return view.to_string(),
                },
            };
            tracing::debug!(from = %route, to = %next, "redirect");
            route = next;
        }
        tracing::warn!(%route, "redirect limit reached");
        format!("Could not open {route}.")
    }

    pub async fn execute(&self, command: ShellCommand) -> Flow {
        let output = match command {
            ShellCommand::Help => HELP_TEXT.to_owned(),
            ShellCommand::Go(route) => self.render(route).await,
            ShellCommand::Login { username, password } => {
                match LoginView::submit(&self.session, &username, &password).await {
                    LoginView::Redirect(route) => self.render(route).await,
                    form => form.to_string(),
                }
            }
            ShellCommand::Logout => {
                self.session.logout().await;
                self.render(Route::Home).await
            }
            ShellCommand::Whoami => whoami(&self.session),
            ShellCommand::Item(id) => match self.client.item(id).await {
                Ok(item) => describe_item(&item),
                Err(err) => self.surface(&err, &format!("Could not fetch item {id}.")),
            },
            ShellCommand::Create(item) => match self.client.create_item(&item).await {
                Ok(created) => format!("Created {}", describe_item(&created)),
                Err(err) => self.surface(&err, "Could not create the item."),
            },
            ShellCommand::Ping => match self.client.ping().await {
                Ok(message) => message,
                Err(err) => self.surface(&err, "The BFF did not answer."),
            },
            ShellCommand::Quit => return Flow::Quit,
        };
        Flow::Continue(output)
    }

    /// One-shot dashboard: check the session, optionally sign in, render.
    ///
    /// A rejected sign-in shows the login form; the store has already
    /// reported the failure.
    pub async fn open_dashboard(&self, credentials: Option<(&str, &str)>) -> String {
        self.session.initialize().await;
        if let Some((username, password)) = credentials {
            return match LoginView::submit(&self.session, username, password).await {
                LoginView::Redirect(route) => self.render(route).await,
                form => form.to_string(),
            };
        }
        self.render(Route::Dashboard).await
    }

    fn surface(&self, err: &ApiError, summary: &str) -> String {
        tracing::warn!(status = err.status, error = %err, "command failed");
        notify::report(self.notifier.as_ref(), err);
        summary.to_owned()
    }
}

// =============================================================================
// SHELL
// =============================================================================

impl App {
    /// Render the home page, then run commands from `input` until `quit` or
    /// end of input. Parse errors are printed and the loop carries on.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error from either side.
    pub async fn run_shell<R, W>(&self, input: R, output: &mut W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        write_block(output, &self.start().await).await?;

        let mut lines = input.lines();
        loop {
            output.write_all(PROMPT).await?;
            output.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            let command = match ShellCommand::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(err) => {
                    write_block(output, &err.to_string()).await?;
                    continue;
                }
            };

            match self.execute(command).await {
                Flow::Continue(text) => write_block(output, &text).await?,
                Flow::Quit => break,
            }
        }
        Ok(())
    }
}

async fn write_block<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> io::Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await
}

fn whoami(session: &SessionStore) -> String {
    let state = session.state();
    match &state.user {
        Some(user) if user.roles.is_empty() => format!("{} ({})", user.username, user.user_id),
        Some(user) => format!("{} ({}) roles: {}", user.username, user.user_id, user.roles_label()),
        None if state.is_loading => "Checking session...".to_owned(),
        None => "Not logged in.".to_owned(),
    }
}

fn describe_item(item: &Item) -> String {
    match &item.description {
        Some(description) => format!("#{} {} - {description}", item.id, item.name),
        None => format!("#{} {}", item.id, item.name),
    }
}
