use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use foodcourt::nav::LOGIN_ROUTE;
use foodcourt::{
    ApiRequest, CredentialStore, FileStore, LoginOutcome, MemoryNavigator, Navigator, Role, Session, SessionConfig,
    SessionError, Signing, TokenKind, TokenStatus,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("login failed: {0}")]
    LoginRejected(String),
    #[error("not logged in; run `foodcourt login` first")]
    NotLoggedIn,
    #[error("session is no longer valid; log in again")]
    SessionExpired,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "foodcourt", about = "Foodcourt marketplace session CLI")]
struct Cli {
    /// API origin; overrides `FOODCOURT_API_URL`.
    #[arg(long)]
    api_url: Option<String>,

    #[arg(long, env = "FOODCOURT_SESSION_FILE", default_value = ".foodcourt-session.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Account {
    User,
    Seller,
    Delivery,
}

impl From<Account> for TokenKind {
    fn from(account: Account) -> Self {
        match account {
            Account::User => Self::User,
            Account::Seller => Self::Seller,
            Account::Delivery => Self::Delivery,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and cache the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "FOODCOURT_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long = "as", value_enum, default_value_t = Account::User)]
        account: Account,
    },
    /// Check the cached token with the server.
    Verify,
    /// Print the cached user record.
    Whoami,
    /// Print whether the cached user has `role`.
    Role { role: String },
    /// Drop the cached session.
    Logout {
        /// Skip notifying the server.
        #[arg(long, default_value_t = false)]
        local: bool,
    },
    /// Signed `GET` against the API.
    Get {
        path: String,
        /// Sign with the delivery-agent token.
        #[arg(long, default_value_t = false)]
        delivery: bool,
    },
}

/// Route the command is "on", for the 401 policy.
fn start_route(command: &Command) -> &'static str {
    match command {
        Command::Login { account: Account::Seller, .. } => "/seller-login",
        Command::Login { .. } => LOGIN_ROUTE,
        _ => "/",
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = SessionConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config.api_url = SessionConfig::with_api_url(url).api_url;
    }

    let store = CredentialStore::new(Arc::new(FileStore::new(&cli.store)));
    let nav = Arc::new(MemoryNavigator::new(start_route(&cli.command)));
    let session = Session::connect(config, store, nav.clone())?;
    tracing::debug!(api_url = %session.config().api_url, store = %cli.store.display(), "session ready");

    let is_logout = matches!(cli.command, Command::Logout { .. });
    let result = run(&session, cli.command).await;
    if !is_logout && nav.navigations() > 0 && nav.current_path() == LOGIN_ROUTE {
        eprintln!("session expired; cached credentials were cleared");
    }
    result
}

async fn run(session: &Session, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { email, password, account } => {
            let kind = TokenKind::from(account);
            match session.login_as(kind, &email, &password).await {
                LoginOutcome::Authenticated(user) => {
                    println!("logged in as {} ({kind})", display_name(&user.name, &user.email));
                    Ok(())
                }
                LoginOutcome::Rejected { message } => Err(CliError::LoginRejected(message)),
            }
        }
        Command::Verify => match session.validate_token().await {
            TokenStatus::Valid(user) => {
                print_json(&serde_json::to_value(&user)?)?;
                Ok(())
            }
            TokenStatus::Invalid if session.is_authenticated() => Err(CliError::SessionExpired),
            TokenStatus::Invalid => Err(CliError::NotLoggedIn),
        },
        Command::Whoami => {
            let user = session.current_user().ok_or(CliError::NotLoggedIn)?;
            print_json(&serde_json::to_value(&user)?)?;
            Ok(())
        }
        Command::Role { role } => {
            println!("{}", session.has_role(&Role::from(role.as_str())));
            Ok(())
        }
        Command::Logout { local } => {
            if local {
                session.logout();
            } else {
                session.logout_and_redirect().await;
            }
            println!("logged out");
            Ok(())
        }
        Command::Get { path, delivery } => {
            let signing = if delivery { Signing::Delivery } else { Signing::Default };
            let result = session
                .client()
                .send::<Value>(ApiRequest::get(path).signing(signing))
                .await;
            print_json(&result?)
        }
    }
}

fn display_name<'a>(name: &'a str, email: &'a str) -> &'a str {
    if name.is_empty() { email } else { name }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
