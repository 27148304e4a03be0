//! loginkit - command line front end for the login API.
//!
//! Logs in and out against the configured API, keeps the issued token in the
//! configured store, and answers permission checks from that token.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use loginkit_core::{ApiClient, ApiError, AuthClient, Config, Credentials, KeyValueStore, StoreBackend};

/// Environment variables read by `login`
const USERNAME_ENV: &str = "LOGINKIT_USERNAME";
const PASSWORD_ENV: &str = "LOGINKIT_PASSWORD";

#[derive(Parser, Debug)]
#[command(name = "loginkit", version, about = "Log in, log out and check permissions against a login API")]
struct Cli {
    /// Login API root (overrides LOGINKIT_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Token store backend: memory, file or keyring
    #[arg(long, global = true)]
    store: Option<StoreBackend>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session token
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },
    /// Log out and clear the stored token
    Logout,
    /// Print the stored token
    Token,
    /// Show the stored session
    Whoami,
    /// Exit 0 if the stored token carries ROLE, 1 otherwise
    Check { role: String },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_file: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| "loginkit.log".into());
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_file.as_deref());

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };
    if let Some(store) = cli.store {
        config.store = store;
    }

    let api_url = cli.api_url.clone().unwrap_or_else(|| config.api_url());
    debug!(api_url = %api_url, store = %config.store, "Configuration resolved");

    let api = ApiClient::with_timeout(api_url, config.timeout())?;
    let auth = AuthClient::new(api, config.open_store()?);

    match cli.command {
        Command::Login { username } => login(&auth, &mut config, username).await,
        Command::Logout => logout(&auth).await,
        Command::Token => Ok(match auth.sessions().load()? {
            Some(token) => {
                println!("{}", token);
                ExitCode::SUCCESS
            }
            None => {
                eprintln!("Not logged in");
                ExitCode::FAILURE
            }
        }),
        Command::Whoami => Ok(match auth.current_session()? {
            Some(session) => {
                println!("{} (id {})", session.username, session.user_id);
                println!("role: {}", session.role);
                println!("signed in {}", session.age_display());
                ExitCode::SUCCESS
            }
            None => {
                eprintln!("Not logged in");
                ExitCode::FAILURE
            }
        }),
        Command::Check { role } => Ok(if auth.has_permission(&role) {
            println!("allowed");
            ExitCode::SUCCESS
        } else {
            println!("denied");
            ExitCode::FAILURE
        }),
    }
}

async fn login<S: KeyValueStore>(
    auth: &AuthClient<S>,
    config: &mut Config,
    username: Option<String>,
) -> Result<ExitCode> {
    let username = match username.or_else(|| std::env::var(USERNAME_ENV).ok()) {
        Some(u) => u,
        None => prompt_username(config.last_username.as_deref())?,
    };
    let password = match std::env::var(PASSWORD_ENV) {
        Ok(p) => p,
        Err(_) => rpassword::prompt_password("Password: ")?,
    };

    let credentials = match Credentials::new(&username, &password) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    match auth.sign_in(&credentials).await {
        Ok(user) => {
            config.last_username = Some(user.username.clone());
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
            info!(username = %user.username, "Login successful");
            println!("Login successful ({}, role {})", user.username, user.role);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => match e.downcast_ref::<ApiError>() {
            Some(api_error) => {
                warn!(error = %api_error, "Login failed");
                eprintln!("{}", api_error.user_message());
                Ok(ExitCode::FAILURE)
            }
            None => Err(e),
        },
    }
}

async fn logout<S: KeyValueStore>(auth: &AuthClient<S>) -> Result<ExitCode> {
    match auth.sign_out().await {
        Ok(()) => {
            println!("Logged out");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => match e.downcast_ref::<ApiError>() {
            Some(api_error) => {
                eprintln!("Local session cleared, but the server did not confirm: {}", api_error);
                Ok(ExitCode::FAILURE)
            }
            None => Err(e),
        },
    }
}

fn prompt_username(last_username: Option<&str>) -> Result<String> {
    match last_username {
        Some(last) => print!("Username [{}]: ", last),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(match (input.is_empty(), last_username) {
        (true, Some(last)) => last.to_string(),
        _ => input.to_string(),
    })
}
