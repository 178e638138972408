//! Notedeck CLI
//!
//! Command-line client for the multi-tenant notes service

mod config;
mod render;

use anyhow::bail;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{Level, debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use notedeck_core::{NoteDraft, NoteId, UpgradeAffordance};
use notedeck_egress::HttpNotesGateway;
use notedeck_session::{FileSessionStore, Section, SessionManager};

use config::ClientConfig;

type Manager = SessionManager<HttpNotesGateway, FileSessionStore>;

#[derive(Parser)]
#[command(name = "notedeck")]
#[command(about = "Notedeck - multi-tenant notes client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "NOTEDECK_CONFIG",
        global = true
    )]
    config: Option<String>,

    /// Backend base URL
    #[arg(long, value_name = "URL", global = true)]
    backend_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the backend is reachable
    Health,
    /// Log in and store the session locally
    Login {
        email: String,

        /// Prompted for when not given
        #[arg(long, env = "NOTEDECK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create a tenant and its first account
    Signup {
        email: String,

        /// Name of the new tenant
        #[arg(long)]
        tenant: String,

        #[arg(long, env = "NOTEDECK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the current session, plan and note usage
    #[command(alias = "whoami")]
    Status,
    /// Manage notes
    Notes {
        #[command(subcommand)]
        command: NotesCommand,
    },
    /// Upgrade the tenant to the PRO plan (ADMIN only)
    Upgrade {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum NotesCommand {
    /// List notes of the tenant
    List {
        /// Print the notes as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a note
    Create {
        title: String,

        #[arg(default_value = "")]
        content: String,

        /// Send the request even when the FREE plan limit is reached
        #[arg(long)]
        force: bool,
    },
    /// Change the title and/or content of a note
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,
    },
    /// Delete a note
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration, then environment, then flags
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    config.merge_env();
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_logging(&config.logging.level)?;
    debug!("Using backend {}", config.backend_url);

    let gateway = HttpNotesGateway::new(config.api_config())?;
    let store = FileSessionStore::new(config.state_dir())?;
    let mut manager = SessionManager::new(Arc::new(gateway), store);

    run(cli.command, &mut manager, &config).await
}

fn parse_log_level(level: &str) -> Option<Level> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn init_logging(level: &str) -> anyhow::Result<()> {
    let level = parse_log_level(level).unwrap_or_else(|| {
        // The subscriber isn't installed yet
        eprintln!("Warning: Invalid log level '{}', using warn", level);
        Level::WARN
    });

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn run(command: Commands, manager: &mut Manager, config: &ClientConfig) -> anyhow::Result<()> {
    match command {
        Commands::Health => {
            let result = manager.probe_health().await;
            let healthy = outcome(manager, result)?;
            if !healthy {
                bail!("Backend at {} answered with an error status", config.backend_url);
            }
            println!("Backend at {} is healthy", config.backend_url);
        }
        Commands::Login { email, password } => {
            let password = password_or_prompt(password)?;
            let result = manager.login(&email, &password).await;
            outcome(manager, result)?;
            print_notice(manager);
        }
        Commands::Signup {
            email,
            tenant,
            password,
        } => {
            let password = password_or_prompt(password)?;
            let result = manager.signup(&email, &password, &tenant).await;
            outcome(manager, result)?;
            print_notice(manager);
        }
        Commands::Logout => {
            manager.logout().await;
            println!("Logged out.");
        }
        Commands::Status => {
            if manager.restore().await? {
                fail_on_error_notice(manager)?;
            } else if let Some(notice) = manager.state().notice() {
                bail!(notice.text.clone());
            }
            println!("{}", render::dashboard(manager.state()).trim_end());
        }
        Commands::Notes { command } => {
            require_session(manager).await?;
            run_notes(command, manager).await?;
        }
        Commands::Upgrade { yes } => {
            require_session(manager).await?;
            if !manager.show_section(Section::Upgrade) {
                bail!(UpgradeAffordance::ContactAdmin.message());
            }
            if let Some(identity) = manager.state().identity() {
                println!("{}", render::upgrade_offer(identity));
            }
            if !yes && !confirm("Upgrade the tenant to PRO?")? {
                println!("Cancelled.");
                return Ok(());
            }
            let result = manager.upgrade_plan().await;
            outcome(manager, result)?;
            print_notice(manager);
        }
    }

    Ok(())
}

async fn run_notes(command: NotesCommand, manager: &mut Manager) -> anyhow::Result<()> {
    match command {
        NotesCommand::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(manager.state().notes())?);
            } else {
                print!("{}", render::note_list(manager.state().notes()));
            }
        }
        NotesCommand::Create {
            title,
            content,
            force,
        } => {
            let draft = NoteDraft::new(title, content);
            let result = if force {
                manager.create_note(draft).await
            } else {
                manager.set_draft(draft);
                manager.submit_draft().await
            };
            let note = outcome(manager, result)?;
            print_notice(manager);
            println!("[{}] {}", note.id, note.title);
        }
        NotesCommand::Edit { id, title, content } => {
            let id = NoteId::new(id);
            manager.begin_edit(&id)?;

            let mut draft = manager.state().draft().clone();
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(content) = content {
                draft.content = content;
            }
            manager.set_draft(draft);

            let result = manager.submit_draft().await;
            outcome(manager, result)?;
            print_notice(manager);
        }
        NotesCommand::Delete { id, yes } => {
            let id = NoteId::new(id);
            let prompt = match manager.state().note(&id) {
                Some(note) => format!("Delete note \"{}\"?", note.title),
                None => format!("Delete note {}?", id),
            };
            if !yes && !confirm(&prompt)? {
                println!("Cancelled.");
                return Ok(());
            }
            let result = manager.delete_note(&id).await;
            outcome(manager, result)?;
            print_notice(manager);
        }
    }

    Ok(())
}

/// Restore the stored session; fails when there is none or it was rejected
async fn require_session(manager: &mut Manager) -> anyhow::Result<()> {
    let active = manager.restore().await?;
    fail_on_error_notice(manager)?;
    if !active {
        bail!("Not logged in. Run `notedeck login` first.");
    }
    info!("Using stored session");
    Ok(())
}

fn fail_on_error_notice(manager: &Manager) -> anyhow::Result<()> {
    match manager.state().notice() {
        Some(notice) if notice.is_error() => bail!(notice.text.clone()),
        _ => Ok(()),
    }
}

/// Turn an operation result into the user-facing error recorded by the session
fn outcome<T>(manager: &Manager, result: notedeck_core::Result<T>) -> anyhow::Result<T> {
    result.map_err(|e| match manager.state().notice() {
        Some(notice) if notice.is_error() => anyhow::anyhow!(notice.text.clone()),
        _ => anyhow::Error::new(e),
    })
}

fn print_notice(manager: &Manager) {
    if let Some(notice) = manager.state().notice() {
        println!("{}", notice.text);
    }
}

fn password_or_prompt(password: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    print!("Password: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
