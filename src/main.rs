use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tenantctl::auth;
use tenantctl::auth::AuthStorage;
use tenantctl::binding::Binding;
use tenantctl::commands::{self, GetGroupOwners, GetTerm};
use tenantctl::config::{Config, KNOWN_KEYS, Overrides, Settings};
use tenantctl::consts::{AUTHOR, DEFAULT_TENANT, REPO, default_db_path};
use tenantctl::output::{Collector, Format, render};
use tenantctl::session::Session;

#[derive(Parser)]
#[command(
    name = "tenantctl",
    version,
    author = AUTHOR,
    about = "Group and taxonomy commands for a collaboration tenant.",
    after_help = REPO,
    help_template = "{name} {version}\n{author}\n{about}\n\n{usage-heading} {usage}\n\n{all-args}{after-help}"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// SQLite database for credentials and config [default: ~/.tenantctl/tenantctl.db]
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Tenant whose stored token to use
    #[arg(long, global = true, default_value = DEFAULT_TENANT)]
    tenant: String,

    /// Site id for taxonomy commands (overrides env and stored config)
    #[arg(long, global = true)]
    site: Option<String>,

    /// Remote API base URL (overrides env and stored config)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Json)]
    output: Format,

    /// More logging on stderr (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Store an access token for the tenant
    Login {
        /// Bearer token; read from stdin when omitted
        #[arg(long)]
        token: Option<String>,
        /// Seconds until the token expires
        #[arg(long)]
        expires_in: Option<u64>,
    },
    /// Remove the stored access token
    Logout,
    /// Read or change persisted settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// List the owners of a group
    GetGroupOwners {
        /// Group id or display name
        #[arg(long)]
        identity: String,
        /// Owner fields to return, comma separated
        #[arg(long, value_delimiter = ',')]
        select: Vec<String>,
    },
    /// Look up taxonomy terms in a term set
    GetTerm {
        /// Term group id or name
        #[arg(long)]
        term_group: String,
        /// Term set id or name
        #[arg(long)]
        term_set: String,
        /// Term store id or name [default: the site's default store]
        #[arg(long)]
        term_store: Option<String>,
        /// Term id or name; omit to list every term in the set
        #[arg(long)]
        identity: Option<String>,
        /// Match the name as a label anywhere below the set
        #[arg(long, requires = "identity")]
        recursive: bool,
        /// Attach descendants of each term under `Terms`
        #[arg(long)]
        include_child_terms: bool,
        /// Fields to return, comma separated [default: Name,Id]
        #[arg(long, value_delimiter = ',')]
        includes: Vec<String>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print one value
    Get { key: String },
    /// Store a value
    Set { key: String, value: String },
    /// Remove a value
    Unset { key: String },
    /// Print every known key
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let Cli {
        command,
        db,
        tenant,
        site,
        api_base,
        output,
        verbose,
    } = Cli::parse();

    init_tracing(verbose);

    let db = open_db_path(db)?;
    let overrides = Overrides { site, api_base };

    match command {
        Command::Login { token, expires_in } => handle_login(&db, &tenant, token, expires_in),
        Command::Logout => {
            auth::logout(&db, &tenant)?;
            println!("✓ Logged out from {tenant}.");
            Ok(())
        }
        Command::Config { action } => handle_config(&db, action),
        Command::GetGroupOwners { identity, select } => {
            let mut cmd = GetGroupOwners::new(Binding::parse(&identity)?);
            if !select.is_empty() {
                cmd = cmd.with_select(select);
            }
            let session = connect(&db, &tenant, &overrides)?;
            execute(&cmd, &session, output).await
        }
        Command::GetTerm {
            term_group,
            term_set,
            term_store,
            identity,
            recursive,
            include_child_terms,
            includes,
        } => {
            let mut cmd = GetTerm::new(Binding::parse(&term_group)?, Binding::parse(&term_set)?)
                .recursive(recursive)
                .include_child_terms(include_child_terms);
            if let Some(store) = term_store {
                cmd = cmd.with_store(Binding::parse(&store)?);
            }
            if let Some(identity) = identity {
                cmd = cmd.with_identity(Binding::parse(&identity)?);
            }
            if !includes.is_empty() {
                cmd = cmd.with_includes(includes);
            }
            let session = connect(&db, &tenant, &overrides)?;
            execute(&cmd, &session, output).await
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "warn,tenantctl=debug",
        _ => "warn,tenantctl=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Resolve the database path and make sure its directory exists.
fn open_db_path(db: Option<PathBuf>) -> anyhow::Result<String> {
    let path = match db {
        Some(path) => path,
        None => default_db_path()?,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    path.to_str()
        .map(str::to_string)
        .context("database path is not valid UTF-8")
}

fn connect(db: &str, tenant: &str, overrides: &Overrides) -> anyhow::Result<Session> {
    let config = Config::open(db)?;
    let settings = Settings::resolve(overrides, &config)?;
    let auth = AuthStorage::open(db).context("failed to open auth storage")?;
    Session::connect(&settings, &auth, tenant)
}

async fn execute(
    command: &dyn commands::Command,
    session: &Session,
    format: Format,
) -> anyhow::Result<()> {
    let mut out = Collector::new();
    commands::run(command, session, &mut out).await?;
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    render(out.records(), format, &mut lock)?;
    lock.flush()?;
    Ok(())
}

fn handle_login(
    db: &str,
    tenant: &str,
    token: Option<String>,
    expires_in: Option<u64>,
) -> anyhow::Result<()> {
    let token = match token {
        Some(token) => token,
        None => {
            print!("Paste the access token: ");
            io::stdout().flush()?;
            let mut token = String::new();
            io::stdin().read_line(&mut token)?;
            token
        }
    };

    auth::login(db, tenant, &token, expires_in)?;

    println!("✓ Token stored for {tenant}.");
    println!("  Credentials saved to {db}");
    Ok(())
}

fn handle_config(db: &str, action: ConfigAction) -> anyhow::Result<()> {
    let config = Config::open(db)?;
    match action {
        ConfigAction::Get { key } => match config.get(&key)? {
            Some(value) => println!("{value}"),
            None => anyhow::bail!("{key} is not set"),
        },
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            println!("✓ {key} = {value}");
        }
        ConfigAction::Unset { key } => {
            config.remove(&key)?;
            println!("✓ {key} removed");
        }
        ConfigAction::Show => {
            let width = KNOWN_KEYS.iter().map(|k| k.len()).max().unwrap_or(0);
            for key in KNOWN_KEYS {
                let value = config.get(key)?.unwrap_or_else(|| "(unset)".to_string());
                println!("  {key:<width$}  {value}");
            }
        }
    }
    Ok(())
}
