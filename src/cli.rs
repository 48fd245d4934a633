//! CLI argument parsing, validation, and startup helpers.

use clap::{Parser, Subcommand};
use tracing::{error, info};
use url::Url;

use crate::ClientConfig;
use crate::backend::DEFAULT_API_URL;
use crate::session::Role;
use crate::storage::Storage;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "sanatorium", about = "Sanatorium management client")]
pub struct Args {
    /// API root of the sanatorium backend
    #[arg(long, env = "SANATORIUM_API_URL", default_value = DEFAULT_API_URL,
        value_parser = validate_api_url)]
    pub api_url: Url,

    /// Path to the SQLite file holding the session
    #[arg(short, long, env = "SANATORIUM_STATE", default_value = "sanatorium.db")]
    pub state: String,

    /// Role to act as when the account holds several (e.g. ROLE_DOCTOR)
    #[arg(short, long, value_parser = parse_role)]
    pub role: Option<Role>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sign in and remember the session
    Login {
        login: String,
        /// Prefer SANATORIUM_PASSWORD over passing it on the command line
        #[arg(long, env = "SANATORIUM_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in identity
    Whoami {
        /// Re-fetch the identity from the backend first
        #[arg(long)]
        revalidate: bool,
    },
    /// Show the role dashboard the session resolves to
    Dashboard {
        #[command(flatten)]
        table: TableArgs,
    },
    /// Published news
    News {
        #[command(flatten)]
        table: TableArgs,
    },
    /// Active shifts
    Shifts {
        #[command(flatten)]
        table: TableArgs,
    },
    /// Procedure catalogue
    Procedures {
        #[command(flatten)]
        table: TableArgs,
    },
    /// Send a message to the administration
    Feedback { message: String },
    /// Turn a shift on or off (admin)
    ToggleShift { shift_id: i64 },
    /// Register a user for a shift (registrar)
    Register {
        user_id: i64,
        shift_id: i64,
        #[arg(long)]
        room: Option<i64>,
    },
    /// Prescribe a procedure for today (doctor)
    Prescribe {
        patient_id: i64,
        shift_id: i64,
        procedure_id: i64,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Mark an appointment as carried out today (nurse)
    Complete { appointment_id: i64 },
    /// Print a random password suitable for a new account
    GeneratePassword,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct TableArgs {
    /// Case-insensitive filter
    #[arg(long, default_value = "")]
    pub search: String,

    /// Page number, starting at 1
    #[arg(long, default_value = "1")]
    pub page: usize,
}

/// Accept only absolute http(s) URLs.
pub fn validate_api_url(s: &str) -> Result<Url, String> {
    let url = Url::parse(s).map_err(|e| format!("Invalid API URL {}: {}", s, e))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("API URL must use http or https: {}", s));
    }
    if url.host_str().is_none() {
        return Err(format!("API URL must include a host: {}", s));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(format!("API URL must not carry a query or fragment: {}", s));
    }

    Ok(url)
}

fn parse_role(s: &str) -> Result<Role, String> {
    let label = s.trim().to_ascii_uppercase();
    let label = if label.starts_with("ROLE_") {
        label
    } else {
        format!("ROLE_{}", label)
    };
    match Role::parse(&label) {
        Role::Unrecognized(_) => Err(format!("Unknown role: {}", s)),
        role => Ok(role),
    }
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_writer(std::io::stderr).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Compact => tracing_subscriber::fmt()
            .compact()
            .with_writer(std::io::stderr)
            .init(),
    }
}

/// Open the state database, logging errors if it fails.
pub async fn open_storage(path: &str) -> Option<Storage> {
    match Storage::open(path).await {
        Ok(storage) => {
            info!(path = %path, "State opened");
            Some(storage)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open state");
            None
        }
    }
}

/// Build ClientConfig from validated arguments.
pub fn build_config(api_url: Url, storage: Storage) -> ClientConfig {
    ClientConfig { api_url, storage }
}
