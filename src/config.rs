use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub database_url: String,
    /// Base URL under which signed media URLs are issued.
    pub public_base_url: String,
    /// Registered email of the administrator account. A profile created
    /// with this email is granted the admin claim.
    pub admin_email: String,
    /// Secret used to sign media read URLs.
    pub signing_secret: String,
}

/// What the process should do after configuration is loaded.
#[derive(Debug)]
pub enum RunMode {
    Serve,
    Migrate,
    CreateUser {
        email: String,
        display_name: Option<String>,
        admin: bool,
    },
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Book catalog & community API")]
pub struct Args {
    /// Host to bind to (overrides BOOKCLUB_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides BOOKCLUB_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where media payloads are stored (overrides BOOKCLUB_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Database URL (overrides BOOKCLUB_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Public base URL for signed media links (overrides BOOKCLUB_PUBLIC_BASE_URL)
    #[arg(long)]
    pub public_base_url: Option<String>,

    /// Administrator email (overrides BOOKCLUB_ADMIN_EMAIL)
    #[arg(long)]
    pub admin_email: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,

    /// Create an identity record for this email, print its API token, and exit
    #[arg(long, value_name = "EMAIL")]
    pub create_user: Option<String>,

    /// Display name for --create-user
    #[arg(long, requires = "create_user")]
    pub display_name: Option<String>,

    /// Grant the admin claim to the user created with --create-user
    #[arg(long, requires = "create_user")]
    pub admin: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and run mode.
    pub fn from_env_and_args() -> Result<(Self, RunMode)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("BOOKCLUB_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("BOOKCLUB_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing BOOKCLUB_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading BOOKCLUB_PORT"),
        };
        let env_storage = env::var("BOOKCLUB_STORAGE_DIR").unwrap_or_else(|_| "./data/media".into());
        let env_db = env::var("BOOKCLUB_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/meta/bookclub.db".into());
        let env_public_base_url = env::var("BOOKCLUB_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into());
        let env_admin_email = env::var("BOOKCLUB_ADMIN_EMAIL").unwrap_or_default();
        let signing_secret = env::var("BOOKCLUB_SIGNING_SECRET")
            .unwrap_or_else(|_| "insecure-dev-signing-secret".into());

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            database_url: args.database_url.unwrap_or(env_db),
            public_base_url: args.public_base_url.unwrap_or(env_public_base_url),
            admin_email: args.admin_email.unwrap_or(env_admin_email),
            signing_secret,
        };

        let mode = if args.migrate {
            RunMode::Migrate
        } else if let Some(email) = args.create_user {
            RunMode::CreateUser {
                email,
                display_name: args.display_name,
                admin: args.admin,
            }
        } else {
            RunMode::Serve
        };

        Ok((cfg, mode))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
