use anyhow::Result;
use axum::Router;
use std::{fs, io::ErrorKind, path::Path};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use bookclub::config::{AppConfig, RunMode};
use bookclub::database;
use bookclub::routes;
use bookclub::services::{
    document_store::DocumentStore, identity_service::IdentityService, media_service::MediaService,
};
use bookclub::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + run mode ---
    let (cfg, mode) = AppConfig::from_env_and_args()?;

    tracing::info!("starting bookclub with config: {:?}", cfg);

    // --- Ensure storage directory exists ---
    if !Path::new(&cfg.storage_dir).exists() {
        fs::create_dir_all(&cfg.storage_dir)?;
        tracing::info!("created storage directory at {}", cfg.storage_dir);
    }

    // --- Initialize SQLite connection ---
    let db = database::connect(&cfg.database_url).await?;

    match mode {
        RunMode::Migrate => {
            database::run_migrations(&db).await?;
            tracing::info!("database migration complete");
            return Ok(());
        }
        RunMode::CreateUser {
            email,
            display_name,
            admin,
        } => {
            let identity = IdentityService::new(db.clone());
            let user = identity
                .create_user(&email, display_name.as_deref(), admin)
                .await?;
            // The API token is shown once, at provisioning time.
            println!("uid:       {}", user.uid);
            println!("api token: {}", user.api_token);
            return Ok(());
        }
        RunMode::Serve => {}
    }

    // --- Initialize services + shared state ---
    let state = AppState {
        documents: DocumentStore::new(db.clone()),
        media: MediaService::new(
            db.clone(),
            cfg.storage_dir.clone(),
            cfg.public_base_url.clone(),
            cfg.signing_secret.clone(),
        ),
        identity: IdentityService::new(db.clone()),
        admin_email: cfg.admin_email.clone(),
    };

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
