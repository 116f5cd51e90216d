use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use foodjournal_api::auth::{AppState, AppStateInner};
use foodjournal_db::Store;

const DEFAULT_JWT_SECRET: &str = "dev-secret-change-me";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "foodjournal=debug,foodjournal_api=debug,foodjournal_db=info,tower_http=debug".into()
            }),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("FOODJOURNAL_JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.into());
    if jwt_secret == DEFAULT_JWT_SECRET {
        warn!("FOODJOURNAL_JWT_SECRET not set, using the development default");
    }
    let data_dir: PathBuf = std::env::var("FOODJOURNAL_DATA_DIR")
        .unwrap_or_else(|_| "./data".into())
        .into();
    let host = std::env::var("FOODJOURNAL_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("FOODJOURNAL_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // One store handle for the whole process. Initializing here surfaces a bad
    // data dir at startup instead of on the first request.
    let store = Store::new(&data_dir);
    store.initialize().await?;

    let state: AppState = Arc::new(AppStateInner { store, jwt_secret });
    let app = foodjournal_api::router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Food journal server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
