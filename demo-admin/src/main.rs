use std::sync::Arc;
use std::time::Duration;

use uniadmin_axum::{App, UNIADMIN_BASE_PATH, uniadmin_router};

mod server;

use crate::server::{init_tracing, serve, spawn_session_purger};

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing(env!("CARGO_CRATE_NAME"));

    let app = Arc::new(App::from_env().await?);

    // First start: seed an admin so someone can sign in.
    if let (Ok(username), Ok(email), Ok(password)) = (
        std::env::var("ADMIN_USERNAME"),
        std::env::var("ADMIN_EMAIL"),
        std::env::var("ADMIN_PASSWORD"),
    ) {
        app.ensure_admin(&username, &email, &password).await?;
    } else {
        tracing::debug!("ADMIN_USERNAME/ADMIN_EMAIL/ADMIN_PASSWORD not set, no admin seeding");
    }

    let _purger = spawn_session_purger(app.clone(), SESSION_PURGE_INTERVAL);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);
    tracing::info!(base_path = %UNIADMIN_BASE_PATH.as_str(), "Mounting application");

    serve(port, uniadmin_router(app)).await?;
    Ok(())
}
