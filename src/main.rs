use std::process::ExitCode;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use gatehouse::api::{routes, AppState};
use gatehouse::providers::HttpSlackClient;
use gatehouse::teams::MemoryTeamRepository;
use gatehouse::{AuthGateway, GatewayConfig, MemoryUserRepository};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Misconfiguration is fatal here, never a per-request error.
    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "startup configuration failed");
            return ExitCode::FAILURE;
        }
    };

    let slack_client = match HttpSlackClient::new(config.slack.clone()) {
        Ok(client) => client,
        Err(err) => {
            tracing::error!(error = %err, "slack client construction failed");
            return ExitCode::FAILURE;
        }
    };

    let user_repo = MemoryUserRepository::new();
    let team_repo = MemoryTeamRepository::new();
    let gateway = AuthGateway::new(user_repo.clone(), slack_client, &config);

    let state = AppState {
        gateway: Arc::new(gateway),
        user_repo,
        team_repo,
        base_url: config.base_url.clone(),
    };

    let app = routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = std::env::var("GATEHOUSE_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_owned());
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, addr, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(addr, base_url = %config.base_url, "gatehouse listening");

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(error = %err, "server exited with error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
