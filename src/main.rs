use verifiedmeasure::{app, state::AppState};

const DEFAULT_LOG_FILTER: &str = "verifiedmeasure=debug,axum=info,tower_http=info";

/// `RUST_LOG` overrides the default filter; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v == "json");

    let fmt = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        fmt.with_target(false).json().init();
    } else {
        fmt.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let state = AppState::init().await?;
    let config = state.config.clone();
    tracing::info!(host = %config.host, port = config.port, "starting verifiedmeasure");

    app::serve(app::build_app(state), &config).await
}
