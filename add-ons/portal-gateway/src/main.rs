//! Axum-based portal gateway: agent proxy routes, chat sessions, health/status/probe.
//! Config-driven via `PortalConfig`.
//!
//! Headless modes:
//! - `--verify`: config and port pre-flight.
//! - `--probe`: send a test question to both agents and print the reports.
//! - `--ask <question> [--gateway-url <url>]`: run the dual-agent fallback once and print the reply.

mod handlers;

use axum::{
    extract::State,
    http::Method,
    routing::{get, post},
    Json, Router,
};
use portal_core::{
    probe_endpoints, ChatSessions, FallbackOrchestrator, GatewayClient, PortalConfig, ProxyGateway,
    ServicesResponder,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Gateway version from Cargo.toml.
pub const GATEWAY_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<PortalConfig>,
    /// Forwards proxy-route questions to the configured upstream agents.
    pub(crate) gateway: Arc<ProxyGateway>,
    /// Data-domain widget: primary agent with sentinel fallback to secondary.
    pub(crate) fallback: Arc<FallbackOrchestrator<ProxyGateway>>,
    /// Services-catalog widget: single agent.
    pub(crate) services: Arc<ServicesResponder<ProxyGateway>>,
    /// In-memory chat sessions, one per widget. Cleared on restart.
    pub(crate) sessions: Arc<ChatSessions>,
}

impl AppState {
    pub(crate) fn new(config: PortalConfig) -> Self {
        let gateway = ProxyGateway::from_config(&config);
        Self {
            fallback: Arc::new(FallbackOrchestrator::with_sentinel(
                gateway.clone(),
                config.sentinel_marker.clone(),
            )),
            services: Arc::new(ServicesResponder::new(gateway.clone())),
            gateway: Arc::new(gateway),
            sessions: Arc::new(ChatSessions::new()),
            config: Arc::new(config),
        }
    }
}

/// Pre-flight check: config is valid and the listener port is free.
fn run_verify(config: &PortalConfig) -> Result<(), String> {
    print!("Checking configuration... ");
    config.validate().map_err(|e| format!("Config invalid: {}", e))?;
    println!("OK");
    println!("  primary   -> {}", config.primary_url);
    println!("  secondary -> {}", config.secondary_url);
    println!(
        "  services  -> {}",
        config.services_url.as_deref().unwrap_or("(not configured)")
    );
    println!("  sentinel  -> {}", config.sentinel_marker);

    let addr = config.listen_addr();
    print!("Checking {}... ", addr);
    match std::net::TcpListener::bind(addr.as_str()) {
        Ok(listener) => {
            drop(listener);
            println!("OK (available)");
        }
        Err(e) => return Err(format!("{} BLOCKED: {}", addr, e)),
    }

    println!("\nAll checks passed. Ready to start gateway.");
    Ok(())
}

async fn run_probe(config: &PortalConfig) -> Result<(), String> {
    let gateway = ProxyGateway::from_config(config);
    let reports = probe_endpoints(&gateway).await;
    let pretty = serde_json::to_string_pretty(&reports).map_err(|e| e.to_string())?;
    println!("{}", pretty);
    if reports.iter().all(|r| r.ok) {
        Ok(())
    } else {
        Err("one or more agents did not answer".to_string())
    }
}

async fn run_ask(config: &PortalConfig, question: &str, gateway_url: Option<&str>) {
    let text = match gateway_url {
        Some(url) => {
            FallbackOrchestrator::with_sentinel(GatewayClient::new(url), config.sentinel_marker.clone())
                .answer(question)
                .await
        }
        None => {
            FallbackOrchestrator::with_sentinel(
                ProxyGateway::from_config(config),
                config.sentinel_marker.clone(),
            )
            .answer(question)
            .await
        }
    };
    println!("{}", text);
}

/// Installs the subscriber. Returns the file writer guard when `log_dir` is set; keep it alive.
fn init_tracing(config: &PortalConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let (file_layer, guard) = match config.log_dir.as_deref() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "portal-gateway.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                ),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}

/// Value following `flag`. Another flag in that position means the value is missing.
fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|pos| args.get(pos + 1))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.starts_with("--"))
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[portal-gateway] .env not loaded: {} (using system environment)", e);
    }

    let config = match PortalConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[portal-gateway] Config load failed: {}", e);
            std::process::exit(1);
        }
    };

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--verify") {
        match run_verify(&config) {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("PRE-FLIGHT FAILED: {}", e);
                std::process::exit(1);
            }
        }
    }

    let _log_guard = init_tracing(&config);

    if args.iter().any(|a| a == "--probe") {
        match run_probe(&config).await {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("PROBE FAILED: {}", e);
                std::process::exit(1);
            }
        }
    }
    if args.iter().any(|a| a == "--ask") {
        let Some(question) = arg_value(&args, "--ask") else {
            eprintln!("Usage: portal-gateway --ask <QUESTION> [--gateway-url <URL>]");
            std::process::exit(1);
        };
        run_ask(&config, &question, arg_value(&args, "--gateway-url").as_deref()).await;
        return;
    }

    let addr = config.listen_addr();
    let app_name = config.app_name.clone();
    let app = build_app(AppState::new(config));

    let listener = match tokio::net::TcpListener::bind(addr.as_str()).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("{} v{} listening on {}", app_name, GATEWAY_VERSION, addr);

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown initiated (Ctrl+C received)");
        }
    }
}

fn build_app(state: AppState) -> Router {
    // CORS: local UI origins (dev servers on 3000-3099) may call the gateway directly.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &axum::http::HeaderValue, _| {
            let s = origin.to_str().unwrap_or("");
            if !(s.starts_with("http://localhost:") || s.starts_with("http://127.0.0.1:")) {
                return false;
            }
            let port = s
                .rsplit(':')
                .next()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(0);
            (3000..=3099).contains(&port)
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/api/ai-agent", post(handlers::proxy::ai_agent_post))
        .route("/api/services-agent", post(handlers::proxy::services_agent_post))
        .route(
            "/api/v1/chat/:widget",
            get(handlers::chat::chat_history_get).post(handlers::chat::chat_send_post),
        )
        .route("/api/v1/health", get(health))
        .route("/api/v1/status", get(status))
        .route("/api/v1/probe", get(probe))
        .with_state(state)
        .layer(cors)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": GATEWAY_VERSION,
    }))
}

/// GET /api/v1/status – identity and upstream wiring from config.
async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "app_name": state.config.app_name,
        "port": state.config.port,
        "primary_url": state.config.primary_url,
        "secondary_url": state.config.secondary_url,
        "services_url": state.config.services_url,
        "sentinel_marker": state.config.sentinel_marker,
    }))
}

/// GET /api/v1/probe – ask both agents a test question.
async fn probe(State(state): State<AppState>) -> Json<serde_json::Value> {
    let reports = probe_endpoints(&state.gateway).await;
    Json(serde_json::json!({ "reports": reports }))
}
