//! Mekong Doctor gateway server.
//!
//! Accepts authenticated browser uploads, signs them with SigV4, and
//! forwards them to an S3-compatible object store; also proxies crop
//! diagnosis requests to an LLM API with a rule-based fallback.
//!
//! # Usage
//!
//! ```text
//! GATEWAY_LISTEN=0.0.0.0:8787 mekong-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Required | Description |
//! |----------|----------|-------------|
//! | `GATEWAY_LISTEN` | no | Bind address (default `0.0.0.0:8787`) |
//! | `STORE_ACCESS_KEY_ID` | yes | Object-store access key |
//! | `STORE_SECRET_ACCESS_KEY` | yes | Object-store secret key |
//! | `STORE_ACCOUNT_ID` | yes | Object-store account identifier |
//! | `STORE_BUCKET` | yes | Target bucket |
//! | `IDENTITY_URL` | yes | Identity provider base URL |
//! | `IDENTITY_API_KEY` | yes | Identity provider service key |
//! | `LLM_API_KEY` | no | LLM API key (diagnosis route) |
//! | `LOG_LEVEL` | no | Log level filter (default `info`) |
//! | `RUST_LOG` | no | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use mekong_core::GatewayConfig;
use mekong_diagnosis::{DiagnosisEngine, OpenRouterClient};
use mekong_http::{GatewayService, GatewayState};
use mekong_identity::HttpIdentityVerifier;
use mekong_storage::ObjectStoreClient;

/// Server version reported in the startup banner.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Timeout applied to every outbound call (identity provider, object store,
/// LLM API). No retry is performed on top of it.
const OUTBOUND_TIMEOUT: Duration = Duration::from_secs(30);

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Build the shared gateway state from configuration.
fn build_state(config: &GatewayConfig) -> Result<GatewayState> {
    let client = reqwest::Client::builder()
        .timeout(OUTBOUND_TIMEOUT)
        .build()
        .context("failed to build HTTP client")?;

    let verifier = HttpIdentityVerifier::new(
        client.clone(),
        config.identity_url.clone(),
        config.identity_api_key.clone(),
    );

    let store = ObjectStoreClient::new(
        client.clone(),
        config.store_access_key_id.clone(),
        config.store_secret_access_key.clone(),
        &config.store_account_id,
        config.store_bucket.clone(),
        config.store_region.clone(),
    );

    let diagnosis = match &config.llm_api_key {
        Some(api_key) => DiagnosisEngine::new(Arc::new(OpenRouterClient::new(
            client,
            config.llm_api_url.clone(),
            api_key.clone(),
            config.llm_model.clone(),
        ))),
        None => {
            warn!("LLM_API_KEY not set, diagnosis route will answer with a configuration error");
            DiagnosisEngine::unconfigured()
        }
    };

    Ok(GatewayState {
        verifier: Arc::new(verifier),
        store: Arc::new(store),
        diagnosis,
        max_upload_bytes: config.max_upload_bytes,
    })
}

/// Run the accept loop, serving connections until a shutdown signal arrives.
async fn serve(listener: TcpListener, service: GatewayService) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    // Wait for in-flight requests to complete.
    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Perform a health check against a running gateway.
///
/// Exits with code 0 if healthy, 1 otherwise.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("\"status\":\"running\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle --health-check flag for container HEALTHCHECK probes. The
    // listen address is all that is needed, so secrets are not loaded here.
    if std::env::args().any(|a| a == "--health-check") {
        let listen =
            std::env::var("GATEWAY_LISTEN").unwrap_or_else(|_| "0.0.0.0:8787".to_owned());
        let addr = listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    // Missing secrets abort startup here, before the listener binds.
    let config = GatewayConfig::from_env().context("invalid gateway configuration")?;

    init_tracing(&config.log_level)?;

    info!(
        gateway_listen = %config.gateway_listen,
        store_bucket = %config.store_bucket,
        store_region = %config.store_region,
        identity_url = %config.identity_url,
        llm_configured = config.llm_api_key.is_some(),
        version = VERSION,
        "starting Mekong Doctor gateway",
    );

    let state = build_state(&config)?;
    let service = GatewayService::new(state);

    let addr: SocketAddr = config
        .gateway_listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.gateway_listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    serve(listener, service).await
}
