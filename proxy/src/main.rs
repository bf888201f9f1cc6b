use anyhow::Result;
use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Router,
};
use clap::Parser;
use hyper::header::CONTENT_TYPE;
use hyper::Response;
use msghop_shared::protocol::{ErrorResponse, ForwardRequest, MAX_BODY_SIZE};
use msghop_shared::Error;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, warn};

mod forward;

#[derive(Parser)]
#[command(name = "msghop")]
#[command(version = "0.1.0")]
#[command(about = "Single-hop JSON message forwarding proxy", long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8888)]
    listen: u16,

    /// Upstream round-trip deadline in seconds
    #[arg(short, long, default_value_t = 30)]
    timeout: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone)]
struct AppState {
    client: reqwest::Client,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    let client = forward::build_client(Duration::from_secs(cli.timeout))?;
    let app = router(AppState { client });

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.listen));
    info!("Starting proxy server on port {} (upstream timeout: {}s)", cli.listen, cli.timeout);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .fallback(any(forward_handler))
        .with_state(state)
}

/// Forwarding handler: POST on any path.
///
/// Parses the inbound body, performs one upstream round trip, and echoes
/// the upstream bytes back with status 200. The upstream status is never
/// propagated; callers that need it must encode it in the reply body.
async fn forward_handler(
    State(state): State<AppState>,
    req: Request<Body>,
) -> axum::response::Response {
    if req.method() != Method::POST {
        return error_response(StatusCode::METHOD_NOT_ALLOWED, "POST only");
    }

    let body = match axum::body::to_bytes(req.into_body(), MAX_BODY_SIZE).await {
        Ok(b) => b,
        Err(e) => {
            warn!("Rejecting unreadable body: {}", e);
            return error_response(StatusCode::BAD_REQUEST, &format!("Unreadable body: {}", e));
        }
    };

    let request: ForwardRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            warn!("Rejecting malformed body: {}", e);
            return error_response(StatusCode::BAD_REQUEST, &format!("Malformed body: {}", e));
        }
    };

    info!(
        "Forwarding {} bytes to {}:{}",
        request.message.len(),
        request.server_ip,
        request.server_port
    );

    match forward::forward(
        &state.client,
        &request.server_ip,
        request.server_port,
        request.message,
    )
    .await
    {
        Ok((upstream_status, bytes)) => {
            if upstream_status >= 400 {
                warn!(
                    "Upstream {}:{} answered {}",
                    request.server_ip, request.server_port, upstream_status
                );
            }
            json_response(StatusCode::OK, bytes)
        }
        Err(e) => {
            warn!(
                "Forward to {}:{} failed: {}",
                request.server_ip, request.server_port, e
            );
            let status = match e {
                Error::Timeout => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::BAD_GATEWAY,
            };
            error_response(status, &e.to_string())
        }
    }
}

fn json_response(status: StatusCode, body: Vec<u8>) -> axum::response::Response {
    let builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json");
    match builder.body(Body::from(body)) {
        Ok(r) => r.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Response build error").into_response(),
    }
}

fn error_response(status: StatusCode, reason: &str) -> axum::response::Response {
    let body = serde_json::to_vec(&ErrorResponse::new(reason)).unwrap_or_default();
    json_response(status, body)
}
