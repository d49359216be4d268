use std::{
    error::Error,
    fs::OpenOptions,
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use sales_dashboard::{
    AccessConfig, AppConfig, AppState, DEFAULT_IMPORT_URL, PaginationConfig, build_router,
    graceful_shutdown,
};

/// The HTTP server for the sales dashboard and its JSON API.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "DB_PATH")]
    db_path: String,

    /// The address to listen on.
    #[arg(long, env = "ADDRESS", default_value = "127.0.0.1")]
    address: IpAddr,

    /// The port to serve the app from.
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// The canonical name of the timezone that month boundaries are computed in,
    /// e.g. "Pacific/Auckland".
    #[arg(long, env = "LOCAL_TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,

    /// The URL of the JSON array of transactions that `/api/initialize` imports.
    #[arg(long, env = "IMPORT_URL", default_value = DEFAULT_IMPORT_URL)]
    import_url: String,

    /// When set, every API request must send `Authorization: Bearer <token>`.
    #[arg(long, env = "API_TOKEN")]
    api_token: Option<String>,

    /// The maximum number of requests handled at once.
    #[arg(long, env = "MAX_CONCURRENT_REQUESTS")]
    max_concurrent_requests: Option<usize>,

    /// The maximum size of a request body in bytes.
    #[arg(long, env = "REQUEST_BODY_LIMIT", default_value_t = AccessConfig::default().request_body_limit)]
    request_body_limit: usize,

    /// File path to write the debug log to.
    #[arg(long, env = "LOG_FILE", default_value = "debug.log")]
    log_file: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    setup_logging(&args.log_file)?;

    let addr = SocketAddr::from((args.address, args.port));

    let conn = Connection::open(&args.db_path)
        .inspect_err(|error| tracing::error!("could not open database {}: {error}", args.db_path))?;
    let config = AppConfig {
        local_timezone: args.timezone,
        import_url: args.import_url,
        pagination: PaginationConfig::default(),
        access: AccessConfig {
            api_token: args.api_token,
            request_body_limit: args.request_body_limit,
            max_concurrent_requests: args.max_concurrent_requests,
        },
    };
    let app_state = AppState::new(conn, config)
        .inspect_err(|error| tracing::error!("could not create app state: {error}"))?;

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(app_state));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    Ok(())
}

fn setup_logging(log_path: &str) -> Result<(), Box<dyn Error>> {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_ansi(false)
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .try_init()?;

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
