use std::{
    io,
    sync::{Arc, OnceLock},
    time,
};

use application::{api, config, graphql, Args, Config};
use axum::{
    extract::MatchedPath,
    routing::{on, MethodFilter},
    Extension, Router,
};
use axum_client_ip::InsecureClientIp;
use service::{
    infra::{postgres, Postgres},
    Service,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing as log;
use tracing_subscriber::{
    filter::{filter_fn, FilterFn},
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

/// [`log::Level`]s written to STDERR rather than STDOUT.
const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

/// Maximum [`log::Level`] to output, set once the [`Config`] is loaded.
static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

postgres::embed_migrations!("../migrations");

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_thread_names(true)
                .with_writer(io::stdout)
                .with_filter(stdio_filter(false)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(stdio_filter(true)),
        )
        .init();

    _ = run().await;
}

/// Filters the events to be written to STDERR (if `stderr` is `true`) or to
/// STDOUT otherwise, respecting the configured [`LOG_LEVEL`].
fn stdio_filter(
    stderr: bool,
) -> FilterFn<impl Fn(&log::Metadata<'_>) -> bool> {
    filter_fn(move |meta| {
        let max = LOG_LEVEL.get().copied().unwrap_or(log::Level::INFO);
        meta.is_span()
            || STDERR_LEVELS.contains(meta.level()) == stderr
                && *meta.level() <= max
    })
}

/// Loads the [`Config`], migrates the database and serves the GraphQL API
/// until failure.
///
/// Failures are logged right away.
async fn run() -> Result<(), ()> {
    let Args { config } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;
    let Config {
        server,
        service,
        postgres,
        log,
    } = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;
    LOG_LEVEL
        .set(log.level)
        .unwrap_or_else(|_| unreachable!("set only once"));

    let mut database = Postgres::new(&postgres.into()).map_err(|e| {
        log::error!("failed to initialize `Postgres`: {e}");
    })?;
    let report = migrations::runner()
        .run_async(&mut database)
        .await
        .map_err(|e| {
            log::error!("failed to run database migrations: {e}");
        })?;
    for m in report.applied_migrations() {
        log::info!("applied `{m}` database migration");
    }

    let service = Service::new(service.into(), database);
    let schema =
        api::Schema::new(api::Query, api::Mutation, api::Subscription::new());

    let app = Router::new()
        .route(
            "/graphql",
            on(MethodFilter::GET.or(MethodFilter::POST), graphql),
        )
        .layer(Extension(Arc::new(schema)))
        .layer(Extension(service))
        .layer(cors(&server.cors)?)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(http_span)
                .on_response(log_response),
        );

    let addr = format!("{}:{}", server.host, server.port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        log::error!("failed to listen on `{addr}`: {e}");
    })?;
    log::info!("listening on `{addr}`");

    axum::serve(listener, app)
        .await
        .map_err(|e| log::error!("webserver failed: {e}"))
}

/// Builds the [`CorsLayer`] allowing the configured origins.
///
/// A `*` among the origins allows any of them.
fn cors(conf: &config::Cors) -> Result<CorsLayer, ()> {
    let origins = if conf.origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        conf.origins
            .iter()
            .map(|origin| {
                origin.parse::<http::HeaderValue>().map_err(|e| {
                    log::error!("`{origin}` is not a valid CORS origin: {e}");
                })
            })
            .collect::<Result<Vec<_>, _>>()?
            .into()
    };

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            http::Method::GET,
            http::Method::OPTIONS,
            http::Method::POST,
        ])
        .allow_headers([
            http::header::AUTHORIZATION,
            http::header::CONTENT_TYPE,
            http::header::COOKIE,
        ]))
}

/// Creates a [`tracing::Span`] of the provided HTTP request.
fn http_span<B>(req: &http::Request<B>) -> tracing::Span {
    let headers = req.headers();
    tracing::info_span!(
        "HTTP request",
        http.client_ip = InsecureClientIp::from(headers, req.extensions())
            .map(|ip| ip.0.to_string())
            .ok(),
        http.method = req.method().as_str(),
        http.route = req
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str),
        http.status_code = tracing::field::Empty,
        http.target = req
            .uri()
            .path_and_query()
            .map(http::uri::PathAndQuery::as_str),
        http.user_agent = headers
            .get(http::header::USER_AGENT)
            .and_then(|h| h.to_str().ok()),
        http.version = ?req.version(),
    )
}

/// Records the status of the provided HTTP response into its [`http_span`]
/// and logs its duration.
fn log_response<B>(
    res: &http::Response<B>,
    dur: time::Duration,
    span: &tracing::Span,
) {
    let status = res.status();
    _ = span.record("http.status_code", status.as_u16());

    let duration = format!("{}ms", dur.as_millis());
    if status.is_client_error() || status.is_server_error() {
        log::warn!(duration = %duration, "request failed");
    } else {
        log::info!(duration = %duration, "request served");
    }
}
