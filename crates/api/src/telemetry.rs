use tower::layer::util::{Identity, Stack};
use tower::ServiceBuilder;
use tower_http::trace::HttpMakeClassifier;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// JSON log lines, filtered by `RUST_LOG`.
pub fn init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

pub fn stack(
    body_limit: usize,
) -> ServiceBuilder<
    Stack<RequestBodyLimitLayer, Stack<CorsLayer, Stack<TraceLayer<HttpMakeClassifier>, Identity>>>,
> {
    let trace = TraceLayer::new_for_http();
    let cors = CorsLayer::permissive();
    let limit = RequestBodyLimitLayer::new(body_limit);

    ServiceBuilder::new().layer(trace).layer(cors).layer(limit)
}
