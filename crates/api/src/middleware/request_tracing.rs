use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Build the tracing layer for request/response logging. Responses log at
/// debug so autosave traffic does not flood the info level.
pub fn trace_layer() -> TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>,
> {
    TraceLayer::new_for_http().on_response(DefaultOnResponse::new().level(Level::DEBUG))
}
