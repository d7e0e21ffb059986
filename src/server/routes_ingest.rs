use crate::ingest::IngestOutcome;
use crate::server::{AppContext, AppError};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use hls_sink_common::Error;

pub fn ingest_routes() -> Router<AppContext> {
    Router::new().route("/save", post(save_artifact))
}

/// Accept one forwarded artifact; the origin URL travels in a header.
async fn save_artifact(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let origin_url = headers
        .get(&ctx.url_header)
        .map(|v| {
            v.to_str().map_err(|_| {
                Error::validation(format!(
                    "{} header is not valid UTF-8",
                    ctx.url_header.as_str()
                ))
            })
        })
        .transpose()?;

    let outcome = ctx.ingestor.ingest(origin_url, &body).await?;

    let response = match outcome {
        IngestOutcome::Ignored => StatusCode::OK.into_response(),
        outcome => (StatusCode::OK, outcome.message()).into_response(),
    };
    Ok(response)
}
