use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use shared_types::ApiErrorBody;

/// Header carrying the caller's uid, set by the authenticating edge proxy.
pub const USER_ID_HEADER: &str = "x-befriend-user-id";

/// Caller identity, inserted into request extensions by [`require_identity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

/// Middleware: reject requests without a caller uid.
/// `/health` is served without identity.
pub async fn require_identity(mut req: Request, next: Next) -> Response {
    if req.uri().path() == "/health" {
        return next.run(req).await;
    }

    let uid = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string);

    let Some(uid) = uid else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ApiErrorBody {
                error: "not authenticated".to_string(),
            }),
        )
            .into_response();
    };

    req.extensions_mut().insert(CurrentUser(uid));
    next.run(req).await
}
