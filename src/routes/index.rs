//! Homepage with a small in-browser test console

use axum::response::Html;

/// GET /
pub async fn homepage() -> Html<&'static str> {
    Html(include_str!("../../assets/index.html"))
}
