use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn healthcheck() -> Json<Health> {
    Json(Health {
        status: "available",
        version: env!("CARGO_PKG_VERSION"),
    })
}
