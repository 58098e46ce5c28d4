use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthData {
    status: &'static str,
    message: &'static str,
    time: DateTime<Utc>,
}

pub async fn health() -> Json<HealthData> {
    let health_data = HealthData {
        status: "healthy",
        message: "Task manager API is running fine",
        time: Utc::now(),
    };
    Json(health_data)
}
