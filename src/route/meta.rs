use std::time::Instant;

use bson::doc;
use chrono::Utc;
use mongodb::Database;
use rocket::serde::json::{json, Json, Value};
use rocket::State;
use utoipa::ToSchema;

/// Process start marker, managed at launch so /health can report uptime.
pub struct StartTime(pub Instant);

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub success: bool,
    pub status: String,
    pub database: String,
    pub uptime: u64,
    pub timestamp: String,
}

#[utoipa::path(
    responses((status = 200, description = "Service metadata"))
)]
#[get("/")]
pub async fn index() -> Value {
    json!({
        "success": true,
        "message": "City College API",
        "version": "2.0",
        "endpoints": {
            "students": "/api/students",
            "registration": "/api/students/register",
            "contact": "/api/contact",
            "courses": "/api/courses",
            "admin": "/api/admin",
        },
        "status": "Server is running",
        "timestamp": Utc::now().to_rfc3339(),
    })
}

/// Liveness plus a database connectivity flag.
#[utoipa::path(
    responses((status = 200, description = "Liveness report", body = HealthResponse))
)]
#[get("/health")]
pub async fn health(db: &State<Database>, start: &State<StartTime>) -> Json<HealthResponse> {
    let database = match db.run_command(doc! { "ping": 1 }, None).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Json(HealthResponse {
        success: true,
        status: "healthy".to_string(),
        database: database.to_string(),
        uptime: start.0.elapsed().as_secs(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
