use crate::DbConn;
use diesel::{sql_query, RunQueryDsl};
use rocket::{
    http::Status,
    serde::json::{json, Json, Value},
};

#[get("/")]
pub fn index() -> Json<Value> {
    Json(json!({
        "message": "AutoAssist Backend API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "/api/health",
            "users": "/api/users",
            "admin": "/api/admin",
            "workshops": "/api/workshops",
            "products": "/api/products",
            "transactions": "/api/transactions",
            "banners": "/api/banners",
        }
    }))
}

#[get("/health")]
pub async fn health(conn: DbConn) -> (Status, Json<Value>) {
    let timestamp = chrono::Utc::now().to_rfc3339();
    match conn.run(|c| sql_query("SELECT 1").execute(c)).await {
        Ok(_) => (
            Status::Ok,
            Json(json!({ "status": "ok", "database": "connected", "timestamp": timestamp })),
        ),
        Err(e) => {
            log::error!("health check failed: {}", e);
            (
                Status::InternalServerError,
                Json(json!({
                    "status": "error",
                    "database": "disconnected",
                    "timestamp": timestamp,
                    "error": "Database connection failed",
                })),
            )
        }
    }
}
