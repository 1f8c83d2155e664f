use crate::{ApiResult, DbConn};
use autoassist_db::banners::{Banner, Banners};
use rocket::serde::json::Json;

#[get("/")]
pub async fn list(conn: DbConn) -> ApiResult<Json<Vec<Banner>>> {
    Ok(Json(conn.exec(Banners::list_active).await?))
}
