use crate::{ApiResult, DbConn, JsonBody};
use autoassist_db::workshops::*;
use rocket::{
    http::Status,
    serde::json::{json, Json, Value},
};

#[get("/")]
pub async fn list(conn: DbConn) -> ApiResult<Json<Vec<Workshop>>> {
    Ok(Json(conn.exec(Workshops::list).await?))
}

#[get("/<id>")]
pub async fn get(id: i32, conn: DbConn) -> ApiResult<Json<Workshop>> {
    Ok(Json(conn.exec(move |c| Workshops::find_by_id(c, id)).await?))
}

#[post("/", data = "<form>")]
pub async fn create(form: JsonBody<WorkshopForm>, conn: DbConn) -> ApiResult<(Status, Json<Workshop>)> {
    let workshop = conn
        .exec(move |c| form.into_inner().verify()?.create(c))
        .await?;
    Ok((Status::Created, Json(workshop)))
}

#[put("/<id>", data = "<patch>")]
pub async fn update(id: i32, patch: JsonBody<WorkshopPatch>, conn: DbConn) -> ApiResult<Json<Workshop>> {
    let workshop = conn
        .exec(move |c| Workshops::update(c, id, patch.into_inner()))
        .await?;
    Ok(Json(workshop))
}

#[delete("/<id>")]
pub async fn delete(id: i32, conn: DbConn) -> ApiResult<Json<Value>> {
    conn.exec(move |c| Workshops::delete_by_id(c, id)).await?;
    Ok(Json(
        json!({ "success": true, "message": "Workshop deleted successfully" }),
    ))
}
