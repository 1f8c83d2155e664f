use crate::{ApiResult, DbConn, JsonBody};
use autoassist_db::{admins::*, users::LoginForm};
use rocket::{
    http::Status,
    serde::json::{json, Json, Value},
};

#[post("/login", data = "<credentials>")]
pub async fn login(credentials: JsonBody<LoginForm>, conn: DbConn) -> ApiResult<Json<Value>> {
    let admin = conn
        .exec(move |c| Admins::login(c, credentials.into_inner()))
        .await?;
    Ok(Json(json!({ "success": true, "admin": admin })))
}

#[get("/")]
pub async fn list(conn: DbConn) -> ApiResult<Json<Vec<Admin>>> {
    Ok(Json(conn.exec(Admins::list).await?))
}

#[get("/<id>")]
pub async fn get(id: i32, conn: DbConn) -> ApiResult<Json<Admin>> {
    Ok(Json(conn.exec(move |c| Admins::find_by_id(c, id)).await?))
}

#[post("/", data = "<form>")]
pub async fn create(form: JsonBody<AdminForm>, conn: DbConn) -> ApiResult<(Status, Json<Admin>)> {
    let admin = conn.exec(move |c| form.create(c)).await?;
    Ok((Status::Created, Json(admin)))
}

#[put("/<id>", data = "<patch>")]
pub async fn update(id: i32, patch: JsonBody<AdminPatch>, conn: DbConn) -> ApiResult<Json<Admin>> {
    let admin = conn
        .exec(move |c| Admins::update(c, id, patch.into_inner()))
        .await?;
    Ok(Json(admin))
}

#[delete("/<id>")]
pub async fn delete(id: i32, conn: DbConn) -> ApiResult<Json<Value>> {
    conn.exec(move |c| Admins::delete_by_id(c, id)).await?;
    Ok(Json(
        json!({ "success": true, "message": "Admin deleted successfully" }),
    ))
}
