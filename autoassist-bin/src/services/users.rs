use crate::{ApiResult, DbConn, JsonBody};
use autoassist_db::users::*;
use rocket::{
    http::Status,
    serde::json::{json, Json, Value},
};

#[post("/register", data = "<form>")]
pub async fn register(form: JsonBody<UserForm>, conn: DbConn) -> ApiResult<(Status, Json<Value>)> {
    let user = conn.exec(move |c| form.create(c)).await?;
    Ok((
        Status::Created,
        Json(json!({ "success": true, "user": user })),
    ))
}

#[post("/login", data = "<credentials>")]
pub async fn login(credentials: JsonBody<LoginForm>, conn: DbConn) -> ApiResult<Json<Value>> {
    let user = conn
        .exec(move |c| Users::login(c, credentials.into_inner()))
        .await?;
    Ok(Json(json!({ "success": true, "user": user })))
}

#[get("/")]
pub async fn list(conn: DbConn) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(conn.exec(Users::list).await?))
}

#[get("/<id>")]
pub async fn get(id: i32, conn: DbConn) -> ApiResult<Json<User>> {
    Ok(Json(conn.exec(move |c| Users::find_by_id(c, id)).await?))
}

#[post("/", data = "<form>")]
pub async fn create(form: JsonBody<UserForm>, conn: DbConn) -> ApiResult<(Status, Json<User>)> {
    let user = conn.exec(move |c| form.create(c)).await?;
    Ok((Status::Created, Json(user)))
}

#[put("/<id>", data = "<patch>")]
pub async fn update(id: i32, patch: JsonBody<UserPatch>, conn: DbConn) -> ApiResult<Json<User>> {
    let user = conn
        .exec(move |c| Users::update(c, id, patch.into_inner()))
        .await?;
    Ok(Json(user))
}

#[delete("/<id>")]
pub async fn delete(id: i32, conn: DbConn) -> ApiResult<Json<Value>> {
    conn.exec(move |c| Users::delete_by_id(c, id)).await?;
    Ok(Json(
        json!({ "success": true, "message": "User deleted successfully" }),
    ))
}
