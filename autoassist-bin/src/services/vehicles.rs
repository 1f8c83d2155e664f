use crate::{ApiResult, DbConn, JsonBody};
use autoassist_db::vehicles::*;
use rocket::{
    http::Status,
    serde::json::{json, Json, Value},
};

// Mounted under the users namespace: every vehicle belongs to `uid`

#[get("/<uid>/vehicles")]
pub async fn list(uid: i32, conn: DbConn) -> ApiResult<Json<Vec<Vehicle>>> {
    Ok(Json(conn.exec(move |c| Vehicles::list_by_user(c, uid)).await?))
}

#[get("/<uid>/vehicles/<vid>")]
pub async fn get(uid: i32, vid: i32, conn: DbConn) -> ApiResult<Json<Vehicle>> {
    Ok(Json(conn.exec(move |c| Vehicles::find(c, uid, vid)).await?))
}

#[post("/<uid>/vehicles", data = "<form>")]
pub async fn create(
    uid: i32,
    form: JsonBody<VehicleForm>,
    conn: DbConn,
) -> ApiResult<(Status, Json<Vehicle>)> {
    let vehicle = conn
        .exec(move |c| Vehicles::create(c, uid, form.into_inner()))
        .await?;
    Ok((Status::Created, Json(vehicle)))
}

#[put("/<uid>/vehicles/<vid>", data = "<form>")]
pub async fn update(
    uid: i32,
    vid: i32,
    form: JsonBody<VehicleForm>,
    conn: DbConn,
) -> ApiResult<Json<Vehicle>> {
    let vehicle = conn
        .exec(move |c| Vehicles::update(c, uid, vid, form.into_inner()))
        .await?;
    Ok(Json(vehicle))
}

#[delete("/<uid>/vehicles/<vid>")]
pub async fn delete(uid: i32, vid: i32, conn: DbConn) -> ApiResult<Json<Value>> {
    conn.exec(move |c| Vehicles::delete(c, uid, vid)).await?;
    Ok(Json(
        json!({ "success": true, "message": "Vehicle deleted successfully" }),
    ))
}
