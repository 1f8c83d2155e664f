use crate::{ApiResult, DbConn, JsonBody};
use autoassist_db::products::*;
use rocket::{
    http::Status,
    serde::json::{json, Json, Value},
};

#[get("/?<category>")]
pub async fn list(category: Option<String>, conn: DbConn) -> ApiResult<Json<Vec<Product>>> {
    let products = conn
        .exec(move |c| {
            let finder = ProductFinder::new(c, None);
            match category.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                Some(cat) => finder.category(cat).search(),
                None => finder.search(),
            }
        })
        .await?;
    Ok(Json(products))
}

#[get("/<id>")]
pub async fn get(id: i32, conn: DbConn) -> ApiResult<Json<Product>> {
    Ok(Json(conn.exec(move |c| Products::find_by_id(c, id)).await?))
}

#[post("/", data = "<form>")]
pub async fn create(form: JsonBody<ProductForm>, conn: DbConn) -> ApiResult<(Status, Json<Product>)> {
    let product = conn
        .exec(move |c| form.into_inner().verify(c)?.create(c))
        .await?;
    Ok((Status::Created, Json(product)))
}

#[put("/<id>", data = "<patch>")]
pub async fn update(id: i32, patch: JsonBody<ProductPatch>, conn: DbConn) -> ApiResult<Json<Product>> {
    let product = conn
        .exec(move |c| Products::update(c, id, patch.into_inner()))
        .await?;
    Ok(Json(product))
}

#[delete("/<id>")]
pub async fn delete(id: i32, conn: DbConn) -> ApiResult<Json<Value>> {
    conn.exec(move |c| Products::delete_by_id(c, id)).await?;
    Ok(Json(
        json!({ "success": true, "message": "Product deleted successfully" }),
    ))
}
