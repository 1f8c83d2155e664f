use crate::{ApiError, ApiResult, DbConn, JsonBody, LedgerConfig};
use autoassist_db::{
    cart::CartItems,
    enums::{TransactionKind, TransactionStatus},
    quotations::{create_quotation, QuotationForm},
    shop_orders::{checkout, CheckoutRequest},
    towing::{create_towing_request, TowingRequestForm},
    transactions::{Transaction, TransactionFinder, TransactionInfo, TransactionPatch, Transactions},
};
use rocket::{
    form::{FromFormField, ValueField},
    http::Status,
    serde::json::{json, Json, Value},
    State,
};
use serde::Deserialize;

fn created(info: TransactionInfo) -> (Status, Json<Value>) {
    (
        Status::Created,
        Json(json!({ "success": true, "transaction": info })),
    )
}

#[post("/checkout", data = "<req>")]
pub async fn checkout_cart(
    req: JsonBody<CheckoutRequest>,
    ledger: &State<LedgerConfig>,
    conn: DbConn,
) -> ApiResult<(Status, Json<Value>)> {
    let scheme = ledger.id_scheme;
    let info = conn
        .exec(move |c| checkout(c, req.into_inner(), scheme, &CartItems))
        .await?;
    Ok(created(info))
}

#[post("/towing", data = "<form>")]
pub async fn request_towing(
    form: JsonBody<TowingRequestForm>,
    ledger: &State<LedgerConfig>,
    conn: DbConn,
) -> ApiResult<(Status, Json<Value>)> {
    let scheme = ledger.id_scheme;
    let info = conn
        .exec(move |c| create_towing_request(c, form.into_inner(), scheme))
        .await?;
    Ok(created(info))
}

#[post("/quotation", data = "<form>")]
pub async fn request_quotation(
    form: JsonBody<QuotationForm>,
    ledger: &State<LedgerConfig>,
    conn: DbConn,
) -> ApiResult<(Status, Json<Value>)> {
    let scheme = ledger.id_scheme;
    let info = conn
        .exec(move |c| create_quotation(c, form.into_inner(), scheme))
        .await?;
    Ok(created(info))
}

// Raw query values, parsed by `parse_filter` so that a bad one is a 400
#[derive(Debug, FromForm)]
pub struct TransactionFilter {
    #[field(name = "type")]
    kind: Option<String>,
    status: Option<String>,
    #[field(name = "userId")]
    user_id: Option<String>,
}

fn parse_filter<'v, T: FromFormField<'v>>(name: &str, raw: &'v Option<String>) -> ApiResult<Option<T>> {
    raw.as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            T::from_value(ValueField::from_value(v))
                .map_err(|_| ApiError::bad_request(format!("Invalid {} filter: {}", name, v)))
        })
        .transpose()
}

#[get("/?<filter..>")]
pub async fn list(filter: TransactionFilter, conn: DbConn) -> ApiResult<Json<Vec<TransactionInfo>>> {
    let kind = parse_filter::<TransactionKind>("type", &filter.kind)?;
    let status = parse_filter::<TransactionStatus>("status", &filter.status)?;
    let user_id = parse_filter::<i32>("userId", &filter.user_id)?;
    let rows = conn
        .exec(move |c| {
            let mut finder = TransactionFinder::new(c, None);
            if let Some(kind) = kind {
                finder = finder.kind(kind);
            }
            if let Some(status) = status {
                finder = finder.status(status);
            }
            if let Some(user) = user_id {
                finder = finder.user(user);
            }
            finder.search()
        })
        .await?;
    Ok(Json(rows))
}

#[get("/<id>")]
pub async fn get(id: String, conn: DbConn) -> ApiResult<Json<Transaction>> {
    Ok(Json(conn.exec(move |c| Transactions::get(c, &id)).await?))
}

#[put("/<id>", data = "<patch>")]
pub async fn update(
    id: String,
    patch: JsonBody<TransactionPatch>,
    conn: DbConn,
) -> ApiResult<Json<Transaction>> {
    let tx = conn
        .exec(move |c| Transactions::update(c, &id, patch.into_inner()))
        .await?;
    Ok(Json(tx))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminMessage {
    admin_message: Option<String>,
}

#[put("/<id>/admin-message", data = "<msg>")]
pub async fn set_admin_message(
    id: String,
    msg: JsonBody<AdminMessage>,
    conn: DbConn,
) -> ApiResult<Json<Transaction>> {
    let tx = conn
        .exec(move |c| Transactions::set_admin_message(c, &id, msg.admin_message.as_deref()))
        .await?;
    Ok(Json(tx))
}

#[delete("/<id>")]
pub async fn delete(id: String, conn: DbConn) -> ApiResult<Json<Value>> {
    conn.exec(move |c| Transactions::delete_by_id(c, &id)).await?;
    Ok(Json(
        json!({ "success": true, "message": "Transaction deleted successfully" }),
    ))
}
