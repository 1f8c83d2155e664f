use crate::{
    cart::CartStore,
    enums::{TransactionKind, TransactionStatus},
    error::{AssistDbError, AssistDbResult as Result},
    ids::{new_transaction_id, IdScheme},
    last_insert_rowid,
    money::{serialize_cents, Money},
    non_blank,
    products::Products,
    schema::{shop_order_items, shop_orders},
    transactions::TransactionInfo,
    users::check_customer,
    workshops::{require_workshop_id, Workshops, WorkshopRef},
};
use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// The shop order detail row of a `Shop` transaction
#[derive(Debug, Serialize, Queryable, Identifiable, Clone, PartialEq)]
pub struct ShopOrder {
    id: i32,
    transaction_id: String,
    user_id: Option<i32>,
    workshop_id: i32,
    #[serde(serialize_with = "serialize_cents")]
    total: i64,
    status: TransactionStatus,
    date: NaiveDate,
}

impl ShopOrder {
    pub fn get_id(&self) -> i32 {
        self.id
    }

    pub fn get_workshop_id(&self) -> i32 {
        self.workshop_id
    }

    pub fn get_total(&self) -> Money {
        Money::from_cents(self.total)
    }

    pub fn get_status(&self) -> TransactionStatus {
        self.status
    }

    pub fn get_date(&self) -> NaiveDate {
        self.date
    }
}

/// One line of a shop order. Name and price are snapshots taken at checkout.
#[derive(Debug, Serialize, Queryable, Identifiable, Clone, PartialEq)]
pub struct ShopOrderItem {
    id: i32,
    order_id: i32,
    product_id: i32,
    product_name: String,
    #[serde(serialize_with = "serialize_cents")]
    product_price: i64,
    quantity: i32,
    #[serde(serialize_with = "serialize_cents")]
    subtotal: i64,
}

impl ShopOrderItem {
    pub fn get_product_id(&self) -> i32 {
        self.product_id
    }

    pub fn get_product_name(&self) -> &str {
        &self.product_name
    }

    pub fn get_product_price(&self) -> Money {
        Money::from_cents(self.product_price)
    }

    pub fn get_quantity(&self) -> i32 {
        self.quantity
    }

    pub fn get_subtotal(&self) -> Money {
        Money::from_cents(self.subtotal)
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ShopOrderDetail {
    #[serde(flatten)]
    pub order: ShopOrder,
    pub items: Vec<ShopOrderItem>,
}

impl ShopOrderDetail {
    pub fn find_by_transaction(conn: &mut SqliteConnection, tx_id: &str) -> Result<Option<Self>> {
        let order = shop_orders::table
            .filter(shop_orders::transaction_id.eq(tx_id))
            .first::<ShopOrder>(conn)
            .optional()?;
        match order {
            Some(order) => {
                let items = shop_order_items::table
                    .filter(shop_order_items::order_id.eq(order.id))
                    .order(shop_order_items::id.asc())
                    .load::<ShopOrderItem>(conn)?;
                Ok(Some(Self { order, items }))
            }
            None => Ok(None),
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = shop_orders)]
struct NewShopOrder<'a> {
    transaction_id: &'a str,
    user_id: Option<i32>,
    workshop_id: i32,
    total: i64,
    status: TransactionStatus,
    date: NaiveDate,
}

#[derive(Insertable)]
#[diesel(table_name = shop_order_items)]
struct NewShopOrderItem<'a> {
    order_id: i32,
    product_id: i32,
    product_name: &'a str,
    product_price: i64,
    quantity: i32,
    subtotal: i64,
}

/// A cart line as the client holds it.
#[derive(Debug, Deserialize, Clone)]
pub struct CartLine {
    pub id: Option<i32>,
    pub name: Option<String>,
    pub price: Option<Money>,
    pub quantity: Option<i32>,
}

impl CartLine {
    pub fn new(product: i32, price: Money, quantity: i32) -> Self {
        Self {
            id: Some(product),
            name: None,
            price: Some(price),
            quantity: Some(quantity),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct WorkshopChoice {
    pub id: Option<WorkshopRef>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub cart: Vec<CartLine>,
    pub total: Option<Money>,
    pub workshop: Option<WorkshopChoice>,
    pub user_id: Option<i32>,
}

// A cart line that passed the shape checks
struct Line {
    product: i32,
    price: Option<Money>,
    quantity: i32,
}

impl CheckoutRequest {
    fn verify(&self) -> Result<(Vec<Line>, Money)> {
        let total = match (self.cart.is_empty(), self.total) {
            (false, Some(total)) => total,
            _ => return Err(AssistDbError::validation("Missing required fields: cart, total")),
        };
        let lines = self
            .cart
            .iter()
            .map(|line| match (line.id, line.quantity) {
                (Some(product), Some(quantity)) if quantity >= 1 => Ok(Line {
                    product,
                    price: line.price,
                    quantity,
                }),
                (Some(_), _) => Err(AssistDbError::validation("Item quantity must be at least 1")),
                (None, _) => Err(AssistDbError::validation("Every cart item needs a product id")),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((lines, total))
    }
}

fn order_title(lines: usize, workshop: &str) -> String {
    format!(
        "{} Item{} Order at {}",
        lines,
        if lines > 1 { "s" } else { "" },
        workshop
    )
}

/// Turn a cart into a pending `Shop` transaction with its order and line items.
///
/// Prices are authoritative on the server: each line must quote the current product price, and the total must
/// be the sum of the lines. All rows are written in one SQL transaction. The user's cart is emptied afterwards,
/// and a failure to do so is only logged.
pub fn checkout(
    conn: &mut SqliteConnection,
    req: CheckoutRequest,
    scheme: IdScheme,
    cart: &dyn CartStore,
) -> Result<TransactionInfo> {
    let (lines, total) = req.verify()?;
    let choice = req.workshop.clone().unwrap_or_default();
    let workshop_id = require_workshop_id(conn, choice.id.as_ref())?;
    check_customer(conn, req.user_id)?;

    let info = conn.immediate_transaction::<_, AssistDbError, _>(|conn| {
        let workshop_name = match non_blank(&choice.name) {
            Some(name) => name.to_string(),
            None => Workshops::find_by_id(conn, workshop_id)?.get_name().to_string(),
        };

        let mut priced = Vec::with_capacity(lines.len());
        let mut computed = Money::ZERO;
        for line in &lines {
            let product = Products::find_by_id(conn, line.product).map_err(|e| match e {
                AssistDbError::NotFound(_) => AssistDbError::ReferenceNotFound(format!(
                    "Product with ID {} does not exist",
                    line.product
                )),
                e => e,
            })?;
            let price = product.get_price();
            if let Some(quoted) = line.price {
                if quoted != price {
                    return Err(AssistDbError::validation(format!(
                        "Price of {} changed to {}",
                        product.get_name(),
                        price
                    )));
                }
            }
            let subtotal = price
                .checked_mul(line.quantity)
                .ok_or_else(|| AssistDbError::validation("Order total out of range"))?;
            computed = computed
                .checked_add(subtotal)
                .ok_or_else(|| AssistDbError::validation("Order total out of range"))?;
            priced.push((product, line.quantity, subtotal));
        }
        if computed != total {
            return Err(AssistDbError::validation(format!(
                "Order total {} does not match the cart ({})",
                total, computed
            )));
        }

        let tx_id = new_transaction_id(conn, scheme)?;
        let info = TransactionInfo::new(
            &tx_id,
            TransactionKind::Shop,
            order_title(lines.len(), &workshop_name),
            computed.cents(),
            req.user_id,
        );
        info.insert(conn)?;

        diesel::insert_into(shop_orders::table)
            .values(&NewShopOrder {
                transaction_id: &tx_id,
                user_id: req.user_id,
                workshop_id,
                total: computed.cents(),
                status: info.get_status(),
                date: info.get_date(),
            })
            .execute(conn)?;
        let order_id = last_insert_rowid(conn)?;

        let items: Vec<_> = priced
            .iter()
            .map(|(product, quantity, subtotal)| NewShopOrderItem {
                order_id,
                product_id: product.get_id(),
                product_name: product.get_name(),
                product_price: product.get_price().cents(),
                quantity: *quantity,
                subtotal: subtotal.cents(),
            })
            .collect();
        diesel::insert_into(shop_order_items::table)
            .values(&items)
            .execute(conn)?;
        Ok(info)
    })?;

    if let Some(user) = req.user_id {
        if let Err(e) = cart.clear(conn, user) {
            log::warn!(
                "order {} placed but the cart of user {} was not cleared: {}",
                info.get_id(),
                user,
                e
            );
        }
    }
    Ok(info)
}

#[cfg(test)]
mod tests;
