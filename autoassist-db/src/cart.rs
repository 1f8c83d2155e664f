use crate::{error::AssistDbResult as Result, schema::cart_items};
use diesel::prelude::*;
use serde::Serialize;

/// Where a user's pending cart lives. Checkout only ever needs to empty it.
pub trait CartStore {
    fn clear(&self, conn: &mut SqliteConnection, user: i32) -> Result<usize>;
}

/// The SQLite-backed cart in the table `cart_items`
pub struct CartItems;

impl CartItems {
    /// Put a product into the cart, adding to the quantity if it is already there.
    pub fn add(conn: &mut SqliteConnection, user: i32, product: i32, qty: i32) -> Result<CartItem> {
        use crate::schema::cart_items::dsl::*;
        conn.transaction(|conn| {
            let existing = cart_items
                .filter(user_id.eq(user))
                .filter(product_id.eq(product))
                .first::<CartItem>(conn)
                .optional()?;
            match existing {
                Some(item) => {
                    diesel::update(cart_items.filter(id.eq(item.id)))
                        .set(quantity.eq(quantity + qty))
                        .execute(conn)?;
                }
                None => {
                    diesel::insert_into(cart_items)
                        .values((user_id.eq(user), product_id.eq(product), quantity.eq(qty)))
                        .execute(conn)?;
                }
            }
            Ok(cart_items
                .filter(user_id.eq(user))
                .filter(product_id.eq(product))
                .first::<CartItem>(conn)?)
        })
    }

    pub fn list_by_user(conn: &mut SqliteConnection, user: i32) -> Result<Vec<CartItem>> {
        use crate::schema::cart_items::dsl::*;
        Ok(cart_items
            .filter(user_id.eq(user))
            .order(id.asc())
            .load::<CartItem>(conn)?)
    }
}

impl CartStore for CartItems {
    fn clear(&self, conn: &mut SqliteConnection, user: i32) -> Result<usize> {
        use crate::schema::cart_items::dsl::*;
        Ok(diesel::delete(cart_items.filter(user_id.eq(user))).execute(conn)?)
    }
}

#[derive(Debug, Serialize, Queryable, Identifiable, Clone, PartialEq, Eq)]
#[diesel(table_name = cart_items)]
pub struct CartItem {
    id: i32,
    user_id: i32,
    product_id: i32,
    quantity: i32,
}

impl CartItem {
    pub fn get_product_id(&self) -> i32 {
        self.product_id
    }

    pub fn get_quantity(&self) -> i32 {
        self.quantity
    }
}
