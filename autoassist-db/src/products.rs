use crate::{
    error::{AssistDbError, AssistDbResult as Result, OrNotFound},
    last_insert_rowid,
    money::{serialize_cents, Money},
    non_blank,
    schema::products,
    workshops::{normalize_workshop_id, Requirement, WorkshopRef},
};
use chrono::NaiveDateTime;
use diesel::{prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};

/// A pseudo products used to manage table `products`
pub struct Products;

impl Products {
    // CRUD: READ. For convenience
    pub fn list(conn: &mut SqliteConnection) -> Result<Vec<Product>> {
        ProductFinder::new(conn, None).search()
    }

    pub fn find_by_id(conn: &mut SqliteConnection, id_provided: i32) -> Result<Product> {
        use crate::schema::products::dsl::*;
        products
            .filter(id.eq(id_provided))
            .first::<Product>(conn)
            .or_not_found("Product")
    }

    pub fn count(conn: &mut SqliteConnection) -> Result<i64> {
        use crate::schema::products::dsl::*;
        Ok(products.count().get_result(conn)?)
    }

    // CRUD: UPDATE
    pub fn update(
        conn: &mut SqliteConnection,
        id_provided: i32,
        patch: ProductPatch,
    ) -> Result<Product> {
        use crate::schema::products::dsl::*;
        conn.transaction(|conn| {
            Self::find_by_id(conn, id_provided)?;
            let changes = patch.verify(conn)?;
            diesel::update(products.filter(id.eq(id_provided)))
                .set(&changes)
                .execute(conn)?;
            Self::find_by_id(conn, id_provided)
        })
    }

    // CRUD: DELETE
    // Order items keep a restricting reference for history; cart rows cascade.
    pub fn delete_by_id(conn: &mut SqliteConnection, id_provided: i32) -> Result<()> {
        use crate::schema::{products::dsl::*, shop_order_items};
        conn.transaction(|conn| {
            Self::find_by_id(conn, id_provided)?;
            let ordered: i64 = shop_order_items::table
                .filter(shop_order_items::product_id.eq(id_provided))
                .count()
                .get_result(conn)?;
            if ordered > 0 {
                return Err(AssistDbError::ReferenceInUse(format!(
                    "Product {} appears in {} order item(s)",
                    id_provided, ordered
                )));
            }
            diesel::delete(products.filter(id.eq(id_provided))).execute(conn)?;
            Ok(())
        })
    }
}

type BoxedQuery<'a> = products::BoxedQuery<'a, Sqlite, products::SqlType>;

/// A search query helper (builder)
pub struct ProductFinder<'a> {
    conn: &'a mut SqliteConnection,
    query: BoxedQuery<'a>,
}

impl<'a> ProductFinder<'a> {
    pub fn new(conn: &'a mut SqliteConnection, query: Option<BoxedQuery<'a>>) -> Self {
        use crate::schema::products::dsl::*;
        if let Some(q) = query {
            Self { conn, query: q }
        } else {
            Self {
                conn,
                query: products.into_boxed(),
            }
        }
    }

    pub fn search(self) -> Result<Vec<Product>> {
        use crate::schema::products::dsl::*;
        Ok(self.query.then_order_by(id.asc()).load::<Product>(self.conn)?)
    }

    pub fn category(mut self, category_provided: &'a str) -> Self {
        use crate::schema::products::dsl::*;
        self.query = self.query.filter(category.eq(category_provided));
        self
    }

    pub fn workshop(mut self, workshop_provided: i32) -> Self {
        use crate::schema::products::dsl::*;
        self.query = self.query.filter(workshop_id.eq(workshop_provided));
        self
    }
}

/// A single product, corresponding to a row in the table `products`
#[derive(Debug, Serialize, Queryable, Identifiable, Clone, PartialEq)]
pub struct Product {
    id: i32,
    name: String,
    #[serde(serialize_with = "serialize_cents")]
    price: i64,
    category: String,
    image: String,
    stock: i32,
    workshop_id: Option<i32>,
    created_at: NaiveDateTime,
}

impl Product {
    pub fn get_id(&self) -> i32 {
        self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_price(&self) -> Money {
        Money::from_cents(self.price)
    }

    pub fn get_category(&self) -> &str {
        &self.category
    }

    pub fn get_stock(&self) -> i32 {
        self.stock
    }

    pub fn get_workshop_id(&self) -> Option<i32> {
        self.workshop_id
    }
}

/// Product creation as submitted by the admin console.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub stock: Option<i32>,
    #[serde(alias = "workshopId")]
    pub workshop_id: Option<WorkshopRef>,
}

impl ProductForm {
    pub fn verify(self, conn: &mut SqliteConnection) -> Result<IncompleteProduct> {
        let (name, price, category, image, stock) = match (
            non_blank(&self.name),
            self.price,
            non_blank(&self.category),
            non_blank(&self.image),
            self.stock,
        ) {
            (Some(n), Some(p), Some(c), Some(i), Some(s)) => (n, p, c, i, s),
            _ => {
                return Err(AssistDbError::validation(
                    "Missing required fields: name, price, category, image, stock",
                ))
            }
        };
        if stock < 0 {
            return Err(AssistDbError::validation("Stock cannot be negative"));
        }
        let mut product = IncompleteProduct::new(name, price, category, image, stock);
        product.workshop_id =
            normalize_workshop_id(conn, self.workshop_id.as_ref(), Requirement::Optional)?;
        Ok(product)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = products)]
pub struct IncompleteProduct {
    name: String,
    price: i64,
    category: String,
    image: String,
    stock: i32,
    workshop_id: Option<i32>,
}

impl IncompleteProduct {
    pub fn new(
        name: impl ToString,
        price: Money,
        category: impl ToString,
        image: impl ToString,
        stock: i32,
    ) -> Self {
        Self {
            name: name.to_string(),
            price: price.cents(),
            category: category.to_string(),
            image: image.to_string(),
            stock,
            workshop_id: None,
        }
    }

    /// Affiliate with a workshop already known to exist.
    pub fn workshop_id(mut self, workshop: i32) -> Self {
        self.workshop_id = Some(workshop);
        self
    }

    pub fn create(&self, conn: &mut SqliteConnection) -> Result<Product> {
        use crate::schema::products::dsl::*;
        conn.transaction(|conn| {
            diesel::insert_into(products).values(self).execute(conn)?;
            let new_id = last_insert_rowid(conn)?;
            Products::find_by_id(conn, new_id)
        })
    }
}

/// Partial update of a product.
///
/// `workshop_id` distinguishes an absent key (untouched) from a present one. A present key is normalized in an
/// optional context, so null, empty, malformed, and unknown ids all clear the affiliation.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub stock: Option<i32>,
    #[serde(default, alias = "workshopId", deserialize_with = "crate::double_option")]
    pub workshop_id: Option<Option<WorkshopRef>>,
}

#[derive(AsChangeset)]
#[diesel(table_name = products)]
struct ProductChangeset {
    name: Option<String>,
    price: Option<i64>,
    category: Option<String>,
    image: Option<String>,
    stock: Option<i32>,
    workshop_id: Option<Option<i32>>,
}

impl ProductPatch {
    fn verify(self, conn: &mut SqliteConnection) -> Result<ProductChangeset> {
        let name = non_blank(&self.name).map(ToString::to_string);
        let category = non_blank(&self.category).map(ToString::to_string);
        let image = non_blank(&self.image).map(ToString::to_string);
        if name.is_none()
            && self.price.is_none()
            && category.is_none()
            && image.is_none()
            && self.stock.is_none()
            && self.workshop_id.is_none()
        {
            return Err(AssistDbError::validation("No fields to update"));
        }
        if matches!(self.stock, Some(s) if s < 0) {
            return Err(AssistDbError::validation("Stock cannot be negative"));
        }
        let workshop_id = match self.workshop_id {
            Some(raw) => Some(normalize_workshop_id(
                conn,
                raw.as_ref(),
                Requirement::Optional,
            )?),
            None => None,
        };
        Ok(ProductChangeset {
            name,
            price: self.price.map(|p| p.cents()),
            category,
            image,
            stock: self.stock,
            workshop_id,
        })
    }
}
