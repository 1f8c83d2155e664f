use crate::{
    enums::{QuoteType, TransactionKind, TransactionStatus},
    error::{AssistDbError, AssistDbResult as Result},
    ids::{new_transaction_id, IdScheme},
    money::{serialize_cents, Money},
    non_blank,
    schema::quotations,
    transactions::TransactionInfo,
    users::check_customer,
    workshops::{require_workshop_id, WorkshopRef},
};
use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{ser::Error as _, Deserialize, Serialize, Serializer};

/// The quotation detail row of a `Quotation` transaction
#[derive(Debug, Serialize, Queryable, Identifiable, Clone, PartialEq)]
pub struct Quotation {
    id: i32,
    transaction_id: String,
    user_id: Option<i32>,
    workshop_id: i32,
    model: String,
    year: String,
    engine: String,
    chassis: String,
    description: Option<String>,
    quote_type: QuoteType,
    #[serde(serialize_with = "serialize_images")]
    images: Option<String>,
    #[serde(serialize_with = "serialize_cents")]
    amount: i64,
    status: TransactionStatus,
    date: NaiveDate,
    admin_message: Option<String>,
}

// Stored as JSON text, presented as an array
fn serialize_images<S: Serializer>(images: &Option<String>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let parsed: Vec<String> = match images {
        Some(text) => serde_json::from_str(text).map_err(S::Error::custom)?,
        None => Vec::new(),
    };
    parsed.serialize(serializer)
}

impl Quotation {
    pub fn find_by_transaction(conn: &mut SqliteConnection, tx_id: &str) -> Result<Option<Self>> {
        use crate::schema::quotations::dsl::*;
        Ok(quotations
            .filter(transaction_id.eq(tx_id))
            .first::<Self>(conn)
            .optional()?)
    }

    pub fn get_workshop_id(&self) -> i32 {
        self.workshop_id
    }

    pub fn get_quote_type(&self) -> QuoteType {
        self.quote_type
    }

    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn get_admin_message(&self) -> Option<&str> {
        self.admin_message.as_deref()
    }

    pub fn get_status(&self) -> TransactionStatus {
        self.status
    }

    pub fn get_amount(&self) -> Money {
        Money::from_cents(self.amount)
    }

    pub fn get_date(&self) -> NaiveDate {
        self.date
    }

    /// Whether any photos were attached (the column is NULL otherwise).
    pub fn has_images(&self) -> bool {
        self.images.is_some()
    }

    pub fn get_images(&self) -> Result<Vec<String>> {
        match &self.images {
            Some(text) => Ok(serde_json::from_str(text)?),
            None => Ok(Vec::new()),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct QuotationForm {
    /// Display label used in the title, e.g. "Engine"
    #[serde(rename = "type")]
    pub label: Option<String>,
    pub model: Option<String>,
    #[serde(default, deserialize_with = "crate::lenient_string")]
    pub year: Option<String>,
    pub engine: Option<String>,
    pub chassis: Option<String>,
    pub description: Option<String>,
    pub quote_type: Option<QuoteType>,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub images: Vec<String>,
    pub workshop_id: Option<WorkshopRef>,
    pub amount: Option<Money>,
    pub user_id: Option<i32>,
}

#[derive(Insertable)]
#[diesel(table_name = quotations)]
struct NewQuotation<'a> {
    transaction_id: &'a str,
    user_id: Option<i32>,
    workshop_id: i32,
    model: &'a str,
    year: &'a str,
    engine: &'a str,
    chassis: &'a str,
    description: Option<&'a str>,
    quote_type: QuoteType,
    images: Option<String>,
    amount: i64,
    status: TransactionStatus,
    date: NaiveDate,
}

/// Record a repair quotation request as a pending `Quotation` transaction.
///
/// The tier decides the price (checked against the client amount) and caps the description and photo count.
pub fn create_quotation(
    conn: &mut SqliteConnection,
    form: QuotationForm,
    scheme: IdScheme,
) -> Result<TransactionInfo> {
    let (model, year, engine, chassis, amount) = match (
        non_blank(&form.model),
        non_blank(&form.year),
        non_blank(&form.engine),
        non_blank(&form.chassis),
        form.amount,
    ) {
        (Some(m), Some(y), Some(e), Some(c), Some(a)) => (m, y, e, c, a),
        _ => {
            return Err(AssistDbError::validation(
                "Missing required fields: model, year, engine, chassis, amount",
            ))
        }
    };
    if form.workshop_id.as_ref().map_or(true, WorkshopRef::is_blank) {
        return Err(AssistDbError::validation("Workshop ID is required"));
    }
    let workshop_id = require_workshop_id(conn, form.workshop_id.as_ref())?;

    let tier = form.quote_type.unwrap_or_default();
    if amount.cents() != tier.price_cents() {
        return Err(AssistDbError::validation(format!(
            "A {} quotation costs {}",
            tier.label().to_lowercase(),
            Money::from_cents(tier.price_cents())
        )));
    }
    let description = non_blank(&form.description);
    if description.map_or(0, |d| d.chars().count()) > tier.description_limit() {
        return Err(AssistDbError::validation(format!(
            "Description is limited to {} characters",
            tier.description_limit()
        )));
    }
    if form.images.len() > tier.image_limit() {
        return Err(AssistDbError::validation(format!(
            "At most {} images can be attached",
            tier.image_limit()
        )));
    }
    check_customer(conn, form.user_id)?;

    let images = if form.images.is_empty() {
        None
    } else {
        Some(serde_json::to_string(&form.images)?)
    };
    let label = non_blank(&form.label).unwrap_or_else(|| tier.label());

    conn.immediate_transaction(|conn| {
        let tx_id = new_transaction_id(conn, scheme)?;
        let info = TransactionInfo::new(
            &tx_id,
            TransactionKind::Quotation,
            format!("{} Quote: {}", label, model),
            amount.cents(),
            form.user_id,
        );
        info.insert(conn)?;
        diesel::insert_into(quotations::table)
            .values(&NewQuotation {
                transaction_id: &tx_id,
                user_id: form.user_id,
                workshop_id,
                model,
                year,
                engine,
                chassis,
                description,
                quote_type: tier,
                images,
                amount: amount.cents(),
                status: info.get_status(),
                date: info.get_date(),
            })
            .execute(conn)?;
        Ok(info)
    })
}

#[cfg(test)]
mod tests;
