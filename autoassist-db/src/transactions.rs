use crate::{
    enums::{QuoteType, TransactionKind, TransactionStatus},
    error::{AssistDbError, AssistDbResult as Result, OrNotFound},
    money::{serialize_cents, Money},
    quotations::Quotation,
    schema::transactions,
    shop_orders::ShopOrderDetail,
    towing::TowingRequest,
    Order,
};
use chrono::{Local, NaiveDate, NaiveDateTime, Utc};
use diesel::{prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};

/// A pseudo struct for managing the ledger
pub struct Transactions;

impl Transactions {
    pub fn list(conn: &mut SqliteConnection) -> Result<Vec<TransactionInfo>> {
        TransactionFinder::new(conn, None).search()
    }

    pub fn find_info(conn: &mut SqliteConnection, id_provided: &str) -> Result<TransactionInfo> {
        use crate::schema::transactions::dsl::*;
        transactions
            .filter(id.eq(id_provided))
            .first::<TransactionInfo>(conn)
            .or_not_found("Transaction")
    }

    /// The ledger row together with its service detail.
    pub fn get(conn: &mut SqliteConnection, id_provided: &str) -> Result<Transaction> {
        let info = Self::find_info(conn, id_provided)?;
        let detail = ServiceDetail::load(conn, &info)?;
        Ok(Transaction { info, detail })
    }

    pub fn update(
        conn: &mut SqliteConnection,
        id_provided: &str,
        patch: TransactionPatch,
    ) -> Result<Transaction> {
        use crate::schema::transactions::dsl::*;
        conn.immediate_transaction(|conn| {
            let info = Self::find_info(conn, id_provided)?;
            let changes = patch.verify(info.kind)?;
            if changes.is_empty() {
                // Only the unchanged type was sent
                return Self::get(conn, id_provided);
            }
            diesel::update(transactions.filter(id.eq(id_provided)))
                .set(&changes)
                .execute(conn)?;
            mirror_onto_detail(conn, &info, &changes)?;
            Self::get(conn, id_provided)
        })
    }

    /// Staff note on a quotation. An empty message clears the note.
    pub fn set_admin_message(
        conn: &mut SqliteConnection,
        id_provided: &str,
        message: Option<&str>,
    ) -> Result<Transaction> {
        use crate::schema::quotations::dsl::*;
        conn.immediate_transaction(|conn| {
            let info = Self::find_info(conn, id_provided)?;
            if info.kind != TransactionKind::Quotation {
                return Err(AssistDbError::validation(
                    "Admin messages can only be attached to quotations",
                ));
            }
            let note = message.map(str::trim).filter(|m| !m.is_empty());
            diesel::update(quotations.filter(transaction_id.eq(id_provided)))
                .set(admin_message.eq(note))
                .execute(conn)?;
            Self::get(conn, id_provided)
        })
    }

    // CRUD: DELETE
    // Detail rows (and shop order items through them) go with the ledger row
    pub fn delete_by_id(conn: &mut SqliteConnection, id_provided: &str) -> Result<()> {
        use crate::schema::transactions::dsl::*;
        Self::find_info(conn, id_provided)?;
        diesel::delete(transactions.filter(id.eq(id_provided))).execute(conn)?;
        Ok(())
    }

    pub fn count(conn: &mut SqliteConnection) -> Result<i64> {
        use crate::schema::transactions::dsl::*;
        Ok(transactions.count().get_result(conn)?)
    }
}

// Keep the detail row's copies of status, amount and date in step with the ledger
fn mirror_onto_detail(
    conn: &mut SqliteConnection,
    info: &TransactionInfo,
    changes: &TransactionChangeset,
) -> Result<()> {
    use crate::schema::{quotations, shop_orders, towing_requests};
    if changes.status.is_none() && changes.amount.is_none() && changes.date.is_none() {
        return Ok(());
    }
    let updated = match info.kind {
        TransactionKind::Shop => diesel::update(
            shop_orders::table.filter(shop_orders::transaction_id.eq(&info.id)),
        )
        .set((
            changes.status.map(|s| shop_orders::status.eq(s)),
            changes.amount.map(|a| shop_orders::total.eq(a)),
            changes.date.map(|d| shop_orders::date.eq(d)),
        ))
        .execute(conn)?,
        TransactionKind::Towing => diesel::update(
            towing_requests::table.filter(towing_requests::transaction_id.eq(&info.id)),
        )
        .set((
            changes.status.map(|s| towing_requests::status.eq(s)),
            changes.amount.map(|a| towing_requests::amount.eq(a)),
            changes.date.map(|d| towing_requests::date.eq(d)),
        ))
        .execute(conn)?,
        TransactionKind::Quotation => diesel::update(
            quotations::table.filter(quotations::transaction_id.eq(&info.id)),
        )
        .set((
            changes.status.map(|s| quotations::status.eq(s)),
            changes.amount.map(|a| quotations::amount.eq(a)),
            changes.date.map(|d| quotations::date.eq(d)),
        ))
        .execute(conn)?,
    };
    if updated == 0 {
        return Err(AssistDbError::DetailMissing(info.id.clone()));
    }
    Ok(())
}

type BoxedQuery<'a> = transactions::BoxedQuery<'a, Sqlite, transactions::SqlType>;

/// A search query helper (builder)
pub struct TransactionFinder<'a> {
    conn: &'a mut SqliteConnection,
    query: BoxedQuery<'a>,
    order: Order,
}

impl<'a> TransactionFinder<'a> {
    pub fn new(conn: &'a mut SqliteConnection, query: Option<BoxedQuery<'a>>) -> Self {
        use crate::schema::transactions::dsl::*;
        Self {
            conn,
            query: query.unwrap_or_else(|| transactions.into_boxed()),
            order: Order::Desc,
        }
    }

    pub fn search(self) -> Result<Vec<TransactionInfo>> {
        use crate::schema::transactions::dsl::*;
        let query = match self.order {
            Order::Asc => self.query.order((date.asc(), created_at.asc())),
            Order::Desc => self.query.order((date.desc(), created_at.desc())),
        };
        Ok(query.load::<TransactionInfo>(self.conn)?)
    }

    pub fn kind(mut self, kind_provided: TransactionKind) -> Self {
        use crate::schema::transactions::dsl::*;
        self.query = self.query.filter(kind.eq(kind_provided));
        self
    }

    pub fn status(mut self, status_provided: TransactionStatus) -> Self {
        use crate::schema::transactions::dsl::*;
        self.query = self.query.filter(status.eq(status_provided));
        self
    }

    pub fn user(mut self, user_provided: i32) -> Self {
        use crate::schema::transactions::dsl::*;
        self.query = self.query.filter(user_id.eq(user_provided));
        self
    }

    pub fn order_by_date(mut self, order: Order) -> Self {
        self.order = order;
        self
    }
}

/// A ledger row, corresponding to a row in the table `transactions`
#[derive(Debug, Serialize, Queryable, Insertable, Identifiable, Clone, PartialEq)]
#[diesel(table_name = transactions)]
pub struct TransactionInfo {
    id: String,
    #[serde(rename = "type")]
    kind: TransactionKind,
    title: String,
    date: NaiveDate,
    #[serde(serialize_with = "serialize_cents")]
    amount: i64,
    status: TransactionStatus,
    user_id: Option<i32>,
    created_at: NaiveDateTime,
}

impl TransactionInfo {
    /// A fresh pending row dated today.
    pub fn new(
        id: impl ToString,
        kind: TransactionKind,
        title: impl ToString,
        amount_cents: i64,
        user_id: Option<i32>,
    ) -> Self {
        Self {
            id: id.to_string(),
            kind,
            title: title.to_string(),
            date: Local::now().naive_local().date(),
            amount: amount_cents,
            status: TransactionStatus::default(),
            user_id,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn insert(&self, conn: &mut SqliteConnection) -> Result<()> {
        diesel::insert_into(transactions::table)
            .values(self)
            .execute(conn)?;
        log::info!("ledger row {} ({}) created: {}", self.id, self.kind, self.title);
        Ok(())
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn get_title(&self) -> &str {
        &self.title
    }

    pub fn get_date(&self) -> NaiveDate {
        self.date
    }

    pub fn get_amount(&self) -> Money {
        Money::from_cents(self.amount)
    }

    pub fn get_status(&self) -> TransactionStatus {
        self.status
    }

    pub fn get_user_id(&self) -> Option<i32> {
        self.user_id
    }
}

/// The service-specific half of a transaction. Exactly one exists per ledger row.
#[derive(Debug, Serialize, Clone)]
#[serde(untagged)]
pub enum ServiceDetail {
    Shop(ShopOrderDetail),
    Towing(TowingRequest),
    Quotation(Quotation),
}

impl ServiceDetail {
    fn load(conn: &mut SqliteConnection, info: &TransactionInfo) -> Result<Self> {
        let detail = match info.kind {
            TransactionKind::Shop => {
                ShopOrderDetail::find_by_transaction(conn, &info.id)?.map(Self::Shop)
            }
            TransactionKind::Towing => {
                TowingRequest::find_by_transaction(conn, &info.id)?.map(Self::Towing)
            }
            TransactionKind::Quotation => {
                Quotation::find_by_transaction(conn, &info.id)?.map(Self::Quotation)
            }
        };
        detail.ok_or_else(|| AssistDbError::DetailMissing(info.id.clone()))
    }

    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::Shop(_) => TransactionKind::Shop,
            Self::Towing(_) => TransactionKind::Towing,
            Self::Quotation(_) => TransactionKind::Quotation,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub info: TransactionInfo,
    pub detail: ServiceDetail,
}

impl Transaction {
    pub fn view(&self) -> TransactionView<'_> {
        let quote = match &self.detail {
            ServiceDetail::Quotation(q) => Some(QuoteSummary {
                quote_type: q.get_quote_type(),
                admin_message: q.get_admin_message(),
                workshop_id: q.get_workshop_id(),
            }),
            _ => None,
        };
        TransactionView {
            info: &self.info,
            quote,
            details: &self.detail,
        }
    }
}

impl Serialize for Transaction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.view().serialize(serializer)
    }
}

/// The ledger row as the clients read it, with the quotation essentials lifted to the top level.
#[derive(Debug, Serialize)]
pub struct TransactionView<'a> {
    #[serde(flatten)]
    info: &'a TransactionInfo,
    #[serde(flatten)]
    quote: Option<QuoteSummary<'a>>,
    details: &'a ServiceDetail,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummary<'a> {
    quote_type: QuoteType,
    admin_message: Option<&'a str>,
    workshop_id: i32,
}

/// Staff edit of a ledger row. Every field is optional; the type may be restated but never changed.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TransactionPatch {
    #[serde(rename = "type")]
    pub kind: Option<TransactionKind>,
    pub title: Option<String>,
    pub amount: Option<Money>,
    pub status: Option<TransactionStatus>,
    pub date: Option<NaiveDate>,
}

#[derive(AsChangeset)]
#[diesel(table_name = transactions)]
struct TransactionChangeset {
    title: Option<String>,
    amount: Option<i64>,
    status: Option<TransactionStatus>,
    date: Option<NaiveDate>,
}

impl TransactionChangeset {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.amount.is_none() && self.status.is_none() && self.date.is_none()
    }
}

impl TransactionPatch {
    fn verify(self, current: TransactionKind) -> Result<TransactionChangeset> {
        let changes = TransactionChangeset {
            title: self.title.filter(|t| !t.trim().is_empty()),
            amount: self.amount.map(|a| a.cents()),
            status: self.status,
            date: self.date,
        };
        match self.kind {
            None if changes.is_empty() => Err(AssistDbError::validation("No fields to update")),
            Some(k) if k != current => Err(AssistDbError::validation(format!(
                "Transaction type cannot be changed from {} to {}",
                current, k
            ))),
            _ => Ok(changes),
        }
    }
}
