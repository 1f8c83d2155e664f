use crate::{
    enums::{TransactionKind, TransactionStatus},
    error::{AssistDbError, AssistDbResult as Result},
    ids::{new_transaction_id, IdScheme},
    money::{serialize_cents, Money},
    non_blank,
    schema::towing_requests,
    transactions::TransactionInfo,
    users::check_customer,
    workshops::{require_workshop_id, WorkshopRef},
};
use chrono::NaiveDate;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Flat fee for a tow, whatever the distance.
pub const TOWING_FLAT_RATE: Money = Money::from_cents(500_00);

/// The towing detail row of a `Towing` transaction
#[derive(Debug, Serialize, Queryable, Identifiable, Clone, PartialEq)]
pub struct TowingRequest {
    id: i32,
    transaction_id: String,
    user_id: Option<i32>,
    workshop_id: i32,
    pickup: String,
    destination: String,
    pickup_latitude: Option<f64>,
    pickup_longitude: Option<f64>,
    destination_latitude: Option<f64>,
    destination_longitude: Option<f64>,
    #[serde(serialize_with = "serialize_cents")]
    amount: i64,
    status: TransactionStatus,
    notes: Option<String>,
    date: NaiveDate,
}

impl TowingRequest {
    pub fn find_by_transaction(conn: &mut SqliteConnection, tx_id: &str) -> Result<Option<Self>> {
        use crate::schema::towing_requests::dsl::*;
        Ok(towing_requests
            .filter(transaction_id.eq(tx_id))
            .first::<Self>(conn)
            .optional()?)
    }

    pub fn get_workshop_id(&self) -> i32 {
        self.workshop_id
    }

    pub fn get_pickup(&self) -> &str {
        &self.pickup
    }

    pub fn get_destination(&self) -> &str {
        &self.destination
    }

    pub fn get_pickup_coordinates(&self) -> Option<(f64, f64)> {
        self.pickup_latitude.zip(self.pickup_longitude)
    }

    pub fn get_notes(&self) -> Option<&str> {
        self.notes.as_deref()
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
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TowingRequestForm {
    pub workshop_id: Option<WorkshopRef>,
    pub workshop_name: Option<String>,
    pub amount: Option<Money>,
    pub pickup: Option<String>,
    pub destination: Option<String>,
    pub pickup_latitude: Option<f64>,
    pub pickup_longitude: Option<f64>,
    pub destination_latitude: Option<f64>,
    pub destination_longitude: Option<f64>,
    pub notes: Option<String>,
    pub user_id: Option<i32>,
}

#[derive(Insertable)]
#[diesel(table_name = towing_requests)]
struct NewTowingRequest<'a> {
    transaction_id: &'a str,
    user_id: Option<i32>,
    workshop_id: i32,
    pickup: &'a str,
    destination: &'a str,
    pickup_latitude: Option<f64>,
    pickup_longitude: Option<f64>,
    destination_latitude: Option<f64>,
    destination_longitude: Option<f64>,
    amount: i64,
    status: TransactionStatus,
    notes: Option<&'a str>,
    date: NaiveDate,
}

/// Record a tow to a workshop as a pending `Towing` transaction.
pub fn create_towing_request(
    conn: &mut SqliteConnection,
    form: TowingRequestForm,
    scheme: IdScheme,
) -> Result<TransactionInfo> {
    let (workshop_name, amount, pickup, destination) = match (
        form.workshop_id.as_ref().filter(|w| !w.is_blank()),
        non_blank(&form.workshop_name),
        form.amount,
        non_blank(&form.pickup),
        non_blank(&form.destination),
    ) {
        (Some(_), Some(w), Some(a), Some(p), Some(d)) => (w, a, p, d),
        _ => {
            return Err(AssistDbError::validation(
                "Missing required fields: workshopId, workshopName, amount, pickup, destination",
            ))
        }
    };
    let workshop_id = require_workshop_id(conn, form.workshop_id.as_ref())?;
    if amount != TOWING_FLAT_RATE {
        return Err(AssistDbError::validation(format!(
            "Towing is charged at a flat rate of {}",
            TOWING_FLAT_RATE
        )));
    }
    check_customer(conn, form.user_id)?;

    conn.immediate_transaction(|conn| {
        let tx_id = new_transaction_id(conn, scheme)?;
        let info = TransactionInfo::new(
            &tx_id,
            TransactionKind::Towing,
            format!(
                "Towing to {} from {} to {}",
                workshop_name, pickup, destination
            ),
            amount.cents(),
            form.user_id,
        );
        info.insert(conn)?;
        diesel::insert_into(towing_requests::table)
            .values(&NewTowingRequest {
                transaction_id: &tx_id,
                user_id: form.user_id,
                workshop_id,
                pickup,
                destination,
                pickup_latitude: form.pickup_latitude,
                pickup_longitude: form.pickup_longitude,
                destination_latitude: form.destination_latitude,
                destination_longitude: form.destination_longitude,
                amount: amount.cents(),
                status: info.get_status(),
                notes: non_blank(&form.notes),
                date: info.get_date(),
            })
            .execute(conn)?;
        Ok(info)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_utils::{create_workshop, establish_connection},
        transactions::{ServiceDetail, Transactions},
    };

    fn form(workshop: WorkshopRef) -> TowingRequestForm {
        TowingRequestForm {
            workshop_id: Some(workshop),
            workshop_name: Some("Bengkel Ah Seng".into()),
            amount: Some(TOWING_FLAT_RATE),
            pickup: Some("Jalan Tun Razak".into()),
            destination: Some("Segambut".into()),
            ..Default::default()
        }
    }

    #[test]
    fn create_towing() {
        let mut conn = establish_connection();
        let w = create_workshop(&mut conn, "Bengkel Ah Seng");
        let mut f = form(WorkshopRef::from(w.get_id()));
        f.pickup_latitude = Some(3.1579);
        f.pickup_longitude = Some(101.7116);
        f.notes = Some("Flat tyre, car is in the basement".into());

        let info = create_towing_request(&mut conn, f, IdScheme::Short).unwrap();
        assert_eq!(
            info.get_title(),
            "Towing to Bengkel Ah Seng from Jalan Tun Razak to Segambut"
        );
        assert_eq!(info.get_amount(), TOWING_FLAT_RATE);
        assert_eq!(info.get_status(), TransactionStatus::Pending);

        match Transactions::get(&mut conn, info.get_id()).unwrap().detail {
            ServiceDetail::Towing(t) => {
                assert_eq!(t.get_workshop_id(), w.get_id());
                assert_eq!(t.get_pickup_coordinates(), Some((3.1579, 101.7116)));
                assert_eq!(t.get_notes(), Some("Flat tyre, car is in the basement"));
            }
            other => panic!("unexpected detail {:?}", other),
        }
    }

    #[test]
    fn workshop_is_verified() {
        let mut conn = establish_connection();
        assert!(matches!(
            create_towing_request(&mut conn, form(WorkshopRef::from(31)), IdScheme::Short),
            Err(AssistDbError::ReferenceNotFound(_))
        ));
        let mut missing = form(WorkshopRef::from(31));
        missing.workshop_id = None;
        assert!(matches!(
            create_towing_request(&mut conn, missing, IdScheme::Short),
            Err(AssistDbError::Validation(_))
        ));
        assert_eq!(Transactions::count(&mut conn).unwrap(), 0);
    }

    #[test]
    fn flat_rate_is_enforced() {
        let mut conn = establish_connection();
        let w = create_workshop(&mut conn, "Bengkel Ah Seng");
        let mut cheap = form(WorkshopRef::from(w.get_id()));
        cheap.amount = Some(Money::from_cents(100));
        assert!(matches!(
            create_towing_request(&mut conn, cheap, IdScheme::Long),
            Err(AssistDbError::Validation(_))
        ));
        assert_eq!(Transactions::count(&mut conn).unwrap(), 0);
    }
}
