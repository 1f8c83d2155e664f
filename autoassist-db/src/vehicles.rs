use crate::{
    error::{AssistDbError, AssistDbResult as Result, OrNotFound},
    last_insert_rowid, non_blank,
    schema::vehicles,
    users::Users,
};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

// Vehicles are always addressed through their owner.
pub struct Vehicles;

impl Vehicles {
    pub fn list_by_user(conn: &mut SqliteConnection, user: i32) -> Result<Vec<Vehicle>> {
        use crate::schema::vehicles::dsl::*;
        Ok(vehicles
            .filter(user_id.eq(user))
            .order((created_at.desc(), id.desc()))
            .load::<Vehicle>(conn)?)
    }

    pub fn find(conn: &mut SqliteConnection, user: i32, vehicle: i32) -> Result<Vehicle> {
        use crate::schema::vehicles::dsl::*;
        vehicles
            .filter(id.eq(vehicle))
            .filter(user_id.eq(user))
            .first::<Vehicle>(conn)
            .or_not_found("Vehicle")
    }

    pub fn create(conn: &mut SqliteConnection, user: i32, form: VehicleForm) -> Result<Vehicle> {
        let form = form.verify()?;
        conn.transaction(|conn| {
            if !Users::exists(conn, user)? {
                return Err(AssistDbError::ReferenceNotFound(format!(
                    "User with ID {} does not exist",
                    user
                )));
            }
            diesel::insert_into(vehicles::table)
                .values((vehicles::user_id.eq(user), &form))
                .execute(conn)?;
            let new_id = last_insert_rowid(conn)?;
            Self::find(conn, user, new_id)
        })
    }

    pub fn update(
        conn: &mut SqliteConnection,
        user: i32,
        vehicle: i32,
        form: VehicleForm,
    ) -> Result<Vehicle> {
        use crate::schema::vehicles::dsl::*;
        let form = form.verify()?;
        conn.transaction(|conn| {
            Self::find(conn, user, vehicle)?;
            diesel::update(vehicles.filter(id.eq(vehicle)))
                .set((&form, updated_at.eq(Utc::now().naive_utc())))
                .execute(conn)?;
            Self::find(conn, user, vehicle)
        })
    }

    pub fn delete(conn: &mut SqliteConnection, user: i32, vehicle: i32) -> Result<()> {
        use crate::schema::vehicles::dsl::*;
        Self::find(conn, user, vehicle)?;
        diesel::delete(vehicles.filter(id.eq(vehicle))).execute(conn)?;
        Ok(())
    }
}

/// A single vehicle, corresponding to a row in the table `vehicles`
#[derive(Debug, Serialize, Queryable, Identifiable, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    id: i32,
    user_id: i32,
    model: String,
    year: String,
    chassis: String,
    engine: String,
    plate_number: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl Vehicle {
    pub fn get_id(&self) -> i32 {
        self.id
    }

    pub fn get_user_id(&self) -> i32 {
        self.user_id
    }

    pub fn get_model(&self) -> &str {
        &self.model
    }

    pub fn get_plate_number(&self) -> Option<&str> {
        self.plate_number.as_deref()
    }
}

/// Vehicle descriptors, used for both creation and full replacement.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct VehicleForm {
    pub model: Option<String>,
    #[serde(default, deserialize_with = "crate::lenient_string")]
    pub year: Option<String>,
    pub chassis: Option<String>,
    pub engine: Option<String>,
    pub plate_number: Option<String>,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = vehicles, treat_none_as_null = true)]
struct VerifiedVehicle {
    model: String,
    year: String,
    chassis: String,
    engine: String,
    plate_number: Option<String>,
}

impl VehicleForm {
    pub fn new(model: &str, year: &str, chassis: &str, engine: &str) -> Self {
        Self {
            model: Some(model.to_string()),
            year: Some(year.to_string()),
            chassis: Some(chassis.to_string()),
            engine: Some(engine.to_string()),
            plate_number: None,
        }
    }

    pub fn plate_number(mut self, plate: &str) -> Self {
        self.plate_number = Some(plate.to_string());
        self
    }

    fn verify(self) -> Result<VerifiedVehicle> {
        match (
            non_blank(&self.model),
            non_blank(&self.year),
            non_blank(&self.chassis),
            non_blank(&self.engine),
        ) {
            (Some(model), Some(year), Some(chassis), Some(engine)) => Ok(VerifiedVehicle {
                model: model.to_string(),
                year: year.to_string(),
                chassis: chassis.to_string(),
                engine: engine.to_string(),
                plate_number: non_blank(&self.plate_number).map(ToString::to_string),
            }),
            _ => Err(AssistDbError::validation(
                "Missing required fields: model, year, chassis, engine",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_user, establish_connection};

    #[test]
    fn vehicles_are_scoped_by_owner() {
        let mut conn = establish_connection();
        let owner = create_user(&mut conn, "owner@example.org");
        let other = create_user(&mut conn, "other@example.org");

        let v = Vehicles::create(
            &mut conn,
            owner.get_id(),
            VehicleForm::new("Perodua Myvi", "2019", "PM2-123456", "1.5L").plate_number("WXY 1234"),
        )
        .unwrap();
        assert_eq!(v.get_plate_number(), Some("WXY 1234"));
        assert_eq!(Vehicles::list_by_user(&mut conn, owner.get_id()).unwrap().len(), 1);
        assert!(Vehicles::list_by_user(&mut conn, other.get_id()).unwrap().is_empty());

        assert!(matches!(
            Vehicles::find(&mut conn, other.get_id(), v.get_id()),
            Err(AssistDbError::NotFound("Vehicle"))
        ));
        assert!(matches!(
            Vehicles::delete(&mut conn, other.get_id(), v.get_id()),
            Err(AssistDbError::NotFound("Vehicle"))
        ));
    }

    #[test]
    fn update_replaces_descriptors() {
        let mut conn = establish_connection();
        let owner = create_user(&mut conn, "owner@example.org");
        let v = Vehicles::create(
            &mut conn,
            owner.get_id(),
            VehicleForm::new("Perodua Myvi", "2019", "PM2-123456", "1.5L").plate_number("WXY 1234"),
        )
        .unwrap();

        let updated = Vehicles::update(
            &mut conn,
            owner.get_id(),
            v.get_id(),
            VehicleForm::new("Perodua Myvi", "2020", "PM2-123456", "1.5L"),
        )
        .unwrap();
        assert_eq!(updated.get_plate_number(), None);

        let incomplete = VehicleForm {
            model: Some("Proton Saga".into()),
            ..Default::default()
        };
        assert!(matches!(
            Vehicles::update(&mut conn, owner.get_id(), v.get_id(), incomplete),
            Err(AssistDbError::Validation(_))
        ));
    }

    #[test]
    fn unknown_owner_and_cascade() {
        let mut conn = establish_connection();
        assert!(matches!(
            Vehicles::create(&mut conn, 77, VehicleForm::new("Proton Saga", "2015", "C1", "1.3L")),
            Err(AssistDbError::ReferenceNotFound(_))
        ));

        let owner = create_user(&mut conn, "owner@example.org");
        Vehicles::create(
            &mut conn,
            owner.get_id(),
            VehicleForm::new("Proton Saga", "2015", "C1", "1.3L"),
        )
        .unwrap();
        Users::delete_by_id(&mut conn, owner.get_id()).unwrap();
        assert!(Vehicles::list_by_user(&mut conn, owner.get_id()).unwrap().is_empty());
    }
}
