use crate::{
    error::{AssistDbError, AssistDbResult as Result, OrNotFound},
    last_insert_rowid, non_blank,
    schema::workshops,
};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

// A pseudo struct for managing the workshops table.
pub struct Workshops;

impl Workshops {
    pub fn list(conn: &mut SqliteConnection) -> Result<Vec<Workshop>> {
        use crate::schema::workshops::dsl::*;
        Ok(workshops.order(id.asc()).load::<Workshop>(conn)?)
    }

    pub fn find_by_id(conn: &mut SqliteConnection, id_provided: i32) -> Result<Workshop> {
        use crate::schema::workshops::dsl::*;
        workshops
            .filter(id.eq(id_provided))
            .first::<Workshop>(conn)
            .or_not_found("Workshop")
    }

    pub fn exists(conn: &mut SqliteConnection, id_provided: i32) -> Result<bool> {
        use crate::schema::workshops::dsl::*;
        let count: i64 = workshops
            .filter(id.eq(id_provided))
            .count()
            .get_result(conn)?;
        Ok(count > 0)
    }

    pub fn count(conn: &mut SqliteConnection) -> Result<i64> {
        use crate::schema::workshops::dsl::*;
        Ok(workshops.count().get_result(conn)?)
    }

    /// Number of shop orders, towing requests, and quotations pointing at the workshop.
    pub fn references(conn: &mut SqliteConnection, id_provided: i32) -> Result<i64> {
        use crate::schema::{quotations, shop_orders, towing_requests};
        let orders: i64 = shop_orders::table
            .filter(shop_orders::workshop_id.eq(id_provided))
            .count()
            .get_result(conn)?;
        let towing: i64 = towing_requests::table
            .filter(towing_requests::workshop_id.eq(id_provided))
            .count()
            .get_result(conn)?;
        let quotes: i64 = quotations::table
            .filter(quotations::workshop_id.eq(id_provided))
            .count()
            .get_result(conn)?;
        Ok(orders + towing + quotes)
    }

    // CRUD: DELETE
    // Products of the workshop are detached by the store (ON DELETE SET NULL)
    pub fn delete_by_id(conn: &mut SqliteConnection, id_provided: i32) -> Result<()> {
        use crate::schema::workshops::dsl::*;
        conn.transaction(|conn| {
            Self::find_by_id(conn, id_provided)?;
            let refs = Self::references(conn, id_provided)?;
            if refs > 0 {
                return Err(AssistDbError::ReferenceInUse(format!(
                    "Workshop {} is referenced by {} order(s), towing or quotation request(s)",
                    id_provided, refs
                )));
            }
            diesel::delete(workshops.filter(id.eq(id_provided))).execute(conn)?;
            Ok(())
        })
    }

    pub fn update(
        conn: &mut SqliteConnection,
        id_provided: i32,
        patch: WorkshopPatch,
    ) -> Result<Workshop> {
        use crate::schema::workshops::dsl::*;
        let patch = patch.verify()?;
        Self::find_by_id(conn, id_provided)?;
        diesel::update(workshops.filter(id.eq(id_provided)))
            .set(&patch)
            .execute(conn)?;
        Self::find_by_id(conn, id_provided)
    }
}

/// A single workshop, corresponding to a row in the table `workshops`
#[derive(Debug, Serialize, Queryable, Identifiable, Clone, PartialEq)]
pub struct Workshop {
    id: i32,
    name: String,
    rating: f64,
    location: String,
    icon: String,
    image: Option<String>,
    created_at: NaiveDateTime,
}

impl Workshop {
    pub fn get_id(&self) -> i32 {
        self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_rating(&self) -> f64 {
        self.rating
    }

    pub fn get_location(&self) -> &str {
        &self.location
    }

    pub fn get_icon(&self) -> &str {
        &self.icon
    }

    pub fn get_image(&self) -> Option<&str> {
        self.image.as_deref()
    }
}

fn check_rating(rating: f64) -> Result<f64> {
    if (0.0..=5.0).contains(&rating) {
        Ok(rating)
    } else {
        Err(AssistDbError::validation("Rating must be between 0 and 5"))
    }
}

/// Workshop creation as submitted by the admin console.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct WorkshopForm {
    pub name: Option<String>,
    pub rating: Option<f64>,
    pub location: Option<String>,
    pub icon: Option<String>,
    pub image: Option<String>,
}

impl WorkshopForm {
    pub fn verify(self) -> Result<IncompleteWorkshop> {
        match (
            non_blank(&self.name),
            self.rating,
            non_blank(&self.location),
            non_blank(&self.icon),
        ) {
            (Some(name), Some(rating), Some(location), Some(icon)) => {
                let mut workshop = IncompleteWorkshop::new(name, check_rating(rating)?, location, icon);
                workshop.image = non_blank(&self.image).map(ToString::to_string);
                Ok(workshop)
            }
            _ => Err(AssistDbError::validation(
                "Missing required fields: name, rating, location, icon",
            )),
        }
    }
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = workshops)]
pub struct IncompleteWorkshop {
    name: String,
    rating: f64,
    location: String,
    icon: String,
    image: Option<String>,
}

impl IncompleteWorkshop {
    pub fn new(
        name: impl ToString,
        rating: f64,
        location: impl ToString,
        icon: impl ToString,
    ) -> Self {
        Self {
            name: name.to_string(),
            rating,
            location: location.to_string(),
            icon: icon.to_string(),
            image: None,
        }
    }

    pub fn image(mut self, image: impl ToString) -> Self {
        self.image = Some(image.to_string());
        self
    }

    pub fn create(&self, conn: &mut SqliteConnection) -> Result<Workshop> {
        use crate::schema::workshops::dsl::*;
        conn.transaction(|conn| {
            diesel::insert_into(workshops).values(self).execute(conn)?;
            let new_id = last_insert_rowid(conn)?;
            Workshops::find_by_id(conn, new_id)
        })
    }
}

/// Partial update. Only supplied fields are touched; `image: null` or `""` clears the image.
#[derive(Debug, Deserialize, AsChangeset, Clone, Default)]
#[diesel(table_name = workshops)]
pub struct WorkshopPatch {
    pub name: Option<String>,
    pub rating: Option<f64>,
    pub location: Option<String>,
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "crate::double_option")]
    pub image: Option<Option<String>>,
}

impl WorkshopPatch {
    // Blank text counts as not supplied, except for `image` where it clears the picture
    fn verify(self) -> Result<Self> {
        let patch = Self {
            name: non_blank(&self.name).map(ToString::to_string),
            rating: self.rating,
            location: non_blank(&self.location).map(ToString::to_string),
            icon: non_blank(&self.icon).map(ToString::to_string),
            image: self
                .image
                .map(|image| non_blank(&image).map(ToString::to_string)),
        };
        if patch.name.is_none()
            && patch.rating.is_none()
            && patch.location.is_none()
            && patch.icon.is_none()
            && patch.image.is_none()
        {
            return Err(AssistDbError::validation("No fields to update"));
        }
        if let Some(rating) = patch.rating {
            check_rating(rating)?;
        }
        Ok(patch)
    }
}

/// Whether the calling context needs a workshop to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    // Shop checkout, towing, and quotation: the workshop routes fulfilment
    Required,
    // Product affiliation is best effort
    Optional,
}

/// A workshop identifier exactly as a client sent it: a JSON number or a (numeric) string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkshopRef {
    Number(serde_json::Number),
    Text(String),
}

impl From<i32> for WorkshopRef {
    fn from(id: i32) -> Self {
        Self::Number(id.into())
    }
}

impl From<&str> for WorkshopRef {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl WorkshopRef {
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }

    /// A positive integer id, if the raw value denotes one.
    pub fn parse(&self) -> Option<i32> {
        fn integral(f: f64) -> Option<i64> {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Some(f as i64)
            } else {
                None
            }
        }
        let parsed = match self {
            Self::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
            Self::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral))
            }
        };
        parsed
            .filter(|v| *v > 0)
            .and_then(|v| i32::try_from(v).ok())
    }
}

/// Normalize a client-supplied workshop reference into a verified foreign key.
///
/// Absent, null, and blank values mean "no workshop". Anything else is parsed and then checked against the
/// `workshops` table. In a [`Requirement::Required`] context every failure is an error; in an optional context
/// unparsable or unknown ids silently become `None`.
pub fn normalize_workshop_id(
    conn: &mut SqliteConnection,
    raw: Option<&WorkshopRef>,
    requirement: Requirement,
) -> Result<Option<i32>> {
    log::debug!("normalizing workshop reference {:?} ({:?})", raw, requirement);

    let raw = match raw {
        Some(r) if !r.is_blank() => r,
        _ => {
            return match requirement {
                Requirement::Required => Err(AssistDbError::validation("Workshop is required")),
                Requirement::Optional => Ok(None),
            }
        }
    };

    let parsed = match (raw.parse(), requirement) {
        (Some(id), _) => id,
        (None, Requirement::Required) => {
            return Err(AssistDbError::validation("Invalid workshop id"));
        }
        (None, Requirement::Optional) => {
            log::warn!("dropping unparsable workshop reference {:?}", raw);
            return Ok(None);
        }
    };

    if Workshops::exists(conn, parsed)? {
        log::debug!("workshop reference {:?} resolved to {}", raw, parsed);
        Ok(Some(parsed))
    } else {
        match requirement {
            Requirement::Required => Err(AssistDbError::ReferenceNotFound(format!(
                "Workshop with ID {} does not exist",
                parsed
            ))),
            Requirement::Optional => {
                log::warn!("dropping reference to unknown workshop {}", parsed);
                Ok(None)
            }
        }
    }
}

/// [`normalize_workshop_id`] in a required context.
pub fn require_workshop_id(conn: &mut SqliteConnection, raw: Option<&WorkshopRef>) -> Result<i32> {
    normalize_workshop_id(conn, raw, Requirement::Required)?
        .ok_or_else(|| AssistDbError::validation("Workshop is required"))
}
