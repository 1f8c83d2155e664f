use crate::{
    error::{AssistDbError, AssistDbResult as Result, OrNotFound},
    last_insert_rowid, non_blank,
    schema::admin,
    users::{dummy_verify, hash_password, LoginForm},
};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ROLE: &str = "admin";

/// A pseudo struct used to manage the table `admin`
pub struct Admins;

impl Admins {
    pub fn list(conn: &mut SqliteConnection) -> Result<Vec<Admin>> {
        use crate::schema::admin::dsl::*;
        Ok(admin
            .order((created_at.desc(), id.desc()))
            .load::<Admin>(conn)?)
    }

    pub fn find_by_id(conn: &mut SqliteConnection, id_provided: i32) -> Result<Admin> {
        use crate::schema::admin::dsl::*;
        admin
            .filter(id.eq(id_provided))
            .first::<Admin>(conn)
            .or_not_found("Admin")
    }

    pub fn find_by_email(conn: &mut SqliteConnection, email_provided: &str) -> Result<Option<Admin>> {
        use crate::schema::admin::dsl::*;
        Ok(admin
            .filter(email.eq(email_provided))
            .first::<Admin>(conn)
            .optional()?)
    }

    pub fn count(conn: &mut SqliteConnection) -> Result<i64> {
        use crate::schema::admin::dsl::*;
        Ok(admin.count().get_result(conn)?)
    }

    /// Check the credentials, then the account state, and stamp `last_login`.
    pub fn login(conn: &mut SqliteConnection, credentials: LoginForm) -> Result<Admin> {
        use crate::schema::admin::dsl::*;
        let (email_provided, password_provided) = credentials.verify()?;
        let account = match Self::find_by_email(conn, email_provided)? {
            Some(a) if a.verify_passwd(password_provided)? => a,
            Some(_) => return Err(AssistDbError::Authentication),
            None => {
                dummy_verify(password_provided)?;
                return Err(AssistDbError::Authentication);
            }
        };
        if !account.is_active {
            log::warn!("login attempt on deactivated admin {}", account.id);
            return Err(AssistDbError::AccountDisabled);
        }
        diesel::update(admin.filter(id.eq(account.id)))
            .set(last_login.eq(Utc::now().naive_utc()))
            .execute(conn)?;
        Self::find_by_id(conn, account.id)
    }

    pub fn update(conn: &mut SqliteConnection, id_provided: i32, patch: AdminPatch) -> Result<Admin> {
        use crate::schema::admin::dsl::*;
        conn.transaction(|conn| {
            Self::find_by_id(conn, id_provided)?;
            let changes = patch.verify()?;
            if let Some(new_email) = &changes.email {
                let taken: i64 = admin
                    .filter(email.eq(new_email))
                    .filter(id.ne(id_provided))
                    .count()
                    .get_result(conn)?;
                if taken > 0 {
                    return Err(AssistDbError::validation("Email already in use"));
                }
            }
            diesel::update(admin.filter(id.eq(id_provided)))
                .set(&changes)
                .execute(conn)?;
            Self::find_by_id(conn, id_provided)
        })
    }

    pub fn delete_by_id(conn: &mut SqliteConnection, id_provided: i32) -> Result<()> {
        use crate::schema::admin::dsl::*;
        Self::find_by_id(conn, id_provided)?;
        diesel::delete(admin.filter(id.eq(id_provided))).execute(conn)?;
        Ok(())
    }
}

/// A staff account, corresponding to a row in the table `admin`
#[derive(Debug, Serialize, Queryable, Identifiable, Clone)]
#[diesel(table_name = admin)]
pub struct Admin {
    id: i32,
    email: String,
    #[serde(skip_serializing)]
    password: String,
    name: String,
    role: String,
    is_active: bool,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    last_login: Option<NaiveDateTime>,
}

impl Admin {
    pub fn get_id(&self) -> i32 {
        self.id
    }

    pub fn get_email(&self) -> &str {
        &self.email
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_role(&self) -> &str {
        &self.role
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn get_last_login(&self) -> Option<NaiveDateTime> {
        self.last_login
    }

    pub fn verify_passwd(&self, passwd: impl AsRef<[u8]>) -> Result<bool> {
        Ok(bcrypt::verify(passwd, &self.password)?)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AdminForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    #[serde(alias = "isActive")]
    pub is_active: Option<bool>,
}

#[derive(Insertable)]
#[diesel(table_name = admin)]
struct NewAdmin<'a> {
    email: &'a str,
    password: String,
    name: &'a str,
    role: &'a str,
    is_active: bool,
}

impl AdminForm {
    pub fn new(email: &str, password: &str, name: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn create(&self, conn: &mut SqliteConnection) -> Result<Admin> {
        let (email, password, name) = match (
            non_blank(&self.email),
            self.password.as_deref().filter(|p| !p.is_empty()),
            non_blank(&self.name),
        ) {
            (Some(e), Some(p), Some(n)) => (e, p, n),
            _ => {
                return Err(AssistDbError::validation(
                    "Missing required fields: email, password, name",
                ))
            }
        };
        let new_admin = NewAdmin {
            email,
            password: hash_password(password)?,
            name,
            role: non_blank(&self.role).unwrap_or(DEFAULT_ROLE),
            is_active: self.is_active.unwrap_or(true),
        };
        conn.transaction(|conn| {
            if Admins::find_by_email(conn, email)?.is_some() {
                return Err(AssistDbError::validation("Email already registered"));
            }
            diesel::insert_into(admin::table)
                .values(&new_admin)
                .execute(conn)?;
            let new_id = last_insert_rowid(conn)?;
            Admins::find_by_id(conn, new_id)
        })
    }
}

/// Partial update of a staff account. Always bumps `updated_at`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AdminPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    #[serde(alias = "isActive")]
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

#[derive(AsChangeset)]
#[diesel(table_name = admin)]
struct AdminChangeset {
    email: Option<String>,
    name: Option<String>,
    role: Option<String>,
    is_active: Option<bool>,
    password: Option<String>,
    updated_at: NaiveDateTime,
}

impl AdminPatch {
    fn verify(self) -> Result<AdminChangeset> {
        let password = match self.password.as_deref().filter(|p| !p.is_empty()) {
            Some(raw) => Some(hash_password(raw)?),
            None => None,
        };
        let changes = AdminChangeset {
            email: non_blank(&self.email).map(ToString::to_string),
            name: non_blank(&self.name).map(ToString::to_string),
            role: non_blank(&self.role).map(ToString::to_string),
            is_active: self.is_active,
            password,
            updated_at: Utc::now().naive_utc(),
        };
        if changes.email.is_none()
            && changes.name.is_none()
            && changes.role.is_none()
            && changes.is_active.is_none()
            && changes.password.is_none()
        {
            return Err(AssistDbError::validation("No fields to update"));
        }
        Ok(changes)
    }
}
