use crate::{
    error::{AssistDbError, AssistDbResult as Result, OrNotFound},
    last_insert_rowid, non_blank,
    schema::users,
};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
// Tests hash a lot of passwords
#[cfg(test)]
const HASH_COST: u32 = 4;

pub(crate) fn hash_password(raw: &str) -> Result<String> {
    Ok(bcrypt::hash(raw, HASH_COST)?)
}

// One bcrypt round at the stored cost, for a login whose email matched no account
pub(crate) fn dummy_verify(raw: &str) -> Result<()> {
    hash_password(raw).map(drop)
}

/// A pseudo struct used to manage the table `users`
pub struct Users;

impl Users {
    // CRUD: READ, newest first
    pub fn list(conn: &mut SqliteConnection) -> Result<Vec<User>> {
        use crate::schema::users::dsl::*;
        Ok(users
            .order((created_at.desc(), id.desc()))
            .load::<User>(conn)?)
    }

    // CRUD: READ
    pub fn find_by_id(conn: &mut SqliteConnection, id_provided: i32) -> Result<User> {
        use crate::schema::users::dsl::*;
        users
            .filter(id.eq(id_provided))
            .first::<User>(conn)
            .or_not_found("User")
    }

    pub fn find_by_email(conn: &mut SqliteConnection, email_provided: &str) -> Result<Option<User>> {
        use crate::schema::users::dsl::*;
        Ok(users
            .filter(email.eq(email_provided))
            .first::<User>(conn)
            .optional()?)
    }

    pub fn exists(conn: &mut SqliteConnection, id_provided: i32) -> Result<bool> {
        use crate::schema::users::dsl::*;
        let count: i64 = users.filter(id.eq(id_provided)).count().get_result(conn)?;
        Ok(count > 0)
    }

    pub fn count(conn: &mut SqliteConnection) -> Result<i64> {
        use crate::schema::users::dsl::*;
        Ok(users.count().get_result(conn)?)
    }

    // Unknown email and wrong password are indistinguishable to the caller
    pub fn login(conn: &mut SqliteConnection, credentials: LoginForm) -> Result<User> {
        let (email, password) = credentials.verify()?;
        match Self::find_by_email(conn, email)? {
            Some(user) if user.verify_passwd(password)? => Ok(user),
            Some(_) => Err(AssistDbError::Authentication),
            None => {
                dummy_verify(password)?;
                Err(AssistDbError::Authentication)
            }
        }
    }

    pub fn update(conn: &mut SqliteConnection, id_provided: i32, patch: UserPatch) -> Result<User> {
        use crate::schema::users::dsl::*;
        conn.transaction(|conn| {
            Self::find_by_id(conn, id_provided)?;
            let changes = patch.verify()?;
            let taken: i64 = users
                .filter(email.eq(&changes.email))
                .filter(id.ne(id_provided))
                .count()
                .get_result(conn)?;
            if taken > 0 {
                return Err(AssistDbError::validation("Email already in use"));
            }
            diesel::update(users.filter(id.eq(id_provided)))
                .set(&changes)
                .execute(conn)?;
            Self::find_by_id(conn, id_provided)
        })
    }

    // CRUD: DELETE
    // Vehicles and cart rows cascade, ledger rows keep the history with a NULL user
    pub fn delete_by_id(conn: &mut SqliteConnection, id_provided: i32) -> Result<()> {
        use crate::schema::users::dsl::*;
        Self::find_by_id(conn, id_provided)?;
        diesel::delete(users.filter(id.eq(id_provided))).execute(conn)?;
        Ok(())
    }
}

/// A service request may be anonymous, but a named customer must exist.
pub(crate) fn check_customer(conn: &mut SqliteConnection, user: Option<i32>) -> Result<()> {
    match user {
        Some(u) if !Users::exists(conn, u)? => Err(AssistDbError::ReferenceNotFound(format!(
            "User with ID {} does not exist",
            u
        ))),
        _ => Ok(()),
    }
}

/// A single user, corresponding to a row in the table `users`
#[derive(Debug, Serialize, Queryable, Identifiable, Clone)]
pub struct User {
    id: i32,
    email: String,
    #[serde(skip_serializing)]
    password: String,
    name: String,
    phone: Option<String>,
    created_at: NaiveDateTime,
}

impl User {
    pub fn get_id(&self) -> i32 {
        self.id
    }

    pub fn get_email(&self) -> &str {
        &self.email
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn verify_passwd(&self, passwd: impl AsRef<[u8]>) -> Result<bool> {
        Ok(bcrypt::verify(passwd, &self.password)?)
    }
}

/// Registration payload. The password is plain here and hashed on `create`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct UserForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
struct NewUser<'a> {
    email: &'a str,
    password: String,
    name: &'a str,
    phone: Option<&'a str>,
}

impl UserForm {
    pub fn new(email: &str, password: &str, name: &str, phone: Option<&str>) -> Self {
        Self {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            name: Some(name.to_string()),
            phone: phone.map(ToString::to_string),
        }
    }

    pub fn create(&self, conn: &mut SqliteConnection) -> Result<User> {
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
        let new_user = NewUser {
            email,
            password: hash_password(password)?,
            name,
            phone: non_blank(&self.phone),
        };
        conn.transaction(|conn| {
            if Users::find_by_email(conn, email)?.is_some() {
                return Err(AssistDbError::validation("Email already registered"));
            }
            diesel::insert_into(users::table)
                .values(&new_user)
                .execute(conn)?;
            let new_id = last_insert_rowid(conn)?;
            Users::find_by_id(conn, new_id)
        })
    }
}

/// Email and plain password, shared by user and admin login.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginForm {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    pub(crate) fn verify(&self) -> Result<(&str, &str)> {
        match (
            non_blank(&self.email),
            self.password.as_deref().filter(|p| !p.is_empty()),
        ) {
            (Some(e), Some(p)) => Ok((e, p)),
            _ => Err(AssistDbError::validation("Email and password are required")),
        }
    }
}

/// Profile update. `name` and `email` are mandatory; `phone: null` or `""` clears the phone, an empty password
/// keeps the current one.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::double_option")]
    pub phone: Option<Option<String>>,
    pub password: Option<String>,
}

#[derive(AsChangeset)]
#[diesel(table_name = users)]
struct UserChangeset {
    email: String,
    name: String,
    phone: Option<Option<String>>,
    password: Option<String>,
}

impl UserPatch {
    fn verify(self) -> Result<UserChangeset> {
        let (email, name) = match (non_blank(&self.email), non_blank(&self.name)) {
            (Some(e), Some(n)) => (e.to_string(), n.to_string()),
            _ => return Err(AssistDbError::validation("Name and email are required")),
        };
        let password = match self.password.as_deref().filter(|p| !p.is_empty()) {
            Some(raw) => Some(hash_password(raw)?),
            None => None,
        };
        Ok(UserChangeset {
            email,
            name,
            phone: self.phone.map(|p| non_blank(&p).map(ToString::to_string)),
            password,
        })
    }
}

#[cfg(test)]
mod tests;
