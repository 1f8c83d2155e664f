use super::guards::BodyRejection;
use autoassist_db::{error::AssistDbError, ids::IdScheme};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rocket::{
    fairing::{AdHoc, Fairing},
    http::Status,
    request::Request,
    response::{self, Responder},
    serde::json::{json, Json, Value},
};
use serde::{de::DeserializeOwned, Deserialize};

pub type ApiResult<T> = Result<T, ApiError>;

/// The one error type every route returns. Renders as `{"error": message}` with a matching status.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: Status,
    pub message: String,
}

impl ApiError {
    pub fn new(status: Status, message: impl ToString) -> Self {
        Self {
            status,
            message: message.to_string(),
        }
    }

    pub fn bad_request(message: impl ToString) -> Self {
        Self::new(Status::BadRequest, message)
    }

    fn internal(cause: impl std::fmt::Display) -> Self {
        log::error!("internal store failure: {}", cause);
        Self::new(Status::InternalServerError, "Internal server error")
    }
}

impl From<AssistDbError> for ApiError {
    fn from(e: AssistDbError) -> Self {
        use AssistDbError::*;
        match e {
            Validation(_) | ReferenceNotFound(_) => Self::new(Status::BadRequest, e),
            Authentication => Self::new(Status::Unauthorized, e),
            AccountDisabled => Self::new(Status::Forbidden, e),
            NotFound(_) => Self::new(Status::NotFound, e),
            ReferenceInUse(_) => Self::new(Status::Conflict, e),
            QueryError(DieselError::NotFound) => Self::new(Status::NotFound, "Not found"),
            QueryError(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
                Self::new(
                    Status::Conflict,
                    "The record is still referenced by other records",
                )
            }
            QueryError(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Self::new(Status::Conflict, "The record already exists")
            }
            HashError(_) | QueryError(_) | SerdeError(_) | IdSpaceExhausted(_)
            | DetailMissing(_) => Self::internal(e),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        (self.status, Json(json!({ "error": self.message }))).respond_to(req)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub id_scheme: IdScheme,
}

// Manage the config table `name` as state. A missing table falls back to the default.
pub fn create_fairing<T: DeserializeOwned + Default + Sync + Send + 'static>(
    name: &'static str,
) -> impl Fairing {
    AdHoc::try_on_ignite(name, move |rocket| async move {
        if !rocket.figment().contains(name) {
            return Ok(rocket.manage(T::default()));
        }
        let config: T = match rocket.figment().extract_inner(name) {
            Ok(c) => c,
            Err(e) => {
                log::error!("Invalid configuration: {:?}", e);
                return Err(rocket);
            }
        };

        Ok(rocket.manage(config))
    })
}

fn error_body(status: Status, message: &str) -> (Status, Json<Value>) {
    (status, Json(json!({ "error": message })))
}

#[catch(400)]
pub fn bad_request(req: &Request<'_>) -> (Status, Json<Value>) {
    let rejection = req.local_cache(|| BodyRejection(None));
    error_body(
        Status::BadRequest,
        rejection.0.as_deref().unwrap_or("Bad request"),
    )
}

#[catch(404)]
pub fn not_found(req: &Request<'_>) -> (Status, Json<Value>) {
    error_body(Status::NotFound, &format!("Route {} not found", req.uri()))
}

#[catch(422)]
pub fn unprocessable() -> (Status, Json<Value>) {
    error_body(Status::UnprocessableEntity, "Malformed request body")
}

#[catch(500)]
pub fn internal() -> (Status, Json<Value>) {
    error_body(Status::InternalServerError, "Internal server error")
}

#[catch(default)]
pub fn fallback(status: Status, _req: &Request<'_>) -> (Status, Json<Value>) {
    error_body(status, status.reason().unwrap_or("Unknown error"))
}
