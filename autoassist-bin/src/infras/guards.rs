use rocket::{
    data::{self, Data, FromData},
    http::Status,
    outcome::Outcome,
    request::Request,
    serde::json::{Error as JsonError, Json},
};
use serde::de::DeserializeOwned;
use std::ops::Deref;

// Why the request body was rejected, read back by the 400 catcher
pub(crate) struct BodyRejection(pub(crate) Option<String>);

/// A JSON request body. One that does not deserialize is a 400 whose `error` is the deserializer's message,
/// e.g. an unknown `quoteType` or a negative amount.
pub struct JsonBody<T>(pub T);

impl<T> JsonBody<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for JsonBody<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r, T: DeserializeOwned + Send> FromData<'r> for JsonBody<T> {
    type Error = ();

    async fn from_data(req: &'r Request<'_>, data: Data<'r>) -> data::Outcome<'r, Self> {
        match Json::<T>::from_data(req, data).await {
            Outcome::Success(json) => Outcome::Success(JsonBody(json.into_inner())),
            Outcome::Forward(f) => Outcome::Forward(f),
            Outcome::Error((_, e)) => {
                let message = match e {
                    JsonError::Parse(_, e) => format!("Invalid request body: {}", e),
                    _ => "Unreadable request body".to_string(),
                };
                log::debug!("rejected request body: {}", message);
                req.local_cache(|| BodyRejection(Some(message)));
                Outcome::Error((Status::BadRequest, ()))
            }
        }
    }
}
