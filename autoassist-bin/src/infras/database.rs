use crate::ApiError;
use autoassist_db::{error::AssistDbResult, seed::SeedBuilder};
use diesel::{connection::SimpleConnection, SqliteConnection};
use rocket::{fairing, Build, Rocket};

#[database("autoassist")]
pub struct DbConn(diesel::SqliteConnection);

impl DbConn {
    /// Run store code on the blocking pool. Foreign keys are switched on for every pooled connection first.
    pub async fn exec<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut SqliteConnection) -> AssistDbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run(move |c| -> AssistDbResult<T> {
            c.batch_execute("PRAGMA foreign_keys = ON;")?;
            f(c)
        })
        .await
        .map_err(ApiError::from)
    }
}

pub async fn prepare_database(rocket: Rocket<Build>) -> fairing::Result {
    let conn = match DbConn::get_one(&rocket).await {
        Some(c) => c,
        None => {
            log::error!("no database connection available for migrations");
            return Err(rocket);
        }
    };

    let seed = rocket.state::<SeedBuilder>().cloned().unwrap_or_default();
    // Initialize the database
    let prepared = conn
        .run(move |c| -> anyhow::Result<_> {
            autoassist_db::prepare(c)?;
            Ok(seed.build(c)?)
        })
        .await;

    match prepared {
        Ok(report) => {
            log::info!("database ready, seeded {:?}", report);
            Ok(rocket)
        }
        Err(e) => {
            log::error!("failed to prepare the database: {:#}", e);
            Err(rocket)
        }
    }
}
