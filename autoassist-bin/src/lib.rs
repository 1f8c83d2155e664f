#[macro_use]
extern crate rocket;
#[macro_use]
extern crate rocket_sync_db_pools;

pub use infras::{basics::*, database::DbConn, guards::JsonBody};
use autoassist_db::seed::SeedBuilder;
use rocket::{fairing::AdHoc, figment::Figment, Build, Rocket};

mod infras;
mod services;

/// Assemble the server from an already merged configuration.
pub fn build(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(DbConn::fairing())
        .attach(create_fairing::<LedgerConfig>("ledger"))
        .attach(create_fairing::<SeedBuilder>("seed"))
        // Must come after the seed config is managed
        .attach(AdHoc::try_on_ignite(
            "Run database migrations",
            infras::database::prepare_database,
        ))
        .mount("/", routes![services::root::index])
        .mount("/api", routes![services::root::health])
        .mount(
            "/api/transactions",
            routes![
                services::transactions::checkout_cart,
                services::transactions::request_towing,
                services::transactions::request_quotation,
                services::transactions::list,
                services::transactions::get,
                services::transactions::update,
                services::transactions::set_admin_message,
                services::transactions::delete,
            ],
        )
        .mount(
            "/api/workshops",
            routes![
                services::workshops::list,
                services::workshops::get,
                services::workshops::create,
                services::workshops::update,
                services::workshops::delete,
            ],
        )
        .mount(
            "/api/products",
            routes![
                services::products::list,
                services::products::get,
                services::products::create,
                services::products::update,
                services::products::delete,
            ],
        )
        // Mount user namespace
        .mount(
            "/api/users",
            routes![
                services::users::register,
                services::users::login,
                services::users::list,
                services::users::get,
                services::users::create,
                services::users::update,
                services::users::delete,
                services::vehicles::list,
                services::vehicles::get,
                services::vehicles::create,
                services::vehicles::update,
                services::vehicles::delete,
            ],
        )
        .mount(
            "/api/admin",
            routes![
                services::admins::login,
                services::admins::list,
                services::admins::get,
                services::admins::create,
                services::admins::update,
                services::admins::delete,
            ],
        )
        .mount("/api/banners", routes![services::banners::list])
        .register(
            "/",
            catchers![
                infras::basics::bad_request,
                infras::basics::not_found,
                infras::basics::unprocessable,
                infras::basics::internal,
                infras::basics::fallback,
            ],
        )
}
