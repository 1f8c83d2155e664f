// Rocket basics, i.e. config fairings, the error responder and catchers.
pub mod basics;
// Rocket-based database infra
pub mod database;
// Data guards shared by the JSON routes
pub mod guards;
