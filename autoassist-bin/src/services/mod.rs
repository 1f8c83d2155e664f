// Service banner and health check
pub mod root;
// The ledger and its three orchestrators
pub mod transactions;
pub mod admins;
pub mod banners;
pub mod products;
pub mod users;
pub mod vehicles;
pub mod workshops;
