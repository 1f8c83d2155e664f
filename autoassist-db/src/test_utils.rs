use crate::{
    money::Money,
    products::{IncompleteProduct, Product},
    users::{User, UserForm},
    workshops::{IncompleteWorkshop, Workshop},
};
use diesel::{Connection, SqliteConnection};

// A helper function to create a in-memory SQLite DB in order to test. The database is discarded after the test
pub fn establish_connection() -> SqliteConnection {
    let mut conn = SqliteConnection::establish(":memory:")
        .unwrap_or_else(|_| panic!("Error creating test database"));

    // Enforce foreign key relation and bring up the schema
    crate::prepare(&mut conn).unwrap();
    conn
}

pub fn create_workshop(conn: &mut SqliteConnection, name: &str) -> Workshop {
    IncompleteWorkshop::new(name, 4.8, "No.26, Persiaran Segambut Tengah, KL", "fa-wrench")
        .create(conn)
        .unwrap()
}

pub fn create_product(conn: &mut SqliteConnection, name: &str, price_cents: i64) -> Product {
    IncompleteProduct::new(name, Money::from_cents(price_cents), "Lubricants", "oil.png", 12)
        .create(conn)
        .unwrap()
}

pub fn create_user(conn: &mut SqliteConnection, email: &str) -> User {
    UserForm::new(email, "strongpasswd", "Ahmad Zulkifli", Some("+60123456789"))
        .create(conn)
        .unwrap()
}
