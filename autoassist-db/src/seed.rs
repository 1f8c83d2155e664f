use crate::{
    admins::{AdminForm, Admins},
    banners::{Banners, IncompleteBanner},
    error::AssistDbResult as Result,
    products::{ProductForm, Products},
    users::{UserForm, Users},
    workshops::{WorkshopForm, Workshops},
};
use diesel::prelude::*;
use serde::Deserialize;

/// Initial catalogue data. Each group is only written into a table that is still empty, so restarting the
/// server never duplicates rows.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct SeedBuilder {
    #[serde(default)]
    pub workshops: Vec<WorkshopForm>,
    #[serde(default)]
    pub products: Vec<ProductForm>,
    #[serde(default)]
    pub banners: Vec<IncompleteBanner>,
    #[serde(default)]
    pub user: Option<UserForm>,
    #[serde(default)]
    pub admin: Option<AdminForm>,
}

/// How many rows a seeding run inserted per table.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub workshops: usize,
    pub products: usize,
    pub banners: usize,
    pub users: usize,
    pub admins: usize,
}

impl SeedBuilder {
    pub fn build(self, conn: &mut SqliteConnection) -> Result<SeedReport> {
        conn.transaction(|conn| {
            let mut report = SeedReport::default();

            // Workshops go first so that products may refer to them
            if Workshops::count(conn)? == 0 {
                for w in self.workshops {
                    w.verify()?.create(conn)?;
                    report.workshops += 1;
                }
            }
            if Products::count(conn)? == 0 {
                for p in self.products {
                    p.verify(conn)?.create(conn)?;
                    report.products += 1;
                }
            }
            if Banners::count(conn)? == 0 {
                for b in &self.banners {
                    b.create(conn)?;
                    report.banners += 1;
                }
            }
            if let Some(user) = &self.user {
                if Users::count(conn)? == 0 {
                    user.create(conn)?;
                    report.users += 1;
                }
            }
            if let Some(admin) = &self.admin {
                if Admins::count(conn)? == 0 {
                    admin.create(conn)?;
                    report.admins += 1;
                }
            }
            Ok(report)
        })
    }
}
