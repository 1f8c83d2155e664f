use crate::{error::AssistDbResult as Result, schema::banner_sliders};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

pub struct Banners;

impl Banners {
    /// Active slides in display order.
    pub fn list_active(conn: &mut SqliteConnection) -> Result<Vec<Banner>> {
        use crate::schema::banner_sliders::dsl::*;
        Ok(banner_sliders
            .filter(is_active.eq(true))
            .order((display_order.asc(), id.asc()))
            .load::<Banner>(conn)?)
    }

    pub fn count(conn: &mut SqliteConnection) -> Result<i64> {
        use crate::schema::banner_sliders::dsl::*;
        Ok(banner_sliders.count().get_result(conn)?)
    }
}

#[derive(Debug, Serialize, Queryable, Identifiable, Clone)]
#[diesel(table_name = banner_sliders)]
pub struct Banner {
    id: i32,
    title: String,
    subtitle: String,
    image: String,
    link_url: Option<String>,
    display_order: i32,
    is_active: bool,
}

impl Banner {
    pub fn get_title(&self) -> &str {
        &self.title
    }
}

#[derive(Debug, Serialize, Deserialize, Insertable, Clone)]
#[diesel(table_name = banner_sliders)]
pub struct IncompleteBanner {
    pub title: String,
    pub subtitle: String,
    pub image: String,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "active")]
    pub is_active: bool,
}

fn active() -> bool {
    true
}

impl IncompleteBanner {
    pub fn create(&self, conn: &mut SqliteConnection) -> Result<()> {
        diesel::insert_into(banner_sliders::table)
            .values(self)
            .execute(conn)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::establish_connection;

    fn banner(title: &str, order: i32, active: bool) -> IncompleteBanner {
        IncompleteBanner {
            title: title.to_string(),
            subtitle: "Promo".to_string(),
            image: "banner.jpg".to_string(),
            link_url: None,
            display_order: order,
            is_active: active,
        }
    }

    #[test]
    fn only_active_in_order() {
        let mut conn = establish_connection();
        banner("Second", 2, true).create(&mut conn).unwrap();
        banner("Hidden", 0, false).create(&mut conn).unwrap();
        banner("First", 1, true).create(&mut conn).unwrap();

        let titles: Vec<_> = Banners::list_active(&mut conn)
            .unwrap()
            .iter()
            .map(|b| b.get_title().to_string())
            .collect();
        assert_eq!(titles, vec!["First", "Second"]);
        assert_eq!(Banners::count(&mut conn).unwrap(), 3);
    }
}
