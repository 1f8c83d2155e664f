use crate::error::{AssistDbError, AssistDbResult as Result};
use diesel::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_SHORT_ATTEMPTS: usize = 32;

/// How transaction ids are minted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IdScheme {
    // `TX0042`, the format the mobile client displays. Collision-checked.
    Short,
    // `TX` followed by 32 upper-case hex digits of a v4 UUID.
    Long,
}

impl Default for IdScheme {
    fn default() -> Self {
        Self::Short
    }
}

pub fn short_candidate() -> String {
    format!("TX{:04}", rand::thread_rng().gen_range(0..=9999))
}

pub fn long_candidate() -> String {
    format!("TX{}", Uuid::new_v4().simple()).to_uppercase()
}

/// Mint an id not used by any ledger row yet. Call this inside the transaction doing the insert.
pub fn new_transaction_id(conn: &mut SqliteConnection, scheme: IdScheme) -> Result<String> {
    match scheme {
        IdScheme::Long => Ok(long_candidate()),
        IdScheme::Short => mint_checked(conn, MAX_SHORT_ATTEMPTS, short_candidate),
    }
}

fn mint_checked(
    conn: &mut SqliteConnection,
    attempts: usize,
    mut candidate: impl FnMut() -> String,
) -> Result<String> {
    use crate::schema::transactions::dsl::*;
    for _ in 0..attempts {
        let tx_id = candidate();
        let taken: i64 = transactions
            .filter(id.eq(&tx_id))
            .count()
            .get_result(conn)?;
        if taken == 0 {
            return Ok(tx_id);
        }
        log::debug!("transaction id {} already taken, retrying", tx_id);
    }
    Err(AssistDbError::IdSpaceExhausted(attempts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{enums::*, test_utils::establish_connection, transactions::TransactionInfo};

    #[test]
    fn id_formats() {
        for _ in 0..100 {
            let short = short_candidate();
            assert_eq!(short.len(), 6);
            assert!(short.starts_with("TX"));
            assert!(short[2..].chars().all(|c| c.is_ascii_digit()));
        }
        let long = long_candidate();
        assert_eq!(long.len(), 34);
        assert!(long.starts_with("TX"));
        assert_ne!(long, long_candidate());
    }

    #[test]
    fn retry_past_taken_ids() {
        let mut conn = establish_connection();
        TransactionInfo::new("TX0001", TransactionKind::Towing, "Towing", 50000, None)
            .insert(&mut conn)
            .unwrap();

        let mut seq = vec!["TX0002", "TX0001"];
        let minted = mint_checked(&mut conn, 5, || seq.pop().unwrap().to_string()).unwrap();
        assert_eq!(minted, "TX0002");

        // Every candidate is taken
        assert!(matches!(
            mint_checked(&mut conn, 3, || "TX0001".to_string()),
            Err(AssistDbError::IdSpaceExhausted(3))
        ));
    }
}
