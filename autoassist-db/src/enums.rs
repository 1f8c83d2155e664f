use diesel_derive_enum::DbEnum;
use rocket::FromFormField;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The service a ledger row bills for. Each kind owns exactly one detail table.
#[derive(DbEnum, FromFormField, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[DbValueStyle = "verbatim"]
pub enum TransactionKind {
    Shop,
    Towing,
    Quotation,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Shop => "Shop",
            Self::Towing => "Towing",
            Self::Quotation => "Quotation",
        };
        f.write_str(s)
    }
}

// Any status may be set by staff, there is no enforced transition graph.
#[derive(DbEnum, FromFormField, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    // Every transaction starts here
    Pending,
    Ongoing,
    Completed,
    Cancelled,
}

impl Default for TransactionStatus {
    fn default() -> Self {
        Self::Pending
    }
}

#[derive(DbEnum, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum QuoteType {
    Brief,
    Detailed,
}

impl Default for QuoteType {
    fn default() -> Self {
        Self::Brief
    }
}

impl QuoteType {
    /// Fixed price of the tier, in cents.
    pub fn price_cents(&self) -> i64 {
        match self {
            Self::Brief => 5_00,
            Self::Detailed => 15_00,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Brief => "Brief",
            Self::Detailed => "Detailed",
        }
    }

    /// Maximum length of the free-text description, in characters.
    pub fn description_limit(&self) -> usize {
        match self {
            Self::Brief => 100,
            Self::Detailed => 300,
        }
    }

    /// Maximum number of photos attached to a request.
    pub fn image_limit(&self) -> usize {
        match self {
            Self::Brief => 3,
            Self::Detailed => 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_statuses_use_client_spelling() {
        assert_eq!(serde_json::to_string(&TransactionKind::Shop).unwrap(), r#""Shop""#);
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Cancelled).unwrap(),
            r#""cancelled""#
        );
        assert_eq!(
            serde_json::from_str::<QuoteType>(r#""detailed""#).unwrap(),
            QuoteType::Detailed
        );
        assert!(serde_json::from_str::<TransactionStatus>(r#""done""#).is_err());
    }

    #[test]
    fn tiers_are_priced_server_side() {
        assert_eq!(QuoteType::default(), QuoteType::Brief);
        assert_eq!(QuoteType::Brief.price_cents(), 500);
        assert_eq!(QuoteType::Detailed.price_cents(), 1500);
        assert_eq!(QuoteType::Detailed.label(), "Detailed");
    }
}
