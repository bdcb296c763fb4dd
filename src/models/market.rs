//! Marketplace contract records.
//!
//! Shapes follow the contract wire format: integers that do not fit a JS
//! number (ids, sequences, amounts, timestamps) travel as decimal strings.

use serde::{Deserialize, Serialize};

/// Serde adapter for integers carried as decimal strings.
pub mod decimal {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<T: Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(d: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        let text = match Raw::deserialize(d)? {
            Raw::Text(s) => s,
            Raw::Number(n) => n.to_string(),
        };
        text.trim().parse().map_err(de::Error::custom)
    }
}

/// Project location as stored by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketLocation {
    #[serde(with = "decimal")]
    pub latitude: i128,
    #[serde(with = "decimal")]
    pub longitude: i128,
    pub country: String,
    pub province: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketMilestone {
    pub title: String,
    pub description: String,
    #[serde(with = "decimal")]
    pub amount_budget: i128,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketUpdate {
    pub title: String,
    pub body: String,
    #[serde(with = "decimal")]
    pub timestamp: i128,
}

/// A project registered in the marketplace ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketProject {
    #[serde(with = "decimal")]
    pub id: u64,
    pub owner: String,
    pub name: String,
    #[serde(with = "decimal")]
    pub deadline_ts: i128,
    #[serde(with = "decimal")]
    pub current_amount: i128,
    #[serde(with = "decimal")]
    pub target_amount: i128,
    pub problem_statement: String,
    pub impact_area: String,
    pub location: MarketLocation,
    pub milestones: Vec<MarketMilestone>,
    pub updates: Vec<MarketUpdate>,
}

impl MarketProject {
    /// Funding progress in basis points, 0 for a zero target.
    ///
    /// Totals too large to scale first are divided first instead, which only
    /// loses precision below one percent of a basis point.
    pub fn percent_bp(&self) -> i128 {
        if self.target_amount <= 0 {
            return 0;
        }
        match self.current_amount.checked_mul(10_000) {
            Some(scaled) => scaled / self.target_amount,
            None => (self.current_amount / self.target_amount).saturating_mul(10_000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDonation {
    #[serde(with = "decimal")]
    pub seq: u64,
    #[serde(with = "decimal")]
    pub project_id: u64,
    pub donor: String,
    #[serde(with = "decimal")]
    pub amount: i128,
    #[serde(with = "decimal")]
    pub timestamp: i128,
}

/// Aggregates for a project dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketStats {
    #[serde(with = "decimal")]
    pub current_amount: i128,
    #[serde(with = "decimal")]
    pub target_amount: i128,
    #[serde(with = "decimal")]
    pub percent_bp: i128,
    #[serde(with = "decimal")]
    pub donations_count: u64,
    pub milestones_completed: u32,
    pub milestones_total: u32,
    #[serde(with = "decimal")]
    pub last_update_ts: i128,
}

/// `get_summary` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketSummary {
    pub name: String,
    #[serde(with = "decimal")]
    pub current_amount: i128,
    #[serde(with = "decimal")]
    pub target_amount: i128,
    #[serde(with = "decimal")]
    pub percent_bp: i128,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectRequest {
    pub owner: String,
    pub name: String,
    #[serde(with = "decimal")]
    pub deadline_ts: i128,
    #[serde(with = "decimal")]
    pub target_amount: i128,
    pub problem_statement: String,
    pub impact_area: String,
    pub location: MarketLocation,
    #[serde(default)]
    pub milestones: Vec<MarketMilestone>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DonateRequest {
    pub donor: String,
    #[serde(with = "decimal")]
    pub amount: i128,
    #[serde(with = "decimal")]
    pub timestamp: i128,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddUpdateRequest {
    pub owner: String,
    pub title: String,
    pub body: String,
    #[serde(with = "decimal")]
    pub timestamp: i128,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwnerRequest {
    pub owner: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetImpactRequest {
    pub owner: String,
    #[serde(with = "decimal")]
    pub impacted_people: i128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amounts_accept_strings_and_numbers() {
        let req: DonateRequest = serde_json::from_str(
            r#"{"donor":"GABC","amount":"2500","timestamp":1726000000}"#,
        )
        .unwrap();
        assert_eq!(req.amount, 2500);
        assert_eq!(req.timestamp, 1_726_000_000);
    }

    #[test]
    fn test_amounts_serialize_as_strings() {
        let donation = MarketDonation {
            seq: 1,
            project_id: 7,
            donor: "GABC".to_string(),
            amount: 170_141_183_460_469_231_731_687_303_715_884_105_727,
            timestamp: 0,
        };
        let json = serde_json::to_value(&donation).unwrap();
        assert_eq!(json["seq"], "1");
        assert_eq!(json["amount"], "170141183460469231731687303715884105727");
    }

    fn project(current_amount: i128, target_amount: i128) -> MarketProject {
        MarketProject {
            id: 1,
            owner: "G".into(),
            name: "x".into(),
            deadline_ts: 0,
            current_amount,
            target_amount,
            problem_statement: String::new(),
            impact_area: String::new(),
            location: MarketLocation {
                latitude: 0,
                longitude: 0,
                country: "AR".into(),
                province: String::new(),
                city: String::new(),
            },
            milestones: vec![],
            updates: vec![],
        }
    }

    #[test]
    fn test_percent_bp_zero_target() {
        assert_eq!(project(10, 0).percent_bp(), 0);
    }

    #[test]
    fn test_percent_bp_huge_totals_do_not_overflow() {
        assert_eq!(project(50, 100).percent_bp(), 5_000);
        assert_eq!(
            project(10i128.pow(35), 100).percent_bp(),
            10i128.pow(37)
        );
        assert_eq!(project(i128::MAX, 1).percent_bp(), i128::MAX);
    }
}
