use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub value: f64,
    /// Estimated close probability, 0-100
    pub probability: i32,
    pub stage: String,
    pub contact_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pipeline position of a deal, stored as text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealStage {
    Lead,
    Qualified,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

impl DealStage {
    pub const ALL: [DealStage; 6] = [
        DealStage::Lead,
        DealStage::Qualified,
        DealStage::Proposal,
        DealStage::Negotiation,
        DealStage::ClosedWon,
        DealStage::ClosedLost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DealStage::Lead => "lead",
            DealStage::Qualified => "qualified",
            DealStage::Proposal => "proposal",
            DealStage::Negotiation => "negotiation",
            DealStage::ClosedWon => "closed_won",
            DealStage::ClosedLost => "closed_lost",
        }
    }

    pub fn parse(s: &str) -> Option<DealStage> {
        DealStage::ALL.into_iter().find(|stage| stage.as_str() == s)
    }

    /// Closed deals no longer count toward the active pipeline
    pub fn is_closed(&self) -> bool {
        matches!(self, DealStage::ClosedWon | DealStage::ClosedLost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_round_trips_through_text() {
        for stage in DealStage::ALL {
            assert_eq!(DealStage::parse(stage.as_str()), Some(stage));
        }
        assert_eq!(DealStage::parse("won"), None);
    }

    #[test]
    fn only_terminal_stages_are_closed() {
        assert!(DealStage::ClosedWon.is_closed());
        assert!(DealStage::ClosedLost.is_closed());
        assert!(!DealStage::Negotiation.is_closed());
        assert!(!DealStage::Lead.is_closed());
    }
}
