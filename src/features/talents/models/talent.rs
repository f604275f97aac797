use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use crate::features::files::models::FileSnapshot;

/// Database model for talent, joined with the recommender's username
#[derive(Debug, Clone, FromRow)]
pub struct Talent {
    pub id: Uuid,
    pub name: String,
    pub position: String,
    pub avatar: Option<Json<FileSnapshot>>,
    pub summary: String,
    pub skills: Vec<String>,
    pub work_experience: String,
    pub education: String,
    pub contact: String,
    pub status: String,
    pub recommended_by: Uuid,
    pub recommended_by_username: Option<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TalentStatus {
    #[default]
    #[serde(rename = "available")]
    Available,
    #[serde(rename = "not-available")]
    NotAvailable,
}

impl TalentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TalentStatus::Available => "available",
            TalentStatus::NotAvailable => "not-available",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "available" => Some(TalentStatus::Available),
            "not-available" => Some(TalentStatus::NotAvailable),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_uses_hyphenated_values() {
        let value = serde_json::to_value(TalentStatus::NotAvailable).unwrap();
        assert_eq!(value, "not-available");
        assert_eq!(TalentStatus::parse("not-available"), Some(TalentStatus::NotAvailable));
        assert_eq!(TalentStatus::parse("busy"), None);
    }
}
