use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use crate::features::files::models::FileSnapshot;

/// Database model for employment articles, joined with the author's username
#[derive(Debug, Clone, FromRow)]
pub struct Employment {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub source: String,
    pub summary: String,
    pub cover: Option<Json<FileSnapshot>>,
    pub category: String,
    pub tag: String,
    pub author_id: Uuid,
    pub author_username: Option<String>,
    pub status: String,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentCategory {
    EmploymentNews,
    EmploymentPolicy,
}

impl EmploymentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentCategory::EmploymentNews => "employment_news",
            EmploymentCategory::EmploymentPolicy => "employment_policy",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "employment_news" => Some(EmploymentCategory::EmploymentNews),
            "employment_policy" => Some(EmploymentCategory::EmploymentPolicy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentTag {
    Important,
    Job,
    Startup,
    NationalPolicy,
    LocalPolicy,
}

impl EmploymentTag {
    pub const ALL: [EmploymentTag; 5] = [
        EmploymentTag::Important,
        EmploymentTag::Job,
        EmploymentTag::Startup,
        EmploymentTag::NationalPolicy,
        EmploymentTag::LocalPolicy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmploymentTag::Important => "important",
            EmploymentTag::Job => "job",
            EmploymentTag::Startup => "startup",
            EmploymentTag::NationalPolicy => "national_policy",
            EmploymentTag::LocalPolicy => "local_policy",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_match_column_values() {
        for tag in EmploymentTag::ALL {
            let value = serde_json::to_value(tag).unwrap();
            assert_eq!(value, tag.as_str());
            assert_eq!(EmploymentTag::parse(tag.as_str()), Some(tag));
        }
        assert_eq!(
            EmploymentCategory::parse("employment_policy"),
            Some(EmploymentCategory::EmploymentPolicy)
        );
        assert_eq!(EmploymentCategory::parse("news"), None);
    }
}
