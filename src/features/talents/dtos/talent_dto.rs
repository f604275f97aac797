use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::features::files::models::FileSnapshot;
use crate::features::talents::models::{Talent, TalentStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommenderDto {
    pub id: Uuid,
    pub username: Option<String>,
}

/// Response DTO for talent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TalentResponseDto {
    pub id: Uuid,
    pub name: String,
    pub position: String,
    pub avatar: Option<FileSnapshot>,
    pub summary: String,
    pub skills: Vec<String>,
    pub work_experience: String,
    pub education: String,
    pub contact: String,
    pub status: TalentStatus,
    pub recommended_by: RecommenderDto,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Talent> for TalentResponseDto {
    fn from(t: Talent) -> Self {
        Self {
            id: t.id,
            name: t.name,
            position: t.position,
            avatar: t.avatar.map(|a| a.0),
            summary: t.summary,
            skills: t.skills,
            work_experience: t.work_experience,
            education: t.education,
            contact: t.contact,
            status: TalentStatus::parse(&t.status).unwrap_or_default(),
            recommended_by: RecommenderDto {
                id: t.recommended_by,
                username: t.recommended_by_username,
            },
            featured: t.featured,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Query params for listing talents
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTalentsQuery {
    pub page: Option<i64>,
    #[serde(alias = "limit")]
    pub page_size: Option<i64>,
    /// Comma separated; a talent matches when it has any of them
    pub skills: Option<String>,
    pub status: Option<TalentStatus>,
    /// `true` restricts to featured talents
    pub featured: Option<bool>,
    /// Substring match on name, position and summary
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTalentDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "Position must be 1-100 characters"))]
    pub position: String,

    #[validate(length(min = 1, message = "Summary is required"))]
    pub summary: String,

    #[serde(default)]
    pub skills: Vec<String>,

    #[validate(length(min = 1, message = "Work experience is required"))]
    pub work_experience: String,

    #[validate(length(min = 1, message = "Education is required"))]
    pub education: String,

    #[validate(length(min = 1, message = "Contact is required"))]
    pub contact: String,

    #[serde(default)]
    pub status: TalentStatus,

    /// Ignored unless the caller is an admin
    #[serde(default)]
    pub featured: bool,

    pub avatar_file_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTalentDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Position must be 1-100 characters"))]
    pub position: Option<String>,

    #[validate(length(min = 1, message = "Summary is required"))]
    pub summary: Option<String>,

    pub skills: Option<Vec<String>>,

    #[validate(length(min = 1, message = "Work experience is required"))]
    pub work_experience: Option<String>,

    #[validate(length(min = 1, message = "Education is required"))]
    pub education: Option<String>,

    #[validate(length(min = 1, message = "Contact is required"))]
    pub contact: Option<String>,

    pub status: Option<TalentStatus>,

    /// Ignored unless the caller is an admin
    pub featured: Option<bool>,

    pub avatar_file_id: Option<Uuid>,

    #[serde(default)]
    pub clear_avatar: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetFeaturedDto {
    pub featured: bool,
}

/// Trim skills, dropping blanks and duplicates while keeping order
pub fn normalize_skills(skills: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        let skill = skill.trim();
        if !skill.is_empty() && !normalized.iter().any(|s| s == skill) {
            normalized.push(skill.to_string());
        }
    }
    normalized
}
