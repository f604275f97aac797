use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for files
#[derive(Debug, Clone, FromRow)]
pub struct File {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub original_name: String,
    pub extension: String,
    pub size: i64,
    pub mime_type: String,
    /// Path relative to the storage root
    pub storage_path: String,
    pub url: String,
    pub source_type: String,
    pub related_entity_id: Option<Uuid>,
    pub source_title: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Why a file exists, and which content slot it fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FileSourceType {
    #[default]
    UserUpload,
    NewsCover,
    NewsContent,
    TalentAvatar,
    EmploymentCover,
    EmploymentContent,
}

impl FileSourceType {
    pub const ALL: [FileSourceType; 6] = [
        FileSourceType::UserUpload,
        FileSourceType::NewsCover,
        FileSourceType::NewsContent,
        FileSourceType::TalentAvatar,
        FileSourceType::EmploymentCover,
        FileSourceType::EmploymentContent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileSourceType::UserUpload => "user_upload",
            FileSourceType::NewsCover => "news_cover",
            FileSourceType::NewsContent => "news_content",
            FileSourceType::TalentAvatar => "talent_avatar",
            FileSourceType::EmploymentCover => "employment_cover",
            FileSourceType::EmploymentContent => "employment_content",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }

    /// Every type except a plain user upload is tied to a content entity
    pub fn belongs_to_entity(&self) -> bool {
        !matches!(self, FileSourceType::UserUpload)
    }
}

/// Provenance recorded with a file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileSource {
    #[serde(rename = "type")]
    pub kind: FileSourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_entity_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl FileSource {
    /// The related entity id is only kept for entity-bound source types
    pub fn new(kind: FileSourceType, related_entity_id: Option<Uuid>, title: Option<String>) -> Self {
        Self {
            kind,
            related_entity_id: related_entity_id.filter(|_| kind.belongs_to_entity()),
            title: title.filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn for_entity(kind: FileSourceType, entity_id: Uuid, title: &str) -> Self {
        Self::new(kind, Some(entity_id), Some(title.to_string()))
    }
}

impl File {
    pub fn source(&self) -> FileSource {
        FileSource {
            kind: FileSourceType::parse(&self.source_type).unwrap_or_default(),
            related_entity_id: self.related_entity_id,
            title: self.source_title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_type_round_trips_through_column_value() {
        for kind in FileSourceType::ALL {
            assert_eq!(FileSourceType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(FileSourceType::parse("avatar"), None);
    }

    #[test]
    fn test_user_upload_drops_related_entity() {
        let entity = Uuid::new_v4();

        let source = FileSource::new(FileSourceType::UserUpload, Some(entity), None);
        assert_eq!(source.related_entity_id, None);

        let source = FileSource::new(FileSourceType::NewsCover, Some(entity), Some(" ".into()));
        assert_eq!(source.related_entity_id, Some(entity));
        assert_eq!(source.title, None);
    }

    #[test]
    fn test_source_serializes_type_field() {
        let source = FileSource::for_entity(FileSourceType::TalentAvatar, Uuid::nil(), "Zhang San");
        let value = serde_json::to_value(&source).unwrap();
        assert_eq!(value["type"], "talent_avatar");
        assert_eq!(value["title"], "Zhang San");
    }
}
