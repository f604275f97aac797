use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::models::Category;

/// Name of a user attached to a category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUserDto {
    pub id: Uuid,
    pub username: Option<String>,
}

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub name: String,
    pub created_by: CategoryUserDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<CategoryUserDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            created_by: CategoryUserDto {
                id: c.created_by,
                username: c.created_by_username,
            },
            updated_by: c.updated_by.map(|id| CategoryUserDto {
                id,
                username: c.updated_by_username,
            }),
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Query params for listing categories
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCategoriesQuery {
    pub page: Option<i64>,
    #[serde(alias = "limit")]
    pub page_size: Option<i64>,
    /// Substring match on the name
    pub keyword: Option<String>,
}

/// Body for creating or renaming a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryPayloadDto {
    #[validate(length(min = 1, max = 50, message = "Category name must be 1-50 characters"))]
    pub name: String,
}

impl CategoryPayloadDto {
    pub fn trimmed_name(&self) -> String {
        self.name.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_updater_is_omitted_until_renamed() {
        let category = Category {
            id: Uuid::nil(),
            name: "Policy".to_string(),
            created_by: Uuid::from_u128(1),
            updated_by: None,
            created_by_username: Some("admin".to_string()),
            updated_by_username: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(CategoryResponseDto::from(category)).unwrap();
        assert_eq!(value["created_by"]["username"], "admin");
        assert!(value.get("updated_by").is_none());
    }

    #[test]
    fn test_payload_rejects_overlong_name() {
        let dto = CategoryPayloadDto {
            name: "x".repeat(51),
        };
        assert!(dto.validate().is_err());
        assert!(CategoryPayloadDto { name: "Jobs".into() }.validate().is_ok());
    }
}
