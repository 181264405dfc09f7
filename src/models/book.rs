use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String, // UUID
    #[sea_orm(unique)]
    pub isbn: Option<String>,
    pub title: String,
    pub subtitle: Option<String>,
    pub authors: String, // JSON array
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub categories: Option<String>, // JSON array
    pub page_count: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::library_entry::Entity")]
    LibraryEntries,
    #[sea_orm(has_many = "super::wanted_book::Entity")]
    WantedBooks,
}

impl Related<super::library_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LibraryEntries.def()
    }
}

impl Related<super::wanted_book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WantedBooks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// DTO for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub isbn: Option<String>,
    pub title: String,
    pub subtitle: Option<String>,
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub categories: Vec<String>,
    pub page_count: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

/// Decode a JSON list column; malformed text reads as empty.
pub fn decode_list(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

pub fn encode_list(list: &[String]) -> String {
    serde_json::to_string(list).unwrap_or_else(|_| "[]".to_string())
}

impl From<Model> for Book {
    fn from(model: Model) -> Self {
        Self {
            authors: decode_list(Some(&model.authors)),
            categories: decode_list(model.categories.as_deref()),
            id: model.id,
            isbn: model.isbn,
            title: model.title,
            subtitle: model.subtitle,
            publisher: model.publisher,
            published_date: model.published_date,
            description: model.description,
            cover_image_url: model.cover_image_url,
            page_count: model.page_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_columns_decode() {
        assert_eq!(
            decode_list(Some(r#"["A","B"]"#)),
            vec!["A".to_string(), "B".to_string()]
        );
        assert!(decode_list(Some("not json")).is_empty());
        assert!(decode_list(None).is_empty());
        assert_eq!(encode_list(&["Kafka".to_string()]), r#"["Kafka"]"#);
    }
}
