use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Primary membership of a book for a user.
///
/// At most one row per (user_id, book_id). `kind` is one of:
/// - `owned`: placed on `bookshelf_id` (required)
/// - `unshelved`: registered but not on any shelf (`bookshelf_id` is NULL)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "library_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String, // UUID
    pub user_id: String,
    pub book_id: String,
    pub kind: String,
    pub bookshelf_id: Option<String>,
    pub reading_status: String,
    pub note: Option<String>,
    pub marathon_posted: bool,
    pub created_at: String,
    pub updated_at: String,
}

pub const KIND_OWNED: &str = "owned";
pub const KIND_UNSHELVED: &str = "unshelved";

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Book,
    #[sea_orm(
        belongs_to = "super::bookshelf::Entity",
        from = "Column::BookshelfId",
        to = "super::bookshelf::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Bookshelf,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl Related<super::bookshelf::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookshelf.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
