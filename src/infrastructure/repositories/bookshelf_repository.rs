//! SeaORM implementation of BookshelfRepository

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::{Bookshelf, BookshelfDetail, BookshelfRepository, DomainError};
use crate::infrastructure::db::now_timestamp;
use crate::infrastructure::repositories::collection_repository::list_owned_books;
use crate::models::bookshelf::{self, ActiveModel, Column, Entity as BookshelfEntity};
use crate::models::library_entry::{self, Entity as LibraryEntryEntity, KIND_OWNED};

/// SeaORM-based implementation of BookshelfRepository
pub struct SeaOrmBookshelfRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookshelfRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Trimmed, non-empty shelf name
fn validate_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::Validation("Name is required".to_string()));
    }
    Ok(name.to_string())
}

fn clean_memo(memo: Option<String>) -> Option<String> {
    memo.map(|m| m.trim().to_string()).filter(|m| !m.is_empty())
}

/// Shelf row owned by `user_id`, or `None`
pub(crate) async fn find_owned_shelf<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
    id: &str,
) -> Result<Option<bookshelf::Model>, DomainError> {
    let shelf = BookshelfEntity::find()
        .filter(Column::Id.eq(id))
        .filter(Column::UserId.eq(user_id))
        .one(conn)
        .await?;
    Ok(shelf)
}

async fn count_owned<C: ConnectionTrait>(conn: &C, shelf_id: &str) -> Result<u64, DomainError> {
    let count = LibraryEntryEntity::find()
        .filter(library_entry::Column::BookshelfId.eq(shelf_id))
        .filter(library_entry::Column::Kind.eq(KIND_OWNED))
        .count(conn)
        .await?;
    Ok(count)
}

/// Owned-book count per shelf of one user, in a single grouped query
async fn count_owned_by_shelf<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
) -> Result<HashMap<String, u64>, DomainError> {
    let rows: Vec<(Option<String>, i64)> = LibraryEntryEntity::find()
        .select_only()
        .column(library_entry::Column::BookshelfId)
        .column_as(Expr::col(library_entry::Column::Id).count(), "owned_count")
        .filter(library_entry::Column::UserId.eq(user_id))
        .filter(library_entry::Column::Kind.eq(KIND_OWNED))
        .group_by(library_entry::Column::BookshelfId)
        .into_tuple()
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(shelf_id, count)| shelf_id.map(|id| (id, count.max(0) as u64)))
        .collect())
}

fn to_dto(model: bookshelf::Model, owned_book_count: u64) -> Bookshelf {
    Bookshelf {
        id: model.id,
        name: model.name,
        memo: model.memo,
        created_at: model.created_at,
        updated_at: model.updated_at,
        owned_book_count,
    }
}

#[async_trait]
impl BookshelfRepository for SeaOrmBookshelfRepository {
    async fn list(&self, user_id: &str) -> Result<Vec<Bookshelf>, DomainError> {
        let shelves = BookshelfEntity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await?;

        let counts = count_owned_by_shelf(&self.db, user_id).await?;

        Ok(shelves
            .into_iter()
            .map(|shelf| {
                let count = counts.get(&shelf.id).copied().unwrap_or(0);
                to_dto(shelf, count)
            })
            .collect())
    }

    async fn find(&self, user_id: &str, id: &str) -> Result<Option<BookshelfDetail>, DomainError> {
        let Some(shelf) = find_owned_shelf(&self.db, user_id, id).await? else {
            return Ok(None);
        };

        let owned_books = list_owned_books(&self.db, user_id, Some(id)).await?;

        Ok(Some(BookshelfDetail {
            bookshelf: to_dto(shelf, owned_books.len() as u64),
            owned_books,
        }))
    }

    async fn create(
        &self,
        user_id: &str,
        name: &str,
        memo: Option<String>,
    ) -> Result<Bookshelf, DomainError> {
        let name = validate_name(name)?;
        let now = now_timestamp();

        let new_shelf = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            user_id: Set(user_id.to_string()),
            name: Set(name),
            memo: Set(clean_memo(memo)),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let model = new_shelf.insert(&self.db).await?;
        tracing::info!("User {} created bookshelf {}", user_id, model.id);
        Ok(to_dto(model, 0))
    }

    async fn rename(
        &self,
        user_id: &str,
        id: &str,
        name: &str,
        memo: Option<String>,
    ) -> Result<Bookshelf, DomainError> {
        let name = validate_name(name)?;

        let existing = find_owned_shelf(&self.db, user_id, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Bookshelf"))?;

        let mut active: ActiveModel = existing.into();
        active.name = Set(name);
        active.memo = Set(clean_memo(memo));
        active.updated_at = Set(now_timestamp());

        let model = active.update(&self.db).await?;
        let count = count_owned(&self.db, &model.id).await?;
        Ok(to_dto(model, count))
    }

    async fn delete(&self, user_id: &str, id: &str) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        find_owned_shelf(&txn, user_id, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Bookshelf"))?;

        if count_owned(&txn, id).await? > 0 {
            return Err(DomainError::NonEmptyShelf);
        }

        // The RESTRICT foreign key backs up the count check against a
        // concurrent shelving.
        match BookshelfEntity::delete_by_id(id).exec(&txn).await {
            Ok(_) => {}
            Err(e) if matches!(e.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_))) => {
                return Err(DomainError::NonEmptyShelf);
            }
            Err(e) => return Err(e.into()),
        }

        txn.commit().await?;
        tracing::info!("User {} deleted bookshelf {}", user_id, id);
        Ok(())
    }
}
