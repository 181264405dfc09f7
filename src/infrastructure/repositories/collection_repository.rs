//! SeaORM implementation of CollectionRepository
//!
//! Each transition opens one transaction, loads the (user, book) state through
//! it, asks the domain planner for the move and applies every write before
//! committing. Nothing inside a transition touches `self.db` directly.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::{
    CollectionRepository, CollectionState, DomainError, NewEntry, OwnedBook, OwnedRemoval,
    PrimaryState, PurchaseOutcome, PurchasePlan, PurchaseResult, ReadingStatus, ShelfRef,
    UnshelvedBook, UpdateOwnedInput, WantedAdded, WantedBook, WantedPlan, WantedState,
};
use crate::infrastructure::db::now_timestamp;
use crate::infrastructure::repositories::bookshelf_repository::find_owned_shelf;
use crate::models::Book;
use crate::models::book::{self, Entity as BookEntity};
use crate::models::bookshelf::{self, Entity as BookshelfEntity};
use crate::models::library_entry::{
    self, Entity as LibraryEntryEntity, KIND_OWNED, KIND_UNSHELVED,
};
use crate::models::wanted_book::{self, Entity as WantedEntity};

/// SeaORM-based implementation of CollectionRepository
pub struct SeaOrmCollectionRepository {
    db: DatabaseConnection,
}

impl SeaOrmCollectionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn status_of(entry: &library_entry::Model) -> ReadingStatus {
    entry.reading_status.parse().unwrap_or_default()
}

fn owned_dto(
    entry: library_entry::Model,
    book: Option<book::Model>,
    shelf: Option<ShelfRef>,
) -> OwnedBook {
    OwnedBook {
        reading_status: status_of(&entry),
        id: entry.id,
        book_id: entry.book_id,
        bookshelf_id: entry.bookshelf_id.unwrap_or_default(),
        note: entry.note,
        marathon_posted: entry.marathon_posted,
        created_at: entry.created_at,
        updated_at: entry.updated_at,
        book: book.map(Book::from),
        bookshelf: shelf,
    }
}

fn unshelved_dto(entry: library_entry::Model, book: Option<book::Model>) -> UnshelvedBook {
    UnshelvedBook {
        reading_status: status_of(&entry),
        id: entry.id,
        book_id: entry.book_id,
        note: entry.note,
        created_at: entry.created_at,
        updated_at: entry.updated_at,
        book: book.map(Book::from),
    }
}

fn wanted_dto(wanted: wanted_book::Model, book: Option<book::Model>) -> WantedBook {
    WantedBook {
        id: wanted.id,
        book_id: wanted.book_id,
        is_active: wanted.is_active,
        created_at: wanted.created_at,
        updated_at: wanted.updated_at,
        book: book.map(Book::from),
    }
}

fn shelf_ref(shelf: &bookshelf::Model) -> ShelfRef {
    ShelfRef {
        id: shelf.id.clone(),
        name: shelf.name.clone(),
    }
}

async fn require_book<C: ConnectionTrait>(
    conn: &C,
    book_id: &str,
) -> Result<book::Model, DomainError> {
    BookEntity::find_by_id(book_id)
        .one(conn)
        .await?
        .ok_or_else(|| DomainError::not_found("Book"))
}

async fn require_shelf<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
    bookshelf_id: &str,
) -> Result<bookshelf::Model, DomainError> {
    find_owned_shelf(conn, user_id, bookshelf_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Bookshelf"))
}

/// Entry of the given kind, scoped to the user
async fn find_entry<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
    id: &str,
    kind: &str,
) -> Result<Option<library_entry::Model>, DomainError> {
    let entry = LibraryEntryEntity::find()
        .filter(library_entry::Column::Id.eq(id))
        .filter(library_entry::Column::UserId.eq(user_id))
        .filter(library_entry::Column::Kind.eq(kind))
        .one(conn)
        .await?;
    Ok(entry)
}

async fn find_wanted_row<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
    id: &str,
) -> Result<Option<wanted_book::Model>, DomainError> {
    let wanted = WantedEntity::find()
        .filter(wanted_book::Column::Id.eq(id))
        .filter(wanted_book::Column::UserId.eq(user_id))
        .one(conn)
        .await?;
    Ok(wanted)
}

async fn load_state<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
    book_id: &str,
) -> Result<CollectionState, DomainError> {
    let entry = LibraryEntryEntity::find()
        .filter(library_entry::Column::UserId.eq(user_id))
        .filter(library_entry::Column::BookId.eq(book_id))
        .one(conn)
        .await?;

    let wanted = WantedEntity::find()
        .filter(wanted_book::Column::UserId.eq(user_id))
        .filter(wanted_book::Column::BookId.eq(book_id))
        .one(conn)
        .await?;

    let primary = match entry {
        None => PrimaryState::None,
        Some(e) if e.kind == KIND_OWNED => PrimaryState::Owned { entry_id: e.id },
        Some(e) => PrimaryState::Unshelved { entry_id: e.id },
    };

    let wanted = match wanted {
        None => WantedState::Absent,
        Some(w) if w.is_active => WantedState::Active { wanted_id: w.id },
        Some(w) => WantedState::Inactive { wanted_id: w.id },
    };

    Ok(CollectionState { primary, wanted })
}

async fn insert_entry<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
    book_id: &str,
    bookshelf_id: Option<&str>,
    entry: NewEntry,
) -> Result<library_entry::Model, DomainError> {
    let now = now_timestamp();
    let kind = if bookshelf_id.is_some() {
        KIND_OWNED
    } else {
        KIND_UNSHELVED
    };

    let model = library_entry::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        user_id: Set(user_id.to_string()),
        book_id: Set(book_id.to_string()),
        kind: Set(kind.to_string()),
        bookshelf_id: Set(bookshelf_id.map(str::to_string)),
        reading_status: Set(entry.reading_status.as_str().to_string()),
        note: Set(entry.note),
        marathon_posted: Set(false),
        created_at: Set(now.clone()),
        updated_at: Set(now),
    };

    Ok(model.insert(conn).await?)
}

async fn deactivate_wanted<C: ConnectionTrait>(conn: &C, wanted_id: &str) -> Result<(), DomainError> {
    WantedEntity::update_many()
        .col_expr(wanted_book::Column::IsActive, Expr::value(false))
        .col_expr(wanted_book::Column::UpdatedAt, Expr::value(now_timestamp()))
        .filter(wanted_book::Column::Id.eq(wanted_id))
        .exec(conn)
        .await?;
    Ok(())
}

fn carried_over(entry: &library_entry::Model) -> NewEntry {
    NewEntry {
        reading_status: status_of(entry),
        note: entry.note.clone(),
    }
}

/// Owned rows of a user, newest first, optionally limited to one shelf
pub(crate) async fn list_owned_books<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
    bookshelf_id: Option<&str>,
) -> Result<Vec<OwnedBook>, DomainError> {
    let mut query = LibraryEntryEntity::find()
        .filter(library_entry::Column::UserId.eq(user_id))
        .filter(library_entry::Column::Kind.eq(KIND_OWNED));

    if let Some(shelf_id) = bookshelf_id
        && !shelf_id.is_empty()
    {
        query = query.filter(library_entry::Column::BookshelfId.eq(shelf_id));
    }

    let entries = query
        .order_by_desc(library_entry::Column::CreatedAt)
        .find_also_related(BookEntity)
        .all(conn)
        .await?;

    let shelves: HashMap<String, ShelfRef> = BookshelfEntity::find()
        .filter(bookshelf::Column::UserId.eq(user_id))
        .all(conn)
        .await?
        .iter()
        .map(|s| (s.id.clone(), shelf_ref(s)))
        .collect();

    Ok(entries
        .into_iter()
        .map(|(entry, book)| {
            let shelf = entry
                .bookshelf_id
                .as_ref()
                .and_then(|id| shelves.get(id))
                .cloned();
            owned_dto(entry, book, shelf)
        })
        .collect())
}

#[async_trait]
impl CollectionRepository for SeaOrmCollectionRepository {
    async fn add_to_unshelved(
        &self,
        user_id: &str,
        book_id: &str,
        entry: NewEntry,
    ) -> Result<UnshelvedBook, DomainError> {
        let txn = self.db.begin().await?;

        let book = require_book(&txn, book_id).await?;
        load_state(&txn, user_id, book_id)
            .await?
            .plan_add_primary()?;

        let model = insert_entry(&txn, user_id, book_id, None, entry).await?;
        txn.commit().await?;

        tracing::info!("User {} added book {} to unshelved", user_id, book_id);
        Ok(unshelved_dto(model, Some(book)))
    }

    async fn add_to_owned(
        &self,
        user_id: &str,
        book_id: &str,
        bookshelf_id: &str,
        entry: NewEntry,
    ) -> Result<OwnedBook, DomainError> {
        let txn = self.db.begin().await?;

        let book = require_book(&txn, book_id).await?;
        let shelf = require_shelf(&txn, user_id, bookshelf_id).await?;
        load_state(&txn, user_id, book_id)
            .await?
            .plan_add_primary()?;

        let model = insert_entry(&txn, user_id, book_id, Some(&shelf.id), entry).await?;
        txn.commit().await?;

        tracing::info!(
            "User {} shelved book {} on {}",
            user_id,
            book_id,
            bookshelf_id
        );
        Ok(owned_dto(model, Some(book), Some(shelf_ref(&shelf))))
    }

    async fn add_to_wanted(
        &self,
        user_id: &str,
        book_id: &str,
    ) -> Result<WantedAdded, DomainError> {
        let txn = self.db.begin().await?;

        let book = require_book(&txn, book_id).await?;
        let plan = load_state(&txn, user_id, book_id)
            .await?
            .plan_add_to_wanted()?;

        let now = now_timestamp();
        let (model, created) = match plan {
            WantedPlan::Insert => {
                let model = wanted_book::ActiveModel {
                    id: Set(Uuid::new_v4().to_string()),
                    user_id: Set(user_id.to_string()),
                    book_id: Set(book_id.to_string()),
                    is_active: Set(true),
                    created_at: Set(now.clone()),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await?;
                (model, true)
            }
            WantedPlan::Reactivate { wanted_id } => {
                let existing = WantedEntity::find_by_id(wanted_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| DomainError::not_found("Wanted book"))?;
                let mut active: wanted_book::ActiveModel = existing.into();
                active.is_active = Set(true);
                active.updated_at = Set(now);
                (active.update(&txn).await?, false)
            }
        };

        txn.commit().await?;

        tracing::info!(
            "User {} wants book {} ({})",
            user_id,
            book_id,
            if created { "new" } else { "reactivated" }
        );
        Ok(WantedAdded {
            wanted: wanted_dto(model, Some(book)),
            created,
        })
    }

    async fn move_unshelved_to_owned(
        &self,
        user_id: &str,
        unshelved_id: &str,
        bookshelf_id: &str,
        reading_status: Option<ReadingStatus>,
    ) -> Result<OwnedBook, DomainError> {
        let txn = self.db.begin().await?;

        let entry = find_entry(&txn, user_id, unshelved_id, KIND_UNSHELVED)
            .await?
            .ok_or_else(|| DomainError::not_found("Unshelved book"))?;
        let shelf = require_shelf(&txn, user_id, bookshelf_id).await?;
        load_state(&txn, user_id, &entry.book_id)
            .await?
            .plan_shelve(&entry.id)?;

        let mut carried = carried_over(&entry);
        if let Some(status) = reading_status {
            carried.reading_status = status;
        }

        LibraryEntryEntity::delete_by_id(entry.id.clone())
            .exec(&txn)
            .await?;
        let model = insert_entry(&txn, user_id, &entry.book_id, Some(&shelf.id), carried).await?;
        let book = BookEntity::find_by_id(entry.book_id.clone()).one(&txn).await?;

        txn.commit().await?;

        tracing::info!(
            "User {} moved book {} from unshelved to {}",
            user_id,
            entry.book_id,
            shelf.id
        );
        Ok(owned_dto(model, book, Some(shelf_ref(&shelf))))
    }

    async fn move_owned_to_unshelved(
        &self,
        user_id: &str,
        owned_id: &str,
    ) -> Result<UnshelvedBook, DomainError> {
        let txn = self.db.begin().await?;

        let entry = find_entry(&txn, user_id, owned_id, KIND_OWNED)
            .await?
            .ok_or_else(|| DomainError::not_found("Owned book"))?;
        load_state(&txn, user_id, &entry.book_id)
            .await?
            .plan_unshelve(&entry.id)?;

        LibraryEntryEntity::delete_by_id(entry.id.clone())
            .exec(&txn)
            .await?;
        let model = insert_entry(&txn, user_id, &entry.book_id, None, carried_over(&entry)).await?;
        let book = BookEntity::find_by_id(entry.book_id.clone()).one(&txn).await?;

        txn.commit().await?;

        tracing::info!(
            "User {} moved book {} off its shelf",
            user_id,
            entry.book_id
        );
        Ok(unshelved_dto(model, book))
    }

    async fn purchase_wanted(
        &self,
        user_id: &str,
        wanted_id: &str,
        bookshelf_id: Option<&str>,
    ) -> Result<PurchaseResult, DomainError> {
        let txn = self.db.begin().await?;

        let wanted = find_wanted_row(&txn, user_id, wanted_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Wanted book"))?;
        let plan = load_state(&txn, user_id, &wanted.book_id)
            .await?
            .plan_purchase(&wanted.id, bookshelf_id.is_some())?;

        let result = match plan {
            PurchasePlan::AlreadyOwned => PurchaseResult {
                outcome: PurchaseOutcome::AlreadyOwned,
                owned_book: None,
                unshelved_book: None,
            },
            PurchasePlan::AlreadyUnshelved => PurchaseResult {
                outcome: PurchaseOutcome::AlreadyUnshelved,
                owned_book: None,
                unshelved_book: None,
            },
            PurchasePlan::CreateOwned => {
                let shelf_id = bookshelf_id.unwrap_or_default();
                let shelf = require_shelf(&txn, user_id, shelf_id).await?;
                let model = insert_entry(
                    &txn,
                    user_id,
                    &wanted.book_id,
                    Some(&shelf.id),
                    NewEntry::default(),
                )
                .await?;
                let book = BookEntity::find_by_id(wanted.book_id.clone()).one(&txn).await?;
                PurchaseResult {
                    outcome: PurchaseOutcome::AddedToShelf,
                    owned_book: Some(owned_dto(model, book, Some(shelf_ref(&shelf)))),
                    unshelved_book: None,
                }
            }
            PurchasePlan::CreateUnshelved => {
                let model =
                    insert_entry(&txn, user_id, &wanted.book_id, None, NewEntry::default())
                        .await?;
                let book = BookEntity::find_by_id(wanted.book_id.clone()).one(&txn).await?;
                PurchaseResult {
                    outcome: PurchaseOutcome::AddedToUnshelved,
                    owned_book: None,
                    unshelved_book: Some(unshelved_dto(model, book)),
                }
            }
        };

        deactivate_wanted(&txn, &wanted.id).await?;
        txn.commit().await?;

        if result.outcome.already_present() {
            tracing::info!(
                "User {} already had wanted book {} ({:?}), wanted entry closed",
                user_id,
                wanted.book_id,
                result.outcome
            );
        } else {
            tracing::info!(
                "User {} purchased wanted book {}: {:?}",
                user_id,
                wanted.book_id,
                result.outcome
            );
        }
        Ok(result)
    }

    async fn remove_from_wanted(&self, user_id: &str, wanted_id: &str) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        let wanted = find_wanted_row(&txn, user_id, wanted_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Wanted book"))?;
        deactivate_wanted(&txn, &wanted.id).await?;

        txn.commit().await?;
        tracing::info!("User {} removed book {} from wanted", user_id, wanted.book_id);
        Ok(())
    }

    async fn remove_from_unshelved(
        &self,
        user_id: &str,
        unshelved_id: &str,
    ) -> Result<(), DomainError> {
        let result = LibraryEntryEntity::delete_many()
            .filter(library_entry::Column::Id.eq(unshelved_id))
            .filter(library_entry::Column::UserId.eq(user_id))
            .filter(library_entry::Column::Kind.eq(KIND_UNSHELVED))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Unshelved book"));
        }

        tracing::info!("User {} deleted unshelved entry {}", user_id, unshelved_id);
        Ok(())
    }

    async fn remove_from_owned(
        &self,
        user_id: &str,
        owned_id: &str,
        mode: OwnedRemoval,
    ) -> Result<(), DomainError> {
        match mode {
            OwnedRemoval::Detach => {
                let result = LibraryEntryEntity::delete_many()
                    .filter(library_entry::Column::Id.eq(owned_id))
                    .filter(library_entry::Column::UserId.eq(user_id))
                    .filter(library_entry::Column::Kind.eq(KIND_OWNED))
                    .exec(&self.db)
                    .await?;

                if result.rows_affected == 0 {
                    return Err(DomainError::not_found("Owned book"));
                }
                tracing::info!("User {} removed owned entry {}", user_id, owned_id);
            }
            OwnedRemoval::ToUnshelved => {
                self.move_owned_to_unshelved(user_id, owned_id).await?;
            }
            OwnedRemoval::PurgeAll => {
                let txn = self.db.begin().await?;

                let entry = find_entry(&txn, user_id, owned_id, KIND_OWNED)
                    .await?
                    .ok_or_else(|| DomainError::not_found("Owned book"))?;

                LibraryEntryEntity::delete_many()
                    .filter(library_entry::Column::UserId.eq(user_id))
                    .filter(library_entry::Column::BookId.eq(entry.book_id.as_str()))
                    .exec(&txn)
                    .await?;
                WantedEntity::delete_many()
                    .filter(wanted_book::Column::UserId.eq(user_id))
                    .filter(wanted_book::Column::BookId.eq(entry.book_id.as_str()))
                    .exec(&txn)
                    .await?;

                txn.commit().await?;
                tracing::info!(
                    "User {} purged book {} from all collections",
                    user_id,
                    entry.book_id
                );
            }
        }
        Ok(())
    }

    async fn update_owned(
        &self,
        user_id: &str,
        owned_id: &str,
        input: UpdateOwnedInput,
    ) -> Result<OwnedBook, DomainError> {
        let txn = self.db.begin().await?;

        let entry = find_entry(&txn, user_id, owned_id, KIND_OWNED)
            .await?
            .ok_or_else(|| DomainError::not_found("Owned book"))?;

        let target_shelf = match &input.bookshelf_id {
            Some(id) if Some(id) != entry.bookshelf_id.as_ref() => {
                Some(require_shelf(&txn, user_id, id).await?)
            }
            _ => None,
        };

        let note = input.normalized_note();
        let mut active: library_entry::ActiveModel = entry.into();
        if let Some(shelf) = &target_shelf {
            active.bookshelf_id = Set(Some(shelf.id.clone()));
        }
        if let Some(status) = input.reading_status {
            active.reading_status = Set(status.as_str().to_string());
        }
        if let Some(note) = note {
            active.note = Set(note);
        }
        if let Some(posted) = input.marathon_posted {
            active.marathon_posted = Set(posted);
        }
        active.updated_at = Set(now_timestamp());

        let model = active.update(&txn).await?;
        let book = BookEntity::find_by_id(model.book_id.clone()).one(&txn).await?;
        let shelf = match target_shelf {
            Some(shelf) => Some(shelf),
            None => match &model.bookshelf_id {
                Some(id) => BookshelfEntity::find_by_id(id.clone()).one(&txn).await?,
                None => None,
            },
        };

        txn.commit().await?;

        tracing::info!("User {} updated owned entry {}", user_id, owned_id);
        Ok(owned_dto(model, book, shelf.as_ref().map(shelf_ref)))
    }

    async fn list_owned(
        &self,
        user_id: &str,
        bookshelf_id: Option<&str>,
    ) -> Result<Vec<OwnedBook>, DomainError> {
        list_owned_books(&self.db, user_id, bookshelf_id).await
    }

    async fn find_owned(&self, user_id: &str, id: &str) -> Result<Option<OwnedBook>, DomainError> {
        let Some((entry, book)) = LibraryEntryEntity::find()
            .filter(library_entry::Column::Id.eq(id))
            .filter(library_entry::Column::UserId.eq(user_id))
            .filter(library_entry::Column::Kind.eq(KIND_OWNED))
            .find_also_related(BookEntity)
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let shelf = match &entry.bookshelf_id {
            Some(shelf_id) => find_owned_shelf(&self.db, user_id, shelf_id).await?,
            None => None,
        };

        Ok(Some(owned_dto(entry, book, shelf.as_ref().map(shelf_ref))))
    }

    async fn list_unshelved(&self, user_id: &str) -> Result<Vec<UnshelvedBook>, DomainError> {
        let entries = LibraryEntryEntity::find()
            .filter(library_entry::Column::UserId.eq(user_id))
            .filter(library_entry::Column::Kind.eq(KIND_UNSHELVED))
            .order_by_desc(library_entry::Column::CreatedAt)
            .find_also_related(BookEntity)
            .all(&self.db)
            .await?;

        Ok(entries
            .into_iter()
            .map(|(entry, book)| unshelved_dto(entry, book))
            .collect())
    }

    async fn find_unshelved(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<Option<UnshelvedBook>, DomainError> {
        let entry = LibraryEntryEntity::find()
            .filter(library_entry::Column::Id.eq(id))
            .filter(library_entry::Column::UserId.eq(user_id))
            .filter(library_entry::Column::Kind.eq(KIND_UNSHELVED))
            .find_also_related(BookEntity)
            .one(&self.db)
            .await?;

        Ok(entry.map(|(entry, book)| unshelved_dto(entry, book)))
    }

    async fn list_wanted(&self, user_id: &str) -> Result<Vec<WantedBook>, DomainError> {
        let rows = WantedEntity::find()
            .filter(wanted_book::Column::UserId.eq(user_id))
            .filter(wanted_book::Column::IsActive.eq(true))
            .order_by_desc(wanted_book::Column::CreatedAt)
            .find_also_related(BookEntity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(wanted, book)| wanted_dto(wanted, book))
            .collect())
    }

    async fn find_wanted(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<Option<WantedBook>, DomainError> {
        let row = WantedEntity::find()
            .filter(wanted_book::Column::Id.eq(id))
            .filter(wanted_book::Column::UserId.eq(user_id))
            .find_also_related(BookEntity)
            .one(&self.db)
            .await?;

        Ok(row.map(|(wanted, book)| wanted_dto(wanted, book)))
    }
}
