//! SeaORM implementation of BookRepository

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::domain::{BookRepository, CreateBookInput, DomainError, RegisteredBook};
use crate::infrastructure::db::now_timestamp;
use crate::models::Book;
use crate::models::book::{ActiveModel, Column, Entity as BookEntity, encode_list};

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn active_model(input: CreateBookInput) -> ActiveModel {
    let now = now_timestamp();
    ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        isbn: Set(input.isbn),
        title: Set(input.title),
        subtitle: Set(input.subtitle),
        authors: Set(encode_list(&input.authors)),
        publisher: Set(input.publisher),
        published_date: Set(input.published_date),
        description: Set(input.description),
        cover_image_url: Set(input.cover_image_url),
        categories: Set(if input.categories.is_empty() {
            None
        } else {
            Some(encode_list(&input.categories))
        }),
        page_count: Set(input.page_count),
        created_at: Set(now.clone()),
        updated_at: Set(now),
    }
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, DomainError> {
        let model = BookEntity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Book::from))
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>, DomainError> {
        let model = BookEntity::find()
            .filter(Column::Isbn.eq(isbn))
            .one(&self.db)
            .await?;
        Ok(model.map(Book::from))
    }

    async fn find_or_create_by_isbn(
        &self,
        isbn: &str,
        input: CreateBookInput,
    ) -> Result<RegisteredBook, DomainError> {
        let mut input = input.sanitize()?;
        input.isbn = Some(isbn.to_string());

        if let Some(existing) = self.find_by_isbn(isbn).await? {
            return Ok(RegisteredBook {
                book: existing,
                created: false,
            });
        }

        // Atomic upsert: a concurrent insert of the same ISBN makes this a no-op,
        // and both callers read back the single surviving row.
        let inserted = BookEntity::insert(active_model(input))
            .on_conflict(OnConflict::column(Column::Isbn).do_nothing().to_owned())
            .exec_without_returning(&self.db)
            .await?;

        let book = self.find_by_isbn(isbn).await?.ok_or_else(|| {
            DomainError::Internal(format!("Book with ISBN {} vanished after upsert", isbn))
        })?;

        if inserted > 0 {
            tracing::info!("Registered book {} (ISBN {})", book.id, isbn);
        } else {
            tracing::debug!("ISBN {} registered concurrently, reusing {}", isbn, book.id);
        }

        Ok(RegisteredBook {
            book,
            created: inserted > 0,
        })
    }

    async fn create_manual(&self, input: CreateBookInput) -> Result<RegisteredBook, DomainError> {
        let input = input.sanitize()?;

        if let Some(isbn) = input.isbn.clone() {
            return self.find_or_create_by_isbn(&isbn, input).await;
        }

        let model = active_model(input).insert(&self.db).await?;
        tracing::info!("Registered manual book {} without ISBN", model.id);

        Ok(RegisteredBook {
            book: Book::from(model),
            created: true,
        })
    }
}
