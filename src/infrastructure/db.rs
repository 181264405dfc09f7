use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys = ON".to_owned(),
    ))
    .await?;

    // Shared catalog, one row per normalized ISBN
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS books (
            id TEXT PRIMARY KEY NOT NULL,
            isbn TEXT UNIQUE,
            title TEXT NOT NULL,
            subtitle TEXT,
            authors TEXT NOT NULL DEFAULT '[]',
            publisher TEXT,
            published_date TEXT,
            description TEXT,
            cover_image_url TEXT,
            categories TEXT,
            page_count INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS bookshelves (
            id TEXT PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            memo TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_bookshelves_user_id ON bookshelves(user_id);
        "#
        .to_owned(),
    ))
    .await?;

    // Primary state: owned XOR unshelved per (user, book)
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS library_entries (
            id TEXT PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL,
            book_id TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('owned', 'unshelved')),
            bookshelf_id TEXT,
            reading_status TEXT NOT NULL DEFAULT 'NOT_READ'
                CHECK (reading_status IN ('NOT_READ', 'READING', 'COMPLETED')),
            note TEXT,
            marathon_posted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (user_id, book_id),
            CHECK ((kind = 'owned') = (bookshelf_id IS NOT NULL)),
            FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE RESTRICT,
            FOREIGN KEY (bookshelf_id) REFERENCES bookshelves(id) ON DELETE RESTRICT
        );
        CREATE INDEX IF NOT EXISTS idx_library_entries_user_kind ON library_entries(user_id, kind);
        CREATE INDEX IF NOT EXISTS idx_library_entries_bookshelf_id ON library_entries(bookshelf_id);
        "#
        .to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS wanted_books (
            id TEXT PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL,
            book_id TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (user_id, book_id),
            FOREIGN KEY (book_id) REFERENCES books(id) ON DELETE RESTRICT
        );
        CREATE INDEX IF NOT EXISTS idx_wanted_books_user_active ON wanted_books(user_id, is_active);
        "#
        .to_owned(),
    ))
    .await?;

    Ok(())
}

/// Timestamp format used by every table; fixed width so text order is time order.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = init_db("sqlite::memory:").await.expect("Failed to init db");
        run_migrations(&db).await.expect("Second run should succeed");
    }

    #[test]
    fn test_timestamp_is_fixed_width() {
        let a = now_timestamp();
        assert!(a.ends_with('Z'));
        assert_eq!(a.len(), "2026-01-01T00:00:00.000000Z".len());
    }
}
