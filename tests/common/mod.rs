#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use shelfkeeper::api;
use shelfkeeper::auth;
use shelfkeeper::db;
use shelfkeeper::domain::{
    BookMetadata, BookRepository, BookshelfRepository, CreateBookInput, DomainError,
    MetadataResolver,
};
use shelfkeeper::infrastructure::{
    AppState, SeaOrmBookRepository, SeaOrmBookshelfRepository, SeaOrmCollectionRepository,
};
use shelfkeeper::models::Book;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`

/// Resolver that never knows anything
pub struct NoMetadata;

#[async_trait]
impl MetadataResolver for NoMetadata {
    async fn lookup(&self, _isbn: &str) -> Result<Option<BookMetadata>, DomainError> {
        Ok(None)
    }
}

pub async fn setup_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

pub async fn setup_test_state() -> AppState {
    AppState::new(setup_db().await, Arc::new(NoMetadata))
}

pub struct Repos {
    pub books: SeaOrmBookRepository,
    pub shelves: SeaOrmBookshelfRepository,
    pub collection: SeaOrmCollectionRepository,
}

pub async fn setup_repos() -> Repos {
    let db = setup_db().await;
    Repos {
        books: SeaOrmBookRepository::new(db.clone()),
        shelves: SeaOrmBookshelfRepository::new(db.clone()),
        collection: SeaOrmCollectionRepository::new(db),
    }
}

pub async fn create_book(books: &dyn BookRepository, isbn: &str, title: &str) -> Book {
    books
        .create_manual(CreateBookInput {
            isbn: Some(isbn.to_string()),
            title: title.to_string(),
            authors: vec!["Test Author".to_string()],
            ..Default::default()
        })
        .await
        .expect("Failed to create book")
        .book
}

pub async fn create_shelf(shelves: &dyn BookshelfRepository, user_id: &str, name: &str) -> String {
    shelves
        .create(user_id, name, None)
        .await
        .expect("Failed to create shelf")
        .id
}

pub fn app(state: AppState) -> Router {
    api::api_router(state)
}

pub fn token_for(user_id: &str) -> String {
    auth::create_jwt(user_id).expect("Failed to create token")
}

/// Send a request as `user_id` and return status plus parsed JSON body
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user_id: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(user) = user_id {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token_for(user)));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}
