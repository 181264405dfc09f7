mod common;

use axum::http::StatusCode;
use common::{app, send, setup_repos, setup_test_state};
use futures::future::join_all;
use serde_json::json;
use shelfkeeper::domain::{BookRepository, CreateBookInput, DomainError};

fn input(isbn: Option<&str>, title: &str) -> CreateBookInput {
    CreateBookInput {
        isbn: isbn.map(str::to_string),
        title: title.to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_existing_isbn_wins() {
    let repos = setup_repos().await;

    let first = repos
        .books
        .create_manual(input(Some("978-4-06-519981-7"), "Vagabond"))
        .await
        .unwrap();
    assert!(first.created);
    assert_eq!(first.book.isbn.as_deref(), Some("9784065199817"));

    let second = repos
        .books
        .find_or_create_by_isbn("9784065199817", input(None, "Different title"))
        .await
        .unwrap();
    assert!(!second.created);
    assert_eq!(second.book.id, first.book.id);
    assert_eq!(second.book.title, "Vagabond");
}

#[tokio::test]
async fn test_books_without_isbn_are_never_merged() {
    let repos = setup_repos().await;

    let a = repos.books.create_manual(input(None, "Zine")).await.unwrap();
    let b = repos.books.create_manual(input(Some("  "), "Zine")).await.unwrap();
    assert_ne!(a.book.id, b.book.id);
    assert_eq!(b.book.isbn, None);
}

#[tokio::test]
async fn test_title_required() {
    let repos = setup_repos().await;
    let err = repos
        .books
        .create_manual(input(Some("9784065199817"), "   "))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
    assert!(repos.books.find_by_isbn("9784065199817").await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_find_or_create_yields_one_book() {
    let repos = setup_repos().await;

    let calls = (0..8).map(|i| {
        repos
            .books
            .find_or_create_by_isbn("9784065199817", input(None, &format!("Vagabond {}", i)))
    });
    let results: Vec<_> = join_all(calls).await.into_iter().map(|r| r.unwrap()).collect();

    let id = &results[0].book.id;
    assert!(results.iter().all(|r| &r.book.id == id));
    assert_eq!(results.iter().filter(|r| r.created).count(), 1);
}

#[tokio::test]
async fn test_concurrent_post_books_same_isbn() {
    let app = app(setup_test_state().await);
    let body = json!({ "isbn": "978-4-06-519981-7", "title": "Vagabond", "authors": ["Takehiko Inoue"] });

    let (a, b) = futures::join!(
        send(&app, "POST", "/books", Some("user-a"), Some(body.clone())),
        send(&app, "POST", "/books", Some("user-b"), Some(body.clone())),
    );

    assert_eq!(a.1["id"], b.1["id"]);
    let mut statuses = vec![a.0.as_u16(), b.0.as_u16()];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK.as_u16(), StatusCode::CREATED.as_u16()]);
    assert_eq!(a.1["authors"], json!(["Takehiko Inoue"]));
}
