mod common;

use common::{create_book, create_shelf, setup_repos};
use shelfkeeper::domain::{
    BookshelfRepository, CollectionRepository, DomainError, NewEntry, OwnedRemoval,
};
use std::time::Duration;

const USER: &str = "user-a";
const OTHER: &str = "user-b";

#[tokio::test]
async fn test_non_empty_shelf_cannot_be_deleted() {
    let repos = setup_repos().await;
    let book = create_book(&repos.books, "9784065199817", "Vagabond").await;
    let shelf = create_shelf(&repos.shelves, USER, "Living Room").await;

    let owned = repos
        .collection
        .add_to_owned(USER, &book.id, &shelf, NewEntry::default())
        .await
        .unwrap();

    let err = repos.shelves.delete(USER, &shelf).await.unwrap_err();
    assert!(matches!(err, DomainError::NonEmptyShelf));
    assert!(repos.shelves.find(USER, &shelf).await.unwrap().is_some());

    repos
        .collection
        .remove_from_owned(USER, &owned.id, OwnedRemoval::Detach)
        .await
        .unwrap();
    repos
        .shelves
        .delete(USER, &shelf)
        .await
        .expect("Empty shelf should delete");
    assert!(repos.shelves.find(USER, &shelf).await.unwrap().is_none());
}

#[tokio::test]
async fn test_shelf_names_are_trimmed_and_required() {
    let repos = setup_repos().await;

    let shelf = repos
        .shelves
        .create(USER, "  Living Room  ", Some("   ".to_string()))
        .await
        .unwrap();
    assert_eq!(shelf.name, "Living Room");
    assert_eq!(shelf.memo, None);

    let err = repos.shelves.create(USER, "   ", None).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let err = repos
        .shelves
        .rename(USER, &shelf.id, "", None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let renamed = repos
        .shelves
        .rename(USER, &shelf.id, "Study", Some("top floor".to_string()))
        .await
        .unwrap();
    assert_eq!(renamed.name, "Study");
    assert_eq!(renamed.memo.as_deref(), Some("top floor"));
}

#[tokio::test]
async fn test_list_newest_first_with_counts() {
    let repos = setup_repos().await;
    let book = create_book(&repos.books, "9784065199817", "Vagabond").await;

    let other_book = create_book(&repos.books, "9784065199824", "Vagabond 2").await;
    let loose_book = create_book(&repos.books, "9784063142709", "Vagabond 3").await;

    let first = create_shelf(&repos.shelves, USER, "First").await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = create_shelf(&repos.shelves, USER, "Second").await;
    let foreign = create_shelf(&repos.shelves, OTHER, "Someone else's").await;

    for id in [&book.id, &other_book.id] {
        repos
            .collection
            .add_to_owned(USER, id, &first, NewEntry::default())
            .await
            .unwrap();
    }
    repos
        .collection
        .add_to_unshelved(USER, &loose_book.id, NewEntry::default())
        .await
        .unwrap();
    repos
        .collection
        .add_to_owned(OTHER, &book.id, &foreign, NewEntry::default())
        .await
        .unwrap();

    let shelves = repos.shelves.list(USER).await.unwrap();
    assert_eq!(shelves.len(), 2);
    assert_eq!(shelves[0].id, second);
    assert_eq!(shelves[0].owned_book_count, 0);
    assert_eq!(shelves[1].id, first);
    assert_eq!(shelves[1].owned_book_count, 2);

    let detail = repos.shelves.find(USER, &first).await.unwrap().unwrap();
    assert_eq!(detail.owned_books.len(), 2);
    assert_eq!(detail.bookshelf.owned_book_count, 2);

    let theirs = repos.shelves.list(OTHER).await.unwrap();
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0].owned_book_count, 1);
}

#[tokio::test]
async fn test_other_users_shelf_is_not_found() {
    let repos = setup_repos().await;
    let shelf = create_shelf(&repos.shelves, USER, "Living Room").await;

    assert!(repos.shelves.find(OTHER, &shelf).await.unwrap().is_none());

    let err = repos
        .shelves
        .rename(OTHER, &shelf, "Mine now", None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));

    let err = repos.shelves.delete(OTHER, &shelf).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}
