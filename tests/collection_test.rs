mod common;

use common::{create_book, create_shelf, setup_repos};
use shelfkeeper::domain::{
    CollectionRepository, DomainError, NewEntry, OwnedRemoval, PurchaseOutcome, ReadingStatus,
    UpdateOwnedInput,
};

const USER: &str = "user-a";
const OTHER: &str = "user-b";

#[tokio::test]
async fn test_owned_book_cannot_be_unshelved_too() {
    let repos = setup_repos().await;
    let book = create_book(&repos.books, "978-4-06-519981-7", "Vagabond").await;
    let shelf = create_shelf(&repos.shelves, USER, "Living Room").await;

    repos
        .collection
        .add_to_owned(USER, &book.id, &shelf, NewEntry::default())
        .await
        .expect("add_to_owned failed");

    let err = repos
        .collection
        .add_to_unshelved(USER, &book.id, NewEntry::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    let err = repos
        .collection
        .add_to_owned(USER, &book.id, &shelf, NewEntry::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    assert_eq!(repos.collection.list_unshelved(USER).await.unwrap().len(), 0);
    assert_eq!(repos.collection.list_owned(USER, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unshelved_book_cannot_be_added_to_owned() {
    let repos = setup_repos().await;
    let book = create_book(&repos.books, "9784065199817", "Vagabond").await;
    let shelf = create_shelf(&repos.shelves, USER, "Study").await;

    repos
        .collection
        .add_to_unshelved(USER, &book.id, NewEntry::default())
        .await
        .unwrap();

    let err = repos
        .collection
        .add_to_owned(USER, &book.id, &shelf, NewEntry::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn test_memberships_are_per_user() {
    let repos = setup_repos().await;
    let book = create_book(&repos.books, "9784065199817", "Vagabond").await;

    let mine = repos
        .collection
        .add_to_unshelved(USER, &book.id, NewEntry::default())
        .await
        .unwrap();
    repos
        .collection
        .add_to_unshelved(OTHER, &book.id, NewEntry::default())
        .await
        .expect("Another user may hold the same book");

    // Someone else's row looks exactly like a missing one
    assert!(repos
        .collection
        .find_unshelved(OTHER, &mine.id)
        .await
        .unwrap()
        .is_none());
    let err = repos
        .collection
        .remove_from_unshelved(OTHER, &mine.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
    assert!(repos.collection.find_unshelved(USER, &mine.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_shelve_then_unshelve_restores_status_and_note() {
    let repos = setup_repos().await;
    let book = create_book(&repos.books, "9784065199817", "Vagabond").await;
    let shelf = create_shelf(&repos.shelves, USER, "Living Room").await;

    let unshelved = repos
        .collection
        .add_to_unshelved(
            USER,
            &book.id,
            NewEntry::new(Some(ReadingStatus::Reading), Some("  lent by Kei ".to_string())),
        )
        .await
        .unwrap();
    assert_eq!(unshelved.note.as_deref(), Some("lent by Kei"));

    let owned = repos
        .collection
        .move_unshelved_to_owned(USER, &unshelved.id, &shelf, None)
        .await
        .unwrap();
    assert_eq!(owned.reading_status, ReadingStatus::Reading);
    assert_eq!(owned.note.as_deref(), Some("lent by Kei"));
    assert_eq!(owned.bookshelf_id, shelf);
    assert!(repos.collection.find_unshelved(USER, &unshelved.id).await.unwrap().is_none());

    let back = repos
        .collection
        .move_owned_to_unshelved(USER, &owned.id)
        .await
        .unwrap();
    assert_eq!(back.reading_status, ReadingStatus::Reading);
    assert_eq!(back.note.as_deref(), Some("lent by Kei"));
    assert_eq!(repos.collection.list_owned(USER, None).await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_shelve_status_override() {
    let repos = setup_repos().await;
    let book = create_book(&repos.books, "9784065199817", "Vagabond").await;
    let shelf = create_shelf(&repos.shelves, USER, "Living Room").await;

    let unshelved = repos
        .collection
        .add_to_unshelved(USER, &book.id, NewEntry::default())
        .await
        .unwrap();
    let owned = repos
        .collection
        .move_unshelved_to_owned(USER, &unshelved.id, &shelf, Some(ReadingStatus::Completed))
        .await
        .unwrap();
    assert_eq!(owned.reading_status, ReadingStatus::Completed);
}

#[tokio::test]
async fn test_shelve_onto_foreign_shelf_changes_nothing() {
    let repos = setup_repos().await;
    let book = create_book(&repos.books, "9784065199817", "Vagabond").await;
    let foreign_shelf = create_shelf(&repos.shelves, OTHER, "Not yours").await;

    let unshelved = repos
        .collection
        .add_to_unshelved(USER, &book.id, NewEntry::default())
        .await
        .unwrap();

    let err = repos
        .collection
        .move_unshelved_to_owned(USER, &unshelved.id, &foreign_shelf, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));

    // The unshelved row survives the failed move
    assert!(repos.collection.find_unshelved(USER, &unshelved.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_wanted_reactivation_keeps_id() {
    let repos = setup_repos().await;
    let book = create_book(&repos.books, "9784065199817", "Vagabond").await;

    let first = repos.collection.add_to_wanted(USER, &book.id).await.unwrap();
    assert!(first.created);

    let err = repos.collection.add_to_wanted(USER, &book.id).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    repos
        .collection
        .remove_from_wanted(USER, &first.wanted.id)
        .await
        .unwrap();
    let removed = repos
        .collection
        .find_wanted(USER, &first.wanted.id)
        .await
        .unwrap()
        .expect("Wanted rows are soft-deleted");
    assert!(!removed.is_active);
    assert!(repos.collection.list_wanted(USER).await.unwrap().is_empty());

    let again = repos.collection.add_to_wanted(USER, &book.id).await.unwrap();
    assert!(!again.created);
    assert_eq!(again.wanted.id, first.wanted.id);
    assert!(again.wanted.is_active);
}

#[tokio::test]
async fn test_owned_book_cannot_be_wanted() {
    let repos = setup_repos().await;
    let book = create_book(&repos.books, "9784065199817", "Vagabond").await;

    repos
        .collection
        .add_to_unshelved(USER, &book.id, NewEntry::default())
        .await
        .unwrap();
    let err = repos.collection.add_to_wanted(USER, &book.id).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn test_purchase_after_independent_unshelve_is_idempotent() {
    let repos = setup_repos().await;
    let book = create_book(&repos.books, "9784065199817", "Vagabond").await;

    let wanted = repos.collection.add_to_wanted(USER, &book.id).await.unwrap();
    repos
        .collection
        .add_to_unshelved(USER, &book.id, NewEntry::default())
        .await
        .unwrap();

    let result = repos
        .collection
        .purchase_wanted(USER, &wanted.wanted.id, None)
        .await
        .unwrap();
    assert_eq!(result.outcome, PurchaseOutcome::AlreadyUnshelved);
    assert!(result.outcome.already_present());
    assert!(result.unshelved_book.is_none());

    assert_eq!(repos.collection.list_unshelved(USER).await.unwrap().len(), 1);
    let closed = repos
        .collection
        .find_wanted(USER, &wanted.wanted.id)
        .await
        .unwrap()
        .expect("wanted row kept");
    assert!(!closed.is_active);

    // An inactive wanted row cannot be purchased again
    let err = repos
        .collection
        .purchase_wanted(USER, &wanted.wanted.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn test_purchase_onto_shelf() {
    let repos = setup_repos().await;
    let book = create_book(&repos.books, "9784065199817", "Vagabond").await;
    let shelf = create_shelf(&repos.shelves, USER, "Living Room").await;

    let wanted = repos.collection.add_to_wanted(USER, &book.id).await.unwrap();
    let result = repos
        .collection
        .purchase_wanted(USER, &wanted.wanted.id, Some(&shelf))
        .await
        .unwrap();

    assert_eq!(result.outcome, PurchaseOutcome::AddedToShelf);
    let owned = result.owned_book.expect("owned book returned");
    assert_eq!(owned.reading_status, ReadingStatus::NotRead);
    assert_eq!(owned.bookshelf.map(|s| s.name), Some("Living Room".to_string()));

    assert_eq!(repos.collection.list_owned(USER, Some(&shelf)).await.unwrap().len(), 1);
    let closed = repos
        .collection
        .find_wanted(USER, &wanted.wanted.id)
        .await
        .unwrap()
        .expect("wanted row kept");
    assert!(!closed.is_active);
    assert!(repos.collection.list_wanted(USER).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_purchase_with_bad_shelf_keeps_wanted_active() {
    let repos = setup_repos().await;
    let book = create_book(&repos.books, "9784065199817", "Vagabond").await;

    let wanted = repos.collection.add_to_wanted(USER, &book.id).await.unwrap();
    let err = repos
        .collection
        .purchase_wanted(USER, &wanted.wanted.id, Some("no-such-shelf"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));

    assert!(repos.collection.list_owned(USER, None).await.unwrap().is_empty());
    assert!(repos.collection.list_unshelved(USER).await.unwrap().is_empty());
    let still = repos
        .collection
        .find_wanted(USER, &wanted.wanted.id)
        .await
        .unwrap()
        .expect("wanted row kept");
    assert!(still.is_active);
}

#[tokio::test]
async fn test_remove_owned_modes() {
    let repos = setup_repos().await;
    let shelf = create_shelf(&repos.shelves, USER, "Living Room").await;

    // detach
    let book = create_book(&repos.books, "9784065199817", "Vagabond 1").await;
    let owned = repos
        .collection
        .add_to_owned(USER, &book.id, &shelf, NewEntry::default())
        .await
        .unwrap();
    repos
        .collection
        .remove_from_owned(USER, &owned.id, OwnedRemoval::Detach)
        .await
        .unwrap();
    assert!(repos.collection.list_owned(USER, None).await.unwrap().is_empty());
    assert!(repos.collection.list_unshelved(USER).await.unwrap().is_empty());

    // toUnshelved
    let book = create_book(&repos.books, "9784065199824", "Vagabond 2").await;
    let owned = repos
        .collection
        .add_to_owned(
            USER,
            &book.id,
            &shelf,
            NewEntry::new(Some(ReadingStatus::Completed), Some("reread".to_string())),
        )
        .await
        .unwrap();
    repos
        .collection
        .remove_from_owned(USER, &owned.id, OwnedRemoval::ToUnshelved)
        .await
        .unwrap();
    let unshelved = repos.collection.list_unshelved(USER).await.unwrap();
    assert_eq!(unshelved.len(), 1);
    assert_eq!(unshelved[0].reading_status, ReadingStatus::Completed);
    assert_eq!(unshelved[0].note.as_deref(), Some("reread"));

    // unknown row
    let err = repos
        .collection
        .remove_from_owned(USER, "missing", OwnedRemoval::Detach)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn test_purge_all_clears_every_collection() {
    let repos = setup_repos().await;
    let book = create_book(&repos.books, "9784065199817", "Vagabond").await;
    let shelf = create_shelf(&repos.shelves, USER, "Living Room").await;

    let wanted = repos.collection.add_to_wanted(USER, &book.id).await.unwrap();
    let owned = repos
        .collection
        .add_to_owned(USER, &book.id, &shelf, NewEntry::default())
        .await
        .unwrap();

    repos
        .collection
        .remove_from_owned(USER, &owned.id, OwnedRemoval::PurgeAll)
        .await
        .unwrap();

    assert!(repos.collection.list_owned(USER, None).await.unwrap().is_empty());
    assert!(repos.collection.list_unshelved(USER).await.unwrap().is_empty());
    assert!(repos
        .collection
        .find_wanted(USER, &wanted.wanted.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_update_owned_partial() {
    let repos = setup_repos().await;
    let book = create_book(&repos.books, "9784065199817", "Vagabond").await;
    let living = create_shelf(&repos.shelves, USER, "Living Room").await;
    let study = create_shelf(&repos.shelves, USER, "Study").await;

    let owned = repos
        .collection
        .add_to_owned(USER, &book.id, &living, NewEntry::new(None, Some("gift".to_string())))
        .await
        .unwrap();

    let updated = repos
        .collection
        .update_owned(
            USER,
            &owned.id,
            UpdateOwnedInput {
                reading_status: Some(ReadingStatus::Reading),
                marathon_posted: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.reading_status, ReadingStatus::Reading);
    assert!(updated.marathon_posted);
    assert_eq!(updated.note.as_deref(), Some("gift"));
    assert_eq!(updated.bookshelf_id, living);

    let moved = repos
        .collection
        .update_owned(
            USER,
            &owned.id,
            UpdateOwnedInput {
                bookshelf_id: Some(study.clone()),
                note: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.bookshelf_id, study);
    assert_eq!(moved.bookshelf.map(|s| s.name), Some("Study".to_string()));
    assert_eq!(moved.note, None);
    assert_eq!(moved.reading_status, ReadingStatus::Reading);

    let err = repos
        .collection
        .update_owned(
            USER,
            &owned.id,
            UpdateOwnedInput {
                bookshelf_id: Some("missing".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn test_adding_unknown_book_is_not_found() {
    let repos = setup_repos().await;
    let err = repos
        .collection
        .add_to_unshelved(USER, "no-such-book", NewEntry::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn test_concurrent_adds_leave_one_primary_row() {
    let repos = setup_repos().await;
    let book = create_book(&repos.books, "9784065199817", "Vagabond").await;
    let shelf = create_shelf(&repos.shelves, USER, "Living Room").await;

    let unshelve = repos
        .collection
        .add_to_unshelved(USER, &book.id, NewEntry::default());
    let own = repos
        .collection
        .add_to_owned(USER, &book.id, &shelf, NewEntry::default());
    let (a, b) = futures::join!(unshelve, own);

    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    let total = repos.collection.list_unshelved(USER).await.unwrap().len()
        + repos.collection.list_owned(USER, None).await.unwrap().len();
    assert_eq!(total, 1);
}
