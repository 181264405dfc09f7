//! Repository implementations using SeaORM

pub mod book_repository;
pub mod bookshelf_repository;
pub mod collection_repository;

pub use book_repository::SeaOrmBookRepository;
pub use bookshelf_repository::SeaOrmBookshelfRepository;
pub use collection_repository::SeaOrmCollectionRepository;
