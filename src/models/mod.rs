pub mod book;
pub mod bookshelf;
pub mod library_entry;
pub mod wanted_book;

pub use book::Book;
