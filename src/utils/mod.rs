pub mod isbn;
