//! SQLite-backed store for writers and their books.
//!
//! The store owns the connection pool and exposes typed operations over the
//! two tables; the GraphQL layer never touches SQL directly.

pub mod error;
pub mod model;
pub mod store;

pub use error::StoreError;
pub use model::{
    Book, BookPatch, BookWithWriter, Genre, NewBook, Writer, WriterFields, WriterPatch,
    WriterWithBooks,
};
pub use store::Store;
