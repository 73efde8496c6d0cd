//! Query resolvers.

use async_graphql::{Context, Object, Result};
use biblio_db::Store;

use crate::store_error;
use crate::types::{Book, Writer};

/// Root query object.
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// All books with their writer included. Empty store yields an empty
    /// list, never an error.
    async fn all_books(&self, ctx: &Context<'_>) -> Result<Vec<Book>> {
        let store = ctx.data_unchecked::<Store>();
        let books = store.all_books().await.map_err(store_error)?;
        Ok(books.into_iter().map(Book::from).collect())
    }

    /// All writers with their books included.
    async fn all_writers(&self, ctx: &Context<'_>) -> Result<Vec<Writer>> {
        let store = ctx.data_unchecked::<Store>();
        let writers = store.all_writers().await.map_err(store_error)?;
        Ok(writers.into_iter().map(Writer::from).collect())
    }
}
