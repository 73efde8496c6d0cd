//! Mutation resolvers.

use async_graphql::{Context, Object, Result, ID};
use biblio_db::{Store, StoreError};

use crate::types::{Book, CreateBookInput, CreateWriterInput, UpdateBookInput, UpdateWriterInput, Writer};
use crate::{parse_id, store_error};

/// Root mutation object.
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Create a book. The nested writer fields act as an identity: a writer
    /// whose attributes all match is reused, otherwise one is created. The
    /// whole sequence runs in a single store transaction.
    async fn create_book(&self, ctx: &Context<'_>, data: CreateBookInput) -> Result<Book> {
        let store = ctx.data_unchecked::<Store>();
        let (book, writer) = data.into_parts();
        let created = store
            .create_book(&book, &writer)
            .await
            .map_err(store_error)?;
        Ok(created.into())
    }

    /// Partially update a book. Fails with "Livro não encontrado" when the
    /// id does not exist.
    async fn update_book(&self, ctx: &Context<'_>, id: ID, data: UpdateBookInput) -> Result<Book> {
        let store = ctx.data_unchecked::<Store>();
        let book_id = parse_id(&id).ok_or_else(|| store_error(StoreError::book_not_found()))?;
        store
            .update_book(book_id, data.into())
            .await
            .map_err(store_error)?;
        let reloaded = store.reload_book(book_id).await.map_err(store_error)?;
        Ok(reloaded.into())
    }

    /// Delete a book. Deleting a missing id fails with
    /// "Livro não encontrado" instead of silently succeeding.
    async fn delete_book(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let store = ctx.data_unchecked::<Store>();
        let book_id = parse_id(&id).ok_or_else(|| store_error(StoreError::book_not_found()))?;
        store.delete_book(book_id).await.map_err(store_error)?;
        Ok(true)
    }

    /// Create a writer; the returned writer carries its (empty) book list.
    async fn create_writer(&self, ctx: &Context<'_>, data: CreateWriterInput) -> Result<Writer> {
        let store = ctx.data_unchecked::<Store>();
        let created = store
            .create_writer(&data.into())
            .await
            .map_err(store_error)?;
        Ok(created.into())
    }

    /// Partially update a writer. Fails with "Autor não encontrado" when the
    /// id does not exist.
    async fn update_writer(
        &self,
        ctx: &Context<'_>,
        id: ID,
        data: UpdateWriterInput,
    ) -> Result<Writer> {
        let store = ctx.data_unchecked::<Store>();
        let writer_id = parse_id(&id).ok_or_else(|| store_error(StoreError::writer_not_found()))?;
        store
            .update_writer(writer_id, data.into())
            .await
            .map_err(store_error)?;
        let reloaded = store.reload_writer(writer_id).await.map_err(store_error)?;
        Ok(reloaded.into())
    }

    /// Delete a writer and its books. Deleting a missing id fails with
    /// "Autor não encontrado".
    async fn delete_writer(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let store = ctx.data_unchecked::<Store>();
        let writer_id = parse_id(&id).ok_or_else(|| store_error(StoreError::writer_not_found()))?;
        store.delete_writer(writer_id).await.map_err(store_error)?;
        Ok(true)
    }
}
