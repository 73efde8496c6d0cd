//! Typed operations over the writers and books tables.

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteExecutor, Transaction};

use crate::error::StoreError;
use crate::model::{
    Book, BookPatch, BookWithWriter, NewBook, Writer, WriterFields, WriterPatch, WriterWithBooks,
};

const WRITER_COLUMNS: &str = "id, firstname, lastname, birthday, gender, phone";
const BOOK_COLUMNS: &str = "id, title, isbn, publication_date, genre, writer_id";

/// Handle to the relational store. Cheap to clone; all clones share one pool.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Connect to the database at `url` (e.g. `sqlite://biblio.db?mode=rwc`).
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;
        tracing::info!(url, "store connected");
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool. Tests use this with a single-connection
    /// in-memory pool, since every SQLite `:memory:` connection is its own
    /// database.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the writers and books tables if they do not exist yet.
    /// Must complete before the service accepts operations.
    pub async fn sync_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS writers (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                firstname TEXT NOT NULL,
                lastname  TEXT NOT NULL,
                birthday  TEXT,
                gender    TEXT,
                phone     TEXT
            );"#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS books (
                id               INTEGER PRIMARY KEY AUTOINCREMENT,
                title            TEXT NOT NULL,
                isbn             INTEGER NOT NULL,
                publication_date TEXT NOT NULL,
                genre            TEXT,
                writer_id        INTEGER NOT NULL REFERENCES writers(id)
            );"#,
        )
        .execute(&self.pool)
        .await?;
        tracing::info!("store schema synchronized");
        Ok(())
    }

    /// All books with their owning writer eagerly included.
    pub async fn all_books(&self) -> Result<Vec<BookWithWriter>, StoreError> {
        let books = sqlx::query_as(
            "SELECT b.id, b.title, b.isbn, b.publication_date, b.genre, b.writer_id, \
             w.firstname, w.lastname, w.birthday, w.gender, w.phone \
             FROM books b JOIN writers w ON w.id = b.writer_id ORDER BY b.id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// All writers with their books eagerly included.
    pub async fn all_writers(&self) -> Result<Vec<WriterWithBooks>, StoreError> {
        let writers: Vec<Writer> =
            sqlx::query_as(&format!("SELECT {WRITER_COLUMNS} FROM writers ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;
        let books: Vec<Book> =
            sqlx::query_as(&format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;

        let mut result: Vec<WriterWithBooks> = writers
            .into_iter()
            .map(|writer| WriterWithBooks {
                writer,
                books: Vec::new(),
            })
            .collect();
        for book in books {
            if let Some(entry) = result.iter_mut().find(|e| e.writer.id == book.writer_id) {
                entry.books.push(book);
            }
        }
        Ok(result)
    }

    /// Look up a single writer. Absent is a valid, non-error outcome.
    pub async fn find_writer(&self, id: i64) -> Result<Option<Writer>, StoreError> {
        let writer =
            sqlx::query_as(&format!("SELECT {WRITER_COLUMNS} FROM writers WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(writer)
    }

    /// Look up a single book. Absent is a valid, non-error outcome.
    pub async fn find_book(&self, id: i64) -> Result<Option<Book>, StoreError> {
        let book = sqlx::query_as(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    /// Return the writer whose attributes exactly match `fields`, creating it
    /// if none does. The match-then-insert runs in one transaction: a
    /// concurrent identical call either observes the row or fails with a
    /// busy `Database` error, never a silent duplicate writer.
    pub async fn find_or_create_writer(
        &self,
        fields: &WriterFields,
    ) -> Result<(Writer, bool), StoreError> {
        validate_writer(fields)?;
        let mut tx = self.pool.begin().await?;
        let (writer, created) = find_or_create_writer_in(&mut tx, fields).await?;
        tx.commit().await?;
        Ok((writer, created))
    }

    /// Insert a writer and return it with its (empty) book list populated.
    pub async fn create_writer(
        &self,
        fields: &WriterFields,
    ) -> Result<WriterWithBooks, StoreError> {
        validate_writer(fields)?;
        let id = insert_writer(&self.pool, fields).await?;
        tracing::debug!(writer_id = id, "writer created");
        self.reload_writer(id).await
    }

    /// Create a book for the writer identified by `writer`, reusing an
    /// existing writer whose attributes match exactly. Runs the
    /// find-or-create, insert, and link as a single transaction, then
    /// re-fetches the book with its writer populated.
    pub async fn create_book(
        &self,
        book: &NewBook,
        writer: &WriterFields,
    ) -> Result<BookWithWriter, StoreError> {
        validate_book(book)?;
        validate_writer(writer)?;

        let mut tx = self.pool.begin().await?;
        let (writer, created) = find_or_create_writer_in(&mut tx, writer).await?;
        let result = sqlx::query(
            "INSERT INTO books (title, isbn, publication_date, genre, writer_id) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&book.title)
        .bind(book.isbn)
        .bind(&book.publication_date)
        .bind(book.genre)
        .bind(writer.id)
        .execute(&mut *tx)
        .await?;
        let book_id = result.last_insert_rowid();
        tx.commit().await?;

        tracing::debug!(book_id, writer_id = writer.id, writer_created = created, "book created");
        self.reload_book(book_id).await
    }

    /// Partially update a book; only fields present in the patch change.
    pub async fn update_book(&self, id: i64, patch: BookPatch) -> Result<Book, StoreError> {
        let mut book = self
            .find_book(id)
            .await?
            .ok_or_else(StoreError::book_not_found)?;
        patch.apply(&mut book);

        sqlx::query(
            "UPDATE books SET title = ?2, isbn = ?3, publication_date = ?4, genre = ?5, \
             writer_id = ?6 WHERE id = ?1",
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(book.isbn)
        .bind(&book.publication_date)
        .bind(book.genre)
        .bind(book.writer_id)
        .execute(&self.pool)
        .await?;
        Ok(book)
    }

    /// Partially update a writer; only fields present in the patch change.
    pub async fn update_writer(
        &self,
        id: i64,
        patch: WriterPatch,
    ) -> Result<Writer, StoreError> {
        let mut writer = self
            .find_writer(id)
            .await?
            .ok_or_else(StoreError::writer_not_found)?;
        patch.apply(&mut writer);

        sqlx::query(
            "UPDATE writers SET firstname = ?2, lastname = ?3, birthday = ?4, gender = ?5, \
             phone = ?6 WHERE id = ?1",
        )
        .bind(writer.id)
        .bind(&writer.firstname)
        .bind(&writer.lastname)
        .bind(&writer.birthday)
        .bind(&writer.gender)
        .bind(&writer.phone)
        .execute(&self.pool)
        .await?;
        Ok(writer)
    }

    /// Delete a book. Deleting a missing id is an explicit not-found error.
    pub async fn delete_book(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::book_not_found());
        }
        tracing::debug!(book_id = id, "book deleted");
        Ok(())
    }

    /// Delete a writer together with its books. Deleting a missing id is an
    /// explicit not-found error and removes nothing.
    pub async fn delete_writer(&self, id: i64) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM books WHERE writer_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM writers WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            // Dropping the transaction rolls back the book deletes.
            return Err(StoreError::writer_not_found());
        }
        tx.commit().await?;
        tracing::debug!(writer_id = id, "writer deleted");
        Ok(())
    }

    /// Re-point a book's owning writer.
    pub async fn set_book_writer(&self, book_id: i64, writer_id: i64) -> Result<(), StoreError> {
        if self.find_writer(writer_id).await?.is_none() {
            return Err(StoreError::writer_not_found());
        }
        let result = sqlx::query("UPDATE books SET writer_id = ?2 WHERE id = ?1")
            .bind(book_id)
            .bind(writer_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::book_not_found());
        }
        Ok(())
    }

    /// Re-fetch a book with its writer populated.
    pub async fn reload_book(&self, id: i64) -> Result<BookWithWriter, StoreError> {
        sqlx::query_as(
            "SELECT b.id, b.title, b.isbn, b.publication_date, b.genre, b.writer_id, \
             w.firstname, w.lastname, w.birthday, w.gender, w.phone \
             FROM books b JOIN writers w ON w.id = b.writer_id WHERE b.id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(StoreError::book_not_found)
    }

    /// Re-fetch a writer with its books populated.
    pub async fn reload_writer(&self, id: i64) -> Result<WriterWithBooks, StoreError> {
        let writer = self
            .find_writer(id)
            .await?
            .ok_or_else(StoreError::writer_not_found)?;
        let books = sqlx::query_as(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE writer_id = ?1 ORDER BY id"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(WriterWithBooks { writer, books })
    }
}

/// Find a writer by exact equality on all attributes. Optional attributes
/// compare NULL-aware (`IS`), so two absent birthdays match.
async fn writer_by_fields<'e, E>(
    executor: E,
    fields: &WriterFields,
) -> Result<Option<Writer>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as(&format!(
        "SELECT {WRITER_COLUMNS} FROM writers \
         WHERE firstname = ?1 AND lastname = ?2 AND birthday IS ?3 AND gender IS ?4 AND phone IS ?5",
    ))
    .bind(&fields.firstname)
    .bind(&fields.lastname)
    .bind(&fields.birthday)
    .bind(&fields.gender)
    .bind(&fields.phone)
    .fetch_optional(executor)
    .await
}

async fn insert_writer<'e, E>(executor: E, fields: &WriterFields) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "INSERT INTO writers (firstname, lastname, birthday, gender, phone) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(&fields.firstname)
    .bind(&fields.lastname)
    .bind(&fields.birthday)
    .bind(&fields.gender)
    .bind(&fields.phone)
    .execute(executor)
    .await?;
    Ok(result.last_insert_rowid())
}

async fn find_or_create_writer_in(
    tx: &mut Transaction<'_, Sqlite>,
    fields: &WriterFields,
) -> Result<(Writer, bool), StoreError> {
    if let Some(existing) = writer_by_fields(&mut **tx, fields).await? {
        return Ok((existing, false));
    }
    let id = insert_writer(&mut **tx, fields).await?;
    Ok((
        Writer {
            id,
            firstname: fields.firstname.clone(),
            lastname: fields.lastname.clone(),
            birthday: fields.birthday.clone(),
            gender: fields.gender.clone(),
            phone: fields.phone.clone(),
        },
        true,
    ))
}

fn validate_writer(fields: &WriterFields) -> Result<(), StoreError> {
    if fields.firstname.trim().is_empty() {
        return Err(StoreError::validation("firstname must not be empty"));
    }
    if fields.lastname.trim().is_empty() {
        return Err(StoreError::validation("lastname must not be empty"));
    }
    Ok(())
}

fn validate_book(book: &NewBook) -> Result<(), StoreError> {
    if book.title.trim().is_empty() {
        return Err(StoreError::validation("title must not be empty"));
    }
    if book.publication_date.trim().is_empty() {
        return Err(StoreError::validation("publicationDate must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BOOK_NOT_FOUND, WRITER_NOT_FOUND};
    use crate::model::Genre;

    async fn memory_store() -> Store {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = Store::from_pool(pool);
        store.sync_schema().await.unwrap();
        store
    }

    fn herbert() -> WriterFields {
        WriterFields {
            firstname: "Frank".to_string(),
            lastname: "Herbert".to_string(),
            ..Default::default()
        }
    }

    fn dune() -> NewBook {
        NewBook {
            title: "Dune".to_string(),
            isbn: 9780441013593,
            publication_date: "1965-08-01".to_string(),
            genre: Some(Genre::Fantasy),
        }
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let store = memory_store().await;
        assert!(store.all_books().await.unwrap().is_empty());
        assert!(store.all_writers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn find_or_create_reuses_exact_match() {
        let store = memory_store().await;

        let (first, created) = store.find_or_create_writer(&herbert()).await.unwrap();
        assert!(created);

        let (second, created) = store.find_or_create_writer(&herbert()).await.unwrap();
        assert!(!created);
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn find_or_create_distinguishes_optional_fields() {
        let store = memory_store().await;

        let (first, _) = store.find_or_create_writer(&herbert()).await.unwrap();
        let with_birthday = WriterFields {
            birthday: Some("1920-10-08".to_string()),
            ..herbert()
        };
        let (second, created) = store.find_or_create_writer(&with_birthday).await.unwrap();

        assert!(created);
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn create_book_links_new_writer() {
        let store = memory_store().await;

        let created = store.create_book(&dune(), &herbert()).await.unwrap();
        assert_eq!(created.book.title, "Dune");
        assert_eq!(created.writer.firstname, "Frank");
        assert_eq!(created.book.writer_id, created.writer.id);

        let writers = store.all_writers().await.unwrap();
        assert_eq!(writers.len(), 1);
        assert_eq!(writers[0].books.len(), 1);
    }

    #[tokio::test]
    async fn create_book_reuses_matching_writer() {
        let store = memory_store().await;

        let first = store.create_book(&dune(), &herbert()).await.unwrap();
        let messiah = NewBook {
            title: "Dune Messiah".to_string(),
            isbn: 9780441172696,
            publication_date: "1969-10-15".to_string(),
            genre: Some(Genre::Fantasy),
        };
        let second = store.create_book(&messiah, &herbert()).await.unwrap();

        assert_eq!(first.writer.id, second.writer.id);
        assert_eq!(store.all_writers().await.unwrap().len(), 1);
        assert_eq!(store.all_books().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_book_changes_only_patched_fields() {
        let store = memory_store().await;
        let created = store.create_book(&dune(), &herbert()).await.unwrap();

        let updated = store
            .update_book(
                created.book.id,
                BookPatch {
                    title: Some("Dune (1st ed.)".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Dune (1st ed.)");
        assert_eq!(updated.isbn, 9780441013593);
        assert_eq!(updated.genre, Some(Genre::Fantasy));

        let reloaded = store.find_book(created.book.id).await.unwrap().unwrap();
        assert_eq!(reloaded, updated);
    }

    #[tokio::test]
    async fn update_missing_book_is_not_found() {
        let store = memory_store().await;
        let err = store
            .update_book(999, BookPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ref msg) if msg == BOOK_NOT_FOUND));
        assert!(store.all_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_missing_writer_is_not_found() {
        let store = memory_store().await;
        let err = store
            .update_writer(999, WriterPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ref msg) if msg == WRITER_NOT_FOUND));
        assert!(store.all_writers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_book_removes_it_from_listing() {
        let store = memory_store().await;
        let created = store.create_book(&dune(), &herbert()).await.unwrap();

        store.delete_book(created.book.id).await.unwrap();
        assert!(store.all_books().await.unwrap().is_empty());

        let err = store.delete_book(created.book.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_writer_removes_its_books() {
        let store = memory_store().await;
        let created = store.create_book(&dune(), &herbert()).await.unwrap();

        store.delete_writer(created.writer.id).await.unwrap();
        assert!(store.all_writers().await.unwrap().is_empty());
        assert!(store.all_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_writer_is_not_found() {
        let store = memory_store().await;
        let err = store.delete_writer(42).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ref msg) if msg == WRITER_NOT_FOUND));
    }

    #[tokio::test]
    async fn set_book_writer_repoints_ownership() {
        let store = memory_store().await;
        let created = store.create_book(&dune(), &herbert()).await.unwrap();
        let other = store
            .create_writer(&WriterFields {
                firstname: "Ursula".to_string(),
                lastname: "Le Guin".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        store
            .set_book_writer(created.book.id, other.writer.id)
            .await
            .unwrap();

        let reloaded = store.reload_book(created.book.id).await.unwrap();
        assert_eq!(reloaded.writer.id, other.writer.id);
    }

    #[tokio::test]
    async fn set_book_writer_rejects_unknown_writer() {
        let store = memory_store().await;
        let created = store.create_book(&dune(), &herbert()).await.unwrap();

        let err = store
            .set_book_writer(created.book.id, 999)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ref msg) if msg == WRITER_NOT_FOUND));
    }

    #[tokio::test]
    async fn create_writer_starts_with_no_books() {
        let store = memory_store().await;
        let created = store.create_writer(&herbert()).await.unwrap();
        assert!(created.books.is_empty());
    }

    #[tokio::test]
    async fn create_writer_requires_names() {
        let store = memory_store().await;
        let err = store
            .create_writer(&WriterFields {
                firstname: String::new(),
                lastname: "Herbert".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }
}
