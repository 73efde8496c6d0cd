//! Plain data records for the two persisted entities.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

/// Book genre, stored as its uppercase name in a TEXT column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Genre {
    Comedy,
    Drama,
    Fantasy,
    Action,
    Adventure,
    Horror,
    Romance,
}

/// A persisted writer. `initials` is derived on read by the resolver layer
/// and never stored.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Writer {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
    pub birthday: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
}

/// A persisted book. Always owned by exactly one writer.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub isbn: i64,
    pub publication_date: String,
    pub genre: Option<Genre>,
    pub writer_id: i64,
}

/// A writer with its books eagerly included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterWithBooks {
    pub writer: Writer,
    pub books: Vec<Book>,
}

/// A book with its owning writer eagerly included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookWithWriter {
    pub book: Book,
    pub writer: Writer,
}

// Decoded from the books-join-writers projection. The writer id is not
// selected twice; it is the book's writer_id column.
impl FromRow<'_, SqliteRow> for BookWithWriter {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let book = Book {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            isbn: row.try_get("isbn")?,
            publication_date: row.try_get("publication_date")?,
            genre: row.try_get("genre")?,
            writer_id: row.try_get("writer_id")?,
        };
        let writer = Writer {
            id: book.writer_id,
            firstname: row.try_get("firstname")?,
            lastname: row.try_get("lastname")?,
            birthday: row.try_get("birthday")?,
            gender: row.try_get("gender")?,
            phone: row.try_get("phone")?,
        };
        Ok(Self { book, writer })
    }
}

/// Full writer attribute set; also the identity used by find-or-create.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WriterFields {
    pub firstname: String,
    pub lastname: String,
    pub birthday: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
}

/// Fields for a new book, without the writer link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub isbn: i64,
    pub publication_date: String,
    pub genre: Option<Genre>,
}

/// Partial update for a writer; absent fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct WriterPatch {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub birthday: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
}

impl WriterPatch {
    pub fn apply(self, writer: &mut Writer) {
        if let Some(firstname) = self.firstname {
            writer.firstname = firstname;
        }
        if let Some(lastname) = self.lastname {
            writer.lastname = lastname;
        }
        if let Some(birthday) = self.birthday {
            writer.birthday = Some(birthday);
        }
        if let Some(gender) = self.gender {
            writer.gender = Some(gender);
        }
        if let Some(phone) = self.phone {
            writer.phone = Some(phone);
        }
    }
}

/// Partial update for a book; absent fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub isbn: Option<i64>,
    pub publication_date: Option<String>,
    pub genre: Option<Genre>,
}

impl BookPatch {
    pub fn apply(self, book: &mut Book) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(isbn) = self.isbn {
            book.isbn = isbn;
        }
        if let Some(publication_date) = self.publication_date {
            book.publication_date = publication_date;
        }
        if let Some(genre) = self.genre {
            book.genre = Some(genre);
        }
    }
}
