//! GraphQL object, enum, and input types, plus conversions from the store
//! records.

use async_graphql::{ComplexObject, Enum, InputObject, SimpleObject, ID};
use biblio_db as db;

/// Book genre. The strict-enum schema profile is the one served; the
/// free-string variant was rejected (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum Genre {
    Comedy,
    Drama,
    Fantasy,
    Action,
    Adventure,
    Horror,
    Romance,
}

impl From<db::Genre> for Genre {
    fn from(value: db::Genre) -> Self {
        match value {
            db::Genre::Comedy => Self::Comedy,
            db::Genre::Drama => Self::Drama,
            db::Genre::Fantasy => Self::Fantasy,
            db::Genre::Action => Self::Action,
            db::Genre::Adventure => Self::Adventure,
            db::Genre::Horror => Self::Horror,
            db::Genre::Romance => Self::Romance,
        }
    }
}

impl From<Genre> for db::Genre {
    fn from(value: Genre) -> Self {
        match value {
            Genre::Comedy => Self::Comedy,
            Genre::Drama => Self::Drama,
            Genre::Fantasy => Self::Fantasy,
            Genre::Action => Self::Action,
            Genre::Adventure => Self::Adventure,
            Genre::Horror => Self::Horror,
            Genre::Romance => Self::Romance,
        }
    }
}

/// A writer with its books.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Writer {
    pub id: ID,
    pub firstname: String,
    pub lastname: String,
    pub birthday: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub books: Vec<Book>,
}

#[ComplexObject]
impl Writer {
    /// Derived from the stored names on every read, never persisted.
    /// No case normalization: "ana lima" yields "a. l.".
    async fn initials(&self) -> String {
        initials(&self.firstname, &self.lastname)
    }
}

/// A book with its owning writer.
#[derive(Debug, Clone, SimpleObject)]
pub struct Book {
    pub id: ID,
    pub title: String,
    #[graphql(name = "ISBN")]
    pub isbn: i64,
    pub publication_date: String,
    pub genre: Option<Genre>,
    pub writer: Writer,
}

pub(crate) fn initials(firstname: &str, lastname: &str) -> String {
    let first = firstname.chars().next().map(String::from).unwrap_or_default();
    let last = lastname.chars().next().map(String::from).unwrap_or_default();
    format!("{first}. {last}.")
}

fn shallow_writer(writer: db::Writer) -> Writer {
    Writer {
        id: ID(writer.id.to_string()),
        firstname: writer.firstname,
        lastname: writer.lastname,
        birthday: writer.birthday,
        gender: writer.gender,
        phone: writer.phone,
        books: Vec::new(),
    }
}

fn book_with_writer(book: db::Book, writer: Writer) -> Book {
    Book {
        id: ID(book.id.to_string()),
        title: book.title,
        isbn: book.isbn,
        publication_date: book.publication_date,
        genre: book.genre.map(Genre::from),
        writer,
    }
}

impl From<db::BookWithWriter> for Book {
    fn from(value: db::BookWithWriter) -> Self {
        book_with_writer(value.book, shallow_writer(value.writer))
    }
}

impl From<db::WriterWithBooks> for Writer {
    fn from(value: db::WriterWithBooks) -> Self {
        let shallow = shallow_writer(value.writer);
        let books = value
            .books
            .into_iter()
            .map(|book| book_with_writer(book, shallow.clone()))
            .collect();
        Writer { books, ..shallow }
    }
}

/// Input for creating a writer; doubles as the identity for find-or-create
/// when nested inside [`CreateBookInput`].
#[derive(Debug, InputObject)]
pub struct CreateWriterInput {
    pub firstname: String,
    pub lastname: String,
    pub birthday: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
}

impl From<CreateWriterInput> for db::WriterFields {
    fn from(value: CreateWriterInput) -> Self {
        Self {
            firstname: value.firstname,
            lastname: value.lastname,
            birthday: value.birthday,
            gender: value.gender,
            phone: value.phone,
        }
    }
}

/// Partial writer update; absent fields keep their current value.
#[derive(Debug, InputObject)]
pub struct UpdateWriterInput {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub birthday: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
}

impl From<UpdateWriterInput> for db::WriterPatch {
    fn from(value: UpdateWriterInput) -> Self {
        Self {
            firstname: value.firstname,
            lastname: value.lastname,
            birthday: value.birthday,
            gender: value.gender,
            phone: value.phone,
        }
    }
}

/// Input for creating a book together with (or linked to) its writer.
#[derive(Debug, InputObject)]
pub struct CreateBookInput {
    pub title: String,
    #[graphql(name = "ISBN")]
    pub isbn: i64,
    pub publication_date: String,
    pub genre: Option<Genre>,
    pub writer: CreateWriterInput,
}

impl CreateBookInput {
    /// Split into the book fields and the writer identity.
    pub fn into_parts(self) -> (db::NewBook, db::WriterFields) {
        let book = db::NewBook {
            title: self.title,
            isbn: self.isbn,
            publication_date: self.publication_date,
            genre: self.genre.map(db::Genre::from),
        };
        (book, self.writer.into())
    }
}

/// Partial book update; absent fields keep their current value.
#[derive(Debug, InputObject)]
pub struct UpdateBookInput {
    pub title: Option<String>,
    #[graphql(name = "ISBN")]
    pub isbn: Option<i64>,
    pub publication_date: Option<String>,
    pub genre: Option<Genre>,
}

impl From<UpdateBookInput> for db::BookPatch {
    fn from(value: UpdateBookInput) -> Self {
        Self {
            title: value.title,
            isbn: value.isbn,
            publication_date: value.publication_date,
            genre: value.genre.map(db::Genre::from),
        }
    }
}
