//! GraphQL schema and resolvers.
//!
//! - [`QueryRoot`]: read operations (allBooks, allWriters)
//! - [`MutationRoot`]: write operations (create, update, delete)
//!
//! The store handle is registered as schema data; every resolver reaches it
//! through the request context.

mod mutation;
mod query;
pub mod types;

pub use mutation::MutationRoot;
pub use query::QueryRoot;

use async_graphql::{EmptySubscription, ErrorExtensions, Schema};
use biblio_db::{Store, StoreError};

pub type BiblioSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the executable schema over the given store.
pub fn build_schema(store: Store) -> BiblioSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(store)
        .finish()
}

/// Map a store failure to a GraphQL error, preserving the user-facing
/// message and attaching a machine-readable code extension.
pub(crate) fn store_error(err: StoreError) -> async_graphql::Error {
    let code = match &err {
        StoreError::NotFound(_) => "NOT_FOUND",
        StoreError::Validation(_) => "VALIDATION",
        StoreError::Database(_) => "INTERNAL",
    };
    if let StoreError::Database(ref cause) = err {
        tracing::error!(error = %cause, "store failure");
    }
    async_graphql::Error::new(err.to_string()).extend_with(|_, ext| ext.set("code", code))
}

/// Parse a GraphQL ID into a row id. Non-numeric ids cannot match any row.
pub(crate) fn parse_id(id: &async_graphql::ID) -> Option<i64> {
    id.parse::<i64>().ok()
}
