//! HTTP facade serving the GraphQL schema with Axum.

use anyhow::Context;
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use biblio_graphql::BiblioSchema;
use biblio_kernel::Settings;

pub mod router;

use router::RouterBuilder;

/// Start the HTTP server for the given schema.
pub async fn start_server(schema: BiblioSchema, settings: &Settings) -> anyhow::Result<()> {
    let app = build_router(schema, settings);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", settings.server.host, settings.server.port))
            .await
            .context("failed to bind to address")?;

    tracing::info!(
        "GraphQL server listening on http://{}:{}/graphql",
        settings.server.host,
        settings.server.port
    );

    axum::serve(listener, app)
        .await
        .context("HTTP server failed")?;

    Ok(())
}

/// Assemble routes first, then middlewares, so every route is layered.
fn build_router(schema: BiblioSchema, settings: &Settings) -> Router {
    let graphql_routes = Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .with_state(schema);

    RouterBuilder::new()
        .route("/healthz", get(health_check))
        .merge(graphql_routes)
        .with_tracing()
        .with_cors()
        .with_request_id()
        .with_timeout(settings.server.request_timeout_ms)
        .build()
}

async fn graphql_handler(State(schema): State<BiblioSchema>, req: GraphQLRequest) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

/// GraphiQL playground pointed at the GraphQL endpoint.
async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn healthz_responds_ok() {
        let router = RouterBuilder::new()
            .route("/healthz", get(health_check))
            .with_tracing()
            .with_timeout(5000)
            .build();

        let response = router
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let router = RouterBuilder::new()
            .route("/healthz", get(health_check))
            .build();

        let response = router
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
