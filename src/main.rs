use anyhow::Context;

use biblio_db::Store;
use biblio_graphql::build_schema;
use biblio_kernel::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load biblio settings")?;
    biblio_telemetry::init(&settings.telemetry);

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "biblio-app bootstrap starting"
    );

    let store = Store::connect(&settings.database.url)
        .await
        .with_context(|| "failed to connect to the store")?;

    // Schema must exist before the first operation is accepted; a failure
    // here is fatal.
    store
        .sync_schema()
        .await
        .with_context(|| "failed to synchronize store schema")?;

    let schema = build_schema(store);
    biblio_http::start_server(schema, &settings).await
}
