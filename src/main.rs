use std::collections::BTreeMap;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use flagserve::config;
use flagserve::model::{FeatureFlag, Variant};
use flagserve::routes;
use flagserve::state::AppState;
use flagserve::store::{FlagStore, InMemoryFlagStore};

#[tokio::main]
async fn main() {
    let config = config::Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flagserve=info")),
        )
        .init();

    let store: Arc<dyn FlagStore> = Arc::new(InMemoryFlagStore::new());
    seed_flags(&store).await;

    let state = AppState::new(store);

    let app = routes::routes().with_state(state);

    let listener = tokio::net::TcpListener::bind(config.addr()).await.unwrap();

    tracing::info!("listening on http://{}", config.addr());

    axum::serve(listener, app).await.unwrap();
}

/// Seed a demo flag into an empty store so a fresh instance has something to
/// list and evaluate.
async fn seed_flags(store: &Arc<dyn FlagStore>) {
    let existing = store.list().await.expect("Error reading store at startup");
    if !existing.is_empty() {
        return;
    }

    let variants = vec![
        Variant {
            name: "A".to_string(),
            weight: Some(50),
            rule: Some(BTreeMap::from([(
                "country".to_string(),
                "IE".to_string(),
            )])),
        },
        Variant {
            name: "B".to_string(),
            weight: Some(50),
            rule: Some(BTreeMap::from([(
                "plan".to_string(),
                "premium".to_string(),
            )])),
        },
    ];

    let flag = FeatureFlag::new("homepage_banner", true).with_variants(variants);
    store.create(flag).await.expect("Error seeding flags");

    tracing::info!("seeded homepage_banner flag");
}
