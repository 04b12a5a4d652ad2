//! Walks a cart through a shopping session: add lines, toggle and select all, then clean
//! up after a placed order.
//!
//! With `CART_API_BASE_URL` set the session runs against that REST backend; otherwise an
//! in-process backend with a small catalog is started.

use cart_sync::config::CartConfig;
use cart_sync::model::{CartLinePatch, SkuId};
use cart_sync::runtime::{setup_tracing, CartSystem};
use cart_sync::service::{CartService, Catalog, CatalogEntry, HttpCartService};
use cart_sync::store::{CartError, CartStore, Notifier, TracingNotifier};
use tracing::{info, Instrument};

fn demo_catalog() -> Catalog {
    Catalog::new()
        .with_sku(
            7,
            CatalogEntry::new("Linen Shirt", 39.0)
                .with_variant("white", "M")
                .with_image("/static/linen-shirt.png"),
        )
        .with_sku(8, CatalogEntry::new("Canvas Tote", 12.5))
        .with_sku(9, CatalogEntry::new("Wool Socks", 8.0).with_variant("grey", "L"))
}

async fn run_session<S: CartService, N: Notifier>(store: &CartStore<S, N>) -> Result<(), CartError> {
    store.fetch().await?;

    async {
        store.add(SkuId(7), 1).await?;
        store.add(SkuId(8), 2).await?;
        store.add(SkuId(9), 3).await?;
        match store.lines().last() {
            Some(line) => store.update(line.id, CartLinePatch::quantity(2)).await,
            None => Ok(()),
        }
    }
    .instrument(tracing::info_span!("shopping"))
    .await?;

    info!(count = store.count(), lines = store.lines().len(), "Cart filled");

    if let Some(first) = store.lines().first() {
        store.toggle_select(first.id).await?;
        info!(
            selected = store.selected_count(),
            total = store.selected_total(),
            "Toggled first line"
        );
    }

    store.select_all(true).await?;
    info!(
        all_selected = store.all_selected(),
        total = store.selected_total(),
        "Selected everything"
    );

    let report = store
        .remove_selected_items()
        .instrument(tracing::info_span!("checkout_cleanup"))
        .await?;
    info!(
        removed = report.removed,
        failed = report.failed.len(),
        remaining = store.lines().len(),
        "Order placed"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = CartConfig::from_env().map_err(|e| e.to_string())?;

    if config.api_base_url.is_some() {
        let service = HttpCartService::from_config(&config).map_err(|e| e.to_string())?;
        info!(base_url = service.base_url(), "Starting cart demo against remote service");
        let store = CartStore::from_config(service, TracingNotifier, &config);
        return run_session(&store).await.map_err(|e| e.to_string());
    }

    info!("Starting cart demo against in-process service");
    let system = CartSystem::new(&config, demo_catalog(), TracingNotifier);
    run_session(&system.store).await.map_err(|e| e.to_string())?;
    system.shutdown().await
}
