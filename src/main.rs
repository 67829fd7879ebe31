use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{error, info, warn, Instrument};

use order_composer::app_system::{setup_tracing, ComposerConfig, OrderSystem, SystemError};
use order_composer::clients::{ComposerClient, Navigator, RecordingNavigator};
use order_composer::composer::SessionView;
use order_composer::domain::{LineItemDraft, OrderId};
use order_composer::error::ComposerError;

/// Fills a new order with the first two catalog products and submits it.
async fn compose_demo_order(session: &ComposerClient) -> Result<Option<OrderId>, ComposerError> {
    let view = session.wait_ready().await?;
    let Some(product) = view.catalog.products().first() else {
        warn!("Catalog is empty; nothing to order");
        return Ok(None);
    };

    let first = view.items[0].key;
    session.set_customer_name("Awa Koné".to_string()).await?;
    session.set_customer_phone("0123456789".to_string()).await?;
    session.select_product(first, product.id).await?;
    session.edit_quantity(first, "3").await?;

    let second = session.append_item(LineItemDraft::default()).await?;
    let view = match view.catalog.products().get(1) {
        Some(other) => session.select_product(second, other.id).await?,
        None => session.update_unit_price(second, Some(Decimal::from(250))).await?,
    };
    info!(total = %view.total, items = view.items.len(), "Order composed");

    let view = session.submit().await?;
    Ok(view.order_id)
}

async fn raise_first_quantity(session: &ComposerClient) -> Result<SessionView, ComposerError> {
    let view = session.wait_ready().await?;
    session.edit_quantity(view.items[0].key, "5").await?;
    session.submit().await
}

#[tokio::main]
async fn main() -> Result<(), SystemError> {
    dotenvy::dotenv().ok();

    // Setup tracing once for the entire application
    setup_tracing();

    let config = ComposerConfig::from_env()?;
    info!(?config, "Starting order composer");

    let navigator: Arc<dyn Navigator> = Arc::new(RecordingNavigator::new());
    let mut system = OrderSystem::new(&config, navigator)?;

    let session = system.open_create_session();
    let created = compose_demo_order(&session)
        .instrument(tracing::info_span!("create_session"))
        .await;
    session.shutdown().await.ok();
    drop(session);

    let created = match created {
        Ok(id) => id,
        Err(e) => {
            error!(error = %e, "Order creation failed");
            None
        }
    };

    if let Some(id) = created {
        let session = system.open_edit_session(id);
        let edited = raise_first_quantity(&session)
            .instrument(tracing::info_span!("edit_session", order_id = %id))
            .await;
        match edited {
            Ok(view) => info!(total = %view.total, "Order updated"),
            Err(e) => error!(error = %e, "Order update failed"),
        }
        session.shutdown().await.ok();
    }

    match system.order_summary().await {
        Ok(summary) => info!(
            orders = summary.order_count,
            revenue = %summary.revenue,
            articles = summary.article_count,
            "Order list"
        ),
        Err(e) => error!(error = %e, "Could not list orders"),
    }

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
