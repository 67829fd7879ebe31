use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

use super::Route;
use crate::composer::input::{parse_quantity, parse_unit_price};
use crate::composer::SessionView;
use crate::domain::{LineItemDraft, LineItemKey, ProductId};
use crate::error::ComposerError;
use crate::messages::ComposerRequest;

/// Handle to a running composer session.
///
/// Every method returns once the session has handled the request. Dropping
/// the last handle tears the session down.
#[derive(Clone)]
pub struct ComposerClient {
    sender: mpsc::Sender<ComposerRequest>,
}

impl ComposerClient {
    pub(crate) fn new(sender: mpsc::Sender<ComposerRequest>) -> Self {
        Self { sender }
    }

    /// Parses the raw quantity field and applies it. Blank clears the field.
    pub async fn edit_quantity(&self, key: LineItemKey, raw: &str) -> Result<SessionView, ComposerError> {
        let quantity = parse_quantity(raw)?;
        self.update_quantity(key, quantity).await
    }

    /// Parses the raw unit price field and applies it. Blank clears the field.
    pub async fn edit_unit_price(&self, key: LineItemKey, raw: &str) -> Result<SessionView, ComposerError> {
        let unit_price = parse_unit_price(raw)?;
        self.update_unit_price(key, unit_price).await
    }

    /// Stops the session. Results of fetches still in flight are discarded.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), ComposerError> {
        debug!("Sending request");
        self.sender
            .send(ComposerRequest::Shutdown)
            .await
            .map_err(|_| ComposerError::SessionClosed)
    }
}

composer_method!(ComposerClient => fn view() -> SessionView as ComposerRequest::View);
composer_method!(ComposerClient => fn wait_ready() -> SessionView as ComposerRequest::WaitReady);
composer_method!(ComposerClient => fn set_customer_name(name: String) -> SessionView as ComposerRequest::SetCustomerName);
composer_method!(ComposerClient => fn set_customer_phone(phone: String) -> SessionView as ComposerRequest::SetCustomerPhone);
composer_method!(ComposerClient => fn append_item(draft: LineItemDraft) -> LineItemKey as ComposerRequest::AppendItem);
composer_method!(ComposerClient => fn remove_item(key: LineItemKey) -> SessionView as ComposerRequest::RemoveItem);
composer_method!(ComposerClient => fn select_product(key: LineItemKey, product_id: ProductId) -> SessionView as ComposerRequest::SelectProduct);
composer_method!(ComposerClient => fn update_quantity(key: LineItemKey, quantity: Option<u32>) -> SessionView as ComposerRequest::UpdateQuantity);
composer_method!(ComposerClient => fn update_unit_price(key: LineItemKey, unit_price: Option<Decimal>) -> SessionView as ComposerRequest::UpdateUnitPrice);
composer_method!(ComposerClient => fn submit() -> SessionView as ComposerRequest::Submit);
composer_method!(ComposerClient => fn cancel() -> Route as ComposerRequest::Cancel);
