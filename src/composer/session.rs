//! Per-session state machine.
//!
//! `Idle → Loading → Ready → Submitting → (Success | Failed)`, with
//! `Failed → Submitting` on retry and `Loading → Aborted` when the order to
//! edit cannot be loaded. Everything here is synchronous; the async edges
//! (fetches, submission) are driven by the composer service, which feeds
//! their results back in as events.

use std::fmt;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::catalog::CatalogSnapshot;
use super::store::LineItemStore;
use super::validator::validate;
use crate::clients::Route;
use crate::domain::{
    LineItem, LineItemDraft, LineItemKey, Order, OrderId, OrderPayload, OrderRecord, ProductId,
};
use crate::error::{CatalogError, ComposerError, PersistenceError};

/// Whether the session composes a new order or edits a stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeMode {
    Create,
    Edit(OrderId),
}

impl fmt::Display for ComposeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Edit(id) => write!(f, "edit({id})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Ready,
    Submitting,
    Success,
    Failed,
    Aborted,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Submitting => "submitting",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// What the operator sees after each event.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub state: SessionState,
    pub order_id: Option<OrderId>,
    pub customer_name: String,
    pub customer_phone: String,
    pub items: Vec<LineItem>,
    pub total: Decimal,
    pub catalog: CatalogSnapshot,
    pub catalog_available: bool,
    /// Last message for the operator: a degraded catalog, or the error
    /// returned by the order service.
    pub notice: Option<String>,
}

/// One create or edit session.
#[derive(Debug)]
pub struct OrderComposer {
    mode: ComposeMode,
    state: SessionState,
    customer_name: String,
    customer_phone: String,
    store: LineItemStore,
    catalog: CatalogSnapshot,
    catalog_available: bool,
    awaiting_catalog: bool,
    awaiting_order: bool,
    created_id: Option<OrderId>,
    notice: Option<String>,
    catalog_notice: Option<String>,
}

impl OrderComposer {
    pub fn new(mode: ComposeMode) -> Self {
        Self {
            mode,
            state: SessionState::Idle,
            customer_name: String::new(),
            customer_phone: String::new(),
            store: LineItemStore::with_blank_row(),
            catalog: CatalogSnapshot::empty(),
            catalog_available: false,
            awaiting_catalog: false,
            awaiting_order: false,
            created_id: None,
            notice: None,
            catalog_notice: None,
        }
    }

    pub fn mode(&self) -> ComposeMode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn store(&self) -> &LineItemStore {
        &self.store
    }

    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    fn transition(&mut self, next: SessionState) {
        info!(from = %self.state, to = %next, "Session state changed");
        self.state = next;
    }

    /// Starts the prerequisite fetches: the catalog always, the order only in
    /// edit mode.
    pub fn begin_loading(&mut self) -> Result<(), ComposerError> {
        if self.state != SessionState::Idle {
            return Err(ComposerError::InvalidState { state: self.state });
        }
        self.awaiting_catalog = true;
        self.awaiting_order = matches!(self.mode, ComposeMode::Edit(_));
        self.transition(SessionState::Loading);
        Ok(())
    }

    fn settle_loading(&mut self) {
        if self.state == SessionState::Loading && !self.awaiting_catalog && !self.awaiting_order {
            self.transition(SessionState::Ready);
        }
    }

    /// Applies the catalog fetch result. A failure leaves an empty catalog
    /// and a notice; the session still becomes ready.
    pub fn catalog_resolved(&mut self, result: Result<CatalogSnapshot, CatalogError>) {
        if !self.awaiting_catalog {
            warn!("Ignoring catalog result that was not requested");
            return;
        }
        self.awaiting_catalog = false;
        match result {
            Ok(snapshot) => {
                self.catalog = snapshot;
                self.catalog_available = true;
            }
            Err(e) => {
                warn!(error = %e, "Continuing without a catalog; product selection disabled");
                self.catalog = CatalogSnapshot::empty();
                self.catalog_available = false;
                self.catalog_notice = Some(e.to_string());
                self.notice = self.catalog_notice.clone();
            }
        }
        self.settle_loading();
    }

    /// Applies the edit-mode order fetch. On failure the session is aborted
    /// and the operator is sent back to the order list.
    pub fn order_resolved(
        &mut self,
        result: Result<OrderRecord, PersistenceError>,
    ) -> Option<Route> {
        if !self.awaiting_order {
            warn!("Ignoring order result that was not requested");
            return None;
        }
        self.awaiting_order = false;
        if self.state != SessionState::Loading {
            return None;
        }
        match result {
            Ok(record) => {
                debug!(order_id = %record.id, items = record.items.len(), "Hydrating from stored order");
                self.customer_name = record.customer_name;
                self.customer_phone = record.customer_phone;
                self.store = LineItemStore::hydrate(&record.items);
                self.settle_loading();
                None
            }
            Err(e) => {
                warn!(error = %e, "Order load failed; aborting session");
                self.notice = Some(ComposerError::OrderLoadFailed(e.to_string()).to_string());
                self.transition(SessionState::Aborted);
                Some(Route::OrderList)
            }
        }
    }

    /// Edits are allowed once loaded, and after a failed submission so the
    /// operator can fix the order and retry.
    fn ensure_editable(&self) -> Result<(), ComposerError> {
        match self.state {
            SessionState::Ready | SessionState::Failed => Ok(()),
            state => Err(ComposerError::InvalidState { state }),
        }
    }

    pub fn set_customer_name(&mut self, name: impl Into<String>) -> Result<(), ComposerError> {
        self.ensure_editable()?;
        self.customer_name = name.into();
        Ok(())
    }

    pub fn set_customer_phone(&mut self, phone: impl Into<String>) -> Result<(), ComposerError> {
        self.ensure_editable()?;
        self.customer_phone = phone.into();
        Ok(())
    }

    pub fn append_item(&mut self, draft: LineItemDraft) -> Result<LineItemKey, ComposerError> {
        self.ensure_editable()?;
        Ok(self.store.append(draft))
    }

    pub fn remove_item(&mut self, key: LineItemKey) -> Result<LineItem, ComposerError> {
        self.ensure_editable()?;
        Ok(self.store.remove(key)?)
    }

    pub fn select_product(
        &mut self,
        key: LineItemKey,
        product_id: ProductId,
    ) -> Result<&LineItem, ComposerError> {
        self.ensure_editable()?;
        Ok(self.store.select_product(key, product_id, &self.catalog)?)
    }

    pub fn update_quantity(
        &mut self,
        key: LineItemKey,
        quantity: Option<u32>,
    ) -> Result<&LineItem, ComposerError> {
        self.ensure_editable()?;
        Ok(self.store.update_quantity(key, quantity)?)
    }

    pub fn update_unit_price(
        &mut self,
        key: LineItemKey,
        unit_price: Option<Decimal>,
    ) -> Result<&LineItem, ComposerError> {
        self.ensure_editable()?;
        Ok(self.store.update_unit_price(key, unit_price)?)
    }

    /// The aggregate as currently edited.
    pub fn order(&self) -> Order {
        Order {
            customer_name: self.customer_name.clone(),
            customer_phone: self.customer_phone.clone(),
            total: self.store.total(),
            items: self.store.snapshot().to_vec(),
        }
    }

    /// Validates the order and, if it passes, enters `Submitting` and
    /// returns the payload to send. Only `Ready` and `Failed` may submit.
    pub fn begin_submit(&mut self) -> Result<OrderPayload, ComposerError> {
        match self.state {
            SessionState::Ready | SessionState::Failed => {}
            SessionState::Submitting => return Err(ComposerError::SubmissionInFlight),
            state => return Err(ComposerError::InvalidState { state }),
        }
        let order = validate(self.order()).map_err(ComposerError::Validation)?;
        let payload =
            OrderPayload::try_from(&order).map_err(|e| ComposerError::Validation(vec![e]))?;
        // A degraded catalog stays reported for the whole session.
        self.notice = self.catalog_notice.clone();
        self.transition(SessionState::Submitting);
        Ok(payload)
    }

    /// Records a successful submission and returns where to navigate next.
    pub fn submission_succeeded(&mut self, created: Option<OrderId>) -> Option<Route> {
        if self.state != SessionState::Submitting {
            warn!(state = %self.state, "Ignoring submission result outside submitting");
            return None;
        }
        self.transition(SessionState::Success);
        match self.mode {
            ComposeMode::Create => {
                self.created_id = created;
                Some(Route::OrderList)
            }
            ComposeMode::Edit(id) => Some(Route::OrderDetail(id)),
        }
    }

    /// Records a failed submission. All edits are kept and the service's
    /// message is shown as is.
    pub fn submission_failed(&mut self, message: String) {
        if self.state != SessionState::Submitting {
            warn!(state = %self.state, "Ignoring submission failure outside submitting");
            return;
        }
        self.notice = Some(message);
        self.transition(SessionState::Failed);
    }

    /// Leaves the session without submitting.
    pub fn cancel(&self) -> Result<Route, ComposerError> {
        if self.state == SessionState::Submitting {
            return Err(ComposerError::SubmissionInFlight);
        }
        Ok(Route::Back)
    }

    pub fn view(&self) -> SessionView {
        let order_id = match self.mode {
            ComposeMode::Create => self.created_id,
            ComposeMode::Edit(id) => Some(id),
        };
        SessionView {
            state: self.state,
            order_id,
            customer_name: self.customer_name.clone(),
            customer_phone: self.customer_phone.clone(),
            items: self.store.snapshot().to_vec(),
            total: self.store.total(),
            catalog: self.catalog.clone(),
            catalog_available: self.catalog_available,
            notice: self.notice.clone(),
        }
    }
}
