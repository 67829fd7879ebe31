use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use crate::clients::{CatalogSource, ComposerClient, Navigator, OrderPersistence};
use crate::composer::{CatalogSnapshot, ComposeMode, OrderComposer, SessionState, SessionView};
use crate::domain::{OrderId, OrderRecord};
use crate::error::{ComposerError, PersistenceError};
use crate::messages::{ComposerRequest, ServiceResponse};

// =============================================================================
// COMPOSER SERVICE
// =============================================================================

/// Drives one create or edit session.
///
/// Requests are handled strictly one at a time. The catalog fetch, the
/// edit-mode order fetch and the submission run as background tasks that
/// post their result back to this service's own mailbox through a weak
/// sender; once the session is torn down those results go nowhere.
pub struct ComposerService {
    receiver: mpsc::Receiver<ComposerRequest>,
    loopback: mpsc::WeakSender<ComposerRequest>,
    composer: OrderComposer,
    catalog_source: Arc<dyn CatalogSource>,
    orders: Arc<dyn OrderPersistence>,
    navigator: Arc<dyn Navigator>,
    ready_waiters: Vec<ServiceResponse<SessionView, ComposerError>>,
    pending_submit: Option<ServiceResponse<SessionView, ComposerError>>,
    load_failure: Option<String>,
}

impl ComposerService {
    pub fn new(
        buffer_size: usize,
        mode: ComposeMode,
        catalog_source: Arc<dyn CatalogSource>,
        orders: Arc<dyn OrderPersistence>,
        navigator: Arc<dyn Navigator>,
    ) -> (Self, ComposerClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            loopback: sender.downgrade(),
            composer: OrderComposer::new(mode),
            catalog_source,
            orders,
            navigator,
            ready_waiters: Vec::new(),
            pending_submit: None,
            load_failure: None,
        };
        let client = ComposerClient::new(sender);
        (service, client)
    }

    #[instrument(name = "composer_service", skip(self), fields(mode = %self.composer.mode()))]
    pub async fn run(mut self) {
        info!("ComposerService starting");
        self.start_loading();

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ComposerRequest::View { respond_to } => {
                    let _ = respond_to.send(Ok(self.composer.view()));
                }
                ComposerRequest::WaitReady { respond_to } => {
                    self.ready_waiters.push(respond_to);
                    self.settle_waiters();
                }
                ComposerRequest::SetCustomerName { name, respond_to } => {
                    let outcome = self.composer.set_customer_name(name);
                    let _ = respond_to.send(self.view_after(outcome));
                }
                ComposerRequest::SetCustomerPhone { phone, respond_to } => {
                    let outcome = self.composer.set_customer_phone(phone);
                    let _ = respond_to.send(self.view_after(outcome));
                }
                ComposerRequest::AppendItem { draft, respond_to } => {
                    let _ = respond_to.send(self.composer.append_item(draft));
                }
                ComposerRequest::RemoveItem { key, respond_to } => {
                    let outcome = self.composer.remove_item(key).map(drop);
                    let _ = respond_to.send(self.view_after(outcome));
                }
                ComposerRequest::SelectProduct {
                    key,
                    product_id,
                    respond_to,
                } => {
                    let outcome = self.composer.select_product(key, product_id).map(drop);
                    let _ = respond_to.send(self.view_after(outcome));
                }
                ComposerRequest::UpdateQuantity {
                    key,
                    quantity,
                    respond_to,
                } => {
                    let outcome = self.composer.update_quantity(key, quantity).map(drop);
                    let _ = respond_to.send(self.view_after(outcome));
                }
                ComposerRequest::UpdateUnitPrice {
                    key,
                    unit_price,
                    respond_to,
                } => {
                    let outcome = self.composer.update_unit_price(key, unit_price).map(drop);
                    let _ = respond_to.send(self.view_after(outcome));
                }
                ComposerRequest::Submit { respond_to } => {
                    self.handle_submit(respond_to);
                }
                ComposerRequest::Cancel { respond_to } => match self.composer.cancel() {
                    Ok(route) => {
                        info!(%route, "Session cancelled");
                        self.navigator.navigate(route);
                        let _ = respond_to.send(Ok(route));
                        break;
                    }
                    Err(e) => {
                        let _ = respond_to.send(Err(e));
                    }
                },
                ComposerRequest::Shutdown => {
                    info!("ComposerService shutting down");
                    break;
                }
                ComposerRequest::CatalogLoaded(result) => {
                    self.composer.catalog_resolved(result);
                    self.settle_waiters();
                }
                ComposerRequest::OrderLoaded(result) => {
                    self.handle_order_loaded(result);
                    if self.composer.state() == SessionState::Aborted {
                        info!("Order load failed; ending session");
                        break;
                    }
                }
                ComposerRequest::SubmissionFinished(result) => {
                    self.handle_submission_finished(result);
                }
            }
        }
        info!(state = %self.composer.state(), "ComposerService stopped");
    }

    fn start_loading(&mut self) {
        if let Err(e) = self.composer.begin_loading() {
            warn!(error = %e, "Session already started");
            return;
        }

        let source = Arc::clone(&self.catalog_source);
        self.deliver(async move {
            ComposerRequest::CatalogLoaded(CatalogSnapshot::load(source.as_ref()).await)
        });

        if let ComposeMode::Edit(id) = self.composer.mode() {
            let orders = Arc::clone(&self.orders);
            self.deliver(async move { ComposerRequest::OrderLoaded(orders.fetch(id).await) });
        }
    }

    /// Runs `work` in the background and posts its result back to this
    /// session, unless the session has been torn down by then.
    fn deliver<F>(&self, work: F)
    where
        F: Future<Output = ComposerRequest> + Send + 'static,
    {
        let loopback = self.loopback.clone();
        tokio::spawn(async move {
            let event = work.await;
            let Some(sender) = loopback.upgrade() else {
                debug!("Session torn down; discarding result");
                return;
            };
            if sender.send(event).await.is_err() {
                debug!("Session closed; discarding result");
            }
        });
    }

    fn view_after(&self, outcome: Result<(), ComposerError>) -> Result<SessionView, ComposerError> {
        match outcome {
            Ok(()) => Ok(self.composer.view()),
            Err(e) => {
                debug!(error = %e, "Request rejected");
                Err(e)
            }
        }
    }

    /// Answers everyone waiting for the session to finish loading, once it has.
    fn settle_waiters(&mut self) {
        let outcome = match self.composer.state() {
            SessionState::Idle | SessionState::Loading => return,
            SessionState::Aborted => Err(ComposerError::OrderLoadFailed(
                self.load_failure.clone().unwrap_or_default(),
            )),
            _ => Ok(self.composer.view()),
        };
        for waiter in self.ready_waiters.drain(..) {
            let _ = waiter.send(outcome.clone());
        }
    }

    fn handle_order_loaded(&mut self, result: Result<OrderRecord, PersistenceError>) {
        if let Err(e) = &result {
            self.load_failure = Some(e.to_string());
        }
        if let Some(route) = self.composer.order_resolved(result) {
            self.navigator.navigate(route);
        }
        self.settle_waiters();
    }

    #[instrument(skip(self, respond_to))]
    fn handle_submit(&mut self, respond_to: ServiceResponse<SessionView, ComposerError>) {
        let payload = match self.composer.begin_submit() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Submission refused");
                let _ = respond_to.send(Err(e));
                return;
            }
        };
        info!(total = %payload.total, items = payload.items.len(), "Submitting order");
        self.pending_submit = Some(respond_to);

        let orders = Arc::clone(&self.orders);
        let mode = self.composer.mode();
        self.deliver(async move {
            let result = match mode {
                ComposeMode::Create => orders.create(payload).await,
                ComposeMode::Edit(id) => orders.update(id, payload).await.map(|()| Some(id)),
            };
            ComposerRequest::SubmissionFinished(result)
        });
    }

    fn handle_submission_finished(&mut self, result: Result<Option<OrderId>, PersistenceError>) {
        let reply = match result {
            Ok(created) => {
                info!(order_id = ?created, "Order saved");
                if let Some(route) = self.composer.submission_succeeded(created) {
                    self.navigator.navigate(route);
                }
                Ok(self.composer.view())
            }
            Err(e) => {
                let message = e.to_string();
                error!(error = %message, "Order submission failed");
                self.composer.submission_failed(message.clone());
                Err(ComposerError::SubmissionFailed(message))
            }
        };
        if let Some(respond_to) = self.pending_submit.take() {
            let _ = respond_to.send(reply);
        }
    }
}
