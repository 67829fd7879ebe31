use rust_decimal::Decimal;
use tokio::sync::oneshot;

use crate::clients::Route;
use crate::composer::{CatalogSnapshot, SessionView};
use crate::domain::{LineItemDraft, LineItemKey, OrderId, OrderRecord, ProductId};
use crate::error::{CatalogError, ComposerError, PersistenceError};

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Messages handled by a composer session. Operator requests carry a oneshot
/// channel for the reply; the `*Loaded` and `SubmissionFinished` variants
/// are sent by the session's own background tasks.
#[derive(Debug)]
pub enum ComposerRequest {
    View {
        respond_to: ServiceResponse<SessionView, ComposerError>,
    },
    WaitReady {
        respond_to: ServiceResponse<SessionView, ComposerError>,
    },
    SetCustomerName {
        name: String,
        respond_to: ServiceResponse<SessionView, ComposerError>,
    },
    SetCustomerPhone {
        phone: String,
        respond_to: ServiceResponse<SessionView, ComposerError>,
    },
    AppendItem {
        draft: LineItemDraft,
        respond_to: ServiceResponse<LineItemKey, ComposerError>,
    },
    RemoveItem {
        key: LineItemKey,
        respond_to: ServiceResponse<SessionView, ComposerError>,
    },
    SelectProduct {
        key: LineItemKey,
        product_id: ProductId,
        respond_to: ServiceResponse<SessionView, ComposerError>,
    },
    UpdateQuantity {
        key: LineItemKey,
        quantity: Option<u32>,
        respond_to: ServiceResponse<SessionView, ComposerError>,
    },
    UpdateUnitPrice {
        key: LineItemKey,
        unit_price: Option<Decimal>,
        respond_to: ServiceResponse<SessionView, ComposerError>,
    },
    /// Answered once the order service has replied.
    Submit {
        respond_to: ServiceResponse<SessionView, ComposerError>,
    },
    Cancel {
        respond_to: ServiceResponse<Route, ComposerError>,
    },
    Shutdown,
    CatalogLoaded(Result<CatalogSnapshot, CatalogError>),
    OrderLoaded(Result<OrderRecord, PersistenceError>),
    SubmissionFinished(Result<Option<OrderId>, PersistenceError>),
}
