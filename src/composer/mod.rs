//! The order line-item composer: line item store, derivation engine,
//! validator and the per-session state machine that binds them.

pub mod catalog;
pub mod derivation;
pub mod input;
pub mod session;
pub mod store;
pub mod validator;

pub use catalog::CatalogSnapshot;
pub use session::{ComposeMode, OrderComposer, SessionState, SessionView};
pub use store::LineItemStore;
pub use validator::validate;
