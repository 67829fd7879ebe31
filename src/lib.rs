//! Order line-item composer: builds and edits customer orders against a
//! product catalog, keeps subtotals and totals consistent on every edit, and
//! hands validated orders to an order service.

pub mod actor_framework;
pub mod actors;
pub mod app_system;
pub mod clients;
pub mod composer;
pub mod domain;
pub mod error;
pub mod messages;
pub mod order_actor;

#[cfg(test)]
mod mock_framework;
