use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::info;

use crate::domain::OrderId;

/// Where the operator goes once a session is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The order list (`/`).
    OrderList,
    /// A single stored order (`/order/{id}`).
    OrderDetail(OrderId),
    /// Whatever screen the operator came from.
    Back,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrderList => write!(f, "/"),
            Self::OrderDetail(id) => write!(f, "/order/{id}"),
            Self::Back => write!(f, "back"),
        }
    }
}

/// Receives the navigation requests a session emits.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that only records the routes it is asked to visit.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<Route> {
        self.routes().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        info!(%route, "Navigating");
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::OrderList.to_string(), "/");
        assert_eq!(Route::OrderDetail(OrderId(14)).to_string(), "/order/14");
    }

    #[test]
    fn test_recording_navigator_keeps_order() {
        let navigator = RecordingNavigator::new();
        navigator.navigate(Route::Back);
        navigator.navigate(Route::OrderList);

        assert_eq!(navigator.routes(), vec![Route::Back, Route::OrderList]);
        assert_eq!(navigator.last(), Some(Route::OrderList));
    }
}
