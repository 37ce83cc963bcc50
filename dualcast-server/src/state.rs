//! Shared server state.

use dualcast_core::advice::AdviceService;
use dualcast_core::ForecastService;
use std::sync::Arc;

/// Service handles shared by every handler. Both services are read-only
/// after startup, so concurrent requests share one instance each.
#[derive(Clone)]
pub struct AppState {
    pub forecast: Arc<ForecastService>,
    pub advice: Arc<AdviceService>,
}

impl AppState {
    pub fn new(forecast: ForecastService, advice: AdviceService) -> Self {
        Self {
            forecast: Arc::new(forecast),
            advice: Arc::new(advice),
        }
    }
}
