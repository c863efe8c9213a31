use std::{path::PathBuf, sync::Arc};

use dose_core::DoseStore;

/// Shared handler state, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DoseStore>,
    pub dashboard_path: PathBuf,
}

impl AppState {
    pub fn new(store: Arc<dyn DoseStore>, dashboard_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            dashboard_path: dashboard_path.into(),
        }
    }
}
