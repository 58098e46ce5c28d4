use std::sync::Arc;

use crate::routes::tasks::TaskStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TaskStore>,
    pub expose_error_detail: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn TaskStore>, expose_error_detail: bool) -> Self {
        Self {
            store,
            expose_error_detail,
        }
    }
}
