use std::sync::Arc;

use crate::controller::DocumentController;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<DocumentController>,
}

impl AppState {
    pub fn new(controller: DocumentController) -> Self {
        Self {
            controller: Arc::new(controller),
        }
    }
}
