use std::sync::Arc;

use crate::store::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, max_upload_bytes: usize) -> Self {
        Self {
            store,
            max_upload_bytes,
        }
    }
}
