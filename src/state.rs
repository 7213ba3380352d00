use crate::client::BackendClient;
use crate::loader::DataLoader;
use std::{path::PathBuf, sync::Arc};

#[derive(Clone)]
pub struct AppState {
    pub loader: Arc<DataLoader>,
    pub client: BackendClient,
    pub preferences_path: PathBuf,
}

impl AppState {
    pub fn new(loader: Arc<DataLoader>, client: BackendClient, preferences_path: PathBuf) -> Self {
        Self {
            loader,
            client,
            preferences_path,
        }
    }
}
