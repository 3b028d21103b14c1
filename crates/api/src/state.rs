use std::sync::Arc;

use driverelay_config::Settings;
use driverelay_services::{AuthorizationManager, StorageProvider};

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub auth: Arc<AuthorizationManager>,
    pub storage: Arc<dyn StorageProvider>,
}

impl AppState {
    pub fn new(settings: Settings, storage: Arc<dyn StorageProvider>) -> Self {
        let auth = Arc::new(AuthorizationManager::new(
            Arc::clone(&storage),
            &settings.drive,
        ));
        Self {
            settings,
            auth,
            storage,
        }
    }
}
