//! Application state shared by every request handler

use std::sync::Arc;

use crate::config::Settings;
use crate::database::{DatabaseService, DocumentStore};
use crate::services::{ObjectStore, ServiceFactory};

#[derive(Clone, Debug)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: DatabaseService,
    pub services: Arc<ServiceFactory>,
}

impl AppState {
    /// Wire repositories and services over the given backends
    pub fn new(settings: Settings, store: Arc<dyn DocumentStore>, objects: Arc<dyn ObjectStore>) -> Self {
        let db = DatabaseService::new(store);
        let services = ServiceFactory::new(&settings, db.clone(), objects);

        Self {
            settings: Arc::new(settings),
            db,
            services: Arc::new(services),
        }
    }
}
