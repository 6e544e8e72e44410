//! Database service layer
//!
//! Bundles every repository over one shared document store

use std::sync::Arc;

use super::repositories::{
    ActivityRepository, CalificationRepository, EventRepository, FileRepository, MainConfigRepository,
    TicketRepository, UserRepository, WitnessRepository,
};
use super::store::DocumentStore;
use super::target::TargetResolver;
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub events: EventRepository,
    pub activities: ActivityRepository,
    pub tickets: TicketRepository,
    pub califications: CalificationRepository,
    pub witnesses: WitnessRepository,
    pub files: FileRepository,
    pub main_config: MainConfigRepository,
    pub targets: TargetResolver,
    store: Arc<dyn DocumentStore>,
}

impl std::fmt::Debug for DatabaseService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseService").finish_non_exhaustive()
    }
}

impl DatabaseService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let users = UserRepository::new(Arc::clone(&store));
        let events = EventRepository::new(Arc::clone(&store));
        let activities = ActivityRepository::new(Arc::clone(&store));

        Self {
            targets: TargetResolver::new(events.clone(), activities.clone(), users.clone()),
            tickets: TicketRepository::new(Arc::clone(&store)),
            califications: CalificationRepository::new(Arc::clone(&store)),
            witnesses: WitnessRepository::new(Arc::clone(&store)),
            files: FileRepository::new(Arc::clone(&store)),
            main_config: MainConfigRepository::new(Arc::clone(&store)),
            users,
            events,
            activities,
            store,
        }
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.store)
    }

    /// Check the backing store is reachable
    pub async fn health_check(&self) -> Result<()> {
        self.store.ping().await
    }
}
