use crate::db::database::Database;
use crate::provider::ReplicateClient;

/// Shared handles cloned into each request handler. There is no cross-request
/// mutable state; every generation runs as its own sequential pipeline.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub provider: ReplicateClient,
}

impl AppState {
    pub fn new(db: Database, provider: ReplicateClient) -> Self {
        AppState { db, provider }
    }
}
