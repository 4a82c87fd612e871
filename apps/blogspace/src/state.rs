//! Application state - the backend handles every page works through.

use std::sync::Arc;

use blogspace_core::ports::{AuthService, BlogRepository, PostRepository, ProfileRepository};
use blogspace_infra::auth::new_session_store;
use blogspace_infra::{
    BackendConfig, DataRepository, InMemoryAuthService, InMemoryDataClient, RestAuthService,
    RestDataClient,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthService>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub blogs: Arc<dyn BlogRepository>,
    pub posts: Arc<dyn PostRepository>,
}

impl AppState {
    /// Wire the hosted backend. The auth client and the data client share
    /// one session so requests are made as the signed-in user.
    pub fn connect(config: &BackendConfig) -> Self {
        let session = new_session_store();
        let data = Arc::new(RestDataClient::new(config, session.clone()));
        let auth = Arc::new(RestAuthService::new(config, session));

        tracing::info!(backend = %config.url, "Application state initialized");
        Self::from_parts(auth, DataRepository::new(data))
    }

    /// In-process backend with local accounts.
    pub fn in_memory() -> (Self, Arc<InMemoryAuthService>) {
        let data = Arc::new(InMemoryDataClient::new());
        let auth = Arc::new(InMemoryAuthService::new(data.clone()));

        let state = Self::from_parts(auth.clone(), DataRepository::new(data));
        (state, auth)
    }

    fn from_parts(auth: Arc<dyn AuthService>, repo: DataRepository) -> Self {
        Self {
            auth,
            profiles: Arc::new(repo.clone()),
            blogs: Arc::new(repo.clone()),
            posts: Arc::new(repo),
        }
    }
}
