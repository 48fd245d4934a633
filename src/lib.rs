pub mod api;
pub mod backend;
pub mod cli;
pub mod commands;
pub mod dashboards;
pub mod forms;
pub mod listing;
pub mod router;
pub mod session;
pub mod storage;

use std::sync::Arc;

use tokio::task::JoinHandle;
use url::Url;

use api::ApiClient;
use backend::Backend;
use router::RoleRouter;
use session::{SessionStore, Startup};
use storage::{Storage, StorageError};

pub struct ClientConfig {
    /// API root, e.g. `http://localhost:8080/api`
    pub api_url: Url,
    /// Durable session state (cloneable, pool inside)
    pub storage: Storage,
}

/// A started client: the restored session, the API client bound to it and a
/// router already synced with the restored state.
pub struct Client {
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
    pub router: RoleRouter,
    /// Identity fetch running when a token was restored without one.
    pub refresh: Option<JoinHandle<()>>,
}

impl Client {
    /// Wait for a start-up identity fetch, if one is running, and resync the
    /// router with its outcome.
    pub async fn settle(&mut self) {
        if let Some(refresh) = self.refresh.take() {
            // The task only logs; a panic inside it leaves the session as is.
            let _ = refresh.await;
        }
        self.router.sync(&self.session.session());
    }
}

/// Restore the session from storage and wire up the client.
pub async fn start_client(config: ClientConfig) -> Result<Client, StorageError> {
    let backend = Backend::new(&config.api_url);
    let Startup { store, refresh } = SessionStore::initialize(backend, &config.storage).await?;
    let router = RoleRouter::observing(&store.session());

    Ok(Client {
        api: ApiClient::new(store.clone()),
        session: store,
        router,
        refresh,
    })
}
