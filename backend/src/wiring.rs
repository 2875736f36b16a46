//! Startup wiring from settings to a ready [`ListEditor`].
//!
//! The sync strategy is chosen once here; nothing downstream knows which
//! adapter is in use.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, SharedListsSettings, SyncMode};
use crate::domain::ports::{FixtureUserDirectory, ListSyncStrategy, UserDirectory};
use crate::domain::{ListEditor, ListStore, Locale, SyncMediator};
use crate::outbound::mock::{InMemoryListSync, MockSeed, SeedError};
use crate::outbound::remote::{HttpListSync, HttpUserDirectory, PersistenceClient};

/// Errors returned while assembling the core.
#[derive(Debug, Error)]
pub enum WiringError {
    /// Settings could not be interpreted.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Mock seed could not be loaded.
    #[error(transparent)]
    Seed(#[from] SeedError),
    /// HTTP client could not be constructed.
    #[error("failed to build persistence client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Core services assembled for one process.
#[derive(Clone)]
pub struct Services {
    /// Canonical list collection.
    pub store: Arc<ListStore>,
    /// Item, member and title operations over the store.
    pub editor: ListEditor,
    /// Strategy backing the store.
    pub mode: SyncMode,
    /// Locale used when a caller does not pick one.
    pub locale: Locale,
}

/// Build the core from settings.
///
/// # Examples
///
/// ```rust,no_run
/// use shared_lists::config::SharedListsSettings;
/// use shared_lists::wiring::build_services;
/// use ortho_config::OrthoConfig;
/// use std::ffi::OsString;
///
/// # fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = SharedListsSettings::load_from_iter([OsString::from("shared-lists")])?;
/// let services = build_services(&settings)?;
/// assert!(services.store.get_all_lists().is_empty());
/// # Ok(())
/// # }
/// ```
pub fn build_services(settings: &SharedListsSettings) -> Result<Services, WiringError> {
    let mode = settings.sync_mode()?;
    let locale = settings.locale()?;
    let (strategy, directory) = match mode {
        SyncMode::Mock => mock_adapters(settings)?,
        SyncMode::Remote => remote_adapters(settings)?,
    };
    let mediator = SyncMediator::new(strategy, directory).with_timeout(settings.request_timeout());
    let store = Arc::new(ListStore::new(mediator).with_policy(settings.concurrency_policy()));
    info!(
        %mode,
        timeout_ms = settings.request_timeout_ms,
        policy = ?store.policy(),
        "shared list core ready"
    );
    Ok(Services {
        editor: ListEditor::new(Arc::clone(&store)),
        store,
        mode,
        locale,
    })
}

type Adapters = (Arc<dyn ListSyncStrategy>, Arc<dyn UserDirectory>);

fn mock_adapters(settings: &SharedListsSettings) -> Result<Adapters, WiringError> {
    let seed = match settings.mock_seed_path.as_deref() {
        Some(path) => {
            info!(path = %path.display(), "loading mock seed");
            MockSeed::load(path)?
        }
        None => MockSeed::built_in()?,
    };
    let strategy = InMemoryListSync::new(seed.shopping_lists).with_latency(settings.mock_latency());
    Ok((
        Arc::new(strategy),
        Arc::new(FixtureUserDirectory::new(seed.users)),
    ))
}

fn remote_adapters(settings: &SharedListsSettings) -> Result<Adapters, WiringError> {
    let base_url = settings.require_persistence_url()?;
    info!(url = %base_url, "using persistence service");
    let client = PersistenceClient::new(base_url, settings.request_timeout())?;
    Ok((
        Arc::new(HttpListSync::new(client.clone())),
        Arc::new(HttpUserDirectory::new(client)),
    ))
}
