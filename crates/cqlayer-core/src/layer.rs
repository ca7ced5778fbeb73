//! Storage layer: long-lived owner of the shared transport and caches.

use crate::{
    catalog::SchemaCatalog,
    config::ClusterConfig,
    error::InternalError,
    materialize::PostEvaluation,
    model::{ModelRegistry, TypeRegistry},
    naming::{Naming, SnakeCaseNaming},
    session::StorageSession,
    transport::{Transport, TransportConnector},
};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

///
/// StorageLayer
///
/// Validated configuration plus the handles every session shares. The
/// transport is built on the first `begin` and rebuilt only once it
/// reports closed; concurrent callers never build it twice.
///

pub struct StorageLayer {
    config: ClusterConfig,
    connector: Arc<dyn TransportConnector>,
    catalog: Arc<dyn SchemaCatalog>,
    naming: Arc<dyn Naming>,
    models: Arc<ModelRegistry>,
    types: Arc<TypeRegistry>,
    post_evaluation: PostEvaluation,
    transport: Mutex<Option<Arc<dyn Transport>>>,
}

impl StorageLayer {
    pub fn new(
        config: ClusterConfig,
        connector: Arc<dyn TransportConnector>,
        catalog: Arc<dyn SchemaCatalog>,
    ) -> Result<Self, InternalError> {
        config.validate()?;

        Ok(Self {
            config,
            connector,
            catalog,
            naming: Arc::new(SnakeCaseNaming),
            models: Arc::new(ModelRegistry::new()),
            types: Arc::new(TypeRegistry::new()),
            post_evaluation: PostEvaluation::default(),
            transport: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn with_naming(mut self, naming: Arc<dyn Naming>) -> Self {
        self.naming = naming;
        self
    }

    #[must_use]
    pub fn with_post_evaluation(mut self, post_evaluation: PostEvaluation) -> Self {
        self.post_evaluation = post_evaluation;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Types resolvable from type-reference columns.
    #[must_use]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    #[must_use]
    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    /// Open a session over the shared transport, connecting if needed.
    pub fn begin(&self) -> Result<StorageSession, InternalError> {
        let transport = self.transport()?;

        Ok(StorageSession::new(
            transport,
            self.catalog.clone(),
            self.naming.clone(),
            self.models.clone(),
            self.types.clone(),
        )
        .with_post_evaluation(self.post_evaluation))
    }

    fn transport(&self) -> Result<Arc<dyn Transport>, InternalError> {
        let mut slot = self.transport.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(transport) = slot.as_ref()
            && !transport.is_closed()
        {
            return Ok(transport.clone());
        }

        let transport = self.connector.connect(&self.config)?;
        info!(
            keyspace = %self.config.keyspace,
            contact_points = ?self.config.contact_points,
            reconnect = slot.is_some(),
            "transport connected"
        );
        *slot = Some(transport.clone());

        Ok(transport)
    }
}

///
/// TESTS
///
