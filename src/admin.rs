//! Index administration: core bootstrap, schema setup and reset.
//!
//! [`SchemaManager`] drives any [`EngineAdmin`] through the bootstrap
//! sequence for every managed core:
//!
//! 1. `STATUS` the core; `CREATE` it when missing.
//! 2. Look up the marker field. If it exists the core is done.
//! 3. Otherwise post the content field type, then the stored fields.
//!
//! Schema mutations are independent. A failed one is recorded and the
//! rest still run; the failures come back together as
//! [`EngineError::Schema`].
//!
//! Reset only touches the code core, and skips delete and unload when that
//! core does not exist yet.

use std::sync::Arc;

use async_trait::async_trait;
use heline_core::domain::{self, Domain, SCHEMA_MARKER_FIELD};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::traits::{EngineAdmin, IndexAdmin};

/// A core managed by [`SchemaManager`] and the domain whose schema it holds.
#[derive(Debug, Clone)]
pub struct ManagedCore {
    pub name: String,
    pub domain: Domain,
}

pub struct SchemaManager {
    engine: Arc<dyn EngineAdmin>,
    cores: Vec<ManagedCore>,
    code_core: String,
}

impl SchemaManager {
    /// Manages the code and docset cores named in `config`.
    pub fn new(engine: Arc<dyn EngineAdmin>, config: &EngineConfig) -> Self {
        Self {
            engine,
            cores: vec![
                ManagedCore {
                    name: config.code_core.clone(),
                    domain: domain::CODE,
                },
                ManagedCore {
                    name: config.docset_core.clone(),
                    domain: domain::DOCSET,
                },
            ],
            code_core: config.code_core.clone(),
        }
    }

    async fn setup_core(&self, core: &ManagedCore, failures: &mut Vec<String>) -> Result<(), EngineError> {
        if !self.engine.core_exists(&core.name).await? {
            info!(core = %core.name, "Core missing, creating");
            self.engine.create_core(&core.name).await?;
        }

        if self.engine.field_exists(&core.name, SCHEMA_MARKER_FIELD).await? {
            info!(core = %core.name, "Schema already set up");
            return Ok(());
        }

        let steps = [
            ("add-field-type", domain::content_field_type_body()),
            ("add-field", core.domain.add_fields_body()),
        ];
        for (step, body) in &steps {
            if let Err(e) = self.engine.update_schema(&core.name, body).await {
                warn!(core = %core.name, step, error = %e, "Schema mutation failed");
                failures.push(format!("{} {}: {}", core.name, step, e));
            }
        }
        info!(core = %core.name, "Schema set up");
        Ok(())
    }
}

#[async_trait]
impl IndexAdmin for SchemaManager {
    async fn setup_schema(&self) -> Result<(), EngineError> {
        let mut failures = Vec::new();
        for core in &self.cores {
            self.setup_core(core, &mut failures).await?;
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Schema(failures))
        }
    }

    async fn reset_index(&self, recreate_schema: bool) -> Result<(), EngineError> {
        info!(core = %self.code_core, recreate_schema, "Resetting index");
        let exists = self.engine.core_exists(&self.code_core).await?;

        if exists {
            self.engine.delete_all(&self.code_core).await?;
        } else {
            info!(core = %self.code_core, "Core missing, nothing to delete");
        }

        if recreate_schema {
            if exists {
                self.engine.unload_core(&self.code_core).await?;
            }
            self.setup_schema().await?;
        }
        Ok(())
    }
}
