//! Schema resolver with a configurable cache lifetime

use super::types::ColumnSchema;
use crate::config::SchemaCachePolicy;
use crate::database::Destination;
use crate::error::Result;
use std::collections::HashMap;

/// Resolves entity types to destination schemas
#[derive(Debug, Default)]
pub struct SchemaResolver {
    policy: SchemaCachePolicy,
    cache: HashMap<String, ColumnSchema>,
}

impl SchemaResolver {
    /// Create a resolver with the given cache policy
    pub fn new(policy: SchemaCachePolicy) -> Self {
        Self {
            policy,
            cache: HashMap::new(),
        }
    }

    /// Cache policy in effect
    pub fn policy(&self) -> SchemaCachePolicy {
        self.policy
    }

    /// Called before each file; drops cached schemas under the per-file policy
    pub fn begin_file(&mut self) {
        if self.policy == SchemaCachePolicy::PerFile {
            self.cache.clear();
        }
    }

    /// Resolve the schema for an entity type
    pub fn resolve(
        &mut self,
        destination: &mut dyn Destination,
        entity_type: &str,
    ) -> Result<ColumnSchema> {
        if let Some(schema) = self.cache.get(entity_type) {
            tracing::debug!(entity_type, "Using cached schema");
            return Ok(schema.clone());
        }

        let schema = destination.describe_table(entity_type)?;
        tracing::debug!(
            entity_type,
            columns = schema.len(),
            "Resolved destination schema"
        );
        self.cache.insert(entity_type.to_string(), schema.clone());
        Ok(schema)
    }

    /// Number of cached schemas
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}
