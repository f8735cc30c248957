//! Filter construction from configuration references.
//!
//! # Responsibilities
//! - Map filter names to factories (the built-in set plus custom
//!   registrations)
//! - Construct filters from a `FilterRef`, reporting unknown names and bad
//!   parameters as load-time errors
//!
//! # Design Decisions
//! - Explicit construction, no ambient registry: the gateway is handed the
//!   registry it resolves against
//! - Factories receive the raw parameter table, so new filters define their
//!   own parameters without schema changes

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::config::schema::FilterRef;
use crate::filter::header::AddRequestHeaderFilter;
use crate::filter::request_time::RequestTimeFilter;
use crate::filter::token::AccessTokenFilter;
use crate::filter::{header, request_time, token, Filter};

/// Errors raised while resolving a filter reference.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown filter {0:?}")]
    Unknown(String),

    #[error("filter {name:?}: {reason}")]
    InvalidParams { name: String, reason: String },
}

/// Constructor for one named filter kind.
pub type FilterFactory =
    Box<dyn Fn(&toml::Table) -> Result<Arc<dyn Filter>, String> + Send + Sync>;

/// Name-to-factory table used when compiling routes.
pub struct FilterRegistry {
    factories: HashMap<String, FilterFactory>,
}

impl FilterRegistry {
    /// Registry with the built-in filters: `token`, `request_time`,
    /// `add_request_header`.
    pub fn builtin() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };

        registry.register(token::NAME, |_params| {
            Ok(Arc::new(AccessTokenFilter::new()) as Arc<dyn Filter>)
        });

        registry.register(request_time::NAME, |params| {
            let with_params = match params.get("with_params") {
                None => false,
                Some(toml::Value::Boolean(b)) => *b,
                Some(other) => {
                    return Err(format!("with_params must be a boolean, got {}", other))
                }
            };
            Ok(Arc::new(RequestTimeFilter::new(with_params)) as Arc<dyn Filter>)
        });

        registry.register(header::NAME, |params| {
            let field = |key: &str| {
                params
                    .get(key)
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| format!("missing string parameter {:?}", key))
            };
            let filter = AddRequestHeaderFilter::new(field("header")?, field("value")?)?;
            Ok(Arc::new(filter) as Arc<dyn Filter>)
        });

        registry
    }

    /// Register a custom filter factory under `name`, replacing any existing
    /// one.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&toml::Table) -> Result<Arc<dyn Filter>, String> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Resolve a configuration reference into a constructed filter.
    pub fn build(&self, filter_ref: &FilterRef) -> Result<Arc<dyn Filter>, RegistryError> {
        let (name, params) = match filter_ref {
            FilterRef::Name(name) => (name.as_str(), None),
            FilterRef::Configured { name, params } => (name.as_str(), Some(params)),
        };

        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RegistryError::Unknown(name.to_string()))?;

        let empty = toml::Table::new();
        factory(params.unwrap_or(&empty)).map_err(|reason| RegistryError::InvalidParams {
            name: name.to_string(),
            reason,
        })
    }
}
