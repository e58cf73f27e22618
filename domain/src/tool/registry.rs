//! Capability Registry
//!
//! The [`CapabilityRegistry`] owns every registered [`CapabilityProvider`]
//! and maps qualified tool names back to `(provider, local tool)`.
//!
//! # Ordering
//!
//! [`catalog()`](CapabilityRegistry::catalog) is ordered by provider
//! registration order, then tool declaration order, so identical
//! conversation state always produces identical completion requests.
//!
//! # Usage
//!
//! ```ignore
//! let mut registry = CapabilityRegistry::new();
//! registry.register(Arc::new(BuiltinProvider::new()))?;
//!
//! let resolved = registry.resolve("builtin_calculate")?;
//! assert_eq!(resolved.local_name(), "calculate");
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::{ToolDefinition, ToolParameter};
use super::provider::CapabilityProvider;
use super::qualified;
use super::value_objects::ToolError;

/// Errors raised by registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Provider '{0}' is already registered")]
    DuplicateProvider(String),

    #[error("Invalid provider name '{0}': must be non-empty and must not contain '_'")]
    InvalidProviderName(String),

    #[error("Provider '{0}' not found")]
    ProviderNotFound(String),

    #[error("Malformed qualified tool name '{0}'")]
    MalformedQualifiedName(String),
}

impl From<RegistryError> for ToolError {
    fn from(err: RegistryError) -> Self {
        match &err {
            RegistryError::MalformedQualifiedName(name) => ToolError::malformed_name(name),
            RegistryError::ProviderNotFound(name) => {
                ToolError::not_found(format!("provider '{}'", name))
            }
            RegistryError::DuplicateProvider(_) | RegistryError::InvalidProviderName(_) => {
                ToolError::execution_failed(err.to_string())
            }
        }
    }
}

/// A tool as presented to the completion service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Globally qualified name (`provider_tool`)
    pub qualified_name: String,
    /// Name of the owning provider
    pub provider: String,
    /// Provider-tagged description (`[SLACK] Send a message`)
    pub description: String,
    /// Declared parameters
    pub parameters: Vec<ToolParameter>,
}

impl CatalogEntry {
    fn new(provider: &str, tool: &ToolDefinition) -> Self {
        Self {
            qualified_name: qualified::join(provider, &tool.name),
            provider: provider.to_string(),
            description: format!("[{}] {}", provider.to_uppercase(), tool.description),
            parameters: tool.parameters.clone(),
        }
    }

    /// JSON Schema of the parameters (see [`ToolDefinition::parameters_schema`])
    pub fn parameters_schema(&self) -> serde_json::Value {
        ToolDefinition {
            name: self.qualified_name.clone(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
        }
        .parameters_schema()
    }
}

/// A qualified name resolved to its provider and local tool name
#[derive(Clone)]
pub struct ResolvedTool {
    provider: Arc<dyn CapabilityProvider>,
    local_name: String,
}

impl ResolvedTool {
    pub fn provider(&self) -> &Arc<dyn CapabilityProvider> {
        &self.provider
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Definition of the local tool, if the provider declares it
    pub fn definition(&self) -> Option<&ToolDefinition> {
        self.provider.tool(&self.local_name)
    }
}

impl std::fmt::Debug for ResolvedTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedTool")
            .field("provider", &self.provider.name())
            .field("local_name", &self.local_name)
            .finish()
    }
}

/// Registry of capability providers
#[derive(Default)]
pub struct CapabilityRegistry {
    /// Providers in registration order
    providers: Vec<Arc<dyn CapabilityProvider>>,
    /// Provider name → index into `providers`
    index: HashMap<String, usize>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider.
    pub fn register(&mut self, provider: Arc<dyn CapabilityProvider>) -> Result<(), RegistryError> {
        let name = provider.name().to_string();

        if !qualified::is_valid_provider_name(&name) {
            return Err(RegistryError::InvalidProviderName(name));
        }
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateProvider(name));
        }

        self.index.insert(name, self.providers.len());
        self.providers.push(provider);
        Ok(())
    }

    /// Register a provider (builder pattern)
    pub fn with_provider(
        mut self,
        provider: Arc<dyn CapabilityProvider>,
    ) -> Result<Self, RegistryError> {
        self.register(provider)?;
        Ok(self)
    }

    /// Flattened catalog of all tools across all providers
    pub fn catalog(&self) -> Vec<CatalogEntry> {
        self.providers
            .iter()
            .flat_map(|provider| {
                provider
                    .tools()
                    .iter()
                    .map(move |tool| CatalogEntry::new(provider.name(), tool))
            })
            .collect()
    }

    /// Resolve a qualified name to its provider and local tool name
    pub fn resolve(&self, qualified_name: &str) -> Result<ResolvedTool, RegistryError> {
        let (provider_name, local_name) = qualified::split(qualified_name)
            .ok_or_else(|| RegistryError::MalformedQualifiedName(qualified_name.to_string()))?;

        let provider = self
            .provider(provider_name)
            .ok_or_else(|| RegistryError::ProviderNotFound(provider_name.to_string()))?;

        Ok(ResolvedTool {
            provider: provider.clone(),
            local_name: local_name.to_string(),
        })
    }

    pub fn provider(&self, name: &str) -> Option<&Arc<dyn CapabilityProvider>> {
        self.index.get(name).map(|&i| &self.providers[i])
    }

    /// Providers in registration order
    pub fn providers(&self) -> impl Iterator<Item = &Arc<dyn CapabilityProvider>> {
        self.providers.iter()
    }

    /// Provider names in registration order
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Local tool names of one provider, in declaration order
    pub fn tool_names(&self, provider: &str) -> Option<Vec<&str>> {
        self.provider(provider)
            .map(|p| p.tools().iter().map(|t| t.name.as_str()).collect())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
