//! Node registry for creating effects from string identifiers.
//!
//! Presets and configuration files refer to effects by type name; the registry
//! maps those names to constructors taking an initial [`NodeParams`] map.

use crate::{EffectNode, Error, ParamValue, ParameterStore, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Create a `NodeParams` HashMap with key-value pairs.
///
/// # Example
/// ```
/// use voxmod_core::params;
///
/// let params = params! {
///     "carrierFrequency" => 250.0,
///     "delayMs" => 180,
///     "isEnabled" => true,
/// };
/// assert_eq!(params.len(), 3);
/// ```
#[macro_export]
macro_rules! params {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut map = $crate::NodeParams::new();
        $(
            map.insert($key.to_string(), $crate::ParamValue::from($value));
        )*
        map
    }};
}

/// Initial parameter values for a node (simple key-value map)
pub type NodeParams = HashMap<String, ParamValue>;

/// Function that constructs a node from parameters
pub type NodeConstructor = Arc<dyn Fn(&NodeParams) -> Result<Box<dyn EffectNode>> + Send + Sync>;

/// Apply every entry of `params` to `store`.
///
/// Values are clamped like any other write; unknown names and wrong types fail.
pub fn apply_params(store: &ParameterStore, params: &NodeParams) -> Result<()> {
    for (name, value) in params {
        store.set(name, *value)?;
    }
    Ok(())
}

/// Registry of node constructors, cheap to clone and share between threads.
pub struct NodeRegistry {
    constructors: Arc<RwLock<HashMap<String, NodeConstructor>>>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            constructors: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a node constructor, replacing any previous one of the same name
    pub fn register<F>(&self, name: impl Into<String>, constructor: F)
    where
        F: Fn(&NodeParams) -> Result<Box<dyn EffectNode>> + Send + Sync + 'static,
    {
        self.constructors
            .write()
            .insert(name.into(), Arc::new(constructor));
    }

    /// Create a node from registered name and parameters
    pub fn create(&self, name: &str, params: &NodeParams) -> Result<Box<dyn EffectNode>> {
        let constructor = self
            .constructors
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownNodeType(name.to_string()))?;

        let node = constructor(params)?;
        tracing::debug!(node_type = name, params = params.len(), "created effect node");
        Ok(node)
    }

    /// List all registered node types, sorted
    pub fn list_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.constructors.read().keys().cloned().collect();
        types.sort();
        types
    }

    /// Check if a type is registered
    pub fn has_type(&self, name: &str) -> bool {
        self.constructors.read().contains_key(name)
    }

    /// Unregister a node type
    pub fn unregister(&self, name: &str) -> bool {
        self.constructors.write().remove(name).is_some()
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for NodeRegistry {
    fn clone(&self) -> Self {
        Self {
            constructors: Arc::clone(&self.constructors),
        }
    }
}
