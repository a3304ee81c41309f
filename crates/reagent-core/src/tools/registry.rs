//! Tool registry: global name-to-callback mapping and allow-list resolution

use crate::tools::base::ToolCallback;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Registry mapping tool keys to callbacks
///
/// Populated externally (wiring code, plugins); agents look tools up
/// through their allow-list via [`ToolRegistry::resolve`].
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolCallback>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool callback under its own name
    pub fn register(&mut self, tool: Arc<dyn ToolCallback>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Register multiple tool callbacks
    pub fn register_all(&mut self, tools: Vec<Arc<dyn ToolCallback>>) {
        for tool in tools {
            self.register(tool);
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolCallback>> {
        self.tools.get(name)
    }

    /// Check if a tool is registered
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get all registered tool names
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Resolve an allow-list of tool names to callbacks
    ///
    /// Allow-list order is preserved; it determines the order in which
    /// tool definitions are advertised to the model and carries no other
    /// priority. Names absent from the registry are skipped with a
    /// warning, never a failure.
    pub fn resolve(&self, allow_list: &[String]) -> Vec<Arc<dyn ToolCallback>> {
        let mut callbacks = Vec::with_capacity(allow_list.len());
        for key in allow_list {
            match self.tools.get(key) {
                Some(callback) => callbacks.push(Arc::clone(callback)),
                None => warn!(tool = %key, "tool callback not found in the registry"),
            }
        }
        callbacks
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
