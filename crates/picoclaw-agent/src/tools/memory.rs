//! Memory tool — read or append to the agent's long-term memory.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};

use super::base::{optional_string, require_string, Tool};
use crate::memory::MemoryStore;

/// Exposes [`MemoryStore`] to the model with `read` and `append` actions.
pub struct MemoryTool {
    store: MemoryStore,
}

impl MemoryTool {
    pub fn new(workspace: &Path) -> Self {
        Self {
            store: MemoryStore::new_lazy(workspace),
        }
    }
}

#[async_trait]
impl Tool for MemoryTool {
    fn name(&self) -> &str {
        "memory"
    }

    fn description(&self) -> &str {
        "Read or append to long-term memory. Use this to remember important information across sessions."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["read", "append"],
                    "description": "Action to perform: 'read' or 'append'"
                },
                "content": {
                    "type": "string",
                    "description": "Content to append (required for 'append' action)"
                }
            },
            "required": ["action"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let action = require_string(&params, "action")?;

        match action.as_str() {
            "read" => {
                let content = self.store.read().context("Memory operation failed")?;
                Ok(content.unwrap_or_else(|| "[Memory is empty]".to_string()))
            }
            "append" => {
                let content = optional_string(&params, "content")
                    .filter(|c| !c.is_empty())
                    .ok_or_else(|| anyhow::anyhow!("Content required for append action"))?;
                self.store
                    .append(&content)
                    .context("Memory operation failed")?;
                Ok("[SUCCESS] Memory updated".to_string())
            }
            other => anyhow::bail!("Invalid action: {other}"),
        }
    }
}
