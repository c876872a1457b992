//! Registry of loaded body plans
//!
//! Plans are loaded from TOML text, single files or whole directory trees,
//! and handed out behind `Arc` for creatures to share.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use super::loader::parse_body;
use crate::anatomy::instance::Creature;
use crate::anatomy::plan::BodyPlan;
use crate::core::error::ContentError;

#[derive(Debug, Default)]
pub struct BodyRegistry {
    plans: HashMap<String, Arc<BodyPlan>>,
    /// Names in load order
    order: Vec<String>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sealed plan under its own name
    pub fn register(&mut self, plan: BodyPlan) -> Result<Arc<BodyPlan>, ContentError> {
        let name = plan.name().to_string();
        if self.plans.contains_key(&name) {
            return Err(ContentError::DuplicatePlan(name));
        }
        let plan = Arc::new(plan);
        self.plans.insert(name.clone(), Arc::clone(&plan));
        self.order.push(name);
        Ok(plan)
    }

    pub fn load_str(&mut self, content: &str) -> Result<Arc<BodyPlan>, ContentError> {
        self.register(parse_body(content)?)
    }

    pub fn load_file(&mut self, path: &Path) -> Result<Arc<BodyPlan>, ContentError> {
        let content = std::fs::read_to_string(path)?;
        self.load_str(&content)
    }

    /// Load every .toml file under `path`, recursively, in sorted order
    pub fn load_directory(&mut self, path: &Path) -> Result<Vec<Arc<BodyPlan>>, ContentError> {
        let mut plans = Vec::new();
        self.load_directory_recursive(path, &mut plans)?;
        info!(dir = %path.display(), plans = plans.len(), "loaded body plans");
        Ok(plans)
    }

    fn load_directory_recursive(
        &mut self,
        path: &Path,
        plans: &mut Vec<Arc<BodyPlan>>,
    ) -> Result<(), ContentError> {
        let mut entries = std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort();

        for entry in entries {
            if entry.is_dir() {
                self.load_directory_recursive(&entry, plans)?;
            } else if entry.extension().map_or(false, |ext| ext == "toml") {
                plans.push(self.load_file(&entry)?);
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<BodyPlan>> {
        self.plans.get(name).cloned()
    }

    /// Names in load order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// New creature built on a registered plan
    pub fn spawn(&self, plan: &str, name: impl Into<String>) -> Option<Creature> {
        self.get(plan).map(|plan| Creature::new(name, plan))
    }
}
