use std::collections::{BTreeMap, HashSet};

use crate::{
    definition::{BeanDefinition, DependencyRef},
    errors::{DiError, ValidationReport},
};

/// Graph of all declared bean edges
///
/// Built once from the registered definitions. Used to fail fast on
/// missing dependencies and all-eager cycles before anything is constructed.
pub struct DependencyGraph {
    map: BTreeMap<String, GraphEntry>,
}

struct GraphEntry {
    name: String,
    dependencies: Vec<DependencyRef>,
}

impl DependencyGraph {
    pub fn build<'a>(definitions: impl Iterator<Item = &'a BeanDefinition>) -> Self {
        let mut map = BTreeMap::new();
        for definition in definitions {
            map.insert(
                definition.name().to_string(),
                GraphEntry {
                    name: definition.name().to_string(),
                    dependencies: definition.dependencies().to_vec(),
                },
            );
        }
        Self { map }
    }

    /// Validate the graph
    ///
    /// Collects every issue instead of stopping at the first one.
    pub fn check(&self) -> Result<(), ValidationReport> {
        let mut checked = HashSet::new();
        let mut errors = Vec::new();

        for entry in self.map.values() {
            let mut chain = Vec::new();
            self.check_recurse(&mut checked, &mut errors, &mut chain, entry);
        }

        if !errors.is_empty() {
            return Err(ValidationReport { errors });
        }

        Ok(())
    }

    fn check_recurse(
        &self,
        checked: &mut HashSet<String>,
        errors: &mut Vec<DiError>,
        chain: &mut Vec<String>,
        entry: &GraphEntry,
    ) {
        // Eager cycle: the entry is already on the current chain
        if chain.iter().any(|name| name == &entry.name) {
            let mut cycle = chain.clone();
            cycle.push(entry.name.clone());
            errors.push(DiError::CircularDependency { chain: cycle });
            return;
        }

        // Skip other checks if already checked
        if !checked.insert(entry.name.clone()) {
            return;
        }

        chain.push(entry.name.clone());

        for dependency in &entry.dependencies {
            let Some(next_entry) = self.map.get(&dependency.name) else {
                errors.push(DiError::MissingDependency {
                    dependency: dependency.name.clone(),
                    required_by: entry.name.clone(),
                });
                continue;
            };

            if dependency.lazy {
                // Don't recurse, the lazy edge is resolved after construction
                continue;
            }

            self.check_recurse(checked, errors, chain, next_entry);
        }

        chain.pop();
    }
}
