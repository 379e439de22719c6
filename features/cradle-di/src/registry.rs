use std::{
    any::TypeId,
    collections::HashMap,
};

use crate::{
    definition::BeanDefinition,
    errors::DiError,
    types::{Bean, TypeInfo},
};

/// Immutable set of bean definitions
///
/// Built once by the [ContainerBuilder](crate::container::ContainerBuilder),
/// then only read. No re-registration once resolution has begun.
pub struct BeanRegistry {
    definitions: HashMap<String, BeanDefinition>,
    /// Registration order, drives pre-instantiation and destruction ordering
    order: Vec<String>,
    by_type: HashMap<TypeId, Vec<String>>,
}

impl BeanRegistry {
    pub(crate) fn from_definitions(definitions: Vec<BeanDefinition>) -> Self {
        let mut map = HashMap::with_capacity(definitions.len());
        let mut order = Vec::with_capacity(definitions.len());
        let mut by_type: HashMap<TypeId, Vec<String>> = HashMap::new();

        for definition in definitions {
            let name = definition.name().to_string();
            by_type
                .entry(definition.info().type_id)
                .or_default()
                .push(name.clone());
            order.push(name.clone());
            map.insert(name, definition);
        }

        Self {
            definitions: map,
            order,
            by_type,
        }
    }

    pub fn lookup_by_name(&self, name: &str) -> Result<&BeanDefinition, DiError> {
        self.definitions.get(name).ok_or_else(|| DiError::NotFound {
            wanted: name.to_string(),
        })
    }

    /// Picks the single definition of type `T`
    ///
    /// With several candidates, exactly one marked primary wins.
    pub fn lookup_by_type<T: Bean>(&self) -> Result<&BeanDefinition, DiError> {
        let info = TypeInfo::of::<T>();
        let candidates = match self.by_type.get(&info.type_id) {
            Some(names) if !names.is_empty() => names,
            _ => {
                return Err(DiError::NotFound {
                    wanted: info.type_name.to_string(),
                })
            }
        };

        if candidates.len() == 1 {
            return self.lookup_by_name(&candidates[0]);
        }

        let primaries: Vec<&String> = candidates
            .iter()
            .filter(|name| {
                self.definitions
                    .get(*name)
                    .is_some_and(BeanDefinition::is_primary)
            })
            .collect();

        match primaries.as_slice() {
            [single] => self.lookup_by_name(single),
            _ => Err(DiError::Ambiguous {
                type_name: info.type_name,
                candidates: candidates.clone(),
            }),
        }
    }

    /// All names registered under type `T`, in registration order
    pub fn names_of_type<T: Bean>(&self) -> Vec<&str> {
        let type_id = TypeId::of::<T>();
        self.order
            .iter()
            .filter(|name| {
                self.definitions
                    .get(*name)
                    .is_some_and(|def| def.info().type_id == type_id)
            })
            .map(String::as_str)
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definitions in registration order
    pub fn iter(&self) -> impl Iterator<Item = &BeanDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.definitions.get(name))
    }

    /// More than one primary for the same type is a configuration error
    pub(crate) fn check_primaries(&self) -> Vec<DiError> {
        let mut errors = Vec::new();
        for names in self.by_type.values() {
            let primaries: Vec<&String> = names
                .iter()
                .filter(|name| {
                    self.definitions
                        .get(*name)
                        .is_some_and(BeanDefinition::is_primary)
                })
                .collect();
            if primaries.len() > 1 {
                let type_name = names
                    .first()
                    .and_then(|name| self.definitions.get(name))
                    .map(|def| def.info().type_name)
                    .unwrap_or("?");
                errors.push(DiError::Ambiguous {
                    type_name,
                    candidates: primaries.into_iter().cloned().collect(),
                });
            }
        }
        errors
    }
}
