use std::{fmt::Debug, marker::PhantomData, sync::Arc, sync::Weak};

use crate::{
    container::{Container, ContainerInner},
    errors::DiError,
    types::Bean,
};

/// Lazily resolved reference to a bean
///
/// Holds no instance until first accessed. For singleton beans the first
/// access constructs (or finds) the shared instance; for prototype beans
/// every access constructs a fresh one.
///
/// This is the indirection that breaks dependency cycles: a factory takes a
/// `Lazy<T>` edge instead of resolving eagerly, and accesses it after both
/// ends of the cycle exist.
pub struct Lazy<T: Bean> {
    container: Weak<ContainerInner>,
    name: Arc<str>,
    _bean: PhantomData<fn() -> T>,
}

impl<T: Bean> Lazy<T> {
    pub(crate) fn new(container: Weak<ContainerInner>, name: Arc<str>) -> Self {
        Self {
            container,
            name,
            _bean: PhantomData,
        }
    }

    /// Resolves the referenced bean, constructing it on first trigger
    pub fn try_get(&self) -> Result<Arc<T>, DiError> {
        let inner = self.container.upgrade().ok_or(DiError::Closed)?;
        Container(inner).resolve_typed::<T>(&self.name)
    }

    /// Accesses the referenced bean
    ///
    /// # Panics
    /// If the owning container has been dropped or closed, or the
    /// deferred construction fails
    pub fn get(&self) -> Arc<T> {
        match self.try_get() {
            Ok(bean) => bean,
            Err(error) => panic!("lazy access to '{}' failed: {error}", self.name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T: Bean> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        Self {
            container: self.container.clone(),
            name: self.name.clone(),
            _bean: PhantomData,
        }
    }
}

impl<T: Bean> Debug for Lazy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Lazy").field(&self.name).finish()
    }
}
