use std::{
    any::{Any, TypeId},
    sync::Arc,
};

/// All factory errors are boxed into this
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// We assume callers may share the container across threads,
/// so anything a bean holds needs to be Send + Sync + 'static
pub trait Bean: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Bean for T {}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

/// A constructed bean, tagged with the definition it came from
#[derive(Clone)]
pub struct Instance {
    /// Name of the originating [BeanDefinition](crate::definition::BeanDefinition)
    pub bean_name: Arc<str>,
    pub info: TypeInfo,
    handle: Arc<dyn Any + Send + Sync>,
}

impl Instance {
    pub(crate) fn new<T: Bean>(bean_name: Arc<str>, instance: T) -> Self {
        Instance {
            bean_name,
            info: TypeInfo::of::<T>(),
            handle: Arc::new(instance),
        }
    }

    pub fn downcast<T: Bean>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.handle.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.info.type_name),
        }
    }

    /// Untyped access, used by destruction hooks
    pub fn as_any(&self) -> &(dyn Any + Send + Sync) {
        &*self.handle
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("bean_name", &self.bean_name)
            .field("type", &self.info.type_name)
            .finish()
    }
}
