use std::{marker::PhantomData, sync::Arc};

use crate::{
    container::Container,
    types::{Bean, DynError, Instance, TypeInfo},
};

/// How long a constructed bean lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// One shared instance, cached for the container lifetime
    Singleton,
    /// A fresh instance per resolve, owned by the caller
    Prototype,
}

/// A declared edge to another bean
///
/// Eager edges are constructed before the dependent bean.
/// Lazy edges are satisfied with a deferred [Lazy](crate::lazy::Lazy)
/// reference and may close a cycle.
#[derive(Debug, Clone)]
pub struct DependencyRef {
    pub name: String,
    pub lazy: bool,
}

pub(crate) type FactoryFn = Arc<dyn Fn(&Container) -> Result<Instance, DynError> + Send + Sync>;
pub(crate) type DestroyFn = Arc<dyn Fn(&Instance) + Send + Sync>;

/// Declarative recipe for one constructible bean
#[derive(Clone)]
pub struct BeanDefinition {
    pub(crate) name: Arc<str>,
    pub(crate) info: TypeInfo,
    pub(crate) scope: Scope,
    pub(crate) lazy: bool,
    pub(crate) primary: bool,
    pub(crate) dependencies: Vec<DependencyRef>,
    pub(crate) factory: FactoryFn,
    pub(crate) destroy: Option<DestroyFn>,
}

impl BeanDefinition {
    /// Starts a definition for a bean of type `T` built by `factory`
    ///
    /// The factory receives the owning container and may resolve its
    /// declared dependencies through it.
    pub fn new<T, F>(name: impl Into<String>, factory: F) -> BeanDefinitionBuilder<T>
    where
        T: Bean,
        F: Fn(&Container) -> Result<T, DynError> + Send + Sync + 'static,
    {
        let name: Arc<str> = Arc::from(name.into());
        let factory_name = name.clone();
        let factory: FactoryFn = Arc::new(move |container| {
            factory(container).map(|bean| Instance::new(factory_name.clone(), bean))
        });

        BeanDefinitionBuilder {
            name,
            info: TypeInfo::of::<T>(),
            scope: Scope::Singleton,
            lazy: false,
            primary: false,
            dependencies: Vec::new(),
            factory,
            destroy: None,
            _bean: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn info(&self) -> TypeInfo {
        self.info
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    pub fn dependencies(&self) -> &[DependencyRef] {
        &self.dependencies
    }
}

impl std::fmt::Debug for BeanDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeanDefinition")
            .field("name", &self.name)
            .field("type", &self.info.type_name)
            .field("scope", &self.scope)
            .field("lazy", &self.lazy)
            .field("primary", &self.primary)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Chaining builder produced by [BeanDefinition::new]
pub struct BeanDefinitionBuilder<T: Bean> {
    name: Arc<str>,
    info: TypeInfo,
    scope: Scope,
    lazy: bool,
    primary: bool,
    dependencies: Vec<DependencyRef>,
    factory: FactoryFn,
    destroy: Option<DestroyFn>,
    _bean: PhantomData<fn() -> T>,
}

impl<T: Bean> BeanDefinitionBuilder<T> {
    /// A fresh instance per resolve instead of the cached singleton
    pub fn prototype(mut self) -> Self {
        self.scope = Scope::Prototype;
        self
    }

    /// Defer construction until the first resolve or `Lazy` access
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    /// Preferred candidate when several beans share the declared type
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    /// Declares an eager edge to another bean
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(DependencyRef {
            name: name.into(),
            lazy: false,
        });
        self
    }

    /// Declares a lazy edge - allowed to close a cycle
    pub fn depends_on_lazy(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(DependencyRef {
            name: name.into(),
            lazy: true,
        });
        self
    }

    /// Hook run for live singletons when the container closes
    pub fn on_destroy<F>(mut self, hook: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.destroy = Some(Arc::new(move |instance: &Instance| {
            // The container only calls this with instances of our own definition
            if let Some(bean) = instance.as_any().downcast_ref::<T>() {
                hook(bean);
            }
        }));
        self
    }

    pub fn build(self) -> BeanDefinition {
        BeanDefinition {
            name: self.name,
            info: self.info,
            scope: self.scope,
            lazy: self.lazy,
            primary: self.primary,
            dependencies: self.dependencies,
            factory: self.factory,
            destroy: self.destroy,
        }
    }
}

impl<T: Bean> From<BeanDefinitionBuilder<T>> for BeanDefinition {
    fn from(builder: BeanDefinitionBuilder<T>) -> Self {
        builder.build()
    }
}
