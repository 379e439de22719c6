use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    fmt::Debug,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use parking_lot::{Mutex, RwLock};

use crate::{
    definition::{BeanDefinition, Scope},
    errors::{DiError, ValidationReport},
    graph::DependencyGraph,
    lazy::Lazy,
    registry::BeanRegistry,
    types::{Bean, Instance},
};

/// Collects definitions during the build phase
///
/// Registration is fallible per definition; the heavyweight validation
/// (graph check, primary conflicts, eager pre-instantiation) happens in
/// [build](ContainerBuilder::build).
#[derive(Default)]
pub struct ContainerBuilder {
    definitions: Vec<BeanDefinition>,
    names: HashSet<String>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition, failing on a name collision
    pub fn register(&mut self, definition: impl Into<BeanDefinition>) -> Result<&mut Self, DiError> {
        let definition = definition.into();
        if !self.names.insert(definition.name().to_string()) {
            return Err(DiError::Duplicate(definition.name().to_string()));
        }
        tracing::debug!(bean = definition.name(), "registered definition");
        self.definitions.push(definition);
        Ok(self)
    }

    /// Validates the graph and constructs all eager singletons
    ///
    /// Fails fast: missing dependencies, all-eager cycles and conflicting
    /// primaries are surfaced here, before anything is handed out.
    pub fn build(self) -> Result<Container, DiError> {
        let registry = BeanRegistry::from_definitions(self.definitions);

        let graph = DependencyGraph::build(registry.iter());
        let mut errors = match graph.check() {
            Ok(()) => Vec::new(),
            Err(report) => report.errors,
        };
        errors.extend(registry.check_primaries());
        if !errors.is_empty() {
            return Err(ValidationReport { errors }.into());
        }

        let container = Container(Arc::new(ContainerInner {
            registry,
            graph,
            singletons: RwLock::new(HashMap::new()),
            construction_locks: Mutex::new(HashMap::new()),
            creation_order: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }));

        // Eager singletons are constructed up front, lazy ones on first use
        let eager: Vec<String> = container
            .0
            .registry
            .iter()
            .filter(|def| def.scope() == Scope::Singleton && !def.is_lazy())
            .map(|def| def.name().to_string())
            .collect();
        for name in eager {
            container.resolve(&name)?;
        }

        tracing::debug!(
            definitions = container.0.registry.len(),
            "container built"
        );
        Ok(container)
    }
}

/// Container holding the registry and all live singletons
#[derive(Clone)]
pub struct Container(pub(crate) Arc<ContainerInner>);

pub(crate) struct ContainerInner {
    pub(crate) registry: BeanRegistry,
    graph: DependencyGraph,
    singletons: RwLock<HashMap<String, Instance>>,
    /// Per-name locks serializing singleton construction
    construction_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    creation_order: Mutex<Vec<String>>,
    closed: AtomicBool,
}

thread_local! {
    /// Names currently being constructed on this thread, per container.
    /// Turns a re-entrant resolve of the same name into an error instead
    /// of a deadlock on the per-name lock.
    static IN_PROGRESS: RefCell<Vec<(usize, String)>> = const { RefCell::new(Vec::new()) };
}

impl Container {
    /// Resolves a bean by name, constructing it if needed
    ///
    /// Singletons are constructed at most once; concurrent callers for the
    /// same name serialize and observe the one published instance.
    /// Prototypes are constructed fresh on every call.
    pub fn resolve(&self, name: &str) -> Result<Instance, DiError> {
        if self.0.closed.load(Ordering::Acquire) {
            return Err(DiError::Closed);
        }

        // Checked before the per-name lock: a factory resolving its own name
        // must error out instead of deadlocking on that lock
        self.check_not_in_progress(name)?;

        let definition = self.0.registry.lookup_by_name(name)?;

        match definition.scope() {
            Scope::Prototype => self.construct(definition),
            Scope::Singleton => {
                if let Some(instance) = self.0.singletons.read().get(name) {
                    return Ok(instance.clone());
                }

                let name_lock = {
                    let mut locks = self.0.construction_locks.lock();
                    locks.entry(name.to_string()).or_default().clone()
                };
                let _guard = name_lock.lock();

                // A concurrent resolve may have won the race while we waited
                if let Some(instance) = self.0.singletons.read().get(name) {
                    return Ok(instance.clone());
                }

                let instance = self.construct(definition)?;
                self.0
                    .singletons
                    .write()
                    .insert(name.to_string(), instance.clone());
                self.0.creation_order.lock().push(name.to_string());
                Ok(instance)
            }
        }
    }

    /// Resolves by name and downcasts to the declared type
    pub fn resolve_typed<T: Bean>(&self, name: &str) -> Result<Arc<T>, DiError> {
        let instance = self.resolve(name)?;
        instance
            .downcast()
            .map_err(|actual_type| DiError::Downcast {
                bean: name.to_string(),
                required_type: std::any::type_name::<T>(),
                actual_type,
            })
    }

    /// Resolves the single (or primary) bean of type `T`
    pub fn resolve_by_type<T: Bean>(&self) -> Result<Arc<T>, DiError> {
        let name = self.0.registry.lookup_by_type::<T>()?.name().to_string();
        self.resolve_typed(&name)
    }

    /// Resolves every bean of type `T`, keyed by name
    pub fn resolve_all_by_type<T: Bean>(&self) -> Result<HashMap<String, Arc<T>>, DiError> {
        let names: Vec<String> = self
            .0
            .registry
            .names_of_type::<T>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut resolved = HashMap::with_capacity(names.len());
        for name in names {
            let instance = self.resolve_typed::<T>(&name)?;
            resolved.insert(name, instance);
        }
        Ok(resolved)
    }

    /// Deferred reference to a bean - no construction until first access
    ///
    /// This is the edge type that breaks dependency cycles.
    pub fn resolve_lazy<T: Bean>(&self, name: &str) -> Result<Lazy<T>, DiError> {
        let definition = self.0.registry.lookup_by_name(name)?;
        if definition.info() != crate::types::TypeInfo::of::<T>() {
            return Err(DiError::Downcast {
                bean: name.to_string(),
                required_type: std::any::type_name::<T>(),
                actual_type: definition.info().type_name,
            });
        }
        Ok(Lazy::new(Arc::downgrade(&self.0), definition.name.clone()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.registry.contains(name)
    }

    pub fn definition_count(&self) -> usize {
        self.0.registry.len()
    }

    /// The immutable definition registry backing this container
    pub fn registry(&self) -> &BeanRegistry {
        &self.0.registry
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.0.graph
    }

    /// Runs destruction hooks for live singletons in reverse creation order,
    /// then releases the cache. Safe and silent on repeat calls.
    pub fn close(&self) {
        if self.0.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        let order: Vec<String> = {
            let mut creation_order = self.0.creation_order.lock();
            std::mem::take(&mut *creation_order)
        };

        for name in order.into_iter().rev() {
            let instance = self.0.singletons.write().remove(&name);
            let Some(instance) = instance else { continue };

            tracing::info!(bean = %name, "destroying singleton");
            if let Ok(definition) = self.0.registry.lookup_by_name(&name) {
                if let Some(hook) = &definition.destroy {
                    hook(&instance);
                }
            }
        }

        self.0.singletons.write().clear();
        tracing::debug!("container closed");
    }

    /// Re-entrancy guard for cycles the declared graph did not cover
    fn check_not_in_progress(&self, name: &str) -> Result<(), DiError> {
        let key = Arc::as_ptr(&self.0) as usize;
        IN_PROGRESS.with(|stack| {
            let stack = stack.borrow();
            if stack
                .iter()
                .any(|(container, entry)| *container == key && entry == name)
            {
                let mut chain: Vec<String> = stack
                    .iter()
                    .filter(|(container, _)| *container == key)
                    .map(|(_, entry)| entry.clone())
                    .collect();
                chain.push(name.to_string());
                return Err(DiError::CircularDependency { chain });
            }
            Ok(())
        })
    }

    /// Runs the factory with this thread's in-progress stack maintained
    fn construct(&self, definition: &BeanDefinition) -> Result<Instance, DiError> {
        let key = Arc::as_ptr(&self.0) as usize;
        let name = definition.name().to_string();

        IN_PROGRESS.with(|stack| stack.borrow_mut().push((key, name.clone())));

        // Pops the stack entry even if the factory panics
        struct StackGuard {
            key: usize,
            name: String,
        }
        impl Drop for StackGuard {
            fn drop(&mut self) {
                IN_PROGRESS.with(|stack| {
                    let mut stack = stack.borrow_mut();
                    if let Some(position) = stack
                        .iter()
                        .rposition(|(container, entry)| *container == self.key && entry == &self.name)
                    {
                        stack.remove(position);
                    }
                });
            }
        }
        let _stack_guard = StackGuard {
            key,
            name: name.clone(),
        };

        tracing::debug!(bean = %name, "constructing");
        (definition.factory)(self).map_err(|error| DiError::Construction {
            bean: name,
            error: Arc::new(error),
        })
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let singletons = self.0.singletons.read();
        let mut map = f.debug_struct("Container");
        for definition in self.0.registry.iter() {
            let state = if singletons.contains_key(definition.name()) {
                "live"
            } else {
                match definition.scope() {
                    Scope::Prototype => "prototype",
                    Scope::Singleton => "pending",
                }
            };
            map.field(definition.name(), &state);
        }
        map.finish()
    }
}
