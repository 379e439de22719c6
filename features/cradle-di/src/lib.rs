//! In-process bean container: declarative definitions, singleton and
//! prototype scopes, lazy construction and cycle breaking via [Lazy] edges.
//!
//! A build phase collects [BeanDefinition]s, validates the dependency graph
//! (fail-fast on duplicates, missing edges and all-eager cycles) and
//! pre-instantiates eager singletons. The resulting [Container] is immutable
//! and shareable across threads.
//!
//! ```no_run
//! use cradle_di::{BeanDefinition, ContainerBuilder};
//!
//! struct Greeter {
//!     greeting: String,
//! }
//!
//! let mut builder = ContainerBuilder::new();
//! builder.register(BeanDefinition::new("greeter", |_| {
//!     Ok(Greeter { greeting: "hello".into() })
//! }))?;
//! let container = builder.build()?;
//!
//! let greeter = container.resolve_typed::<Greeter>("greeter")?;
//! assert_eq!(greeter.greeting, "hello");
//! container.close();
//! # Ok::<(), cradle_di::DiError>(())
//! ```

pub mod container;
pub mod definition;
pub mod errors;
pub mod graph;
pub mod lazy;
pub mod registry;
pub mod types;

pub use container::{Container, ContainerBuilder};
pub use definition::{BeanDefinition, BeanDefinitionBuilder, DependencyRef, Scope};
pub use errors::{DiError, ValidationReport};
pub use lazy::Lazy;
pub use registry::BeanRegistry;
pub use types::{Bean, DynError, Instance, TypeInfo};
