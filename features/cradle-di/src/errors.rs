use std::sync::Arc;

use thiserror::Error;

use crate::types::DynError;

/// Errors surfaced by registration, graph validation and resolution
#[derive(Error, Debug, Clone)]
pub enum DiError {
    /// A bean name has been registered twice
    #[error("a bean named '{0}' is already registered")]
    Duplicate(String),
    /// No bean with the given name or type is known
    #[error("no bean matching '{wanted}' is registered")]
    NotFound { wanted: String },
    /// Type lookup matched several candidates and none (or several) are primary
    #[error("type '{type_name}' is ambiguous, candidates: {candidates:?} - mark one as primary or resolve by name")]
    Ambiguous {
        type_name: &'static str,
        candidates: Vec<String>,
    },
    /// A dependency cycle with no lazy edge in it
    #[error("circular dependency through {chain:?} - consider a lazy edge")]
    CircularDependency { chain: Vec<String> },
    /// A declared dependency is not registered
    #[error("'{required_by}' needs '{dependency}' but it is missing")]
    MissingDependency {
        dependency: String,
        required_by: String,
    },
    /// The factory itself failed - never retried, propagated as-is
    #[error("factory for '{bean}' failed: {error}")]
    Construction {
        bean: String,
        error: Arc<DynError>,
    },
    /// The stored instance is not of the requested type
    #[error("'{bean}' holds '{actual_type}', not the requested '{required_type}'")]
    Downcast {
        bean: String,
        required_type: &'static str,
        actual_type: &'static str,
    },
    /// The container has been closed
    #[error("the container is closed")]
    Closed,
    /// One or more graph validation failures, reported together
    #[error(transparent)]
    Validation(#[from] ValidationReport),
}

/// Aggregate of everything the graph check found wrong
#[derive(Error, Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<DiError>,
}
impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut display = Vec::new();
        display.push("the bean graph had one or more errors:".to_string());
        for error in &self.errors {
            display.push(format!("- {}", error));
        }
        f.write_str(&display.join("\n"))
    }
}
