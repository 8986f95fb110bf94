//! Resolver error types

use thiserror::Error;

/// Errors produced while resolving a dependency graph
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid version '{input}': expected major.minor.patch[-prerelease]")]
    InvalidVersion { input: String },

    #[error("Invalid version constraint '{input}': {reason}")]
    InvalidConstraint { input: String, reason: String },

    #[error(
        "Package not found: {package}{}",
        .constraint.as_ref().map(|c| format!(" (requested {})", c)).unwrap_or_default()
    )]
    PackageNotFound {
        package: String,
        constraint: Option<String>,
    },

    #[error("Package source unavailable: {remote}: {reason}")]
    SourceUnavailable { remote: String, reason: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Resolution cancelled")]
    Cancelled,
}

impl ResolveError {
    /// A package id that no provider knows about
    pub fn not_found(package: impl Into<String>) -> Self {
        ResolveError::PackageNotFound {
            package: package.into(),
            constraint: None,
        }
    }

    /// Whether tolerant operations may prune the branch that produced this error
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::PackageNotFound { .. })
    }
}

/// Structural invariant violations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid package id '{id}': {reason}")]
    InvalidPackageId { id: String, reason: String },

    #[error("Package '{0}' cannot depend on itself")]
    SelfDependency(String),

    #[error("Optional dependency '{dependent}' -> '{target}' cannot be required")]
    OptionalMarkedRequired { dependent: String, target: String },

    #[error("Dependency on '{target}' declared by '{declared_by}' cannot be attached to '{owner}'")]
    ForeignDependency {
        owner: String,
        declared_by: String,
        target: String,
    },

    #[error("Dependency on '{target}' marked {status} without a reason")]
    MissingReason { target: String, status: &'static str },

    #[error("Dependency on '{target}' cannot move from {from} to {to}")]
    InvalidTransition {
        target: String,
        from: &'static str,
        to: &'static str,
    },

    #[error("Maximum dependency depth {max_depth} exceeded at '{package}' (depth {depth})")]
    DepthExceeded {
        package: String,
        depth: usize,
        max_depth: usize,
    },

    #[error(
        "Packages '{first}' and '{second}' require incompatible {dimension} versions: {first_version} vs {second_version}"
    )]
    IncompatiblePlatform {
        dimension: String,
        first: String,
        first_version: String,
        second: String,
        second_version: String,
    },
}

pub type Result<T> = std::result::Result<T, ResolveError>;
