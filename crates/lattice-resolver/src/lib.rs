//! Lattice Dependency Resolution
//!
//! Version and constraint model, package and dependency declarations, and the
//! engine that turns a root package into an installation plan: which versions
//! to install, in what order, and which conflicts or cycles stand in the way.
//!
//! Packages and remote version listings come from the [`PackageRepository`]
//! and [`VersionProvider`] traits; [`MemoryRegistry`] implements both.

pub mod dependency;
pub mod error;
pub mod install_order;
pub mod memory;
pub mod package;
pub mod provider;
pub mod resolver;
pub mod validator;
pub mod version;

pub use dependency::{Dependency, DependencyType, ResolutionStatus};
pub use error::{ResolveError, Result, ValidationError};
pub use install_order::{InstallOrder, InstallOrderComputer};
pub use memory::MemoryRegistry;
pub use package::{Package, PackageId, PackageManifest, PackageSource, RemoteLocation};
pub use provider::{PackageRepository, RefKind, RemoteRef, VersionProvider};
pub use resolver::{
    ConflictSeverity, DependencyConflict, DependencyResolver, DependencyTree, ResolutionPlan,
    ResolveOptions, ResolvedDependency, VersionResolution, VersionSolver,
};
pub use validator::Validator;
pub use version::{Comparator, ComparisonOp, PackageVersion, VersionConstraint};
