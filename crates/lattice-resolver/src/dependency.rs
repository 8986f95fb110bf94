//! Dependency edges and their resolution lifecycle

use crate::error::ValidationError;
use crate::package::PackageId;
use crate::version::{PackageVersion, VersionConstraint};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a dependency is used by its dependent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    Runtime,
    Development,
    Optional,
    Peer,
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DependencyType::Runtime => "runtime",
            DependencyType::Development => "development",
            DependencyType::Optional => "optional",
            DependencyType::Peer => "peer",
        })
    }
}

/// Resolution state of an edge; each state carries only the data valid for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ResolutionStatus {
    Unresolved,
    Resolving,
    Resolved { version: PackageVersion },
    Failed { reason: String },
    Conflict { reason: String },
}

impl ResolutionStatus {
    pub fn name(&self) -> &'static str {
        match self {
            ResolutionStatus::Unresolved => "unresolved",
            ResolutionStatus::Resolving => "resolving",
            ResolutionStatus::Resolved { .. } => "resolved",
            ResolutionStatus::Failed { .. } => "failed",
            ResolutionStatus::Conflict { .. } => "conflict",
        }
    }

    /// Allowed lifecycle moves
    ///
    /// `unresolved -> resolving -> resolved | failed | conflict`; any settled
    /// or in-flight edge may be reset, and settled edges may be re-resolved.
    pub fn can_transition_to(&self, next: &ResolutionStatus) -> bool {
        use ResolutionStatus::*;
        matches!(
            (self, next),
            (Unresolved, Resolving)
                | (Resolving, Resolved { .. } | Failed { .. } | Conflict { .. } | Unresolved)
                | (Resolved { .. } | Failed { .. } | Conflict { .. }, Resolving | Unresolved)
        )
    }

    pub fn resolved_version(&self) -> Option<&PackageVersion> {
        match self {
            ResolutionStatus::Resolved { version } => Some(version),
            _ => None,
        }
    }
}

/// A declared edge from `source` to `target`
///
/// Instances are immutable: every state change builds a new, re-validated
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DependencyRecord")]
pub struct Dependency {
    source: PackageId,
    target: PackageId,
    constraint: VersionConstraint,
    dependency_type: DependencyType,
    is_required: bool,
    status: ResolutionStatus,
}

#[derive(Deserialize)]
struct DependencyRecord {
    source: PackageId,
    target: PackageId,
    constraint: VersionConstraint,
    dependency_type: DependencyType,
    is_required: bool,
    #[serde(default = "unresolved")]
    status: ResolutionStatus,
}

fn unresolved() -> ResolutionStatus {
    ResolutionStatus::Unresolved
}

impl TryFrom<DependencyRecord> for Dependency {
    type Error = ValidationError;

    fn try_from(record: DependencyRecord) -> Result<Self, Self::Error> {
        let dependency = Dependency {
            source: record.source,
            target: record.target,
            constraint: record.constraint,
            dependency_type: record.dependency_type,
            is_required: record.is_required,
            status: record.status,
        };
        dependency.validate()?;
        Ok(dependency)
    }
}

impl Dependency {
    /// Create an unresolved dependency
    pub fn new(
        source: PackageId,
        target: PackageId,
        constraint: VersionConstraint,
        dependency_type: DependencyType,
        is_required: bool,
    ) -> Result<Self, ValidationError> {
        let dependency = Self {
            source,
            target,
            constraint,
            dependency_type,
            is_required,
            status: ResolutionStatus::Unresolved,
        };
        dependency.validate()?;
        Ok(dependency)
    }

    /// Required runtime dependency
    pub fn runtime(
        source: PackageId,
        target: PackageId,
        constraint: VersionConstraint,
    ) -> Result<Self, ValidationError> {
        Self::new(source, target, constraint, DependencyType::Runtime, true)
    }

    /// Development dependency, skipped unless dev dependencies are requested
    pub fn development(
        source: PackageId,
        target: PackageId,
        constraint: VersionConstraint,
    ) -> Result<Self, ValidationError> {
        Self::new(source, target, constraint, DependencyType::Development, false)
    }

    pub fn optional(
        source: PackageId,
        target: PackageId,
        constraint: VersionConstraint,
    ) -> Result<Self, ValidationError> {
        Self::new(source, target, constraint, DependencyType::Optional, false)
    }

    pub fn peer(
        source: PackageId,
        target: PackageId,
        constraint: VersionConstraint,
    ) -> Result<Self, ValidationError> {
        Self::new(source, target, constraint, DependencyType::Peer, true)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.source == self.target {
            return Err(ValidationError::SelfDependency(self.source.to_string()));
        }

        if self.dependency_type == DependencyType::Optional && self.is_required {
            return Err(ValidationError::OptionalMarkedRequired {
                dependent: self.source.to_string(),
                target: self.target.to_string(),
            });
        }

        if let ResolutionStatus::Failed { reason } | ResolutionStatus::Conflict { reason } =
            &self.status
        {
            if reason.trim().is_empty() {
                return Err(ValidationError::MissingReason {
                    target: self.target.to_string(),
                    status: self.status.name(),
                });
            }
        }

        Ok(())
    }

    pub fn source(&self) -> &PackageId {
        &self.source
    }

    pub fn target(&self) -> &PackageId {
        &self.target
    }

    pub fn constraint(&self) -> &VersionConstraint {
        &self.constraint
    }

    pub fn dependency_type(&self) -> DependencyType {
        self.dependency_type
    }

    pub fn is_required(&self) -> bool {
        self.is_required
    }

    pub fn status(&self) -> &ResolutionStatus {
        &self.status
    }

    pub fn resolved_version(&self) -> Option<&PackageVersion> {
        self.status.resolved_version()
    }

    /// Move to `status`, re-running every construction check
    pub fn with_status(&self, status: ResolutionStatus) -> Result<Self, ValidationError> {
        if !self.status.can_transition_to(&status) {
            return Err(ValidationError::InvalidTransition {
                target: self.target.to_string(),
                from: self.status.name(),
                to: status.name(),
            });
        }

        let next = Self {
            status,
            ..self.clone()
        };
        next.validate()?;
        Ok(next)
    }

    pub fn resolving(&self) -> Result<Self, ValidationError> {
        self.with_status(ResolutionStatus::Resolving)
    }

    pub fn resolved(&self, version: PackageVersion) -> Result<Self, ValidationError> {
        self.with_status(ResolutionStatus::Resolved { version })
    }

    pub fn failed(&self, reason: impl Into<String>) -> Result<Self, ValidationError> {
        self.with_status(ResolutionStatus::Failed {
            reason: reason.into(),
        })
    }

    pub fn conflicted(&self, reason: impl Into<String>) -> Result<Self, ValidationError> {
        self.with_status(ResolutionStatus::Conflict {
            reason: reason.into(),
        })
    }

    /// Replace the constraint, resetting the edge to unresolved
    pub fn with_constraint(&self, constraint: VersionConstraint) -> Result<Self, ValidationError> {
        let next = Self {
            constraint,
            status: ResolutionStatus::Unresolved,
            ..self.clone()
        };
        next.validate()?;
        Ok(next)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} {}", self.source, self.target, self.constraint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> PackageId {
        s.parse().unwrap()
    }

    fn caret(s: &str) -> VersionConstraint {
        VersionConstraint::parse(&format!("^{}", s)).unwrap()
    }

    #[test]
    fn test_self_dependency_rejected() {
        let err = Dependency::runtime(id("app"), id("app"), caret("1.0.0")).unwrap_err();
        assert_eq!(err, ValidationError::SelfDependency("app".to_string()));
    }

    #[test]
    fn test_optional_cannot_be_required() {
        let err = Dependency::new(
            id("app"),
            id("lib"),
            caret("1.0.0"),
            DependencyType::Optional,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::OptionalMarkedRequired { .. }));
    }

    #[test]
    fn test_development_is_not_required() {
        let dep = Dependency::development(id("app"), id("test-kit"), caret("0.3.0")).unwrap();
        assert!(!dep.is_required());
        assert_eq!(dep.dependency_type(), DependencyType::Development);
    }

    #[test]
    fn test_full_lifecycle() {
        let dep = Dependency::runtime(id("app"), id("lib"), caret("1.0.0")).unwrap();
        assert_eq!(dep.status(), &ResolutionStatus::Unresolved);

        let resolving = dep.resolving().unwrap();
        let resolved = resolving.resolved(PackageVersion::new(1, 4, 0)).unwrap();

        assert_eq!(resolved.resolved_version(), Some(&PackageVersion::new(1, 4, 0)));
        // Transitions never touch the original
        assert_eq!(dep.status(), &ResolutionStatus::Unresolved);
        assert_eq!(resolving.status(), &ResolutionStatus::Resolving);
    }

    #[test]
    fn test_cannot_skip_resolving() {
        let dep = Dependency::runtime(id("app"), id("lib"), caret("1.0.0")).unwrap();
        let err = dep.resolved(PackageVersion::new(1, 0, 0)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidTransition {
                target: "lib".to_string(),
                from: "unresolved",
                to: "resolved",
            }
        );
    }

    #[test]
    fn test_failed_requires_reason() {
        let resolving = Dependency::runtime(id("app"), id("lib"), caret("1.0.0"))
            .unwrap()
            .resolving()
            .unwrap();

        assert!(matches!(
            resolving.failed("  "),
            Err(ValidationError::MissingReason { status: "failed", .. })
        ));
        assert!(matches!(
            resolving.conflicted(""),
            Err(ValidationError::MissingReason { status: "conflict", .. })
        ));

        let failed = resolving.failed("no tags").unwrap();
        assert_eq!(
            failed.status(),
            &ResolutionStatus::Failed {
                reason: "no tags".to_string()
            }
        );
    }

    #[test]
    fn test_settled_edge_can_be_re_resolved() {
        let failed = Dependency::runtime(id("app"), id("lib"), caret("1.0.0"))
            .unwrap()
            .resolving()
            .unwrap()
            .failed("remote offline")
            .unwrap();

        assert!(failed.resolving().is_ok());
        assert!(failed.conflicted("late conflict").is_err());
    }

    #[test]
    fn test_with_constraint_resets_status() {
        let resolved = Dependency::runtime(id("app"), id("lib"), caret("1.0.0"))
            .unwrap()
            .resolving()
            .unwrap()
            .resolved(PackageVersion::new(1, 0, 0))
            .unwrap();

        let widened = resolved.with_constraint(VersionConstraint::Wildcard).unwrap();
        assert_eq!(widened.status(), &ResolutionStatus::Unresolved);
        assert_eq!(widened.constraint(), &VersionConstraint::Wildcard);
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{
            "source": "app",
            "target": "app",
            "constraint": "^1.0.0",
            "dependency_type": "runtime",
            "is_required": true
        }"#;
        assert!(serde_json::from_str::<Dependency>(json).is_err());

        let json = r#"{
            "source": "app",
            "target": "lib",
            "constraint": "^1.0.0",
            "dependency_type": "peer",
            "is_required": true
        }"#;
        let dep: Dependency = serde_json::from_str(json).unwrap();
        assert_eq!(dep.dependency_type(), DependencyType::Peer);
        assert_eq!(dep.status(), &ResolutionStatus::Unresolved);
    }
}
