//! Conflict detection over the versions chosen during a walk

use crate::dependency::Dependency;
use crate::package::PackageId;
use crate::version::PackageVersion;
use serde::Serialize;
use std::collections::BTreeMap;

/// How bad a version conflict is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSeverity {
    /// Every pair of versions is compatible; one can serve all dependents
    Warning,
    /// At least two versions cannot substitute for each other
    Error,
}

/// Several versions of one package were selected during a walk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyConflict {
    pub package_id: PackageId,
    /// Distinct versions, highest first
    pub conflicting_versions: Vec<PackageVersion>,
    /// Every resolved edge that targets the package
    pub required_by: Vec<Dependency>,
    pub severity: ConflictSeverity,
    pub suggestion: Option<String>,
}

impl DependencyConflict {
    pub fn is_blocking(&self) -> bool {
        self.severity == ConflictSeverity::Error
    }

    /// Generate human-readable conflict report
    pub fn report(&self) -> String {
        let versions: Vec<String> = self
            .conflicting_versions
            .iter()
            .map(ToString::to_string)
            .collect();

        let mut report = format!(
            "Version conflict ({:?}) for package '{}': {}\n",
            self.severity,
            self.package_id,
            versions.join(", ")
        );

        for edge in &self.required_by {
            let chosen = edge
                .resolved_version()
                .map(ToString::to_string)
                .unwrap_or_else(|| "?".to_string());
            report.push_str(&format!(
                "  {} requires {} (selected {})\n",
                edge.source(),
                edge.constraint(),
                chosen
            ));
        }

        if let Some(suggestion) = &self.suggestion {
            report.push_str(&format!("\nSuggestion: {}\n", suggestion));
        }

        report
    }
}

/// Finds packages that were resolved to more than one version
pub struct ConflictDetector;

impl ConflictDetector {
    /// Build one conflict per package with more than one distinct version
    ///
    /// Output is ordered by package id.
    pub fn detect(
        version_map: &BTreeMap<PackageId, Vec<PackageVersion>>,
        edges: &[Dependency],
    ) -> Vec<DependencyConflict> {
        let mut conflicts = Vec::new();

        for (package_id, versions) in version_map {
            let mut distinct = versions.clone();
            distinct.sort_by(|a, b| b.cmp(a));
            distinct.dedup();

            if distinct.len() < 2 {
                continue;
            }

            let severity = if Self::all_compatible(&distinct) {
                ConflictSeverity::Warning
            } else {
                ConflictSeverity::Error
            };

            let required_by: Vec<Dependency> = edges
                .iter()
                .filter(|e| e.target() == package_id)
                .cloned()
                .collect();

            conflicts.push(DependencyConflict {
                package_id: package_id.clone(),
                suggestion: Some(Self::suggestion(package_id, &distinct, severity)),
                conflicting_versions: distinct,
                required_by,
                severity,
            });
        }

        conflicts
    }

    fn all_compatible(versions: &[PackageVersion]) -> bool {
        versions.iter().enumerate().all(|(i, a)| {
            versions[i + 1..]
                .iter()
                .all(|b| a.is_compatible_with(b))
        })
    }

    fn suggestion(
        package_id: &PackageId,
        versions: &[PackageVersion],
        severity: ConflictSeverity,
    ) -> String {
        match severity {
            ConflictSeverity::Warning => format!(
                "Versions of '{}' are compatible; consider unifying on {}",
                package_id, versions[0]
            ),
            ConflictSeverity::Error => format!(
                "Versions of '{}' are incompatible; update dependents to agree on one major version",
                package_id
            ),
        }
    }
}
