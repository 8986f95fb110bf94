//! Structural view of a dependency graph

use super::DependencyResolver;
use crate::dependency::{Dependency, DependencyType};
use crate::error::Result;
use crate::package::{Package, PackageId};
use crate::provider::{PackageRepository, VersionProvider};
use crate::version::{PackageVersion, VersionConstraint};
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// A package and the packages it declares, as nested nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyTree {
    pub package_id: PackageId,
    /// Version declared in the package's manifest
    pub version: PackageVersion,
    /// Constraint of the edge leading here; `None` for the root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<VersionConstraint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency_type: Option<DependencyType>,
    pub depth: usize,
    /// Already expanded elsewhere in the tree
    pub deduplicated: bool,
    /// Has dependencies that were not expanded because of the depth limit
    pub truncated: bool,
    pub children: Vec<DependencyTree>,
}

impl DependencyTree {
    fn leaf(package: &Package, edge: Option<&Dependency>, depth: usize) -> Self {
        Self {
            package_id: package.id.clone(),
            version: package.version().clone(),
            constraint: edge.map(|e| e.constraint().clone()),
            dependency_type: edge.map(Dependency::dependency_type),
            depth,
            deduplicated: false,
            truncated: false,
            children: Vec::new(),
        }
    }

    /// Number of distinct packages in the tree, root included
    pub fn package_count(&self) -> usize {
        let mut seen = HashSet::new();
        self.collect_ids(&mut seen);
        seen.len()
    }

    fn collect_ids<'a>(&'a self, seen: &mut HashSet<&'a PackageId>) {
        seen.insert(&self.package_id);
        for child in &self.children {
            child.collect_ids(seen);
        }
    }

    /// First node for `id` in depth-first order
    pub fn find(&self, id: &PackageId) -> Option<&DependencyTree> {
        if &self.package_id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// Indented text rendering, one node per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        out.push_str(&"  ".repeat(self.depth));
        out.push_str(&format!("{} {}", self.package_id, self.version));

        if let Some(constraint) = &self.constraint {
            out.push_str(&format!(" ({})", constraint));
        }
        if let Some(kind) = self.dependency_type.filter(|k| *k != DependencyType::Runtime) {
            out.push_str(&format!(" [{}]", kind));
        }
        if self.deduplicated {
            out.push_str(" [deduplicated]");
        }
        if self.truncated {
            out.push_str(" [truncated]");
        }
        out.push('\n');

        for child in &self.children {
            child.render_into(out);
        }
    }
}

impl<R, V> DependencyResolver<R, V>
where
    R: PackageRepository,
    V: VersionProvider,
{
    /// Build the declared dependency tree of `root`
    ///
    /// Every declared edge is followed regardless of its type. Packages the
    /// repository does not know are left out instead of failing, and nodes
    /// at `max_depth` are not expanded.
    pub async fn build_dependency_tree(
        &self,
        root: &Package,
        max_depth: usize,
    ) -> Result<DependencyTree> {
        let mut expanded = HashSet::new();
        self.tree_node(root.clone(), None, 0, max_depth, &mut expanded)
            .await
    }

    fn tree_node<'a>(
        &'a self,
        package: Package,
        edge: Option<Dependency>,
        depth: usize,
        max_depth: usize,
        expanded: &'a mut HashSet<PackageId>,
    ) -> BoxFuture<'a, Result<DependencyTree>> {
        async move {
            let mut node = DependencyTree::leaf(&package, edge.as_ref(), depth);

            if expanded.contains(&package.id) {
                node.deduplicated = true;
                return Ok(node);
            }

            let dependencies = match self
                .repository
                .find_dependencies_for_package(&package.id)
                .await
            {
                Ok(dependencies) => dependencies,
                Err(err) if err.is_not_found() => Vec::new(),
                Err(err) => return Err(err),
            };

            if depth >= max_depth {
                node.truncated = !dependencies.is_empty();
                return Ok(node);
            }

            expanded.insert(package.id.clone());

            for dependency in dependencies {
                let target = match self.repository.find_package_by_id(dependency.target()).await {
                    Ok(target) => target,
                    Err(err) if err.is_not_found() => {
                        debug!(edge = %dependency, "skipping missing package in tree");
                        continue;
                    }
                    Err(err) => return Err(err),
                };

                let child = self
                    .tree_node(target, Some(dependency), depth + 1, max_depth, expanded)
                    .await?;
                node.children.push(child);
            }

            Ok(node)
        }
        .boxed()
    }
}
