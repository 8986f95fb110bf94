//! Installation order computation for resolved dependencies

use crate::dependency::Dependency;
use crate::package::PackageId;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Dependency-first ordering plus any cycles that broke it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOrder {
    /// Packages, each after everything it depends on (except across a cycle)
    pub order: Vec<PackageId>,
    /// Cycles met while ordering, each closed by repeating its first id
    pub cycles: Vec<Vec<PackageId>>,
}

impl InstallOrder {
    pub fn is_strict(&self) -> bool {
        self.cycles.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Visited,
}

/// Orders packages over the resolved edge set
///
/// The root package anchors the walk but is never part of the output.
pub struct InstallOrderComputer {
    root: PackageId,
    /// package -> dependencies, in first-seen edge order
    graph: HashMap<PackageId, Vec<PackageId>>,
    /// every package reachable over the edges, in first-seen order
    nodes: Vec<PackageId>,
}

impl InstallOrderComputer {
    /// Build the graph from resolved edges
    pub fn new(root: &PackageId, edges: &[Dependency]) -> Self {
        let mut graph: HashMap<PackageId, Vec<PackageId>> = HashMap::new();
        let mut nodes = Vec::new();
        let mut seen = HashSet::new();

        for edge in edges {
            let children = graph.entry(edge.source().clone()).or_default();
            if !children.contains(edge.target()) {
                children.push(edge.target().clone());
            }

            if edge.target() != root && seen.insert(edge.target().clone()) {
                nodes.push(edge.target().clone());
            }
        }

        Self {
            root: root.clone(),
            graph,
            nodes,
        }
    }

    /// Depth-first post-order from the root
    ///
    /// A node reached while still `visiting` is not re-entered: the cycle is
    /// recorded and ordering continues best-effort.
    pub fn compute(&self) -> InstallOrder {
        let mut marks = HashMap::new();
        let mut stack = Vec::new();
        let mut result = InstallOrder::default();

        self.visit(&self.root, &mut marks, &mut stack, &mut result);

        // Nodes the root cannot reach still get ordered
        for node in &self.nodes {
            self.visit(node, &mut marks, &mut stack, &mut result);
        }

        result.order.retain(|id| id != &self.root);

        for cycle in &result.cycles {
            let path: Vec<&str> = cycle.iter().map(PackageId::as_str).collect();
            warn!(cycle = %path.join(" -> "), "installation order broken by cycle");
        }

        result
    }

    fn visit(
        &self,
        node: &PackageId,
        marks: &mut HashMap<PackageId, Mark>,
        stack: &mut Vec<PackageId>,
        result: &mut InstallOrder,
    ) {
        match marks.get(node) {
            Some(Mark::Visited) => return,
            Some(Mark::Visiting) => {
                if let Some(start) = stack.iter().position(|id| id == node) {
                    let mut cycle = stack[start..].to_vec();
                    cycle.push(node.clone());
                    result.cycles.push(cycle);
                }
                return;
            }
            None => {}
        }

        marks.insert(node.clone(), Mark::Visiting);
        stack.push(node.clone());

        if let Some(children) = self.graph.get(node) {
            for child in children {
                self.visit(child, marks, stack, result);
            }
        }

        stack.pop();
        marks.insert(node.clone(), Mark::Visited);
        result.order.push(node.clone());
    }

    /// Group packages that can be installed in parallel
    ///
    /// Each group only depends on earlier groups. Packages caught in a cycle
    /// can never satisfy that, so they form one final group.
    pub fn parallel_install_groups(&self) -> Vec<Vec<PackageId>> {
        let mut groups = Vec::new();
        let mut installed: HashSet<&PackageId> = HashSet::new();

        loop {
            let mut group: Vec<&PackageId> = self
                .nodes
                .iter()
                .filter(|p| !installed.contains(p))
                .filter(|p| {
                    self.dependencies_of(p)
                        .iter()
                        .all(|d| d == &self.root || installed.contains(d))
                })
                .collect();

            if group.is_empty() {
                break;
            }

            group.sort();
            installed.extend(group.iter().copied());
            groups.push(group.into_iter().cloned().collect());
        }

        let mut remaining: Vec<PackageId> = self
            .nodes
            .iter()
            .filter(|p| !installed.contains(p))
            .cloned()
            .collect();

        if !remaining.is_empty() {
            remaining.sort();
            groups.push(remaining);
        }

        groups
    }

    /// Dependencies recorded for a package
    pub fn dependencies_of(&self, package: &PackageId) -> &[PackageId] {
        self.graph.get(package).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Count of packages to install
    pub fn package_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
