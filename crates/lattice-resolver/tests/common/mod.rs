#![allow(dead_code)]

use lattice_resolver::*;

pub fn id(s: &str) -> PackageId {
    s.parse().unwrap()
}

pub fn ver(s: &str) -> PackageVersion {
    s.parse().unwrap()
}

pub fn remote_url(name: &str) -> String {
    format!("https://git.example.com/{}.git", name)
}

/// Builds a [`MemoryRegistry`] one package at a time
#[derive(Default)]
pub struct RegistryBuilder {
    registry: MemoryRegistry,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local package; `deps` are runtime edges `(target, constraint)`
    pub fn local(mut self, name: &str, version: &str, deps: &[(&str, &str)]) -> Self {
        let edges = deps
            .iter()
            .map(|(target, constraint)| runtime(name, target, constraint))
            .collect();
        self.registry
            .add_package(package(name, version, PackageSource::local(format!("../{}", name)), edges));
        self
    }

    /// Local package with prebuilt edges
    pub fn local_with(mut self, name: &str, version: &str, edges: Vec<Dependency>) -> Self {
        self.registry
            .add_package(package(name, version, PackageSource::local(format!("../{}", name)), edges));
        self
    }

    /// Git package whose remote publishes `tags`
    pub fn git(mut self, name: &str, version: &str, tags: &[&str], deps: &[(&str, &str)]) -> Self {
        let edges = deps
            .iter()
            .map(|(target, constraint)| runtime(name, target, constraint))
            .collect();
        self.registry
            .add_package(package(name, version, PackageSource::git(remote_url(name)), edges));
        self.registry
            .add_refs(remote_url(name), tags.iter().map(|t| RemoteRef::tag(*t)).collect());
        self
    }

    pub fn branch(mut self, name: &str, branch: &str, version: &str) -> Self {
        self.registry
            .add_refs(remote_url(name), vec![RemoteRef::branch(branch, version)]);
        self
    }

    pub fn unavailable(mut self, name: &str) -> Self {
        self.registry.mark_unavailable(remote_url(name));
        self
    }

    pub fn build(self) -> MemoryRegistry {
        self.registry
    }
}

pub fn runtime(from: &str, to: &str, constraint: &str) -> Dependency {
    Dependency::runtime(id(from), id(to), constraint.parse().unwrap()).unwrap()
}

pub fn development(from: &str, to: &str, constraint: &str) -> Dependency {
    Dependency::development(id(from), id(to), constraint.parse().unwrap()).unwrap()
}

pub fn optional(from: &str, to: &str, constraint: &str) -> Dependency {
    Dependency::optional(id(from), id(to), constraint.parse().unwrap()).unwrap()
}

pub fn package(name: &str, version: &str, source: PackageSource, edges: Vec<Dependency>) -> Package {
    Package::new(id(name), PackageManifest::new(ver(version)), source)
        .with_dependencies(edges)
        .unwrap()
}

pub async fn root_of(registry: &MemoryRegistry, name: &str) -> Package {
    registry.find_package_by_id(&id(name)).await.unwrap()
}

pub fn options(max_depth: usize) -> ResolveOptions {
    ResolveOptions {
        max_depth,
        ..ResolveOptions::default()
    }
}

/// Linear chain `p0 -> p1 -> ... -> p{len}`, all local
pub fn chain(len: usize) -> MemoryRegistry {
    let mut builder = RegistryBuilder::new();
    for i in 0..len {
        let next = format!("p{}", i + 1);
        builder = builder.local(&format!("p{}", i), "1.0.0", &[(next.as_str(), "*")]);
    }
    builder.local(&format!("p{}", len), "1.0.0", &[]).build()
}

pub fn position(order: &[PackageId], name: &str) -> usize {
    order
        .iter()
        .position(|p| p.as_str() == name)
        .unwrap_or_else(|| panic!("{} missing from order", name))
}

/// Route `tracing` output through the test harness; `RUST_LOG` picks the level
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
