//! Circular dependency detection

use super::DependencyResolver;
use crate::error::Result;
use crate::package::{Package, PackageId};
use crate::provider::{PackageRepository, VersionProvider};
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashSet;
use tracing::debug;

#[derive(Default)]
struct CycleSearch {
    visited: HashSet<PackageId>,
    recursion_stack: HashSet<PackageId>,
    current_path: Vec<PackageId>,
    cycles: Vec<Vec<PackageId>>,
}

impl<R, V> DependencyResolver<R, V>
where
    R: PackageRepository,
    V: VersionProvider,
{
    /// Find every dependency cycle reachable from `root`
    ///
    /// Each cycle starts and ends with the same package id. All declared
    /// edges are followed; packages the repository does not know are pruned.
    pub async fn find_circular_dependencies(&self, root: &Package) -> Result<Vec<Vec<PackageId>>> {
        let mut search = CycleSearch::default();
        self.search_cycles(root.id.clone(), &mut search).await?;
        Ok(search.cycles)
    }

    fn search_cycles<'a>(
        &'a self,
        id: PackageId,
        search: &'a mut CycleSearch,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            if search.recursion_stack.contains(&id) {
                if let Some(start) = search.current_path.iter().position(|p| p == &id) {
                    let mut cycle = search.current_path[start..].to_vec();
                    cycle.push(id);
                    search.cycles.push(cycle);
                }
                return Ok(());
            }

            if !search.visited.insert(id.clone()) {
                return Ok(());
            }

            let dependencies = match self.repository.find_dependencies_for_package(&id).await {
                Ok(dependencies) => dependencies,
                Err(err) if err.is_not_found() => Vec::new(),
                Err(err) => return Err(err),
            };

            search.recursion_stack.insert(id.clone());
            search.current_path.push(id.clone());

            for dependency in dependencies {
                match self.repository.find_package_by_id(dependency.target()).await {
                    Ok(target) => self.search_cycles(target.id, search).await?,
                    Err(err) if err.is_not_found() => {
                        debug!(edge = %dependency, "pruning missing package from cycle search");
                    }
                    Err(err) => return Err(err),
                }
            }

            search.current_path.pop();
            search.recursion_stack.remove(&id);

            Ok(())
        }
        .boxed()
    }
}
