use lattice_resolver::*;
use proptest::prelude::*;
use std::cmp::Ordering;

fn version_strategy() -> impl Strategy<Value = PackageVersion> {
    (
        0u64..5,
        0u64..5,
        0u64..5,
        prop::option::of(prop::sample::select(vec!["alpha", "alpha.1", "beta", "rc.1", "rc.2"])),
    )
        .prop_map(|(major, minor, patch, pre)| {
            let text = match pre {
                Some(tag) => format!("{}.{}.{}-{}", major, minor, patch, tag),
                None => format!("{}.{}.{}", major, minor, patch),
            };
            PackageVersion::parse(&text).unwrap()
        })
}

/// Edges `(from, to)` over `n0..n{count}` with `from < to`, so always acyclic
fn dag_strategy() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0usize..8, 0usize..8), 0..20).prop_map(|pairs| {
        pairs
            .into_iter()
            .filter(|(a, b)| a != b)
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect()
    })
}

fn node(i: usize) -> PackageId {
    format!("n{}", i).parse().unwrap()
}

proptest! {
    #[test]
    fn ordering_is_total_and_antisymmetric(a in version_strategy(), b in version_strategy()) {
        let forward = a.compare(&b);
        let backward = b.compare(&a);
        prop_assert_eq!(forward, backward.reverse());
        prop_assert_eq!(forward == Ordering::Equal, a == b);
    }

    #[test]
    fn ordering_is_transitive(
        a in version_strategy(),
        b in version_strategy(),
        c in version_strategy(),
    ) {
        if a <= b && b <= c {
            prop_assert!(a <= c);
        }
    }

    #[test]
    fn prerelease_sorts_before_its_release(a in version_strategy()) {
        let release = PackageVersion::new(a.major, a.minor, a.patch);
        if a.is_prerelease() {
            prop_assert!(a < release);
        } else {
            prop_assert_eq!(a, release);
        }
    }

    #[test]
    fn caret_satisfies_its_own_version(v in version_strategy()) {
        let caret = VersionConstraint::parse(&format!("^{}", v)).unwrap();
        prop_assert!(caret.matches(&v));
        prop_assert!(caret.satisfies(&v.to_string()).unwrap());

        let next_major = PackageVersion::new(v.major + 1, 0, 0);
        prop_assert!(!caret.matches(&next_major));
    }

    #[test]
    fn installation_order_respects_every_edge(edges in dag_strategy()) {
        let root = "root".parse::<PackageId>().unwrap();
        let mut dependencies: Vec<Dependency> = Vec::new();

        // The root reaches every node so all of them are ordered from it
        for i in 0..8 {
            dependencies.push(Dependency::runtime(root.clone(), node(i), VersionConstraint::Wildcard).unwrap());
        }
        for (from, to) in &edges {
            dependencies.push(Dependency::runtime(node(*from), node(*to), VersionConstraint::Wildcard).unwrap());
        }

        let order = InstallOrderComputer::new(&root, &dependencies).compute();
        prop_assert!(order.is_strict());
        prop_assert_eq!(order.order.len(), 8);

        let position = |id: &PackageId| order.order.iter().position(|p| p == id).unwrap();
        for (from, to) in &edges {
            prop_assert!(position(&node(*to)) < position(&node(*from)));
        }
    }
}
