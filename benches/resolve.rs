// SPDX-License-Identifier: MPL-2.0

use std::fmt;

use criterion::{criterion_group, criterion_main, Criterion};

use pinion::{solve, CandidateProvider, IntervalSet, Requirement};

#[derive(Debug, Clone, Eq, PartialEq)]
struct Dep {
    name: String,
    versions: IntervalSet<u32>,
}

impl Dep {
    fn at(name: &str, version: u32) -> Self {
        Self::range(name, version, version + 1)
    }

    fn range(name: &str, lo: u32, hi: u32) -> Self {
        Self {
            name: name.to_owned(),
            versions: IntervalSet::interval(lo, hi).unwrap(),
        }
    }
}

impl fmt::Display for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.versions)
    }
}

impl Requirement for Dep {
    type Key = String;

    fn key(&self) -> &Self::Key {
        &self.name
    }

    fn implied_by(&self, other: &Self) -> bool {
        other.versions.difference(&self.versions).is_empty()
    }

    fn intersection(&self, other: &Self) -> Self {
        Dep {
            name: self.name.clone(),
            versions: self.versions.intersection(&other.versions),
        }
    }

    fn union(&self, other: &Self) -> Self {
        Dep {
            name: self.name.clone(),
            versions: self.versions.union(&other.versions),
        }
    }

    fn difference(&self, other: &Self) -> Self {
        Dep {
            name: self.name.clone(),
            versions: self.versions.difference(&other.versions),
        }
    }

    fn is_unsatisfiable(&self) -> bool {
        self.versions.is_empty()
    }
}

struct Pkg {
    name: String,
    version: u32,
    deps: Vec<Dep>,
}

struct Repo {
    pkgs: Vec<Pkg>,
}

impl CandidateProvider<Dep> for Repo {
    fn best_candidate(&self, req: &Dep) -> Option<(Dep, Vec<Dep>)> {
        self.pkgs
            .iter()
            .filter(|p| p.name == req.name && req.versions.contains(&p.version))
            .min_by_key(|p| p.version)
            .map(|p| (Dep::at(&p.name, p.version), p.deps.clone()))
    }
}

/// pkg0 -> pkg1 -> ... -> pkgN, one version each.
fn chain_repo(len: u32) -> Repo {
    let pkgs = (0..=len)
        .map(|i| Pkg {
            name: format!("pkg{}", i),
            version: 1,
            deps: if i < len {
                vec![Dep::range(&format!("pkg{}", i + 1), 1, 2)]
            } else {
                Vec::new()
            },
        })
        .collect();
    Repo { pkgs }
}

/// Every version of `app` but the last conflicts with the pinned `base`,
/// so the solver walks the whole version list through conflicts.
fn backtracking_repo(versions: u32) -> Repo {
    let mut pkgs = vec![Pkg {
        name: "base".to_owned(),
        version: 1,
        deps: Vec::new(),
    }];
    for v in 1..=versions {
        let deps = if v == versions {
            vec![Dep::range("base", 1, 2)]
        } else {
            vec![Dep::range("base", 2, 3)]
        };
        pkgs.push(Pkg {
            name: "app".to_owned(),
            version: v,
            deps,
        });
    }
    Repo { pkgs }
}

fn bench_resolve(c: &mut Criterion) {
    let chain = chain_repo(100);
    c.bench_function("deep dependency chain", |b| {
        b.iter(|| solve([Dep::range("pkg0", 1, 2)], &chain).unwrap())
    });

    let backtracking = backtracking_repo(50);
    c.bench_function("conflict-heavy version walk", |b| {
        b.iter(|| {
            solve(
                [Dep::range("app", 1, 1000), Dep::range("base", 1, 2)],
                &backtracking,
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
