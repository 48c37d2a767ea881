//! Dependency sets: the branch indices a derived fact relies on.
//!
//! Branch indices are 1-based and equal to the branch stack depth at the
//! time the branch was created, so `max() == 0` means independent.

use smallvec::SmallVec;
use std::fmt;

#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct DependencySet {
    /// Sorted, duplicate-free.
    branches: SmallVec<[u32; 4]>,
}

impl DependencySet {
    pub fn independent() -> Self {
        Self::default()
    }

    pub fn single(branch: u32) -> Self {
        let mut ds = Self::default();
        ds.insert(branch);
        ds
    }

    pub fn is_independent(&self) -> bool {
        self.branches.is_empty()
    }

    /// Highest branch index, or 0 when independent.
    pub fn max(&self) -> u32 {
        self.branches.last().copied().unwrap_or(0)
    }

    pub fn contains(&self, branch: u32) -> bool {
        self.branches.binary_search(&branch).is_ok()
    }

    pub fn insert(&mut self, branch: u32) {
        if branch == 0 {
            return;
        }
        if let Err(pos) = self.branches.binary_search(&branch) {
            self.branches.insert(pos, branch);
        }
    }

    pub fn with(&self, branch: u32) -> Self {
        let mut ds = self.clone();
        ds.insert(branch);
        ds
    }

    pub fn without(&self, branch: u32) -> Self {
        let mut ds = self.clone();
        if let Ok(pos) = ds.branches.binary_search(&branch) {
            ds.branches.remove(pos);
        }
        ds
    }

    pub fn union(&self, other: &DependencySet) -> Self {
        let mut ds = self.clone();
        ds.union_with(other);
        ds
    }

    pub fn union_with(&mut self, other: &DependencySet) {
        if other.branches.is_empty() {
            return;
        }
        if self.branches.is_empty() {
            self.branches = other.branches.clone();
            return;
        }
        let mut merged: SmallVec<[u32; 4]> = SmallVec::with_capacity(self.branches.len() + other.branches.len());
        let (mut i, mut j) = (0, 0);
        while i < self.branches.len() && j < other.branches.len() {
            let (a, b) = (self.branches[i], other.branches[j]);
            if a < b {
                merged.push(a);
                i += 1;
            } else if b < a {
                merged.push(b);
                j += 1;
            } else {
                merged.push(a);
                i += 1;
                j += 1;
            }
        }
        merged.extend_from_slice(&self.branches[i..]);
        merged.extend_from_slice(&other.branches[j..]);
        self.branches = merged;
    }

    pub fn is_subset(&self, other: &DependencySet) -> bool {
        self.branches.iter().all(|b| other.contains(*b))
    }

    /// Drops every branch above `depth`.
    pub fn truncate(&self, depth: u32) -> Self {
        Self {
            branches: self.branches.iter().copied().filter(|b| *b <= depth).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.branches.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}

impl FromIterator<u32> for DependencySet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut ds = DependencySet::independent();
        for branch in iter {
            ds.insert(branch);
        }
        ds
    }
}

impl fmt::Debug for DependencySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.branches.iter()).finish()
    }
}

impl fmt::Display for DependencySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_independent() {
        let ds = DependencySet::independent();
        assert!(ds.is_independent());
        assert_eq!(ds.max(), 0);
        assert_eq!(ds.with(0), ds);
    }

    #[test]
    fn test_union_and_without() {
        let a: DependencySet = [1, 4].into_iter().collect();
        let b: DependencySet = [2, 4, 7].into_iter().collect();
        let u = a.union(&b);
        assert_eq!(u.iter().collect::<Vec<_>>(), vec![1, 2, 4, 7]);
        assert_eq!(u.max(), 7);
        assert_eq!(u.without(7).max(), 4);
        assert!(a.is_subset(&u));
        assert!(!u.is_subset(&a));
        assert_eq!(u.truncate(3).iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

        #[test]
        fn prop_union_is_conservative(
            a in proptest::collection::vec(1u32..20, 0..6),
            b in proptest::collection::vec(1u32..20, 0..6),
        ) {
            let da: DependencySet = a.iter().copied().collect();
            let db: DependencySet = b.iter().copied().collect();
            let u = da.union(&db);
            prop_assert!(da.is_subset(&u));
            prop_assert!(db.is_subset(&u));
            prop_assert_eq!(u.clone(), db.union(&da));
            prop_assert_eq!(u.max(), da.max().max(db.max()));
            for branch in u.iter() {
                prop_assert!(da.contains(branch) || db.contains(branch));
            }
        }
    }
}
