//! Overlap resolution for runs that share tiles
//!
//! A horizontal and a vertical run can meet at a tile (L, T and + shapes).
//! Merging both blindly would delete or count that tile twice, so runs are
//! grouped into clusters with a union-find and each cluster's runs are
//! classified:
//!
//! - **branch**: none of its non-root tiles is a junction; merges first
//! - **collapsible**: every junction it touches is some run's non-root tile
//!   in the cluster; merges after the branches
//! - **blocked**: anything else; left for a later pass

use rustc_hash::{FxHashMap, FxHashSet};

use crate::matcher::{DirectionalMatch, MatchReport};

// ============================================================================
// UNION-FIND
// ============================================================================

/// Disjoint sets over board indices (path compression + union by rank)
#[derive(Clone, Debug, Default)]
pub struct UnionFind {
    parent: FxHashMap<usize, usize>,
    rank: FxHashMap<usize, u32>,
}

impl UnionFind {
    pub fn new(items: impl IntoIterator<Item = usize>) -> Self {
        let mut sets = Self::default();
        for item in items {
            sets.parent.entry(item).or_insert(item);
            sets.rank.entry(item).or_insert(0);
        }
        sets
    }

    /// Representative of `item`'s set; unknown items are their own set
    pub fn find(&mut self, item: usize) -> usize {
        let mut root = item;
        while let Some(&parent) = self.parent.get(&root) {
            if parent == root {
                break;
            }
            root = parent;
        }

        let mut current = item;
        while current != root {
            let next = self.parent.get(&current).copied().unwrap_or(root);
            self.parent.insert(current, root);
            current = next;
        }
        root
    }

    pub fn union(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return;
        }

        let rank_a = self.rank.get(&root_a).copied().unwrap_or(0);
        let rank_b = self.rank.get(&root_b).copied().unwrap_or(0);
        if rank_a < rank_b {
            self.parent.insert(root_a, root_b);
        } else {
            self.parent.insert(root_b, root_a);
            if rank_a == rank_b {
                self.rank.insert(root_a, rank_a + 1);
            }
        }
    }
}

// ============================================================================
// CLUSTERS
// ============================================================================

/// Two or more qualifying runs connected through shared tiles
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchCluster {
    /// Indices that belong to at least two runs, ascending
    pub junctions: Vec<usize>,
    pub branches: Vec<DirectionalMatch>,
    pub collapsible: Vec<DirectionalMatch>,
    pub blocked: Vec<DirectionalMatch>,
}

impl MatchCluster {
    /// Every run of the cluster, whatever its class
    pub fn runs(&self) -> impl Iterator<Item = &DirectionalMatch> + '_ {
        self.branches
            .iter()
            .chain(self.collapsible.iter())
            .chain(self.blocked.iter())
    }

    fn classify(matches: Vec<DirectionalMatch>) -> Self {
        let mut degree: FxHashMap<usize, usize> = FxHashMap::default();
        for index in matches.iter().flat_map(|m| m.indices.iter()) {
            *degree.entry(*index).or_insert(0) += 1;
        }
        let junction_set: FxHashSet<usize> = degree
            .into_iter()
            .filter(|&(_, count)| count > 1)
            .map(|(index, _)| index)
            .collect();
        let non_root: FxHashSet<usize> = matches
            .iter()
            .flat_map(|m| m.non_root().iter().copied())
            .collect();

        let mut cluster = MatchCluster::default();
        for m in matches {
            if m.non_root().iter().all(|i| !junction_set.contains(i)) {
                cluster.branches.push(m);
            } else if m
                .indices
                .iter()
                .filter(|i| junction_set.contains(i))
                .all(|i| non_root.contains(i))
            {
                cluster.collapsible.push(m);
            } else {
                cluster.blocked.push(m);
            }
        }

        let mut junctions: Vec<usize> = junction_set.into_iter().collect();
        junctions.sort_unstable();
        cluster.junctions = junctions;
        cluster
    }
}

/// Split qualifying runs into non-overlapping runs and classified clusters
///
/// Both outputs keep the input order: clusters are ordered by their first run.
pub fn resolve_special_matches(matches: Vec<DirectionalMatch>) -> MatchReport {
    let mut sets = UnionFind::new(matches.iter().flat_map(|m| m.indices.iter().copied()));
    for m in &matches {
        let Some(root) = m.root() else { continue };
        for &index in m.non_root() {
            sets.union(root, index);
        }
    }

    let mut slot_of_root: FxHashMap<usize, usize> = FxHashMap::default();
    let mut groups: Vec<Vec<DirectionalMatch>> = Vec::new();
    for m in matches {
        let Some(root) = m.root() else { continue };
        let root = sets.find(root);
        let slot = *slot_of_root.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(m);
    }

    let mut report = MatchReport::default();
    for mut group in groups {
        if group.len() == 1 {
            report.simple.append(&mut group);
        } else {
            let cluster = MatchCluster::classify(group);
            tracing::trace!(
                junctions = ?cluster.junctions,
                branches = cluster.branches.len(),
                collapsible = cluster.collapsible.len(),
                blocked = cluster.blocked.len(),
                "cluster classified"
            );
            report.clusters.push(cluster);
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Direction;

    fn run(direction: Direction, indices: &[usize]) -> DirectionalMatch {
        DirectionalMatch {
            direction,
            indices: indices.to_vec(),
        }
    }

    #[test]
    fn test_union_find() {
        let mut sets = UnionFind::new([1, 2, 3, 4, 5]);
        sets.union(1, 2);
        sets.union(3, 4);
        assert_eq!(sets.find(1), sets.find(2));
        assert_ne!(sets.find(1), sets.find(3));
        sets.union(2, 4);
        assert_eq!(sets.find(1), sets.find(3));
        assert_ne!(sets.find(5), sets.find(1));
    }

    #[test]
    fn test_disjoint_runs_stay_simple() {
        let report = resolve_special_matches(vec![
            run(Direction::Left, &[0, 1, 2]),
            run(Direction::Left, &[8, 9, 10]),
        ]);
        assert_eq!(report.simple.len(), 2);
        assert!(report.clusters.is_empty());
    }

    #[test]
    fn test_l_shape_branch_then_collapsible() {
        // 4x4: column 2 rows 0..3 (root 2) and row 0 cols 0..3 (root 0) meet at 2
        let vertical = run(Direction::Up, &[2, 6, 10]);
        let horizontal = run(Direction::Left, &[0, 1, 2]);
        let report = resolve_special_matches(vec![vertical.clone(), horizontal.clone()]);

        assert!(report.simple.is_empty());
        assert_eq!(report.clusters.len(), 1);
        let cluster = &report.clusters[0];
        assert_eq!(cluster.junctions, vec![2]);
        assert_eq!(cluster.branches, vec![vertical]);
        assert_eq!(cluster.collapsible, vec![horizontal]);
        assert!(cluster.blocked.is_empty());
    }

    #[test]
    fn test_shared_root_corner_is_two_branches() {
        let report = resolve_special_matches(vec![
            run(Direction::Up, &[0, 4, 8]),
            run(Direction::Left, &[0, 1, 2]),
        ]);
        let cluster = &report.clusters[0];
        assert_eq!(cluster.junctions, vec![0]);
        assert_eq!(cluster.branches.len(), 2);
    }

    #[test]
    fn test_blocked_run() {
        // Row 0 touches two columns: at its own root (shared root) and at a non-root
        let row = run(Direction::Left, &[0, 1, 2]);
        let left_column = run(Direction::Up, &[0, 4, 8]);
        let right_column = run(Direction::Up, &[2, 6, 10]);
        let report = resolve_special_matches(vec![row.clone(), left_column.clone(), right_column.clone()]);

        assert_eq!(report.clusters.len(), 1);
        let cluster = &report.clusters[0];
        assert_eq!(cluster.junctions, vec![0, 2]);
        assert_eq!(cluster.branches, vec![left_column, right_column]);
        assert!(cluster.collapsible.is_empty());
        assert_eq!(cluster.blocked, vec![row]);
    }

    #[test]
    fn test_cross_shape() {
        let row = run(Direction::Left, &[4, 5, 6]);
        let column = run(Direction::Up, &[1, 5, 9]);
        let report = resolve_special_matches(vec![column, row]);
        let cluster = &report.clusters[0];
        assert_eq!(cluster.junctions, vec![5]);
        assert!(cluster.branches.is_empty());
        assert_eq!(cluster.collapsible.len(), 2);
        assert_eq!(cluster.runs().count(), 2);
    }
}
