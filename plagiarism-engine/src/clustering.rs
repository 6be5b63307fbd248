//! Groups suspicious pairs into clusters via path-compressed, union-by-rank
//! union-find, so a chain of pairwise copies (A~B, B~C) surfaces as one
//! cluster `{A, B, C}` rather than two overlapping pairs.

use std::collections::HashMap;

use judge_types::{ClusterMember, SuspiciousPair};

pub struct UnionFind {
    parent: HashMap<String, String>,
    rank: HashMap<String, u32>,
}

impl UnionFind {
    pub fn new() -> Self {
        Self {
            parent: HashMap::new(),
            rank: HashMap::new(),
        }
    }

    fn make_set(&mut self, id: &str) {
        self.parent
            .entry(id.to_string())
            .or_insert_with(|| id.to_string());
        self.rank.entry(id.to_string()).or_insert(0);
    }

    pub fn find(&mut self, id: &str) -> String {
        self.make_set(id);
        let parent = self.parent.get(id).unwrap().clone();
        if parent == id {
            return parent;
        }
        let root = self.find(&parent);
        self.parent.insert(id.to_string(), root.clone());
        root
    }

    pub fn union(&mut self, a: &str, b: &str) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return;
        }
        let rank_a = *self.rank.get(&root_a).unwrap();
        let rank_b = *self.rank.get(&root_b).unwrap();
        match rank_a.cmp(&rank_b) {
            std::cmp::Ordering::Less => {
                self.parent.insert(root_a, root_b);
            }
            std::cmp::Ordering::Greater => {
                self.parent.insert(root_b, root_a);
            }
            std::cmp::Ordering::Equal => {
                self.parent.insert(root_b.clone(), root_a.clone());
                *self.rank.get_mut(&root_a).unwrap() += 1;
            }
        }
    }
}

impl Default for UnionFind {
    fn default() -> Self {
        Self::new()
    }
}

/// Groups suspicious pairs into connected components of size >= 2, each
/// member carrying its submission id/user/code for the check-result
/// response. Re-checks `similarity > threshold` before unioning, so a
/// pair built with a different threshold upstream can never leak into a
/// cluster here.
pub fn cluster_pairs(pairs: &[SuspiciousPair], threshold: f32) -> Vec<Vec<ClusterMember>> {
    let mut uf = UnionFind::new();
    let mut members: HashMap<String, ClusterMember> = HashMap::new();

    for pair in pairs {
        if pair.similarity > threshold {
            uf.union(&pair.submission_a, &pair.submission_b);
        }
        members
            .entry(pair.submission_a.clone())
            .or_insert_with(|| ClusterMember {
                submission_id: pair.submission_a.clone(),
                user_id: pair.user_a.clone(),
                username: pair.username_a.clone(),
                code: pair.raw_code_a.clone(),
            });
        members
            .entry(pair.submission_b.clone())
            .or_insert_with(|| ClusterMember {
                submission_id: pair.submission_b.clone(),
                user_id: pair.user_b.clone(),
                username: pair.username_b.clone(),
                code: pair.raw_code_b.clone(),
            });
    }

    let mut groups: HashMap<String, Vec<ClusterMember>> = HashMap::new();
    for (id, member) in members {
        let root = uf.find(&id);
        groups.entry(root).or_default().push(member);
    }

    let mut clusters: Vec<Vec<ClusterMember>> = groups
        .into_values()
        .filter(|members| members.len() >= 2)
        .collect();
    for cluster in &mut clusters {
        cluster.sort_by(|a, b| a.submission_id.cmp(&b.submission_id));
    }
    clusters.sort_by(|a, b| a[0].submission_id.cmp(&b[0].submission_id));
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: &str, b: &str, sim: f32) -> SuspiciousPair {
        SuspiciousPair {
            user_a: format!("user-{a}"),
            username_a: format!("user-{a}"),
            submission_a: a.to_string(),
            raw_code_a: format!("code-{a}"),
            user_b: format!("user-{b}"),
            username_b: format!("user-{b}"),
            submission_b: b.to_string(),
            raw_code_b: format!("code-{b}"),
            similarity: sim,
        }
    }

    #[test]
    fn transitive_pairs_merge_into_one_cluster() {
        let pairs = vec![pair("a", "b", 0.98), pair("b", "c", 0.99)];
        let clusters = cluster_pairs(&pairs, 0.97);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 3);
    }

    #[test]
    fn disjoint_pairs_stay_separate_clusters() {
        let pairs = vec![pair("a", "b", 0.98), pair("c", "d", 0.99)];
        let clusters = cluster_pairs(&pairs, 0.97);
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn no_pairs_yields_no_clusters() {
        assert_eq!(cluster_pairs(&[], 0.97).len(), 0);
    }

    #[test]
    fn a_pair_at_or_below_threshold_is_not_unioned() {
        let pairs = vec![pair("a", "b", 0.96), pair("b", "c", 0.99)];
        let clusters = cluster_pairs(&pairs, 0.97);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 2);
        assert!(clusters[0].iter().any(|m| m.submission_id == "b"));
        assert!(clusters[0].iter().any(|m| m.submission_id == "c"));
    }
}
