use serde::{Deserialize, Serialize};

/// One process in the reconstructed forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestNode {
    pub pid: i32,
    pub command: String,
    /// Whether this process matched the filter directly, as opposed to being
    /// kept only as the ancestor of a match.
    pub matched: bool,
    pub children: Vec<ForestNode>,
}

/// Ancestor-closed process forest, conceptually rooted at a synthetic PID 1.
///
/// Built fresh for every (snapshot, filter) pair and discarded after use;
/// there is no incremental update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessForest {
    pub filter: String,
    pub roots: Vec<ForestNode>,
}

impl ProcessForest {
    /// Total number of nodes across all trees.
    pub fn node_count(&self) -> usize {
        fn count(node: &ForestNode) -> usize {
            1 + node.children.iter().map(count).sum::<usize>()
        }
        self.roots.iter().map(count).sum()
    }

    /// Whether `pid` appears anywhere in the forest.
    pub fn contains(&self, pid: i32) -> bool {
        fn find(node: &ForestNode, pid: i32) -> bool {
            node.pid == pid || node.children.iter().any(|child| find(child, pid))
        }
        self.roots.iter().any(|root| find(root, pid))
    }

    /// Depth-first iteration over every node in the forest.
    pub fn walk(&self, mut visit: impl FnMut(&ForestNode, usize)) {
        fn descend(node: &ForestNode, depth: usize, visit: &mut impl FnMut(&ForestNode, usize)) {
            visit(node, depth);
            for child in &node.children {
                descend(child, depth + 1, visit);
            }
        }
        for root in &self.roots {
            descend(root, 0, &mut visit);
        }
    }
}

impl super::ArtifactExt for ProcessForest {}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(pid: i32) -> ForestNode {
        ForestNode {
            pid,
            command: format!("proc-{pid}"),
            matched: true,
            children: Vec::new(),
        }
    }

    fn forest() -> ProcessForest {
        ProcessForest {
            filter: String::new(),
            roots: vec![ForestNode {
                pid: 10,
                command: "parent".to_string(),
                matched: false,
                children: vec![leaf(20), leaf(21)],
            }],
        }
    }

    #[test]
    fn node_count_covers_all_trees() {
        assert_eq!(forest().node_count(), 3);
    }

    #[test]
    fn contains_finds_nested_pids() {
        let forest = forest();
        assert!(forest.contains(10));
        assert!(forest.contains(21));
        assert!(!forest.contains(30));
    }

    #[test]
    fn walk_reports_depths() {
        let mut seen = Vec::new();
        forest().walk(|node, depth| seen.push((node.pid, depth)));
        assert_eq!(seen, vec![(10, 0), (20, 1), (21, 1)]);
    }
}
