use itertools::Itertools;
use procscope_shared::{ForestNode, ProcessForest, ProcessTable};
use std::collections::{HashMap, HashSet};

/// Parent PIDs at or below this value terminate the ancestor walk; the forest
/// is conceptually rooted at PID 1.
const SYNTHETIC_ROOT_PID: i32 = 1;

/// PIDs in the reserved system range are only admitted as roots when their
/// subtree contains a filter match.
const RESERVED_PID_MAX: i32 = 5;

/// Build the ancestor-closed forest for a snapshot and a filter string.
///
/// The forest contains exactly the processes whose command line contains the
/// filter substring, plus every ancestor of such a process. Ancestors are
/// kept whether or not they match themselves; the `matched` flag on each node
/// records which case applies. The forest is rebuilt from scratch on every
/// call.
pub fn build_forest(table: &ProcessTable, filter: &str) -> ProcessForest {
    let matches: HashSet<i32> = table.matching_pids(filter).into_iter().collect();

    // Every match plus every ancestor reachable through the parent chain.
    // The set also memoizes walks shared between leaves and bounds the loop
    // on snapshots with a corrupted PPID cycle.
    let mut tracked: HashSet<i32> = HashSet::new();
    for &leaf in &matches {
        let mut pid = leaf;
        loop {
            if tracked.contains(&pid) {
                break;
            }
            let Some(record) = table.get(pid) else {
                // The process exited between snapshot and lookup. Its chain
                // is unknown from here on, so the previous PID stays a root.
                break;
            };
            tracked.insert(pid);
            if record.parent_pid <= SYNTHETIC_ROOT_PID {
                break;
            }
            pid = record.parent_pid;
        }
    }

    let mut children_of: HashMap<i32, Vec<i32>> = HashMap::new();
    let mut root_pids: Vec<i32> = Vec::new();
    for &pid in &tracked {
        // Tracked PIDs always have a record; the walk skips unknown ones.
        let Some(record) = table.get(pid) else {
            continue;
        };
        let parent = record.parent_pid;
        if parent != pid && tracked.contains(&parent) {
            children_of.entry(parent).or_default().push(pid);
        } else {
            // Parent is the synthetic root, unknown, or the PID itself.
            root_pids.push(pid);
        }
    }

    let roots = root_pids
        .into_iter()
        .sorted_unstable()
        .map(|pid| build_node(pid, table, &children_of, &matches))
        .filter(|node| node.pid > RESERVED_PID_MAX || subtree_has_match(node))
        .collect();

    ProcessForest {
        filter: filter.to_string(),
        roots,
    }
}

fn build_node(
    pid: i32,
    table: &ProcessTable,
    children_of: &HashMap<i32, Vec<i32>>,
    matches: &HashSet<i32>,
) -> ForestNode {
    let command = table
        .get(pid)
        .map(|record| record.command.clone())
        .unwrap_or_default();
    let children = children_of
        .get(&pid)
        .into_iter()
        .flatten()
        .copied()
        .sorted_unstable()
        .map(|child| build_node(child, table, children_of, matches))
        .collect();

    ForestNode {
        pid,
        command,
        matched: matches.contains(&pid),
        children,
    }
}

fn subtree_has_match(node: &ForestNode) -> bool {
    node.matched || node.children.iter().any(subtree_has_match)
}
