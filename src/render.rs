use console::style;
use itertools::Itertools;
use procscope_shared::{ProcessForest, ProcessTable};
use tabled::{Table, Tabled, settings::Style};

/// Print the forest as an indented tree, one process per line, with direct
/// filter matches highlighted.
pub fn print_tree(forest: &ProcessForest) {
    if forest.roots.is_empty() {
        println!("No processes match {:?}", forest.filter);
        return;
    }

    forest.walk(|node, depth| {
        let indent = "  ".repeat(depth);
        let line = format!("{:>7}  {}", node.pid, node.command);
        if node.matched {
            println!("{indent}{}", style(line).green().bold());
        } else {
            println!("{indent}{}", style(line).dim());
        }
    });
}

#[derive(Tabled)]
struct ProcessRow {
    #[tabled(rename = "PID")]
    pid: i32,
    #[tabled(rename = "PPID")]
    ppid: i32,
    #[tabled(rename = "COMMAND")]
    command: String,
}

/// Print the processes matching `filter` as a flat table, ordered by PID.
pub fn print_table(table: &ProcessTable, filter: &str) {
    let rows: Vec<ProcessRow> = table
        .matching_pids(filter)
        .into_iter()
        .sorted_unstable()
        .filter_map(|pid| table.get(pid))
        .map(|record| ProcessRow {
            pid: record.pid,
            ppid: record.parent_pid,
            command: record.command.clone(),
        })
        .collect();

    if rows.is_empty() {
        println!("No processes match {filter:?}");
        return;
    }

    let mut output = Table::new(rows);
    output.with(Style::sharp());
    println!("{output}");
}
