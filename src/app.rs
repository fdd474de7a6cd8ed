use std::path::PathBuf;

use crate::{
    VERSION,
    config::ProcscopeConfig,
    prelude::*,
    prepare::{CancelFlag, PrepareOutcome, prepare_target},
    render,
    session::FilterSession,
    snapshot::{LocalSource, ProcessSnapshotSource, RemoteSource, worker},
};
use clap::{
    Args, Parser, Subcommand,
    builder::{Styles, styling},
};
use itertools::Itertools;
use procscope_shared::{ArtifactExt, ProcessRecord, ProcessTable};

const PROCSCOPE_U8_COLOR_CODE: u8 = 75; // #5FAFFF

fn create_styles() -> Styles {
    styling::Styles::styled()
        .header(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .usage(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .literal(
            styling::Ansi256Color(PROCSCOPE_U8_COLOR_CODE).on_default() | styling::Effects::BOLD,
        )
        .placeholder(styling::AnsiColor::Cyan.on_default())
}

#[derive(Parser, Debug)]
#[command(version, about = "Inspect and filter process trees on local and remote hosts", styles = create_styles())]
pub struct Cli {
    /// The host to snapshot over ssh.
    /// If omitted, the host of the last remote snapshot is reused; if none
    /// was recorded, the local machine is used.
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Snapshot the local machine even if a last host is recorded
    #[arg(long, global = true, default_value = "false")]
    pub local: bool,

    /// The ssh command used to reach remote hosts, e.g. "ssh -J bastion"
    #[arg(long, env = "PROCSCOPE_SSH", global = true)]
    pub ssh_command: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the processes matching a filter as a tree, together with their ancestors
    Tree(TreeArgs),
    /// List the processes matching a filter as a flat table
    List(ListArgs),
    /// Check that a process can be attached to and resolve its executable
    Prepare(PrepareArgs),
}

#[derive(Args, Debug)]
struct TreeArgs {
    /// Substring to match against process command lines. Empty matches everything.
    #[arg(long, short, default_value = "")]
    filter: String,

    /// Print the forest as JSON instead of an indented tree
    #[arg(long, default_value = "false")]
    json: bool,

    /// Also save the forest artifact into this directory
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Substring to match against process command lines. Empty matches everything.
    #[arg(long, short, default_value = "")]
    filter: String,

    /// Print the matching records as JSON instead of a table
    #[arg(long, default_value = "false")]
    json: bool,
}

#[derive(Args, Debug)]
struct PrepareArgs {
    /// The PID to prepare for attach
    pid: libc::pid_t,
}

fn select_host(cli: &Cli, config: &ProcscopeConfig) -> Option<String> {
    if cli.local {
        return None;
    }
    if let Some(host) = &cli.host {
        return Some(host.clone());
    }
    if let Some(host) = &config.last_host {
        debug!("Reusing last host {host}");
        return Some(host.clone());
    }
    None
}

fn build_source(
    host: Option<&str>,
    ssh_command: Option<&str>,
) -> Result<Box<dyn ProcessSnapshotSource>> {
    match host {
        Some(host) => Ok(Box::new(RemoteSource::new(host, ssh_command)?)),
        None => Ok(Box::new(LocalSource::new())),
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    debug!("procscope v{VERSION}");

    let mut config = ProcscopeConfig::load()?;
    let host = select_host(&cli, &config);

    let source = build_source(host.as_deref(), cli.ssh_command.as_deref())?;
    let label = source.label();

    // Enumeration can block on a slow host; keep it off this thread and
    // wait for the single result message.
    let rx = worker::spawn_fetch(source)?;
    let table = rx
        .recv()
        .context("The snapshot worker exited without reporting")??;
    info!("Snapshot of {label}: {} processes", table.len());

    if let Some(host) = &host {
        if config.record_last_host(host) {
            config.persist()?;
        }
    }

    match cli.command {
        Commands::Tree(args) => {
            let session = FilterSession::new(table);
            session
                .filter()
                .subscribe(|text| debug!("Filter set to {text:?}"));
            session.set_filter(&args.filter);
            let forest = session.forest();

            if args.json {
                println!("{}", serde_json::to_string_pretty(&forest)?);
            } else {
                render::print_tree(&forest);
            }
            if let Some(out) = &args.out {
                forest.save_to(out)?;
                info!("Forest artifact saved to {}", out.display());
            }
        }
        Commands::List(args) => {
            if args.json {
                let records = matching_records(&table, &args.filter);
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                render::print_table(&table, &args.filter);
            }
        }
        Commands::Prepare(args) => {
            // The re-probe in the liveness phase needs its own source; the
            // first one was consumed by the snapshot worker.
            let probe = build_source(host.as_deref(), cli.ssh_command.as_deref())?;
            let cancel = CancelFlag::new();
            match prepare_target(probe.as_ref(), &table, args.pid, &cancel)? {
                PrepareOutcome::Prepared(target) => {
                    println!("Ready to attach:");
                    println!("  pid:        {}", target.record.pid);
                    println!("  parent:     {}", target.record.parent_pid);
                    println!("  command:    {}", target.record.command);
                    println!("  executable: {}", target.executable_path);
                }
                PrepareOutcome::Cancelled => info!("Preparation cancelled"),
            }
        }
    }

    Ok(())
}

fn matching_records(table: &ProcessTable, filter: &str) -> Vec<ProcessRecord> {
    table
        .matching_pids(filter)
        .into_iter()
        .sorted_unstable()
        .filter_map(|pid| table.get(pid).cloned())
        .collect()
}
