use anyhow::{Context, Result};
use beam_script_patcher::config::{Config, DEFAULT_BUNDLE_DIR, ROOT_VAR};
use beam_script_patcher::patch::Status;
use beam_script_patcher::runner::{check, run};
use clap::Parser;
use colored::Colorize;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "beam-script-patcher")]
#[command(about = "Install bundled helper scripts into an Erlang/Elixir toolchain", long_about = None)]
#[command(version)]
struct Cli {
    /// Erlang/OTP tree that receives scripts/valgrind_beamasm_update.escript
    #[arg(long, env = "ERL_TOP", value_name = "DIR")]
    erl_top: Option<PathBuf>,

    /// Directory holding the bundled patch sources
    #[arg(long, env = "BEAM_PATCH_BUNDLE_DIR", value_name = "DIR", default_value = DEFAULT_BUNDLE_DIR)]
    bundle_dir: PathBuf,

    /// Report stale or missing targets without writing anything
    #[arg(long)]
    check: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = resolve_config(&cli)?;

    if cli.check {
        return cmd_check(&config);
    }

    run(&config, |outcome| {
        if outcome.action.is_patched() {
            println!("patch {} -> {}", outcome.name, outcome.target.display());
        }
    })?;

    Ok(())
}

/// Diagnostics go to stderr so stdout only carries patch notices.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// `--erl-top` (or `ERL_TOP`, via clap) wins; everything else comes from the
/// process environment.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let erl_top: Option<OsString> = cli.erl_top.clone().map(PathBuf::into_os_string);

    let mut config = Config::from_lookup(|name| {
        if name == ROOT_VAR {
            erl_top.clone()
        } else {
            env::var_os(name)
        }
    })
    .context("required configuration value is not set")?;
    config.bundle_dir = cli.bundle_dir.clone();

    Ok(config)
}

fn cmd_check(config: &Config) -> Result<()> {
    let reports = check(config)?;
    let mut pending = 0;

    for report in &reports {
        let target = report.target.display();
        match report.status {
            Status::UpToDate => {
                println!("{} {}: up to date ({})", "✓".green(), report.name, target);
            }
            Status::Stale => {
                println!("{} {}: stale ({})", "✗".red(), report.name, target);
                pending += 1;
            }
            Status::Missing => {
                println!("{} {}: missing ({})", "⊙".yellow(), report.name, target);
                pending += 1;
            }
        }
    }

    if pending > 0 {
        eprintln!(
            "{}",
            format!("{} of {} targets need patching", pending, reports.len()).yellow()
        );
        std::process::exit(1);
    }

    Ok(())
}
