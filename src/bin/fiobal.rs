//! fiobal CLI
//!
//! One invocation per host. Either pass the fleet lists on the command
//! line or point `--config` at a TOML file with the same fields:
//!
//! ```bash
//! fiobal --hosts h1 h2 --ips 10.0.0.1 ... 10.0.0.16 --mount-base /mnt
//! fiobal --config fleet.toml
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing::{error, info};

use fiobal::config::{defaults, RunConfig};
use fiobal::fio::SystemFioRunner;
use fiobal::mount::SystemMounter;
use fiobal::runner::Balancer;

/// Distribute fio benchmarks over NFS shares across a host fleet
#[derive(Parser, Debug)]
#[command(name = "fiobal")]
#[command(about = "Run this host's share of a fleet-wide fio benchmark")]
struct Args {
    /// All hostnames in the fleet, in partition order
    #[arg(long, num_args = 1.., value_name = "HOST")]
    hosts: Vec<String>,

    /// All NFS server IP addresses, 8 per host, in partition order
    #[arg(long, num_args = 1.., value_name = "ADDR")]
    ips: Vec<String>,

    /// Base directory for mount points
    #[arg(long, default_value = defaults::default_mount_base())]
    mount_base: PathBuf,

    /// fio numjobs value, used directly per mount point (default: 8192).
    /// Overrides the config file when both are given.
    #[arg(long, value_name = "INT")]
    total_threads: Option<u32>,

    /// TOML configuration file (alternative to --hosts/--ips)
    #[arg(long, value_name = "PATH", conflicts_with_all = ["hosts", "ips"])]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = defaults::default_log_level())]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    fiobal::logging::init_with_hostname(&args.log_level);

    let config = match load_config(&args) {
        Ok(Some(config)) => config,
        Ok(None) => {
            // Neither --config nor both --hosts and --ips were given.
            let _ = Args::command().print_help();
            return ExitCode::from(2);
        }
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let current_host = gethostname::gethostname()
        .to_str()
        .unwrap_or("unknown")
        .to_string();

    let mut balancer = Balancer::new(&config, current_host, SystemMounter, SystemFioRunner::default());

    match balancer.run() {
        Ok(()) => {
            info!("Run complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Run failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Resolve the run configuration from flags or a config file.
///
/// `Ok(None)` means usage help should be printed: the caller supplied
/// neither a config file nor both lists.
fn load_config(args: &Args) -> Result<Option<RunConfig>, fiobal::config::ConfigError> {
    if let Some(path) = &args.config {
        let mut config = RunConfig::from_file(path)?;
        if let Some(threads) = args.total_threads {
            config.total_threads = threads;
        }
        return Ok(Some(config));
    }

    if args.hosts.is_empty() || args.ips.is_empty() {
        return Ok(None);
    }

    let config = RunConfig {
        hosts: args.hosts.clone(),
        ip_addresses: args.ips.clone(),
        mount_base: args.mount_base.clone(),
        total_threads: args.total_threads.unwrap_or(defaults::TOTAL_THREADS),
    };
    config.validate()?;

    Ok(Some(config))
}
