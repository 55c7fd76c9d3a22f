//! Run orchestration
//!
//! [`Balancer`] drives one full run on one host: resolve the assigned IP
//! slice, mount everything, run fio write-then-read per mount, unmount
//! everything. Cleanup is structural, not conditional: once mounting was
//! attempted the unmount pass always runs, and a generated job file is
//! removed by its guard's `Drop` no matter how the fio invocations went.

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::config::RunConfig;
use crate::fio::{FioProfile, FioRunner, READ_SECTION, WRITE_SECTION};
use crate::mount::{MountManager, NfsMounter};
use crate::partition;

/// Run error types
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to mount all assigned shares")]
    MountIncomplete,

    #[error("{failed} benchmark phase(s) failed")]
    BenchFailed { failed: usize },

    #[error("failed to unmount all assigned shares")]
    UnmountIncomplete,
}

/// Job file written to the system temp dir, deleted on drop.
///
/// Keyed by IP so concurrent runs against different servers from the same
/// temp dir cannot collide within one host.
struct TempJobFile {
    path: PathBuf,
}

impl TempJobFile {
    fn create(ip: &str, contents: &str) -> std::io::Result<Self> {
        let path = std::env::temp_dir().join(format!("fio_{}.fio", ip));
        std::fs::write(&path, contents)?;
        Ok(Self { path })
    }

    fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for TempJobFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("Failed to remove job file {}: {}", self.path.display(), e);
        }
    }
}

/// One host's share of the fleet-wide benchmark run.
pub struct Balancer<M: NfsMounter, F: FioRunner> {
    current_host: String,
    assigned: Vec<String>,
    total_threads: u32,
    mounts: MountManager<M>,
    fio: F,
}

impl<M: NfsMounter, F: FioRunner> Balancer<M, F> {
    /// Build a balancer for `current_host` from the fleet-wide config.
    ///
    /// The assignment is resolved here, once; an empty assignment is valid
    /// and makes [`run`](Balancer::run) a no-op.
    pub fn new(config: &RunConfig, current_host: String, mounter: M, fio: F) -> Self {
        let assigned = partition::assigned_ips(&config.hosts, &config.ip_addresses, &current_host)
            .to_vec();

        Self {
            current_host,
            assigned,
            total_threads: config.total_threads,
            mounts: MountManager::new(config.mount_base.clone(), mounter),
            fio,
        }
    }

    /// IPs assigned to this host, in partition order.
    pub fn assigned(&self) -> &[String] {
        &self.assigned
    }

    /// Execute the full mount / benchmark / unmount lifecycle.
    pub fn run(&mut self) -> Result<(), RunError> {
        info!("Running on host {}", self.current_host);
        info!("Assigned IPs: {:?}", self.assigned);

        if self.assigned.is_empty() {
            info!("No IPs assigned to this host, nothing to do");
            return Ok(());
        }

        let mounted = self.mounts.mount_all(&self.assigned);

        // The benchmark pass only runs when every mount succeeded, but the
        // unmount pass runs unconditionally to clean up partial mounts.
        let work = if mounted {
            self.bench_all()
        } else {
            error!("Failed to mount all IPs for {}", self.current_host);
            Err(RunError::MountIncomplete)
        };

        let unmounted = self.mounts.unmount_all(&self.assigned);

        work?;
        if !unmounted {
            return Err(RunError::UnmountIncomplete);
        }
        Ok(())
    }

    /// Run fio against every assigned mount point, in assignment order.
    ///
    /// Failures are per-IP and per-phase; one bad mount point never stops
    /// the others.
    fn bench_all(&self) -> Result<(), RunError> {
        let mut failed = 0;

        for ip in &self.assigned {
            let mount_point = self.mounts.mount_point(ip);
            let output_dir = mount_point.join("fio").join(&self.current_host);

            if let Err(e) = std::fs::create_dir_all(&output_dir) {
                error!(
                    "Failed to create output dir {}: {}",
                    output_dir.display(),
                    e
                );
                failed += 1;
                continue;
            }

            let profile = FioProfile {
                output_dir,
                numjobs: self.total_threads,
            };

            let job_file = match TempJobFile::create(ip, &profile.render()) {
                Ok(f) => f,
                Err(e) => {
                    error!("Failed to write job file for {}: {}", ip, e);
                    failed += 1;
                    continue;
                }
            };

            // Write before read, always; job_file is removed when this
            // iteration ends regardless of the outcome.
            for section in [WRITE_SECTION, READ_SECTION] {
                info!("Running fio {} on {}", section, mount_point.display());
                if let Err(e) = self.fio.run_section(job_file.path(), section) {
                    error!("Error running fio for {}: {}", ip, e);
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            Err(RunError::BenchFailed { failed })
        } else {
            Ok(())
        }
    }
}
