//! NFS mount management
//!
//! The [`MountManager`] owns the mapping from assigned IPs to local mount
//! points under `mount_base` and a bookkeeping set of the points this run
//! believes it mounted. The OS is always re-queried before acting; the set
//! is accounting only and may drift from real mount state.
//!
//! Actual OS interaction sits behind the [`NfsMounter`] trait so that the
//! orchestration logic can be exercised without root or an NFS server.

use std::collections::HashSet;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{error, info};

use crate::config::defaults::SHARE_COUNT;

/// Share name for slot `i` of a host's assigned block (0-based).
///
/// Servers export `mount1`..`mount8`; the pairing with IPs is positional
/// and stays fixed for the whole run, including after partial failures.
pub fn share_name(slot: usize) -> String {
    debug_assert!(slot < SHARE_COUNT);
    format!("mount{}", slot + 1)
}

/// Mount error types
#[derive(Debug, thiserror::Error)]
pub enum MountError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("mount of {remote} at {mount_point} failed: {status}")]
    MountFailed {
        remote: String,
        mount_point: PathBuf,
        status: String,
    },

    #[error("unmount of {mount_point} failed: {status}")]
    UnmountFailed { mount_point: PathBuf, status: String },
}

/// OS-level mount operations
///
/// Implementations must not interpret arguments through a shell.
pub trait NfsMounter {
    /// Mount `{ip}:/{share}` at `mount_point` with filesystem type nfs.
    fn mount_nfs(&self, ip: &str, share: &str, mount_point: &Path) -> Result<(), MountError>;

    /// Unmount `mount_point`.
    fn unmount(&self, mount_point: &Path) -> Result<(), MountError>;

    /// Whether the OS currently has a filesystem mounted at `mount_point`.
    fn is_mounted(&self, mount_point: &Path) -> bool;
}

/// [`NfsMounter`] backed by the system `mount`/`umount` utilities and
/// `/proc/self/mounts`.
#[derive(Debug, Default)]
pub struct SystemMounter;

impl NfsMounter for SystemMounter {
    fn mount_nfs(&self, ip: &str, share: &str, mount_point: &Path) -> Result<(), MountError> {
        let remote = format!("{}:/{}", ip, share);
        let status = Command::new("mount")
            .arg("-t")
            .arg("nfs")
            .arg(&remote)
            .arg(mount_point)
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(MountError::MountFailed {
                remote,
                mount_point: mount_point.to_path_buf(),
                status: status.to_string(),
            })
        }
    }

    fn unmount(&self, mount_point: &Path) -> Result<(), MountError> {
        let status = Command::new("umount").arg(mount_point).status()?;

        if status.success() {
            Ok(())
        } else {
            Err(MountError::UnmountFailed {
                mount_point: mount_point.to_path_buf(),
                status: status.to_string(),
            })
        }
    }

    fn is_mounted(&self, mount_point: &Path) -> bool {
        let file = match std::fs::File::open("/proc/self/mounts") {
            Ok(f) => f,
            Err(_) => return false,
        };

        // Octal escapes (\040 etc.) in mount table entries are irrelevant
        // here: mount points are {mount_base}/{ip} and contain no spaces.
        let target = mount_point.to_string_lossy();
        BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .any(|line| line.split_whitespace().nth(1) == Some(target.as_ref()))
    }
}

/// Mounts and unmounts a host's assigned IPs under `mount_base`.
pub struct MountManager<M: NfsMounter> {
    mount_base: PathBuf,
    mounter: M,
    mounted: HashSet<PathBuf>,
}

impl<M: NfsMounter> MountManager<M> {
    pub fn new(mount_base: PathBuf, mounter: M) -> Self {
        Self {
            mount_base,
            mounter,
            mounted: HashSet::new(),
        }
    }

    /// Local mount point for `ip`: `{mount_base}/{ip}`.
    pub fn mount_point(&self, ip: &str) -> PathBuf {
        self.mount_base.join(ip)
    }

    /// Mount one IP with the given share name.
    ///
    /// Creates the mount point directory if needed. An already-mounted
    /// path counts as success and is still recorded, so unmount accounting
    /// stays symmetric.
    pub fn mount(&mut self, ip: &str, share: &str) -> Result<(), MountError> {
        let mount_point = self.mount_point(ip);

        std::fs::create_dir_all(&mount_point)?;

        if self.mounter.is_mounted(&mount_point) {
            info!("Mount point {} is already mounted", mount_point.display());
            self.mounted.insert(mount_point);
            return Ok(());
        }

        self.mounter.mount_nfs(ip, share, &mount_point)?;
        info!(
            "Successfully mounted {}:/{} at {}",
            ip,
            share,
            mount_point.display()
        );
        self.mounted.insert(mount_point);
        Ok(())
    }

    /// Unmount one IP's mount point.
    ///
    /// A path the OS does not consider mounted counts as success; any
    /// stale bookkeeping entry for it is dropped.
    pub fn unmount(&mut self, ip: &str) -> Result<(), MountError> {
        let mount_point = self.mount_point(ip);

        if !self.mounter.is_mounted(&mount_point) {
            info!("Mount point {} is not mounted", mount_point.display());
            self.mounted.remove(&mount_point);
            return Ok(());
        }

        self.mounter.unmount(&mount_point)?;
        info!("Successfully unmounted {}", mount_point.display());
        self.mounted.remove(&mount_point);
        Ok(())
    }

    /// Mount all assigned IPs, pairing slot `i` with share `mount{i+1}`.
    ///
    /// Per-IP failures are logged and do not stop the loop; the return
    /// value is the AND of all individual results.
    pub fn mount_all(&mut self, ips: &[String]) -> bool {
        let mut success = true;
        for (i, ip) in ips.iter().enumerate() {
            let share = share_name(i);
            if let Err(e) = self.mount(ip, &share) {
                error!("Error mounting {}:/{}: {}", ip, share, e);
                success = false;
            }
        }
        success
    }

    /// Unmount all assigned IPs. Same aggregation as [`mount_all`].
    ///
    /// [`mount_all`]: MountManager::mount_all
    pub fn unmount_all(&mut self, ips: &[String]) -> bool {
        let mut success = true;
        for ip in ips {
            if let Err(e) = self.unmount(ip) {
                error!("Error unmounting {}: {}", self.mount_point(ip).display(), e);
                success = false;
            }
        }
        success
    }
}
