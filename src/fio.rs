//! fio job-file generation and invocation
//!
//! Each mount point gets one job file with a fixed profile: libaio direct
//! I/O, 1 GiB files, 60 s time-based runs, queue depth 16, 2 MiB blocks.
//! The only knobs are the output directory and `numjobs`. The file defines
//! a write job and a read job; the orchestrator runs them as two separate
//! fio invocations, write first, via `--section`.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Job section names within a generated job file.
pub const WRITE_SECTION: &str = "seq-write";
pub const READ_SECTION: &str = "seq-read";

/// fio invocation error types
#[derive(Debug, thiserror::Error)]
pub enum FioError {
    #[error("failed to run fio: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("fio section {section} failed: {status}")]
    SectionFailed { section: String, status: String },
}

/// Per-mount benchmark profile.
///
/// `numjobs` is the `--total-threads` flag value, applied directly to each
/// mount point (not divided by host or mount counts).
#[derive(Debug, Clone)]
pub struct FioProfile {
    pub output_dir: PathBuf,
    pub numjobs: u32,
}

impl FioProfile {
    /// Render the fio job file for this profile.
    pub fn render(&self) -> String {
        format!(
            "[global]\n\
             ioengine=libaio\n\
             direct=1\n\
             size=1g\n\
             runtime=60\n\
             time_based=1\n\
             group_reporting=1\n\
             numa_mem_policy=local\n\
             numjobs={numjobs}\n\
             iodepth=16\n\
             bs=2m\n\
             \n\
             [{write_section}]\n\
             rw=randwrite\n\
             directory={dir}\n\
             \n\
             [{read_section}]\n\
             rw=randread\n\
             directory={dir}\n",
            numjobs = self.numjobs,
            write_section = WRITE_SECTION,
            read_section = READ_SECTION,
            dir = self.output_dir.display(),
        )
    }
}

/// Runs one job section of a generated job file.
///
/// A trait seam so orchestration tests do not need a fio binary.
pub trait FioRunner {
    fn run_section(&self, config: &Path, section: &str) -> Result<(), FioError>;
}

/// [`FioRunner`] backed by the fio binary on `$PATH`.
///
/// fio's console output is inherited; there is no machine-readable output
/// contract.
#[derive(Debug)]
pub struct SystemFioRunner {
    binary: PathBuf,
}

impl Default for SystemFioRunner {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("fio"),
        }
    }
}

impl FioRunner for SystemFioRunner {
    fn run_section(&self, config: &Path, section: &str) -> Result<(), FioError> {
        let status = Command::new(&self.binary)
            .arg(format!("--section={}", section))
            .arg(config)
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(FioError::SectionFailed {
                section: section.to_string(),
                status: status.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(numjobs: u32) -> FioProfile {
        FioProfile {
            output_dir: PathBuf::from("/mnt/10.0.0.1/fio/h1"),
            numjobs,
        }
    }

    #[test]
    fn test_fixed_profile_fields() {
        let rendered = profile(79).render();

        for line in [
            "ioengine=libaio",
            "direct=1",
            "size=1g",
            "runtime=60",
            "time_based=1",
            "group_reporting=1",
            "numa_mem_policy=local",
            "iodepth=16",
            "bs=2m",
        ] {
            assert!(rendered.contains(line), "missing {:?} in:\n{}", line, rendered);
        }
    }

    #[test]
    fn test_numjobs_used_directly() {
        assert!(profile(1).render().contains("numjobs=1\n"));
        assert!(profile(8192).render().contains("numjobs=8192\n"));
    }

    #[test]
    fn test_both_jobs_target_output_dir() {
        let rendered = profile(4).render();

        assert!(rendered.contains("[seq-write]\nrw=randwrite\ndirectory=/mnt/10.0.0.1/fio/h1"));
        assert!(rendered.contains("[seq-read]\nrw=randread\ndirectory=/mnt/10.0.0.1/fio/h1"));
    }

    #[test]
    fn test_write_section_precedes_read_section() {
        let rendered = profile(4).render();
        let write_at = rendered.find("[seq-write]").unwrap();
        let read_at = rendered.find("[seq-read]").unwrap();
        assert!(write_at < read_at);
    }
}
