//! fiobal - fio load balancing over NFS shares
//!
//! fiobal distributes a flat list of NFS-exported shares across a fleet of
//! hosts and drives the fio disk benchmark against the subset assigned to
//! the local host. Every host in the fleet runs the same binary with the
//! same host/IP lists; each one independently computes its own slice, so no
//! coordinator is needed.
//!
//! A run on one host proceeds as:
//!
//! 1. Resolve the local host's slice of the IP list ([`partition`]). Eight
//!    IPs per host, in host-list order. A host missing from the list gets
//!    an empty slice and exits cleanly.
//! 2. Mount each assigned IP at `{mount_base}/{ip}` with share names
//!    `mount1`..`mount8` ([`mount`]).
//! 3. For each mount, render a fio job file and run the write phase
//!    followed by the read phase ([`fio`], [`runner`]).
//! 4. Unmount everything. Cleanup runs even when mounting or benchmarking
//!    failed part-way; job files are deleted unconditionally.
//!
//! Mounting, benchmarking and unmounting are strictly sequential within a
//! process. External commands (`mount`, `umount`, `fio`) are invoked with
//! argument vectors, never through a shell.

pub mod config;
pub mod fio;
pub mod logging;
pub mod mount;
pub mod partition;
pub mod runner;
