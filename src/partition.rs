//! Host-to-IP partitioning
//!
//! The global IP list is sliced into contiguous blocks of
//! [`IPS_PER_HOST`](crate::config::defaults::IPS_PER_HOST) addresses, one
//! block per host, in host-list order. Every host of the fleet runs this
//! resolver against the same two lists and picks up only its own block.

use crate::config::defaults::IPS_PER_HOST;
use tracing::warn;

/// Return the contiguous slice of `ips` assigned to `current_host`.
///
/// A hostname missing from `hosts` yields an empty slice; the caller is
/// expected to treat that as "nothing to do", not as a fatal error. If the
/// IP list is shorter than `len(hosts) * 8`, trailing hosts silently get a
/// partial or empty block.
pub fn assigned_ips<'a>(hosts: &[String], ips: &'a [String], current_host: &str) -> &'a [String] {
    let Some(index) = hosts.iter().position(|h| h == current_host) else {
        warn!("Host {} not found in host list", current_host);
        return &[];
    };

    let start = index * IPS_PER_HOST;
    let end = (start + IPS_PER_HOST).min(ips.len());
    if start >= ips.len() {
        return &[];
    }

    &ips[start..end]
}
