//! Optional allocator statistics used to enrich snapshots.
//!
//! The collector asks an [`AllocatorStatsProvider`] once per cycle. A provider
//! that has nothing to report returns `None` and the snapshot falls back to
//! fixed defaults, so the published field set never changes.

use std::ffi::CStr;
use std::fmt;

/// Label published when no allocator statistics are available.
pub const UNKNOWN_POLICY: &str = "UNKNOWN";

/// Placement policy of a free-list allocator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocationPolicy {
    FirstFit,
    BestFit,
    WorstFit,
}

impl AllocationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationPolicy::FirstFit => "FIRST_FIT",
            AllocationPolicy::BestFit => "BEST_FIT",
            AllocationPolicy::WorstFit => "WORST_FIT",
        }
    }
}

impl fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time allocator statistics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemStats {
    /// Bytes currently handed out to callers.
    pub total_allocated: u64,
    /// Bytes held by the allocator but not handed out.
    pub total_free: u64,
    /// External fragmentation, 0.0 (none) to 1.0.
    pub fragmentation: f64,
    /// Size of the largest contiguous free block in bytes.
    pub largest_free_block: u64,
    pub first_fit_count: u64,
    pub best_fit_count: u64,
    pub worst_fit_count: u64,
    pub successful_allocs: u64,
    pub failed_allocs: u64,
}

impl MemStats {
    /// The placement policy that served the most allocations.
    ///
    /// Ties go to the earlier policy in first-fit, best-fit, worst-fit order.
    /// `None` when no policy has been used.
    pub fn most_efficient_policy(&self) -> Option<AllocationPolicy> {
        let candidates = [
            (AllocationPolicy::FirstFit, self.first_fit_count),
            (AllocationPolicy::BestFit, self.best_fit_count),
            (AllocationPolicy::WorstFit, self.worst_fit_count),
        ];

        let mut best: Option<(AllocationPolicy, u64)> = None;
        for (policy, count) in candidates {
            if count == 0 {
                continue;
            }
            if best.is_none_or(|(_, top)| count > top) {
                best = Some((policy, count));
            }
        }
        best.map(|(policy, _)| policy)
    }

    /// Label for [`MemStats::most_efficient_policy`], or `"UNKNOWN"`.
    pub fn policy_label(&self) -> &'static str {
        self.most_efficient_policy()
            .map_or(UNKNOWN_POLICY, |policy| policy.as_str())
    }

    /// Share of managed memory that is free: `free / (allocated + free)`.
    pub fn efficiency_ratio(&self) -> f64 {
        let managed = self.total_allocated.saturating_add(self.total_free);
        if managed == 0 {
            return 0.0;
        }
        self.total_free as f64 / managed as f64
    }

    /// Fragmentation as a percentage.
    pub fn fragmentation_percentage(&self) -> f64 {
        self.fragmentation * 100.0
    }
}

/// Source of allocator statistics.
pub trait AllocatorStatsProvider: Send + Sync {
    /// Returns current statistics, or `None` when unavailable.
    fn mem_stats(&self) -> Option<MemStats>;
}

impl<F> AllocatorStatsProvider for F
where
    F: Fn() -> Option<MemStats> + Send + Sync,
{
    fn mem_stats(&self) -> Option<MemStats> {
        self()
    }
}

/// Provider used when no allocator reports statistics.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAllocatorStats;

impl AllocatorStatsProvider for NoAllocatorStats {
    fn mem_stats(&self) -> Option<MemStats> {
        None
    }
}

/// `MALLCTL_ARENAS_ALL`: pseudo arena index that merges all arenas.
const ARENAS_ALL_SMALL_NMALLOC: &CStr = c"stats.arenas.4096.small.nmalloc";
const ARENAS_ALL_LARGE_NMALLOC: &CStr = c"stats.arenas.4096.large.nmalloc";

/// Statistics of the jemalloc allocator linked into the process.
///
/// Meaningful when jemalloc is the global allocator (as in `hostpulsed`).
/// jemalloc has no first/best/worst-fit placement and does not expose its
/// largest free extent, so those fields stay zero and the policy label is
/// `"UNKNOWN"`. Free bytes are the active-but-unallocated page space.
#[derive(Debug, Default, Clone, Copy)]
pub struct JemallocStats;

impl JemallocStats {
    pub fn new() -> Self {
        Self
    }

    /// Refreshes jemalloc's cached statistics.
    fn advance_epoch() -> bool {
        let mut epoch: u64 = 1;
        // SAFETY: "epoch" takes a uint64_t as new value; we pass a valid
        // pointer and its exact size, and request no old value.
        let rc = unsafe {
            tikv_jemalloc_sys::mallctl(
                c"epoch".as_ptr(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                (&mut epoch as *mut u64).cast(),
                std::mem::size_of::<u64>(),
            )
        };
        rc == 0
    }

    fn read_usize(name: &CStr) -> Option<usize> {
        let mut value: usize = 0;
        let mut len = std::mem::size_of::<usize>();
        // SAFETY: the named statistics are size_t values; oldp/oldlenp point
        // to a usize and its size.
        let rc = unsafe {
            tikv_jemalloc_sys::mallctl(
                name.as_ptr(),
                (&mut value as *mut usize).cast(),
                &mut len,
                std::ptr::null_mut(),
                0,
            )
        };
        (rc == 0).then_some(value)
    }

    fn read_u64(name: &CStr) -> Option<u64> {
        let mut value: u64 = 0;
        let mut len = std::mem::size_of::<u64>();
        // SAFETY: the named statistics are uint64_t values; oldp/oldlenp
        // point to a u64 and its size.
        let rc = unsafe {
            tikv_jemalloc_sys::mallctl(
                name.as_ptr(),
                (&mut value as *mut u64).cast(),
                &mut len,
                std::ptr::null_mut(),
                0,
            )
        };
        (rc == 0).then_some(value)
    }
}

impl AllocatorStatsProvider for JemallocStats {
    fn mem_stats(&self) -> Option<MemStats> {
        if !Self::advance_epoch() {
            return None;
        }

        let allocated = Self::read_usize(c"stats.allocated")? as u64;
        let active = Self::read_usize(c"stats.active")? as u64;
        let free = active.saturating_sub(allocated);
        let fragmentation = if active == 0 {
            0.0
        } else {
            free as f64 / active as f64
        };

        let small = Self::read_u64(ARENAS_ALL_SMALL_NMALLOC).unwrap_or(0);
        let large = Self::read_u64(ARENAS_ALL_LARGE_NMALLOC).unwrap_or(0);

        Some(MemStats {
            total_allocated: allocated,
            total_free: free,
            fragmentation,
            successful_allocs: small.saturating_add(large),
            ..MemStats::default()
        })
    }
}
