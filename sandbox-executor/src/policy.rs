//! Container resource policy, applied identically to compile and run
//! containers (spec §4.2 "Container policy").

/// Hard resource caps placed on every sandbox container. There is exactly
/// one policy for the whole executor — submissions never get a looser or
/// tighter cage depending on language.
#[derive(Debug, Clone, Copy)]
pub struct ContainerPolicy {
    pub memory_bytes: i64,
    pub memory_reservation_bytes: i64,
    pub memory_swap_bytes: i64,
    pub memory_swappiness: i64,
    /// CPU quota expressed as `(quota, period)` microseconds; `quota ==
    /// period` is one full CPU.
    pub cpu_quota_us: i64,
    pub cpu_period_us: i64,
    pub pids_limit: i64,
    pub nofile_soft: i64,
    pub nofile_hard: i64,
    pub nproc_soft: i64,
    pub nproc_hard: i64,
}

impl Default for ContainerPolicy {
    fn default() -> Self {
        const MIB: i64 = 1024 * 1024;
        Self {
            memory_bytes: 300 * MIB,
            memory_reservation_bytes: 200 * MIB,
            memory_swap_bytes: 300 * MIB,
            memory_swappiness: 0,
            cpu_quota_us: 100_000,
            cpu_period_us: 100_000,
            pids_limit: 50,
            nofile_soft: 1024,
            nofile_hard: 2048,
            nproc_soft: 50,
            nproc_hard: 100,
        }
    }
}
