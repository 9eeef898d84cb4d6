//! Host metrics sampled on demand
//!
//! A snapshot has four sections (`uptime`, `cpu`, `mem`, `info`). The fast
//! variant only fills the hostname and uptimes, which avoids the CPU usage
//! measurement window; the other sections then serialize as `{}`.

mod snapshot;
mod uptime;

pub use snapshot::{CpuStats, HostInfo, MemStats, StatsSnapshot, UptimeStats};
pub use uptime::human_readable_uptime;

use std::time::Instant;
use sysinfo::{System, MINIMUM_CPU_UPDATE_INTERVAL};

const MIB: u64 = 1024 * 1024;

/// Samples host metrics; cheap to clone and share
#[derive(Debug, Clone)]
pub struct StatsSampler {
    started_at: Instant,
}

impl Default for StatsSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsSampler {
    /// Process uptime is measured from this call
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }

    /// Take a snapshot on the blocking pool
    pub async fn snapshot(&self, fast: bool) -> StatsSnapshot {
        let sampler = self.clone();
        match tokio::task::spawn_blocking(move || sampler.sample(fast)).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "Stats sampling task failed, falling back to fast sample");
                self.sample(true)
            }
        }
    }

    /// Take a snapshot on the current thread
    ///
    /// A full sample blocks for the CPU usage measurement window.
    pub fn sample(&self, fast: bool) -> StatsSnapshot {
        let mut snapshot = StatsSnapshot {
            uptime: self.uptime(),
            ..Default::default()
        };

        snapshot.info.hostname = System::host_name();

        if fast {
            return snapshot;
        }

        let mut sys = System::new();
        sys.refresh_memory();
        sys.refresh_cpu_all();
        std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
        sys.refresh_cpu_usage();

        snapshot.cpu = Self::cpu(&sys);
        snapshot.mem = Self::mem(&sys);
        snapshot.info = Self::info(&sys);
        snapshot
    }

    fn uptime(&self) -> UptimeStats {
        let process_seconds = self.started_at.elapsed().as_secs();
        let system_seconds = System::uptime();

        UptimeStats {
            process_seconds: Some(process_seconds),
            process_uptime: Some(human_readable_uptime(process_seconds)),
            system_seconds: Some(system_seconds),
            system_uptime: Some(human_readable_uptime(system_seconds)),
        }
    }

    fn cpu(sys: &System) -> CpuStats {
        let load = System::load_average();

        CpuStats {
            load_1m: Some(load.one),
            load_5m: Some(load.five),
            load_15m: Some(load.fifteen),
            cpu_count_logical: Some(sys.cpus().len()),
            cpu_count: sys.physical_core_count(),
            cpu_percent: Some(round2(sys.global_cpu_usage())),
            cpu_percent_percpu: Some(sys.cpus().iter().map(|c| round2(c.cpu_usage())).collect()),
            cpu_brand: sys.cpus().first().map(|c| c.brand().to_string()),
            cpu_frequency_mhz: sys.cpus().first().map(|c| c.frequency()),
        }
    }

    fn mem(sys: &System) -> MemStats {
        MemStats {
            mem_total_mib: Some(sys.total_memory() / MIB),
            mem_used_mib: Some(sys.used_memory() / MIB),
            mem_free_mib: Some(sys.free_memory() / MIB),
            mem_available_mib: Some(sys.available_memory() / MIB),
            mem_swap_total_mib: Some(sys.total_swap() / MIB),
            mem_swap_used_mib: Some(sys.used_swap() / MIB),
            mem_swap_free_mib: Some(sys.free_swap() / MIB),
        }
    }

    fn info(sys: &System) -> HostInfo {
        HostInfo {
            hostname: System::host_name(),
            architecture: Some(std::env::consts::ARCH.to_string()),
            system: System::name(),
            release: System::kernel_version(),
            version: System::os_version(),
            platform: System::long_os_version(),
            distribution_id: Some(System::distribution_id()),
            processor: sys.cpus().first().map(|c| c.vendor_id().to_string()),
            boot_time: Some(System::boot_time()),
        }
    }
}

fn round2(value: f32) -> f64 {
    (f64::from(value) * 100.0).round() / 100.0
}
