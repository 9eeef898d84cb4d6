use serde::{Deserialize, Serialize};

/// One sample of host metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub uptime: UptimeStats,
    pub cpu: CpuStats,
    pub mem: MemStats,
    pub info: HostInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UptimeStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_uptime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_uptime: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_1m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_5m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_15m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_count_logical: Option<usize>,
    /// Physical cores; unknown on some virtualized hosts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_percent_percpu: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_frequency_mhz: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemStats {
    #[serde(rename = "mem_total_MiB", skip_serializing_if = "Option::is_none")]
    pub mem_total_mib: Option<u64>,
    #[serde(rename = "mem_used_MiB", skip_serializing_if = "Option::is_none")]
    pub mem_used_mib: Option<u64>,
    #[serde(rename = "mem_free_MiB", skip_serializing_if = "Option::is_none")]
    pub mem_free_mib: Option<u64>,
    #[serde(rename = "mem_available_MiB", skip_serializing_if = "Option::is_none")]
    pub mem_available_mib: Option<u64>,
    #[serde(rename = "mem_swap_total_MiB", skip_serializing_if = "Option::is_none")]
    pub mem_swap_total_mib: Option<u64>,
    #[serde(rename = "mem_swap_used_MiB", skip_serializing_if = "Option::is_none")]
    pub mem_swap_used_mib: Option<u64>,
    #[serde(rename = "mem_swap_free_MiB", skip_serializing_if = "Option::is_none")]
    pub mem_swap_free_mib: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor: Option<String>,
    /// Unix seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boot_time: Option<u64>,
}

impl StatsSnapshot {
    /// Sections as `(name, [(key, value)])` pairs for the HTML view, in
    /// uptime, cpu, mem, info order
    pub fn sections(&self) -> Vec<(String, Vec<(String, String)>)> {
        [
            ("uptime", serde_json::to_value(&self.uptime)),
            ("cpu", serde_json::to_value(&self.cpu)),
            ("mem", serde_json::to_value(&self.mem)),
            ("info", serde_json::to_value(&self.info)),
        ]
        .into_iter()
        .filter_map(|(name, section)| {
            let entries = match section.ok()? {
                serde_json::Value::Object(entries) => entries
                    .into_iter()
                    .map(|(key, value)| (key, display_value(&value)))
                    .collect(),
                other => vec![(name.to_string(), display_value(&other))],
            };
            Some((name.to_string(), entries))
        })
        .collect()
    }
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
