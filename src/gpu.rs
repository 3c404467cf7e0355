//! Accelerator discovery via the NVIDIA management interface.
//!
//! The probe has exactly three outcomes: structured records, the raw error
//! text of a failed invocation, or a fixed not-found sentinel. It never
//! raises.
use crate::util::run_bounded;
use serde::Serialize;
use std::process::Command;
use std::time::Duration;

/// Sentinel returned when the management interface is not on the search path.
pub const NVIDIA_SMI_MISSING: &str = "nvidia-smi not found";

const NVIDIA_SMI_TIMEOUT: Duration = Duration::from_secs(30);

const QUERY_FIELDS: &str =
    "index,uuid,name,driver_version,memory.total,memory.used,utilization.gpu,temperature.gpu";

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum GpuReport {
    Gpus(Vec<GpuRecord>),
    Text(String),
}

/// One detected accelerator. Fields nvidia-smi reports as `[N/A]` come back
/// as `None`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GpuRecord {
    pub index: Option<u32>,
    pub uuid: String,
    pub name: String,
    pub driver_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_total_mib: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_used_mib: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utilization_gpu_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f64>,
}

/// Query the accelerators.
pub fn gpu_facts() -> GpuReport {
    let Ok(tool) = which::which("nvidia-smi") else {
        return GpuReport::Text(NVIDIA_SMI_MISSING.to_string());
    };

    let mut command = Command::new(tool);
    command
        .arg(format!("--query-gpu={QUERY_FIELDS}"))
        .arg("--format=csv,noheader,nounits");
    let output = match run_bounded(&mut command, NVIDIA_SMI_TIMEOUT) {
        Ok(output) => output,
        Err(err) => return GpuReport::Text(err.to_string()),
    };
    if output.timed_out {
        return GpuReport::Text("nvidia-smi timed out".to_string());
    }
    if !output.status.success() {
        let stderr = output.stderr_text();
        let text = if stderr.trim().is_empty() {
            output.stdout_text()
        } else {
            stderr
        };
        return GpuReport::Text(text.trim().to_string());
    }

    GpuReport::Gpus(parse_query_output(&output.stdout_text()))
}

fn parse_query_output(text: &str) -> Vec<GpuRecord> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_record_line)
        .collect()
}

fn parse_record_line(line: &str) -> GpuRecord {
    let mut fields = line.split(',').map(str::trim);
    GpuRecord {
        index: fields.next().and_then(|field| field.parse().ok()),
        uuid: fields.next().unwrap_or_default().to_string(),
        name: fields.next().unwrap_or_default().to_string(),
        driver_version: fields.next().unwrap_or_default().to_string(),
        memory_total_mib: numeric(fields.next()),
        memory_used_mib: numeric(fields.next()),
        utilization_gpu_pct: numeric(fields.next()),
        temperature_c: numeric(fields.next()),
    }
}

fn numeric(field: Option<&str>) -> Option<f64> {
    field.and_then(|field| field.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_lines_parse_into_records() {
        let text = "0, GPU-8f9d, NVIDIA A100-SXM4-40GB, 535.104.05, 40960, 1024, 37, 41\n";
        let records = parse_query_output(text);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.index, Some(0));
        assert_eq!(record.uuid, "GPU-8f9d");
        assert_eq!(record.name, "NVIDIA A100-SXM4-40GB");
        assert_eq!(record.memory_total_mib, Some(40960.0));
        assert_eq!(record.temperature_c, Some(41.0));
    }

    #[test]
    fn unavailable_fields_become_none() {
        let text = "0, GPU-1, Tesla K80, 470.2, [N/A], [N/A], [N/A], [N/A]\n";
        let records = parse_query_output(text);
        assert_eq!(records[0].memory_total_mib, None);
        assert_eq!(records[0].utilization_gpu_pct, None);
    }

    #[test]
    fn missing_interface_yields_the_sentinel() {
        if which::which("nvidia-smi").is_ok() {
            eprintln!("Skipping: nvidia-smi present on this host");
            return;
        }
        assert_eq!(gpu_facts(), GpuReport::Text(NVIDIA_SMI_MISSING.to_string()));
    }
}
