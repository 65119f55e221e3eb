use std::fmt;

use serde::{Deserialize, Serialize};

// ========== Canonical OS labels ==========

pub const OS_WINDOWS: &str = "Paid: Windows Server";
pub const OS_RHEL: &str = "Paid: Red Hat Enterprise Linux";
pub const OS_SLES: &str = "Paid: SLES";
pub const OS_UBUNTU_PRO: &str = "Paid: Ubuntu Pro";
pub const OS_SQL_WEB: &str = "Paid: SQL Server Web";
pub const OS_SQL_ENTERPRISE: &str = "Paid: SQL Server Enterprise";
pub const OS_SQL_STANDARD: &str = "Paid: SQL Server Standard";
/// Label used when nothing else matches
pub const OS_FREE_TIER: &str = "Free: Debian, CentOS, CoreOS, Ubuntu or BYOL";

// ========== Defaults ==========

pub const DEFAULT_MACHINE_FAMILY: &str = "general purpose";
pub const DEFAULT_SERIES: &str = "E2";
pub const DEFAULT_MACHINE_TYPE: &str = "custom";
pub const DEFAULT_LOCATION: &str = "Mumbai";
/// Full-month usage
pub const FULL_MONTH_HOURS: f64 = 730.0;

pub const COMPUTE_OPTIMIZED_FAMILY: &str = "compute-optimized";
pub const COMPUTE_OPTIMIZED_SERIES: &str = "C2";

/// Provisioning model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineClass {
    #[default]
    Regular,
    /// Preemptible / Spot
    Preemptible,
}

impl MachineClass {
    /// Lenient parse, anything unknown is regular
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "preemptible" | "spot" => MachineClass::Preemptible,
            _ => MachineClass::Regular,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MachineClass::Regular => "regular",
            MachineClass::Preemptible => "preemptible",
        }
    }
}

impl fmt::Display for MachineClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical machine specification
///
/// Serialized with the spreadsheet header names, which is what the compute
/// workers read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizedRow {
    #[serde(rename = "Sl")]
    pub sl_number: u32,
    #[serde(rename = "OS with version")]
    pub os_with_version: String,
    /// Always formatted with two decimals
    #[serde(rename = "No. of Instances")]
    pub number_of_instances: String,
    #[serde(rename = "Machine Family")]
    pub machine_family: String,
    #[serde(rename = "Series")]
    pub series: String,
    #[serde(rename = "Machine Type")]
    pub machine_type: String,
    #[serde(rename = "vCPUs")]
    pub vcpus: f64,
    #[serde(rename = "RAM")]
    pub ram_gib: f64,
    #[serde(rename = "BootDisk Capacity")]
    pub boot_disk_gib: f64,
    #[serde(rename = "Datacenter Location")]
    pub datacenter_location: String,
    #[serde(rename = "Avg no. of hrs")]
    pub avg_hours_per_month: f64,
    #[serde(rename = "Machine Class")]
    pub machine_class: MachineClass,
}

impl StandardizedRow {
    pub fn is_full_month(&self) -> bool {
        self.avg_hours_per_month >= FULL_MONTH_HOURS
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "{} x {} {} {} ({} vCPU / {} GiB) in {}, {}h, {}",
            self.number_of_instances,
            self.series,
            self.machine_type,
            self.os_with_version,
            self.vcpus,
            self.ram_gib,
            self.datacenter_location,
            self.avg_hours_per_month,
            self.machine_class
        )
    }
}
