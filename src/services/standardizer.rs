//! Row standardization - service layer
//!
//! Turns a `RawRow` into a `StandardizedRow`. Total: every missing or
//! malformed field falls back to a documented default, nothing here fails.

use std::sync::LazyLock;

use phf::phf_map;
use regex::Regex;
use tracing::debug;

use crate::models::machine::*;
use crate::models::raw_row::{self, RawRow};

/// Shorthand tokens, checked before any pattern
static OS_SHORTHANDS: phf::Map<&'static str, &'static str> = phf_map! {
    "sql-web" => OS_SQL_WEB,
    "sql-enterprise" => OS_SQL_ENTERPRISE,
    "sql-standard" => OS_SQL_STANDARD,
    "ubuntu-pro" => OS_UBUNTU_PRO,
    "ubuntu pro" => OS_UBUNTU_PRO,
    "win" => OS_WINDOWS,
    "rhel" => OS_RHEL,
    "sles" => OS_SLES,
};

/// Ordered, first match wins. The SQL editions overlap with each other and
/// with the Windows pattern, so the order is part of the mapping.
static OS_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"windows|win", OS_WINDOWS),
        (r"rhel|red hat", OS_RHEL),
        (r"sles|suse", OS_SLES),
        (r"ubuntu pro", OS_UBUNTU_PRO),
        (r"sql.*web", OS_SQL_WEB),
        (r"sql.*enterprise", OS_SQL_ENTERPRISE),
        (r"sql.*standard", OS_SQL_STANDARD),
    ]
    .into_iter()
    .map(|(pattern, label)| (Regex::new(pattern).expect("valid OS pattern"), label))
    .collect()
});

static LEADING_FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?").expect("valid float pattern")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Map free-text OS input to a canonical label
pub fn map_os(value: &str) -> &'static str {
    let v = value.trim().to_lowercase();

    if let Some(label) = OS_SHORTHANDS.get(v.as_str()) {
        return *label;
    }

    OS_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(&v))
        .map(|(_, label)| *label)
        .unwrap_or(OS_FREE_TIER)
}

/// Spreadsheet-style number parse: the longest numeric prefix wins, so
/// `"16 GB"` is 16. Returns `None` instead of NaN or infinity.
pub fn parse_number(value: &str) -> Option<f64> {
    let m = LEADING_FLOAT.find(value.trim())?;
    m.as_str().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Integers without a fraction, everything else as is
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

/// Standardize one raw row
///
/// # Arguments
/// - `raw`: header → cell mapping
/// - `sl_number`: 1-based row position in the batch
pub fn standardize(raw: &RawRow, sl_number: u32) -> StandardizedRow {
    debug!("[Sl {}] standardizing row with {} cells", sl_number, raw.len());

    let os_with_version = map_os(raw.get(raw_row::OS_WITH_VERSION).unwrap_or_default()).to_string();

    let number_of_instances = raw
        .get(raw_row::NO_OF_INSTANCES)
        .and_then(parse_number)
        .map(|n| format!("{:.2}", non_negative(n)))
        .unwrap_or_else(|| "0.00".to_string());

    let machine_family = raw
        .get(raw_row::MACHINE_FAMILY)
        .map(|f| WHITESPACE.replace_all(&f.to_lowercase(), " ").into_owned())
        .unwrap_or_else(|| DEFAULT_MACHINE_FAMILY.to_string());

    let mut series = raw
        .get(raw_row::SERIES)
        .map(|s| s.to_uppercase())
        .unwrap_or_else(|| DEFAULT_SERIES.to_string());

    let mut machine_type = raw
        .get(raw_row::MACHINE_TYPE)
        .map(|t| t.to_lowercase())
        .unwrap_or_else(|| DEFAULT_MACHINE_TYPE.to_string());

    let vcpus = numeric_or(raw, raw_row::VCPUS, 0.0);
    let ram_gib = numeric_or(raw, raw_row::RAM, 0.0);
    let boot_disk_gib = numeric_or(raw, raw_row::BOOT_DISK_CAPACITY, 0.0);
    let avg_hours_per_month = numeric_or(raw, raw_row::AVG_HOURS, FULL_MONTH_HOURS);

    let datacenter_location = raw
        .get(raw_row::DATACENTER_LOCATION)
        .unwrap_or(DEFAULT_LOCATION)
        .to_string();

    let machine_class = raw
        .get(raw_row::MACHINE_CLASS)
        .map(MachineClass::parse)
        .unwrap_or_default();

    if is_compute_optimized(&machine_family) {
        series = COMPUTE_OPTIMIZED_SERIES.to_string();
        let base = if machine_type.contains("custom") {
            DEFAULT_MACHINE_TYPE.to_string()
        } else {
            machine_type
        };
        machine_type = format!("{}-{}", base, format_number(non_negative(vcpus)));
        debug!(
            "[Sl {}] compute-optimized: series {} / type {}",
            sl_number, series, machine_type
        );
    }

    StandardizedRow {
        sl_number,
        os_with_version,
        number_of_instances,
        machine_family,
        series,
        machine_type,
        vcpus,
        ram_gib,
        boot_disk_gib,
        datacenter_location,
        avg_hours_per_month,
        machine_class,
    }
}

fn numeric_or(raw: &RawRow, header: &str, default: f64) -> f64 {
    raw.get(header).and_then(parse_number).unwrap_or(default)
}

/// Clamp to `>= 0`, folding `-0.0` into `0.0` so it never prints a sign
fn non_negative(value: f64) -> f64 {
    if value > 0.0 {
        value
    } else {
        0.0
    }
}

fn is_compute_optimized(family: &str) -> bool {
    family.replace(' ', "-") == COMPUTE_OPTIMIZED_FAMILY
}
