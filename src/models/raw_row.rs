//! Raw spreadsheet row
//!
//! A header → cell mapping straight from the input source. Nothing downstream
//! of the standardizer reads it.

use std::collections::HashMap;
use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

use crate::error::ValidationError;

// ========== Recognized headers ==========

pub const NO_OF_INSTANCES: &str = "No. of Instances";
pub const DATACENTER_LOCATION: &str = "Datacenter Location";
pub const OS_WITH_VERSION: &str = "OS with version";
pub const MACHINE_FAMILY: &str = "Machine Family";
pub const SERIES: &str = "Series";
pub const MACHINE_TYPE: &str = "Machine Type";
pub const VCPUS: &str = "vCPUs";
pub const RAM: &str = "RAM";
pub const BOOT_DISK_CAPACITY: &str = "BootDisk Capacity";
pub const AVG_HOURS: &str = "Avg no. of hrs";
pub const MACHINE_CLASS: &str = "Machine Class";

/// Headers a row must carry to be dispatched at all
pub const REQUIRED_HEADERS: [&str; 3] = [NO_OF_INSTANCES, DATACENTER_LOCATION, OS_WITH_VERSION];

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "HashMap<String, Cell>")]
pub struct RawRow {
    cells: HashMap<String, String>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests
    pub fn with(mut self, header: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(header, value);
        self
    }

    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(header.into().trim().to_string(), value.into());
    }

    /// Trimmed, non-blank cell value
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .get(header)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Required headers that are absent or blank
    pub fn missing_required(&self) -> Vec<String> {
        REQUIRED_HEADERS
            .iter()
            .filter(|h| self.get(h).is_none())
            .map(|h| h.to_string())
            .collect()
    }

    /// Reject the row if a required field is missing
    pub fn validate_required(&self, sl_number: u32) -> Result<(), ValidationError> {
        let fields = self.missing_required();
        if fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields { sl_number, fields })
        }
    }
}

impl From<HashMap<String, Cell>> for RawRow {
    fn from(map: HashMap<String, Cell>) -> Self {
        let mut row = RawRow::new();
        for (header, cell) in map {
            if let Some(value) = cell.0 {
                row.insert(header, value);
            }
        }
        row
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// One spreadsheet cell
///
/// Exports are not consistent about types: the same column may hold `"4"`,
/// `4` or `4.0`. Everything is kept as text; empty cells become `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell(pub Option<String>);

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CellVisitor;

        impl<'de> Visitor<'de> for CellVisitor {
            type Value = Cell;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string, number, boolean or null cell")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Cell(Some(value.to_string())))
            }

            fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
                Ok(Cell(Some(value)))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Cell(Some(value.to_string())))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                Ok(Cell(Some(value.to_string())))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Cell(Some(value.to_string())))
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Cell(Some(value.to_string())))
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(Cell(None))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(Cell(None))
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Cell::deserialize(deserializer)
            }
        }

        deserializer.deserialize_any(CellVisitor)
    }
}
