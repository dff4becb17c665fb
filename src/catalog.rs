//! Device catalog loaded from the embedded CSV table.
//!
//! Each row names a device together with a plausible input-power range (in
//! watts) and a plausible efficiency range (whole percent).

use log::{debug, info};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

const BUILTIN_CSV: &str = include_str!("devices.csv");

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    /// Genitive form used in answer sentences ("Účinnost turbíny je …").
    pub genitive: String,
    pub p0_min_w: f64,
    pub p0_max_w: f64,
    pub eta_min: u32,
    pub eta_max: u32,
}

impl Device {
    pub fn input_power_range(&self) -> (f64, f64) {
        (self.p0_min_w, self.p0_max_w)
    }

    pub fn efficiency_range(&self) -> (u32, u32) {
        (self.eta_min, self.eta_max)
    }
}

#[derive(Debug)]
pub enum CatalogError {
    Csv(csv::Error),
    Empty,
    DuplicateId(String),
    InvalidRange { id: String, reason: &'static str },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Csv(e) => write!(f, "Failed to read device table: {}", e),
            CatalogError::Empty => write!(f, "Device catalog contains no devices"),
            CatalogError::DuplicateId(id) => write!(f, "Duplicate device id '{}'", id),
            CatalogError::InvalidRange { id, reason } => {
                write!(f, "Device '{}' has an invalid range: {}", id, reason)
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for CatalogError {
    fn from(e: csv::Error) -> Self {
        CatalogError::Csv(e)
    }
}

/// Validated, non-empty list of devices.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCatalog {
    devices: Vec<Device>,
}

impl DeviceCatalog {
    pub fn new(devices: Vec<Device>) -> Result<Self, CatalogError> {
        if devices.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen_ids = HashSet::new();
        for device in &devices {
            if !seen_ids.insert(device.id.as_str()) {
                return Err(CatalogError::DuplicateId(device.id.clone()));
            }
            validate_ranges(device)?;
        }
        Ok(Self { devices })
    }

    /// The catalog shipped with the widget.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_csv_str(BUILTIN_CSV)
    }

    /// Parse a catalog with the header
    /// `id,name,genitive,p0_min_w,p0_max_w,eta_min,eta_max`.
    pub fn from_csv_str(csv_content: &str) -> Result<Self, CatalogError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(csv_content.as_bytes());

        let mut devices = Vec::new();
        for record in reader.deserialize::<Device>() {
            let device = record?;
            debug!("Loaded device '{}' ({})", device.id, device.name);
            devices.push(device);
        }

        let catalog = Self::new(devices)?;
        info!("Successfully loaded {} devices", catalog.len());
        Ok(catalog)
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }
}

fn validate_ranges(device: &Device) -> Result<(), CatalogError> {
    let invalid = |reason| CatalogError::InvalidRange {
        id: device.id.clone(),
        reason,
    };
    if !device.p0_min_w.is_finite() || !device.p0_max_w.is_finite() {
        return Err(invalid("input power must be finite"));
    }
    if device.p0_min_w > device.p0_max_w {
        return Err(invalid("input power minimum exceeds maximum"));
    }
    if device.p0_max_w < 1.0 {
        return Err(invalid("input power must reach at least 1 W"));
    }
    if device.eta_min > device.eta_max {
        return Err(invalid("efficiency minimum exceeds maximum"));
    }
    if device.eta_max == 0 || device.eta_max > 100 {
        return Err(invalid("efficiency must lie within 1-100 %"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = DeviceCatalog::builtin().unwrap();
        assert!(catalog.len() >= 5);
        let turbine = catalog.find("turbina").unwrap();
        assert_eq!(turbine.name, "Turbína");
        assert_eq!(turbine.input_power_range(), (1_000_000.0, 50_000_000.0));
        assert_eq!(turbine.efficiency_range(), (30, 60));
    }

    #[test]
    fn rejects_empty_catalog() {
        let csv = "id,name,genitive,p0_min_w,p0_max_w,eta_min,eta_max\n";
        assert!(matches!(
            DeviceCatalog::from_csv_str(csv),
            Err(CatalogError::Empty)
        ));
    }

    #[test]
    fn rejects_inverted_ranges() {
        let csv = "id,name,genitive,p0_min_w,p0_max_w,eta_min,eta_max\n\
                   pump, Čerpadlo, čerpadla, 500, 50000, 80, 40\n";
        match DeviceCatalog::from_csv_str(csv) {
            Err(CatalogError::InvalidRange { id, .. }) => assert_eq!(id, "pump"),
            other => panic!("expected invalid range, got {:?}", other),
        }
    }

    #[test]
    fn rejects_duplicate_ids() {
        let csv = "id,name,genitive,p0_min_w,p0_max_w,eta_min,eta_max\n\
                   a,A,a,1,10,10,20\n\
                   a,B,b,1,10,10,20\n";
        assert!(matches!(
            DeviceCatalog::from_csv_str(csv),
            Err(CatalogError::DuplicateId(_))
        ));
    }

    #[test]
    fn malformed_rows_surface_csv_errors() {
        let csv = "id,name,genitive,p0_min_w,p0_max_w,eta_min,eta_max\n\
                   a,A,a,lots,10,10,20\n";
        assert!(matches!(
            DeviceCatalog::from_csv_str(csv),
            Err(CatalogError::Csv(_))
        ));
    }
}
