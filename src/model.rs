/// Shared data types for watershed housekeeping.
///
/// These mirror the records kept by the streamflow prediction service:
/// watershed configurations, the map-layer resources published for them,
/// the data store their RAPID inputs come from, and the singleton
/// settings record that names the local prediction directories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Forecast sources and cleanup scope
// ---------------------------------------------------------------------------

/// Which forecast product a naming pair or directory belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastSource {
    /// Global ECMWF-derived ensemble, stored in dated `YYYYMMDD.HHMM` folders.
    Ecmwf,
    /// Regional WRF-Hydro model, stored as a flat directory of dated files.
    WrfHydro,
}

impl ForecastSource {
    pub const ALL: [ForecastSource; 2] = [ForecastSource::Ecmwf, ForecastSource::WrfHydro];

    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastSource::Ecmwf => "ecmwf",
            ForecastSource::WrfHydro => "wrf_hydro",
        }
    }
}

impl fmt::Display for ForecastSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which forecast sources a cleanup call should touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastScope {
    All,
    Ecmwf,
    WrfHydro,
}

impl ForecastScope {
    /// Sources covered by this scope, global first.
    pub fn sources(&self) -> &'static [ForecastSource] {
        match self {
            ForecastScope::All => &ForecastSource::ALL,
            ForecastScope::Ecmwf => &[ForecastSource::Ecmwf],
            ForecastScope::WrfHydro => &[ForecastSource::WrfHydro],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown forecast scope '{0}' (expected all, ecmwf or wrf_hydro)")]
pub struct UnknownScope(pub String);

impl FromStr for ForecastScope {
    type Err = UnknownScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(ForecastScope::All),
            "ecmwf" | "global" => Ok(ForecastScope::Ecmwf),
            "wrf_hydro" | "regional" => Ok(ForecastScope::WrfHydro),
            _ => Err(UnknownScope(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Naming pairs
// ---------------------------------------------------------------------------

/// The `(watershed_name, subbasin_name)` tuple naming where a forecast
/// source stores files for a watershed. Several watersheds may share one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct NamingPair {
    pub watershed_name: String,
    pub subbasin_name: String,
}

impl NamingPair {
    pub fn new(watershed_name: impl Into<String>, subbasin_name: impl Into<String>) -> Self {
        Self {
            watershed_name: watershed_name.into(),
            subbasin_name: subbasin_name.into(),
        }
    }

    /// Both halves are needed to build a prediction folder path.
    pub fn is_complete(&self) -> bool {
        !self.watershed_name.is_empty() && !self.subbasin_name.is_empty()
    }
}

impl fmt::Display for NamingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.watershed_name, self.subbasin_name)
    }
}

// ---------------------------------------------------------------------------
// Map layers, data stores, settings
// ---------------------------------------------------------------------------

/// A layer published to GeoServer for a watershed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoServerLayer {
    pub id: Option<i32>,
    /// Fully qualified layer name (`workspace:layer`).
    pub name: String,
    /// False when the layer was linked rather than uploaded by this service.
    pub uploaded: bool,
    /// JSON array `[minx, miny, maxx, maxy]`.
    pub latlon_bbox: Option<String>,
    pub projection: Option<String>,
    /// JSON array of attribute names.
    pub attribute_list: Option<String>,
    pub wfs_url: Option<String>,
}

/// Connection details for the GeoServer instance a watershed's layers live on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoServerConfig {
    pub url: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataStoreType {
    Ckan,
    Local,
    Other(String),
}

impl DataStoreType {
    /// Maps the stored `code_name` column.
    pub fn from_code_name(code_name: &str) -> Self {
        match code_name.trim().to_lowercase().as_str() {
            "ckan" => DataStoreType::Ckan,
            "local" => DataStoreType::Local,
            other => DataStoreType::Other(other.to_string()),
        }
    }
}

/// Where a watershed's RAPID input datasets are published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataStore {
    pub name: String,
    pub data_store_type: DataStoreType,
    pub api_endpoint: String,
    pub api_key: String,
}

impl Default for DataStore {
    fn default() -> Self {
        Self {
            name: "Local Server".to_string(),
            data_store_type: DataStoreType::Local,
            api_endpoint: String::new(),
            api_key: String::new(),
        }
    }
}

/// Singleton settings record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MainSettings {
    pub ecmwf_rapid_prediction_directory: String,
    pub wrf_hydro_rapid_prediction_directory: String,
    /// Used as the GeoServer workspace for uploaded layers.
    pub app_instance_id: String,
}

impl MainSettings {
    /// Local root directory for a forecast source. Empty when unconfigured.
    pub fn prediction_directory(&self, source: ForecastSource) -> &str {
        match source {
            ForecastSource::Ecmwf => &self.ecmwf_rapid_prediction_directory,
            ForecastSource::WrfHydro => &self.wrf_hydro_rapid_prediction_directory,
        }
    }
}

// ---------------------------------------------------------------------------
// Watershed
// ---------------------------------------------------------------------------

/// Which of a watershed's four map layers an outcome refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    DrainageLine,
    Catchment,
    Gage,
    AhpsStation,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LayerKind::DrainageLine => "drainage_line",
            LayerKind::Catchment => "catchment",
            LayerKind::Gage => "gage",
            LayerKind::AhpsStation => "ahps_station",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Watershed {
    pub id: i32,
    pub watershed_name: String,
    pub subbasin_name: String,
    pub ecmwf_data_store_watershed_name: String,
    pub ecmwf_data_store_subbasin_name: String,
    pub wrf_hydro_data_store_watershed_name: String,
    pub wrf_hydro_data_store_subbasin_name: String,
    pub ecmwf_rapid_input_resource_id: Option<String>,
    pub data_store: DataStore,
    pub geoserver: GeoServerConfig,
    pub geoserver_drainage_line_layer: Option<GeoServerLayer>,
    pub geoserver_catchment_layer: Option<GeoServerLayer>,
    pub geoserver_gage_layer: Option<GeoServerLayer>,
    pub geoserver_ahps_station_layer: Option<GeoServerLayer>,
}

impl Watershed {
    /// Naming pair this watershed uses for a forecast source.
    pub fn naming_pair(&self, source: ForecastSource) -> NamingPair {
        match source {
            ForecastSource::Ecmwf => NamingPair::new(
                self.ecmwf_data_store_watershed_name.as_str(),
                self.ecmwf_data_store_subbasin_name.as_str(),
            ),
            ForecastSource::WrfHydro => NamingPair::new(
                self.wrf_hydro_data_store_watershed_name.as_str(),
                self.wrf_hydro_data_store_subbasin_name.as_str(),
            ),
        }
    }

    /// The four optional layer references, in removal order.
    pub fn layers(&self) -> [(LayerKind, Option<&GeoServerLayer>); 4] {
        [
            (LayerKind::DrainageLine, self.geoserver_drainage_line_layer.as_ref()),
            (LayerKind::Catchment, self.geoserver_catchment_layer.as_ref()),
            (LayerKind::Gage, self.geoserver_gage_layer.as_ref()),
            (LayerKind::AhpsStation, self.geoserver_ahps_station_layer.as_ref()),
        ]
    }

    /// Catalog resource to delete on removal, if this watershed's inputs
    /// were published to CKAN.
    pub fn catalog_resource_id(&self) -> Option<&str> {
        if self.data_store.data_store_type != DataStoreType::Ckan {
            return None;
        }
        self.ecmwf_rapid_input_resource_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
