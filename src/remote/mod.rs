/// Remote services a watershed's resources live on.
///
/// Cleanup and upload code only sees the two traits below, so callers can
/// plug in the HTTP clients from `geoserver` and `ckan` or anything else
/// that speaks the same calls.

pub mod ckan;
pub mod geoserver;

#[cfg(test)]
pub(crate) mod fake_server;
#[cfg(test)]
pub(crate) mod fixtures;

use crate::model::GeoServerLayer;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("{service} request failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} rejected the request: {message}")]
    Api {
        service: &'static str,
        message: String,
    },

    #[error("{service} returned an unreadable response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
}

/// What GeoServer reports about a freshly published layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInfo {
    /// `[minx, maxx, miny, maxy]` in lat/lon.
    pub latlon_bbox: [f64; 4],
    pub projection: String,
    pub attributes: Vec<String>,
    /// WFS GetFeature URL returning GeoJSON.
    pub wfs_geojson_url: String,
}

/// Map-layer server operations used by cleanup and uploads.
pub trait MapLayerManager {
    /// Removes a layer and purges its backing store and files.
    fn purge_remove_geoserver_layer(&self, layer: &GeoServerLayer) -> Result<(), RemoteError>;

    /// Publishes a shapefile under `name`. `Ok(None)` means the server
    /// accepted the call but produced no layer.
    fn upload_shapefile(
        &self,
        name: &str,
        files: &[PathBuf],
    ) -> Result<Option<(String, LayerInfo)>, RemoteError>;
}

/// Dataset catalog operations used by cleanup.
pub trait CatalogManager {
    fn delete_resource(&self, resource_id: &str) -> Result<(), RemoteError>;
}
