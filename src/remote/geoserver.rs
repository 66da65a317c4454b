/// GeoServer REST client
///
/// Publishes watershed shapefiles and removes them again.
///
/// API Documentation: https://docs.geoserver.org/stable/en/user/rest/
///
/// Every uploaded shapefile gets its own datastore named after the resource
/// in the app's workspace, and its layer is published under that same name.
/// Removing a layer is then a single recursive datastore delete with
/// `purge=all`.

use super::{LayerInfo, MapLayerManager, RemoteError};
use crate::model::{GeoServerConfig, GeoServerLayer};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SERVICE: &str = "GeoServer";

// ============================================================================
// Feature type response structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct FeatureTypeResponse {
    #[serde(rename = "featureType")]
    feature_type: FeatureType,
}

#[derive(Debug, Deserialize)]
struct FeatureType {
    name: String,
    srs: Option<String>,
    #[serde(rename = "latLonBoundingBox")]
    lat_lon_bounding_box: BoundingBox,
    attributes: Option<Attributes>,
}

#[derive(Debug, Deserialize)]
struct BoundingBox {
    minx: f64,
    maxx: f64,
    miny: f64,
    maxy: f64,
}

#[derive(Debug, Deserialize)]
struct Attributes {
    attribute: OneOrMany<Attribute>,
}

#[derive(Debug, Deserialize)]
struct Attribute {
    name: String,
}

/// GeoServer collapses single-element arrays into a bare object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

// ============================================================================
// Client
// ============================================================================

pub struct GeoServerClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
    workspace: String,
}

impl GeoServerClient {
    /// `workspace` is the app instance id uploaded layers are published under.
    pub fn new(client: Client, config: &GeoServerConfig, workspace: &str) -> Self {
        Self {
            client,
            base_url: normalize_base_url(&config.url),
            username: config.username.clone(),
            password: config.password.clone(),
            workspace: workspace.to_string(),
        }
    }

    fn datastore_url(&self, workspace: &str, store: &str) -> String {
        format!(
            "{}/rest/workspaces/{}/datastores/{}",
            self.base_url,
            urlencoding::encode(workspace),
            urlencoding::encode(store)
        )
    }

    fn layer_url(&self, workspace: &str, layer: &str) -> String {
        format!(
            "{}/rest/layers/{}:{}.json",
            self.base_url,
            urlencoding::encode(workspace),
            urlencoding::encode(layer)
        )
    }

    fn fetch_layer_info(&self, store: &str, feature_type: &str) -> Result<LayerInfo, RemoteError> {
        let url = format!(
            "{}/featuretypes/{}.json",
            self.datastore_url(&self.workspace, store),
            urlencoding::encode(feature_type)
        );

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
            .send()
            .map_err(http_error)?;

        let body = check_status(response)?.text().map_err(http_error)?;
        parse_feature_type(&body, &self.base_url, &self.workspace)
    }

    /// Publishes the shapefile's native feature type under the store's name.
    fn publish_feature_type(&self, store: &str, native_name: &str) -> Result<(), RemoteError> {
        let url = format!("{}/featuretypes", self.datastore_url(&self.workspace, store));
        let body = serde_json::json!({
            "featureType": { "name": store, "nativeName": native_name }
        });

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .map_err(http_error)?;
        check_status(response)?;
        Ok(())
    }

    fn delete_datastore(&self, workspace: &str, store: &str) -> Result<reqwest::blocking::Response, RemoteError> {
        let url = format!("{}?recurse=true&purge=all", self.datastore_url(workspace, store));
        debug!(url = %url, "deleting GeoServer datastore");
        self.client
            .delete(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .map_err(http_error)
    }

    /// Whether GeoServer still serves `workspace:layer`.
    fn layer_exists(&self, workspace: &str, layer: &str) -> Result<bool, RemoteError> {
        let response = self
            .client
            .get(self.layer_url(workspace, layer))
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json")
            .send()
            .map_err(http_error)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check_status(response)?;
        Ok(true)
    }
}

impl MapLayerManager for GeoServerClient {
    /// Deletes the datastore named by the layer, with its files.
    ///
    /// Uploaded layers share their datastore's name. A missing datastore
    /// only counts as removed when the layer is gone as well; a layer that
    /// is still served from some other store is an error.
    fn purge_remove_geoserver_layer(&self, layer: &GeoServerLayer) -> Result<(), RemoteError> {
        let (workspace, store) = split_layer_name(&layer.name, &self.workspace);
        let response = self.delete_datastore(workspace, store)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            if self.layer_exists(workspace, store)? {
                return Err(RemoteError::Api {
                    service: SERVICE,
                    message: format!(
                        "layer {} is still published but datastore {}:{} does not exist",
                        layer.name, workspace, store
                    ),
                });
            }
            debug!(layer = %layer.name, "layer already removed from GeoServer");
            return Ok(());
        }
        check_status(response)?;

        info!(layer = %layer.name, "purged GeoServer layer");
        Ok(())
    }

    /// Creates datastore `name` over the shapefile and publishes it as
    /// layer `workspace:name`.
    fn upload_shapefile(
        &self,
        name: &str,
        files: &[PathBuf],
    ) -> Result<Option<(String, LayerInfo)>, RemoteError> {
        let Some(shp) = files
            .iter()
            .find(|f| f.extension().and_then(|e| e.to_str()) == Some("shp"))
        else {
            return Ok(None);
        };
        let Some(native_name) = shp.file_stem().and_then(|s| s.to_str()) else {
            return Ok(None);
        };

        let url = format!(
            "{}/external.shp?configure=none",
            self.datastore_url(&self.workspace, name)
        );

        let response = self
            .client
            .put(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "text/plain")
            .body(file_url(shp))
            .send()
            .map_err(http_error)?;
        check_status(response)?;

        if let Err(e) = self.publish_feature_type(name, native_name) {
            // Don't leave an unpublished store behind.
            if let Err(cleanup) = self.delete_datastore(&self.workspace, name) {
                debug!(store = %name, error = %cleanup, "could not remove unpublished datastore");
            }
            return Err(e);
        }

        let info = self.fetch_layer_info(name, name)?;
        let layer_name = format!("{}:{}", self.workspace, name);

        info!(layer = %layer_name, "published shapefile to GeoServer");
        Ok(Some((layer_name, info)))
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Strips trailing slashes and a trailing `/rest` from a configured URL.
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    trimmed.strip_suffix("/rest").unwrap_or(trimmed).to_string()
}

/// Splits `workspace:layer`, falling back to `default_workspace`.
pub fn split_layer_name<'a>(name: &'a str, default_workspace: &'a str) -> (&'a str, &'a str) {
    match name.trim().split_once(':') {
        Some((workspace, layer)) => (workspace, layer),
        None => (default_workspace, name.trim()),
    }
}

fn file_url(path: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    format!("file://{}", absolute.display())
}

fn wfs_geojson_url(base_url: &str, workspace: &str, feature_type: &str) -> String {
    format!(
        "{}/wfs?service=wfs&version=2.0.0&typeName={}:{}&outputFormat=application/json",
        base_url, workspace, feature_type
    )
}

fn parse_feature_type(body: &str, base_url: &str, workspace: &str) -> Result<LayerInfo, RemoteError> {
    let parsed: FeatureTypeResponse = serde_json::from_str(body).map_err(|e| RemoteError::Decode {
        service: SERVICE,
        message: e.to_string(),
    })?;
    let ft = parsed.feature_type;
    let bbox = ft.lat_lon_bounding_box;

    Ok(LayerInfo {
        latlon_bbox: [bbox.minx, bbox.maxx, bbox.miny, bbox.maxy],
        projection: ft.srs.unwrap_or_default(),
        attributes: ft
            .attributes
            .map(|a| a.attribute.into_vec().into_iter().map(|attr| attr.name).collect())
            .unwrap_or_default(),
        wfs_geojson_url: wfs_geojson_url(base_url, workspace, &ft.name),
    })
}

fn http_error(source: reqwest::Error) -> RemoteError {
    RemoteError::Http {
        service: SERVICE,
        source,
    }
}

fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, RemoteError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().unwrap_or_default();
    Err(RemoteError::Status {
        service: SERVICE,
        status,
        body,
    })
}

// ============================================================================
// Tests
// ============================================================================
