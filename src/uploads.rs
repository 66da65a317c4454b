/// File uploads: saving uploaded files to disk and publishing shapefile
/// layers to GeoServer.

use crate::model::GeoServerLayer;
use crate::remote::{MapLayerManager, RemoteError};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("problems uploading {0}")]
    LayerUploadFailed(String),

    #[error("uploading {resource} failed: {source}")]
    Remote {
        resource: String,
        #[source]
        source: RemoteError,
    },
}

/// Writes an uploaded file to `dir/file_name`, replacing any file already
/// there and creating `dir` if needed.
pub fn handle_uploaded_file<R: Read>(
    upload: &mut R,
    dir: &Path,
    file_name: &str,
) -> io::Result<PathBuf> {
    let destination = dir.join(file_name);

    match fs::remove_file(&destination) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    fs::create_dir_all(dir)?;

    let mut file = File::create(&destination)?;
    io::copy(upload, &mut file)?;
    file.flush()?;

    Ok(destination)
}

/// Publishes a shapefile and builds the layer record to store for it.
///
/// The manager reports the bounding box as `[minx, maxx, miny, maxy]`; the
/// stored record uses `[minx, miny, maxx, maxy]`.
pub fn upload_geoserver_layer<M: MapLayerManager + ?Sized>(
    manager: &M,
    resource_name: &str,
    shp_files: &[PathBuf],
) -> Result<GeoServerLayer, UploadError> {
    let uploaded = manager
        .upload_shapefile(resource_name, shp_files)
        .map_err(|source| UploadError::Remote {
            resource: resource_name.to_string(),
            source,
        })?;

    let Some((layer_name, info)) = uploaded.filter(|(name, _)| !name.trim().is_empty()) else {
        return Err(UploadError::LayerUploadFailed(resource_name.to_string()));
    };

    let [minx, maxx, miny, maxy] = info.latlon_bbox;
    let latlon_bbox = serde_json::json!([minx, miny, maxx, maxy]).to_string();
    let attribute_list = serde_json::json!(info.attributes).to_string();

    info!(layer = %layer_name.trim(), resource = %resource_name, "uploaded GeoServer layer");

    Ok(GeoServerLayer {
        id: None,
        name: layer_name.trim().to_string(),
        uploaded: true,
        latlon_bbox: Some(latlon_bbox),
        projection: Some(info.projection),
        attribute_list: Some(attribute_list),
        wfs_url: Some(info.wfs_geojson_url),
    })
}
