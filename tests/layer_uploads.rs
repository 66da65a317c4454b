/// Integration tests for publishing shapefile layers
///
/// Verifies the layer record built from a map server's upload response
/// and the failure paths for empty or rejected uploads.

use spt_housekeeping::model::GeoServerLayer;
use spt_housekeeping::remote::{LayerInfo, MapLayerManager, RemoteError};
use spt_housekeeping::uploads::{upload_geoserver_layer, UploadError};
use std::path::PathBuf;

enum Response {
    Published(String),
    Nothing,
    Rejected,
}

struct StubLayers {
    response: Response,
}

impl MapLayerManager for StubLayers {
    fn purge_remove_geoserver_layer(&self, _layer: &GeoServerLayer) -> Result<(), RemoteError> {
        Ok(())
    }

    fn upload_shapefile(
        &self,
        _name: &str,
        _files: &[PathBuf],
    ) -> Result<Option<(String, LayerInfo)>, RemoteError> {
        match &self.response {
            Response::Published(name) => Ok(Some((
                name.clone(),
                LayerInfo {
                    latlon_bbox: [-98.5, -94.0, 29.0, 33.25],
                    projection: "EPSG:4326".to_string(),
                    attributes: vec!["the_geom".to_string(), "COMID".to_string()],
                    wfs_geojson_url: "http://gs/wfs?typeName=spt-test:drainage_line".to_string(),
                },
            ))),
            Response::Nothing => Ok(None),
            Response::Rejected => Err(RemoteError::Status {
                service: "GeoServer",
                status: 401,
                body: "Unauthorized".to_string(),
            }),
        }
    }
}

fn shapefile() -> Vec<PathBuf> {
    ["shp", "shx", "dbf", "prj"]
        .iter()
        .map(|ext| PathBuf::from(format!("/tmp/upload/drainage_line.{}", ext)))
        .collect()
}

#[test]
fn test_published_layer_record() {
    let manager = StubLayers {
        response: Response::Published(" spt-test:drainage_line \n".to_string()),
    };

    let layer = upload_geoserver_layer(&manager, "texas-gulf-drainage_line", &shapefile()).unwrap();

    assert_eq!(layer.name, "spt-test:drainage_line");
    assert!(layer.uploaded);
    assert_eq!(layer.latlon_bbox.as_deref(), Some("[-98.5,29.0,-94.0,33.25]"));
    assert_eq!(layer.projection.as_deref(), Some("EPSG:4326"));
    assert_eq!(layer.attribute_list.as_deref(), Some(r#"["the_geom","COMID"]"#));
    assert_eq!(
        layer.wfs_url.as_deref(),
        Some("http://gs/wfs?typeName=spt-test:drainage_line")
    );
}

#[test]
fn test_no_layer_is_upload_failure() {
    let manager = StubLayers {
        response: Response::Nothing,
    };

    let err = upload_geoserver_layer(&manager, "texas-gulf-catchment", &shapefile()).unwrap_err();
    assert!(matches!(err, UploadError::LayerUploadFailed(ref name) if name == "texas-gulf-catchment"));
    assert_eq!(err.to_string(), "problems uploading texas-gulf-catchment");
}

#[test]
fn test_blank_layer_name_is_upload_failure() {
    let manager = StubLayers {
        response: Response::Published("   ".to_string()),
    };

    let err = upload_geoserver_layer(&manager, "texas-gulf-gage", &shapefile()).unwrap_err();
    assert!(matches!(err, UploadError::LayerUploadFailed(_)));
}

#[test]
fn test_rejected_upload_keeps_remote_error() {
    let manager = StubLayers {
        response: Response::Rejected,
    };

    let err = upload_geoserver_layer(&manager, "texas-gulf-gage", &shapefile()).unwrap_err();
    match err {
        UploadError::Remote { resource, source } => {
            assert_eq!(resource, "texas-gulf-gage");
            assert!(matches!(source, RemoteError::Status { status: 401, .. }));
        }
        other => panic!("expected remote error, got {:?}", other),
    }
}
