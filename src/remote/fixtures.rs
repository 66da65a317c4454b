/// Test fixtures: representative JSON payloads from GeoServer and CKAN.
///
/// These are trimmed to the fields the parsers read.
///
/// GeoServer feature type shape
/// (`GET /rest/workspaces/{ws}/datastores/{store}/featuretypes/{ft}.json`):
///   featureType.name
///   featureType.srs                      - e.g. "EPSG:4326"
///   featureType.latLonBoundingBox        - minx/maxx/miny/maxy
///   featureType.attributes.attribute     - array, or a bare object when
///                                          there is only one attribute
///
/// CKAN action API shape (`POST /api/3/action/resource_delete`):
///   success                              - bool
///   error.__type / error.message         - present when success is false

/// Drainage line layer over the Texas Gulf region.
pub(crate) fn fixture_feature_type_json() -> &'static str {
    r#"{
      "featureType": {
        "name": "drainage_line",
        "nativeName": "drainage_line",
        "namespace": { "name": "spt-abc" },
        "title": "drainage_line",
        "srs": "EPSG:4326",
        "nativeBoundingBox": { "minx": -98.5, "maxx": -94.0, "miny": 29.0, "maxy": 33.25, "crs": "EPSG:4326" },
        "latLonBoundingBox": { "minx": -98.5, "maxx": -94.0, "miny": 29.0, "maxy": 33.25, "crs": "EPSG:4326" },
        "projectionPolicy": "FORCE_DECLARED",
        "enabled": true,
        "attributes": {
          "attribute": [
            { "name": "the_geom", "minOccurs": 0, "maxOccurs": 1, "nillable": true, "binding": "org.locationtech.jts.geom.MultiLineString" },
            { "name": "COMID", "minOccurs": 0, "maxOccurs": 1, "nillable": true, "binding": "java.lang.Long" },
            { "name": "RIVID", "minOccurs": 0, "maxOccurs": 1, "nillable": true, "binding": "java.lang.Long" }
          ]
        }
      }
    }"#
}

/// Feature type with a single attribute, serialized as an object.
pub(crate) fn fixture_feature_type_single_attribute_json() -> &'static str {
    r#"{
      "featureType": {
        "name": "catchment",
        "srs": "EPSG:4326",
        "latLonBoundingBox": { "minx": -1.0, "maxx": 1.0, "miny": -1.0, "maxy": 1.0 },
        "attributes": { "attribute": { "name": "the_geom" } }
      }
    }"#
}

pub(crate) fn fixture_ckan_success_json() -> &'static str {
    r#"{ "help": "http://ckan.example.org/api/3/action/help_show?name=resource_delete", "success": true, "result": null }"#
}

pub(crate) fn fixture_ckan_not_found_json() -> &'static str {
    r#"{
      "help": "http://ckan.example.org/api/3/action/help_show?name=resource_delete",
      "success": false,
      "error": { "message": "Resource was not found.", "__type": "Not Found Error" }
    }"#
}
