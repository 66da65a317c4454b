/// spt_housekeeping: forecast dataset housekeeping for the streamflow
/// prediction service.
///
/// # Module structure
///
/// ```text
/// spt_housekeeping
/// ├── model       - shared data types (Watershed, NamingPair, MainSettings, …)
/// ├── config      - service configuration loader (spt.toml)
/// ├── db          - Postgres connection, validation and sessions
/// ├── store       - session traits and the in-memory naming pair index
/// ├── locator     - most recent / specific ECMWF and WRF-Hydro forecast files
/// ├── cleanup     - reference-counted forecast folder and map layer removal
/// ├── format      - watershed name and title formatting
/// ├── reach       - COMID → reach index lookups
/// ├── uploads     - uploaded file handling and GeoServer layer publishing
/// └── remote
///     ├── geoserver - GeoServer REST client
///     ├── ckan      - CKAN action API client
///     ├── fixtures (test only) - representative API response payloads
///     └── fake_server (test only) - stand-in HTTP server for client tests
/// ```

/// Public modules
pub mod cleanup;
pub mod config;
pub mod db;
pub mod format;
pub mod locator;
pub mod model;
pub mod reach;
pub mod remote;
pub mod store;
pub mod uploads;
