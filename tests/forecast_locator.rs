/// Integration tests for forecast file discovery
///
/// These tests build real directory trees in a temporary folder and check
/// that the locator finds the right forecast cycle without the caller
/// knowing the on-disk layout:
/// 1. ECMWF cycle folders `<root>/<YYYYMMDD>.<HHMM>/*.nc`
/// 2. WRF-Hydro flat files `<root>/RapidResult_<token>_CF.nc`
/// 3. Malformed entries never hide an older valid forecast

use chrono::{TimeZone, Utc};
use spt_housekeeping::locator::{
    find_global_forecast_files, find_regional_forecast_file, ForecastSelector,
};
use std::fs;
use std::path::Path;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"CDF\x01").unwrap();
}

fn most_recent() -> ForecastSelector {
    ForecastSelector::from("most_recent")
}

// ---------------------------------------------------------------------------
// 1. ECMWF
// ---------------------------------------------------------------------------

#[test]
fn test_global_missing_or_empty_root_is_not_found() {
    let dir = tempfile::tempdir().unwrap();

    assert!(find_global_forecast_files(&dir.path().join("nope"), &most_recent()).is_none());
    assert!(find_global_forecast_files(dir.path(), &most_recent()).is_none());
}

#[test]
fn test_global_most_recent_skips_bad_folder() {
    let dir = tempfile::tempdir().unwrap();
    for folder in ["20150406.0000", "20150405.1800", "bad_folder"] {
        touch(&dir.path().join(folder).join("Qout_texas_gulf.nc"));
    }

    let found = find_global_forecast_files(dir.path(), &most_recent())
        .expect("a valid forecast cycle exists");

    assert_eq!(found.files, vec![dir.path().join("20150406.0000/Qout_texas_gulf.nc")]);
    assert_eq!(found.issued_at, Utc.with_ymd_and_hms(2015, 4, 6, 0, 0, 0).unwrap());
    assert_eq!(found.issued_at.to_rfc3339(), "2015-04-06T00:00:00+00:00");
}

#[test]
fn test_global_malformed_newest_entry_does_not_hide_older() {
    let dir = tempfile::tempdir().unwrap();
    // Sorts ahead of every dated folder
    touch(&dir.path().join("zzz_scratch/Qout.nc"));
    touch(&dir.path().join("99999999.1200/Qout.nc"));
    touch(&dir.path().join("20150405.1200/Qout.nc"));

    let found = find_global_forecast_files(dir.path(), &most_recent()).unwrap();
    assert_eq!(found.issued_at, Utc.with_ymd_and_hms(2015, 4, 5, 12, 0, 0).unwrap());
}

#[test]
fn test_global_empty_folder_falls_through() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("20150406.1200")).unwrap();
    touch(&dir.path().join("20150406.1200/download.log"));
    touch(&dir.path().join("20150406.0000/Qout_1.nc"));
    touch(&dir.path().join("20150406.0000/Qout_2.nc"));

    let found = find_global_forecast_files(dir.path(), &most_recent()).unwrap();
    assert_eq!(found.issued_at, Utc.with_ymd_and_hms(2015, 4, 6, 0, 0, 0).unwrap());
    assert_eq!(
        found.files,
        vec![
            dir.path().join("20150406.0000/Qout_2.nc"),
            dir.path().join("20150406.0000/Qout_1.nc"),
        ]
    );
}

#[test]
fn test_global_files_at_root_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("20150406.0000.nc"));

    assert!(find_global_forecast_files(dir.path(), &most_recent()).is_none());
}

#[test]
fn test_global_named_folder_only_scans_that_folder() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("20150406.0000/Qout.nc"));
    fs::create_dir_all(dir.path().join("20150405.1800")).unwrap();

    let named = ForecastSelector::from("20150405.1800");
    assert!(
        find_global_forecast_files(dir.path(), &named).is_none(),
        "an empty named folder must not fall back to other cycles"
    );

    let bad = ForecastSelector::from("bad_folder");
    assert!(find_global_forecast_files(dir.path(), &bad).is_none());
}

// ---------------------------------------------------------------------------
// 2. WRF-Hydro
// ---------------------------------------------------------------------------

#[test]
fn test_regional_token_lookup() {
    let dir = tempfile::tempdir().unwrap();
    let token = ForecastSelector::from("20150405T2300Z");

    assert!(find_regional_forecast_file(dir.path(), &token).is_none());

    touch(&dir.path().join("RapidResult_20150405T2300Z_CF.nc"));
    let found = find_regional_forecast_file(dir.path(), &token).unwrap();
    assert!(found.ends_with("RapidResult_20150405T2300Z_CF.nc"));
}

#[test]
fn test_regional_token_needs_exact_name() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("RapidResult_20150405T2300Z_CF.nc.part"));
    touch(&dir.path().join("RapidResult_20150405T2300Z.nc"));

    let token = ForecastSelector::from("20150405T2300Z");
    assert!(find_regional_forecast_file(dir.path(), &token).is_none());
}

#[test]
fn test_regional_most_recent() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("RapidResult_20150404T0000Z_CF.nc"));
    touch(&dir.path().join("RapidResult_20150405T2300Z_CF.nc"));
    touch(&dir.path().join("RapidResult_20150405T1100Z_CF.nc"));

    let found = find_regional_forecast_file(dir.path(), &most_recent()).unwrap();
    assert_eq!(found, dir.path().join("RapidResult_20150405T2300Z_CF.nc"));
}

#[test]
fn test_regional_missing_or_empty_root() {
    let dir = tempfile::tempdir().unwrap();

    assert!(find_regional_forecast_file(&dir.path().join("nope"), &most_recent()).is_none());
    assert!(find_regional_forecast_file(dir.path(), &most_recent()).is_none());
}

#[test]
fn test_regional_directory_named_like_forecast_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("RapidResult_20150406T0000Z_CF.nc")).unwrap();
    touch(&dir.path().join("RapidResult_20150405T0000Z_CF.nc"));

    let found = find_regional_forecast_file(dir.path(), &most_recent()).unwrap();
    assert_eq!(found, dir.path().join("RapidResult_20150405T0000Z_CF.nc"));
}
