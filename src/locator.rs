/// Forecast file locator
///
/// Resolves the most recent (or a specific) forecast output for a
/// watershed without the caller knowing the on-disk layout:
///
/// - ECMWF: `<root>/<YYYYMMDD>.<HHMM>/*.nc`, one folder per forecast cycle
/// - WRF-Hydro: `<root>/RapidResult_<YYYYMMDDTHHMMZ>_CF.nc`, flat
///
/// Nothing here returns an error. A missing root, an empty folder or a
/// malformed entry all mean "keep looking", and when nothing is left the
/// result is `None`.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Selector value that asks for the newest forecast on disk.
pub const MOST_RECENT: &str = "most_recent";

const FORECAST_EXTENSION: &str = "nc";

// ---------------------------------------------------------------------------
// Selector and results
// ---------------------------------------------------------------------------

/// Which forecast to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForecastSelector {
    MostRecent,
    /// A cycle folder name (ECMWF) or date-time token (WRF-Hydro).
    Named(String),
}

impl From<&str> for ForecastSelector {
    fn from(value: &str) -> Self {
        if value == MOST_RECENT {
            ForecastSelector::MostRecent
        } else {
            ForecastSelector::Named(value.to_string())
        }
    }
}

/// Files for one ECMWF forecast cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalForecast {
    /// Full paths of the `*.nc` files, sorted descending.
    pub files: Vec<PathBuf>,
    /// Forecast initialization time (folder date + cycle hours).
    pub issued_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// ECMWF
// ---------------------------------------------------------------------------

/// Parses an ECMWF cycle folder name such as `20150405.1800`.
///
/// The cycle is `hour * 100`, so `.1800` is 18Z. Returns `None` for
/// anything that is not an 8-digit date, a dot, and a cycle within the day.
/// A cycle of `2400` or later is not rolled into the next day; the folder
/// is treated as malformed.
pub fn parse_forecast_folder_name(name: &str) -> Option<DateTime<Utc>> {
    let (date_part, cycle_part) = name.split_once('.')?;

    if date_part.len() != 8 || !date_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if cycle_part.is_empty() || !cycle_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let date = NaiveDate::parse_from_str(date_part, "%Y%m%d").ok()?;
    let hour = cycle_part.parse::<u32>().ok()? / 100;
    if hour > 23 {
        return None;
    }

    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some((midnight + Duration::hours(hour as i64)).and_utc())
}

/// Finds the ECMWF forecast files for a watershed.
///
/// With [`ForecastSelector::MostRecent`] every cycle folder under `root` is
/// tried newest first; folders with unparsable names or no `*.nc` files
/// are passed over. With a named folder only that folder is tried.
pub fn find_global_forecast_files(
    root: &Path,
    selector: &ForecastSelector,
) -> Option<GlobalForecast> {
    let candidates = match selector {
        ForecastSelector::MostRecent => {
            let mut dirs = list_subdirectory_names(root);
            dirs.sort_unstable_by(|a, b| b.cmp(a));
            dirs
        }
        ForecastSelector::Named(folder) => vec![folder.clone()],
    };

    for folder in candidates {
        let Some(issued_at) = parse_forecast_folder_name(&folder) else {
            debug!(folder = %folder, "skipping folder with unrecognized cycle name");
            continue;
        };
        if !is_plain_name(&folder) {
            continue;
        }

        let folder_path = root.join(&folder);
        if !folder_path.is_dir() {
            continue;
        }

        let files = list_forecast_files(&folder_path);
        if files.is_empty() {
            debug!(folder = %folder, "no forecast files in cycle folder");
            continue;
        }

        return Some(GlobalForecast { files, issued_at });
    }

    None
}

// ---------------------------------------------------------------------------
// WRF-Hydro
// ---------------------------------------------------------------------------

/// File name WRF-Hydro RAPID output uses for a date-time token,
/// e.g. `20150405T2300Z` → `RapidResult_20150405T2300Z_CF.nc`.
pub fn regional_forecast_file_name(token: &str) -> String {
    format!("RapidResult_{}_CF.nc", token)
}

/// Finds a WRF-Hydro forecast file for a watershed.
///
/// With [`ForecastSelector::MostRecent`] the newest `*.nc` file directly
/// in `root` is returned (file names embed a sortable timestamp). With a
/// named token the file is looked up by its expected name.
pub fn find_regional_forecast_file(root: &Path, selector: &ForecastSelector) -> Option<PathBuf> {
    match selector {
        ForecastSelector::MostRecent => list_forecast_files(root)
            .into_iter()
            .find(|path| path.is_file()),
        ForecastSelector::Named(token) => {
            if token.is_empty() || !is_plain_name(token) {
                return None;
            }
            let path = root.join(regional_forecast_file_name(token));
            path.is_file().then_some(path)
        }
    }
}

// ---------------------------------------------------------------------------
// Directory helpers
// ---------------------------------------------------------------------------

/// Names of the immediate subdirectories of `root`. Unreadable entries and
/// non UTF-8 names are dropped; a missing root yields an empty list.
fn list_subdirectory_names(root: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(root) else {
        return Vec::new();
    };

    entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect()
}

/// `*.nc` files directly inside `dir`, sorted descending by path.
/// Hidden files are not matched, as with a shell glob.
fn list_forecast_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| !name.starts_with('.'))
        })
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension().and_then(|ext| ext.to_str()) == Some(FORECAST_EXTENSION)
                && path.is_file()
        })
        .collect();

    files.sort_unstable_by(|a, b| b.cmp(a));
    files
}

/// A single path component: no separators, no parent references.
fn is_plain_name(name: &str) -> bool {
    !name.contains('/') && !name.contains('\\') && name != ".." && name != "."
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
