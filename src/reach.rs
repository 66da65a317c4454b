/// Reach (COMID) lookups in RAPID forecast output.
///
/// Each forecast file carries a one-dimensional `COMID` variable; a reach's
/// position in that array is the row used to pull its time series. A reach
/// that is not in the file is `None`, not an error.

use std::collections::HashSet;

/// Name of the reach id variable in RAPID output.
pub const COMID_VARIABLE: &str = "COMID";

/// Position of `reach_id` in `comids`.
///
/// `guess_index` is checked first (callers usually cache the last index
/// they saw); an out-of-range or stale guess falls back to a full scan.
pub fn get_reach_index(reach_id: i64, comids: &[i64], guess_index: Option<usize>) -> Option<usize> {
    if let Some(guess) = guess_index {
        if comids.get(guess) == Some(&reach_id) {
            return Some(guess);
        }
    }
    comids.iter().position(|&id| id == reach_id)
}

/// Positions in `search_reach_ids` whose id appears in `lookup_reach_ids`,
/// along with those ids, both in `search_reach_ids` order.
pub fn get_comids_in_lookup_comid_list(
    search_reach_ids: &[i64],
    lookup_reach_ids: &[i64],
) -> (Vec<usize>, Vec<i64>) {
    let lookup: HashSet<i64> = lookup_reach_ids.iter().copied().collect();

    search_reach_ids
        .iter()
        .enumerate()
        .filter(|(_, id)| lookup.contains(*id))
        .map(|(index, &id)| (index, id))
        .unzip()
}

#[cfg(feature = "netcdf")]
pub use file::{find_reach_index_in_file, read_comids, ReachError};

#[cfg(feature = "netcdf")]
mod file {
    use super::{get_reach_index, COMID_VARIABLE};
    use std::path::Path;
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum ReachError {
        #[error("failed to open {path}: {message}")]
        Open { path: String, message: String },

        #[error("{path} has no {variable} variable")]
        MissingVariable { path: String, variable: &'static str },

        #[error("{variable} in {path} is not one-dimensional")]
        NotOneDimensional { path: String, variable: &'static str },

        #[error("failed to read {variable} from {path}: {message}")]
        Read {
            path: String,
            variable: &'static str,
            message: String,
        },
    }

    /// Reads the `COMID` array from a RAPID forecast file.
    pub fn read_comids(path: &Path) -> Result<Vec<i64>, ReachError> {
        let display = path.display().to_string();

        let nc_file = netcdf::open(path).map_err(|e| ReachError::Open {
            path: display.clone(),
            message: e.to_string(),
        })?;

        let var = nc_file
            .variable(COMID_VARIABLE)
            .ok_or_else(|| ReachError::MissingVariable {
                path: display.clone(),
                variable: COMID_VARIABLE,
            })?;

        if var.dimensions().len() != 1 {
            return Err(ReachError::NotOneDimensional {
                path: display,
                variable: COMID_VARIABLE,
            });
        }

        var.get_values::<i64, _>(..).map_err(|e| ReachError::Read {
            path: display,
            variable: COMID_VARIABLE,
            message: e.to_string(),
        })
    }

    /// Reads a file's reach ids and looks `reach_id` up in them.
    pub fn find_reach_index_in_file(
        path: &Path,
        reach_id: i64,
        guess_index: Option<usize>,
    ) -> Result<Option<usize>, ReachError> {
        let comids = read_comids(path)?;
        Ok(get_reach_index(reach_id, &comids, guess_index))
    }
}
