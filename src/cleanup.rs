/// Shared-resource cleanup for watersheds being removed or reconfigured.
///
/// Forecast folders are stored once per naming pair, and several
/// watersheds can name the same pair. A folder is only deleted once no
/// other watershed references its pair. Map layers and catalog resources
/// belong to exactly one watershed and are removed unconditionally.
///
/// Cleanup is best-effort. Every step reports a [`StepOutcome`] instead of
/// returning early, so one failed delete never stops the next step and the
/// caller still sees what went wrong.
///
/// The count-then-delete sequence takes no lock: a watershed created in
/// between can lose its files. Removal is an administrative, low-frequency
/// operation.

use crate::model::{ForecastScope, ForecastSource, LayerKind, NamingPair, Watershed};
use crate::remote::{CatalogManager, MapLayerManager, RemoteError};
use crate::store::{SessionFactory, WatershedSession};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum CleanupError {
    #[error("remote cleanup of {resource} failed: {source}")]
    RemoteCleanupFailed {
        resource: String,
        #[source]
        source: RemoteError,
    },

    #[error("failed to delete {}: {source}", .path.display())]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not check watershed references: {0}")]
    Session(String),
}

/// Result of one cleanup step.
#[derive(Debug)]
pub enum StepOutcome {
    /// The resource was deleted.
    Removed,
    /// Other watersheds still reference the resource, so it was kept.
    Retained { other_owners: u64 },
    /// Nothing to do: the resource is absent, unconfigured or not ours.
    Skipped(&'static str),
    Failed(CleanupError),
}

impl StepOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed(_))
    }

    pub fn error(&self) -> Option<&CleanupError> {
        match self {
            StepOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Per-source outcomes of [`remove_forecast_files`].
#[derive(Debug, Default)]
pub struct ForecastCleanup {
    pub steps: Vec<(ForecastSource, StepOutcome)>,
}

impl ForecastCleanup {
    pub fn outcome(&self, source: ForecastSource) -> Option<&StepOutcome> {
        self.steps.iter().find(|(s, _)| *s == source).map(|(_, o)| o)
    }
}

/// Per-layer outcomes of [`remove_map_layers`].
#[derive(Debug, Default)]
pub struct MapLayerCleanup {
    pub steps: Vec<(LayerKind, StepOutcome)>,
}

impl MapLayerCleanup {
    /// Number of remote delete calls that succeeded.
    pub fn removed_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|(_, o)| matches!(o, StepOutcome::Removed))
            .count()
    }

    /// Collapses the outcomes into the number of removed layers, or the
    /// first remote failure.
    pub fn into_result(self) -> Result<usize, CleanupError> {
        let mut removed = 0;
        for (_, outcome) in self.steps {
            match outcome {
                StepOutcome::Removed => removed += 1,
                StepOutcome::Failed(e) => return Err(e),
                _ => {}
            }
        }
        Ok(removed)
    }
}

/// Everything [`remove_watershed_resources`] did.
#[derive(Debug)]
pub struct WatershedRemovalReport {
    pub watershed_id: i32,
    pub map_layers: MapLayerCleanup,
    pub forecasts: ForecastCleanup,
    pub catalog: StepOutcome,
}

impl WatershedRemovalReport {
    pub fn failures(&self) -> Vec<&CleanupError> {
        self.map_layers
            .steps
            .iter()
            .map(|(_, o)| o)
            .chain(self.forecasts.steps.iter().map(|(_, o)| o))
            .chain(std::iter::once(&self.catalog))
            .filter_map(StepOutcome::error)
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.failures().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Forecast files
// ---------------------------------------------------------------------------

/// What to do for one source, decided while the session is open.
enum ForecastPlan {
    Delete { root: PathBuf, pair: NamingPair },
    Done(StepOutcome),
}

/// Removes a watershed's forecast folders for the sources in `scope`,
/// unless another watershed shares the naming pair.
///
/// A session is opened for the reference counts and closed before any
/// filesystem work. Nothing here returns an error; failures are reported
/// per source.
pub fn remove_forecast_files<S: SessionFactory>(
    sessions: &S,
    watershed: &Watershed,
    scope: ForecastScope,
) -> ForecastCleanup {
    let plans = match plan_forecast_removal(sessions, watershed, scope) {
        Ok(plans) => plans,
        Err(message) => {
            warn!(watershed_id = watershed.id, error = %message, "forecast cleanup skipped");
            return ForecastCleanup {
                steps: scope
                    .sources()
                    .iter()
                    .map(|&source| (source, StepOutcome::Failed(CleanupError::Session(message.clone()))))
                    .collect(),
            };
        }
    };

    let steps = plans
        .into_iter()
        .map(|(source, plan)| {
            let outcome = match plan {
                ForecastPlan::Delete { root, pair } => delete_prediction_files(&root, &pair),
                ForecastPlan::Done(outcome) => outcome,
            };
            (source, outcome)
        })
        .collect();

    ForecastCleanup { steps }
}

fn plan_forecast_removal<S: SessionFactory>(
    sessions: &S,
    watershed: &Watershed,
    scope: ForecastScope,
) -> Result<Vec<(ForecastSource, ForecastPlan)>, String> {
    let mut session = sessions.open().map_err(|e| e.to_string())?;
    let settings = session.main_settings().map_err(|e| e.to_string())?;

    let mut plans = Vec::with_capacity(scope.sources().len());
    for &source in scope.sources() {
        let pair = watershed.naming_pair(source);
        let plan = match session.count_sharing_watersheds(source, &pair, watershed.id) {
            Ok(0) => ForecastPlan::Delete {
                root: PathBuf::from(settings.prediction_directory(source)),
                pair,
            },
            Ok(other_owners) => {
                debug!(%source, %pair, other_owners, "forecast folder still shared");
                ForecastPlan::Done(StepOutcome::Retained { other_owners })
            }
            Err(e) => ForecastPlan::Done(StepOutcome::Failed(CleanupError::Session(e.to_string()))),
        };
        plans.push((source, plan));
    }

    drop(session);
    Ok(plans)
}

/// Deletes `root/watershed/subbasin`, then the watershed folder if that
/// left it empty.
fn delete_prediction_files(root: &Path, pair: &NamingPair) -> StepOutcome {
    if root.as_os_str().is_empty() || !pair.is_complete() {
        return StepOutcome::Skipped("prediction directory not configured");
    }
    if !is_plain_component(&pair.watershed_name) || !is_plain_component(&pair.subbasin_name) {
        warn!(%pair, "refusing to delete forecast folder with path-like name");
        return StepOutcome::Skipped("naming pair is not a plain folder name");
    }

    let watershed_dir = root.join(&pair.watershed_name);
    let prediction_dir = watershed_dir.join(&pair.subbasin_name);
    if !prediction_dir.exists() {
        return StepOutcome::Skipped("no forecast folder on disk");
    }

    let outcome = match fs::remove_dir_all(&prediction_dir) {
        Ok(()) => {
            info!(path = %prediction_dir.display(), "removed forecast folder");
            StepOutcome::Removed
        }
        Err(source) => {
            warn!(path = %prediction_dir.display(), error = %source, "failed to remove forecast folder");
            StepOutcome::Failed(CleanupError::DeleteFailed {
                path: prediction_dir,
                source,
            })
        }
    };

    // Only succeeds once no other subbasin folders remain.
    if fs::remove_dir(&watershed_dir).is_ok() {
        debug!(path = %watershed_dir.display(), "removed empty watershed folder");
    }

    outcome
}

fn is_plain_component(name: &str) -> bool {
    !name.contains('/') && !name.contains('\\') && name != "." && name != ".."
}

// ---------------------------------------------------------------------------
// Map layers and catalog
// ---------------------------------------------------------------------------

/// Purges every uploaded map layer of a watershed. Absent layers and
/// layers linked rather than uploaded are skipped without a remote call.
pub fn remove_map_layers<M: MapLayerManager + ?Sized>(
    manager: &M,
    watershed: &Watershed,
) -> MapLayerCleanup {
    let steps = watershed
        .layers()
        .into_iter()
        .map(|(kind, layer)| {
            let outcome = match layer {
                None => StepOutcome::Skipped("no layer"),
                Some(layer) if !layer.uploaded => StepOutcome::Skipped("layer not uploaded by this service"),
                Some(layer) => match manager.purge_remove_geoserver_layer(layer) {
                    Ok(()) => StepOutcome::Removed,
                    Err(source) => {
                        warn!(layer = %layer.name, %kind, error = %source, "failed to purge map layer");
                        StepOutcome::Failed(CleanupError::RemoteCleanupFailed {
                            resource: layer.name.clone(),
                            source,
                        })
                    }
                },
            };
            (kind, outcome)
        })
        .collect();

    MapLayerCleanup { steps }
}

fn remove_catalog_resource<C: CatalogManager + ?Sized>(catalog: &C, watershed: &Watershed) -> StepOutcome {
    let Some(resource_id) = watershed.catalog_resource_id() else {
        return StepOutcome::Skipped("no catalog resource");
    };

    match catalog.delete_resource(resource_id) {
        Ok(()) => StepOutcome::Removed,
        Err(source) => {
            warn!(resource_id = %resource_id, error = %source, "failed to delete catalog resource");
            StepOutcome::Failed(CleanupError::RemoteCleanupFailed {
                resource: format!("catalog resource {}", resource_id),
                source,
            })
        }
    }
}

/// Removes everything a watershed owns: its map layers, its forecast
/// folders (unless shared) and its published RAPID input resource.
///
/// All three steps are always attempted.
pub fn remove_watershed_resources<S, M, C>(
    sessions: &S,
    layers: &M,
    catalog: &C,
    watershed: &Watershed,
) -> WatershedRemovalReport
where
    S: SessionFactory,
    M: MapLayerManager + ?Sized,
    C: CatalogManager + ?Sized,
{
    info!(watershed_id = watershed.id, name = %watershed.watershed_name, "removing watershed resources");

    let map_layers = remove_map_layers(layers, watershed);
    let forecasts = remove_forecast_files(sessions, watershed, ForecastScope::All);
    let catalog = remove_catalog_resource(catalog, watershed);

    let report = WatershedRemovalReport {
        watershed_id: watershed.id,
        map_layers,
        forecasts,
        catalog,
    };

    if !report.is_clean() {
        warn!(
            watershed_id = watershed.id,
            failures = report.failures().len(),
            "watershed removal finished with failures"
        );
    }

    report
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
