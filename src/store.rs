/// Scoped access to watershed records.
///
/// Cleanup never holds a connection as ambient state. Each call opens a
/// session from a [`SessionFactory`], asks it what it needs, and drops it
/// before touching the filesystem.
///
/// Two implementations ship with the crate:
/// - [`crate::db::PgSessionFactory`]: one Postgres connection per session
/// - [`InMemorySessions`]: a [`NamingPairIndex`] snapshot, for tools and tests

use crate::model::{ForecastSource, MainSettings, NamingPair, Watershed};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database query failed: {0}")]
    Query(#[from] postgres::Error),

    #[error("no main settings record found")]
    MissingSettings,

    #[error("watershed {0} not found")]
    WatershedNotFound(i32),

    #[error("could not open session: {0}")]
    Unavailable(String),
}

/// An open unit of work against the watershed records.
pub trait WatershedSession {
    /// The singleton settings record.
    fn main_settings(&mut self) -> Result<MainSettings, StoreError>;

    /// Number of watersheds other than `exclude_id` whose naming pair for
    /// `source` equals `pair`.
    fn count_sharing_watersheds(
        &mut self,
        source: ForecastSource,
        pair: &NamingPair,
        exclude_id: i32,
    ) -> Result<u64, StoreError>;
}

/// Opens a fresh session per call. Dropping the session closes it.
pub trait SessionFactory {
    type Session: WatershedSession;

    fn open(&self) -> Result<Self::Session, StoreError>;
}

// ---------------------------------------------------------------------------
// Naming pair index
// ---------------------------------------------------------------------------

/// Deduplicated map from `(source, naming pair)` to the ids of the
/// watersheds that name it.
#[derive(Debug, Clone, Default)]
pub struct NamingPairIndex {
    owners: BTreeMap<(ForecastSource, NamingPair), BTreeSet<i32>>,
}

impl NamingPairIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_watersheds<'a>(watersheds: impl IntoIterator<Item = &'a Watershed>) -> Self {
        let mut index = Self::new();
        for watershed in watersheds {
            index.insert(watershed);
        }
        index
    }

    /// Registers both naming pairs of a watershed.
    pub fn insert(&mut self, watershed: &Watershed) {
        for source in ForecastSource::ALL {
            self.owners
                .entry((source, watershed.naming_pair(source)))
                .or_default()
                .insert(watershed.id);
        }
    }

    /// Drops a watershed from every pair it owns. Pairs left without owners
    /// are removed.
    pub fn remove(&mut self, watershed_id: i32) {
        self.owners.retain(|_, ids| {
            ids.remove(&watershed_id);
            !ids.is_empty()
        });
    }

    /// Owners of a pair, excluding one watershed id.
    pub fn count_owners_excluding(
        &self,
        source: ForecastSource,
        pair: &NamingPair,
        exclude_id: i32,
    ) -> u64 {
        self.owners
            .get(&(source, pair.clone()))
            .map(|ids| ids.iter().filter(|&&id| id != exclude_id).count() as u64)
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// In-memory sessions
// ---------------------------------------------------------------------------

/// Session factory over an in-memory index and settings record.
///
/// Each opened session works on its own snapshot, so later changes to the
/// factory are not seen by sessions already open.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessions {
    pub settings: Option<MainSettings>,
    pub index: NamingPairIndex,
}

impl InMemorySessions {
    pub fn new(settings: MainSettings, watersheds: &[Watershed]) -> Self {
        Self {
            settings: Some(settings),
            index: NamingPairIndex::from_watersheds(watersheds),
        }
    }
}

#[derive(Debug)]
pub struct InMemorySession {
    settings: Option<MainSettings>,
    index: NamingPairIndex,
}

impl WatershedSession for InMemorySession {
    fn main_settings(&mut self) -> Result<MainSettings, StoreError> {
        self.settings.clone().ok_or(StoreError::MissingSettings)
    }

    fn count_sharing_watersheds(
        &mut self,
        source: ForecastSource,
        pair: &NamingPair,
        exclude_id: i32,
    ) -> Result<u64, StoreError> {
        Ok(self.index.count_owners_excluding(source, pair, exclude_id))
    }
}

impl SessionFactory for InMemorySessions {
    type Session = InMemorySession;

    fn open(&self) -> Result<Self::Session, StoreError> {
        Ok(InMemorySession {
            settings: self.settings.clone(),
            index: self.index.clone(),
        })
    }
}
