use std::{collections::BTreeSet, path::Path};

use crate::route::Route;

/// The school-to-school distances shipped with the crate.
pub const BUNDLED_TABLE_JSON: &str = include_str!("../data/mileage_data.json");

#[derive(Debug, thiserror::Error)]
pub enum DistanceTableError {
    #[error("failed to read distance table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse distance table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("route {origin} -> {destination} has invalid distance {miles}")]
    InvalidDistance {
        origin: String,
        destination: String,
        miles: f64,
    },
}

/// Read-only set of known routes, loaded once at startup.
///
/// Lookups are linear scans in table order; the table is small and static.
#[derive(Debug, Clone, Default)]
pub struct DistanceTable {
    routes: Vec<Route>,
}

impl DistanceTable {
    pub fn new(routes: Vec<Route>) -> Result<Self, DistanceTableError> {
        if let Some(route) = routes.iter().find(|route| !route.miles.is_finite() || route.miles < 0.) {
            return Err(DistanceTableError::InvalidDistance {
                origin: route.origin.clone(),
                destination: route.destination.clone(),
                miles: route.miles,
            });
        }

        Ok(Self { routes })
    }

    /// Parses a JSON array of `{ "from", "to", "miles" }` objects.
    pub fn from_json(json: &str) -> Result<Self, DistanceTableError> {
        let routes: Vec<Route> = serde_json::from_str(json)?;
        Self::new(routes)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DistanceTableError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| DistanceTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn bundled() -> Result<Self, DistanceTableError> {
        Self::from_json(BUNDLED_TABLE_JSON)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Every name that appears as the origin of some route, sorted.
    pub fn list_origins(&self) -> BTreeSet<&str> {
        self.routes.iter().map(|route| route.origin.as_str()).collect()
    }

    /// Every name that appears as the destination of some route, sorted.
    pub fn list_destinations(&self) -> BTreeSet<&str> {
        self.routes.iter().map(|route| route.destination.as_str()).collect()
    }

    /// Distance between `a` and `b` in either direction. First match in table order wins.
    pub fn lookup(&self, a: &str, b: &str) -> Option<f64> {
        self.routes
            .iter()
            .find(|route| route.connects(a, b))
            .map(|route| route.miles)
    }
}
