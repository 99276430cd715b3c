use serde::{Deserialize, Serialize};

/// A known distance between two named locations.
///
/// Direction does not matter: a route from A to B also covers B to A.
/// Serialized with the `from`/`to` keys used by the mileage data files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(rename = "from")]
    pub origin: String,
    #[serde(rename = "to")]
    pub destination: String,
    pub miles: f64,
}

impl Route {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>, miles: f64) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            miles,
        }
    }

    /// True if this route joins `a` and `b`, in either direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.origin == a && self.destination == b) || (self.origin == b && self.destination == a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connects_both_directions() {
        let route = Route::new("Central Office", "Lincoln Elementary", 4.2);

        assert!(route.connects("Central Office", "Lincoln Elementary"));
        assert!(route.connects("Lincoln Elementary", "Central Office"));
        assert!(!route.connects("Central Office", "Adams Elementary"));
    }

    #[test]
    fn deserializes_from_to_keys() {
        let route: Route = serde_json::from_str(r#"{ "from": "A", "to": "B", "miles": 3 }"#).unwrap();

        assert_eq!(route, Route::new("A", "B", 3.0));
    }
}
