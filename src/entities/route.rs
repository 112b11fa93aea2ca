use chrono::{DateTime, Utc};
use geo_types::{coord, LineString, Rect};
use serde::{Deserialize, Serialize};

use crate::entities::Stop;

/// Geometry and summary returned by the directions service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    pub geometry: LineString<f64>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

impl RouteGeometry {
    pub fn bounds(&self) -> Option<Rect<f64>> {
        let mut coords = self.geometry.coords();
        let first = coords.next()?;
        let (mut min, mut max) = (*first, *first);

        for c in coords {
            min = coord! { x: min.x.min(c.x), y: min.y.min(c.y) };
            max = coord! { x: max.x.max(c.x), y: max.y.max(c.y) };
        }

        Some(Rect::new(min, max))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OptimizedRoute {
    pub stops: Vec<Stop>,
    pub geometry: LineString<f64>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub computed_at: DateTime<Utc>,
}

impl OptimizedRoute {
    pub fn new(stops: Vec<Stop>, route: RouteGeometry) -> Self {
        Self {
            stops,
            geometry: route.geometry,
            distance_meters: route.distance_meters,
            duration_seconds: route.duration_seconds,
            computed_at: Utc::now(),
        }
    }

    pub fn distance_km(&self) -> f64 {
        (self.distance_meters / 10.0).round() / 100.0
    }

    pub fn duration_minutes(&self) -> f64 {
        (self.duration_seconds / 6.0).round() / 10.0
    }

    pub fn summary(&self) -> String {
        format!(
            "Total distance: {:.2} km, estimated time: {:.1} minutes",
            self.distance_km(),
            self.duration_minutes()
        )
    }
}

#[test]
fn route_summary() {
    let route = OptimizedRoute::new(
        vec![],
        RouteGeometry {
            geometry: LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]),
            distance_meters: 12345.0,
            duration_seconds: 1530.0,
        },
    );

    assert_eq!(route.distance_km(), 12.35);
    assert_eq!(route.duration_minutes(), 25.5);
    assert_eq!(
        route.summary(),
        "Total distance: 12.35 km, estimated time: 25.5 minutes"
    );
}

#[test]
fn route_bounds() {
    let route = RouteGeometry {
        geometry: LineString::from(vec![(-58.4, -34.6), (-58.5, -34.5), (-58.3, -34.7)]),
        distance_meters: 0.0,
        duration_seconds: 0.0,
    };

    let bounds = route.bounds().unwrap();
    assert_eq!(bounds.min(), coord! { x: -58.5, y: -34.7 });
    assert_eq!(bounds.max(), coord! { x: -58.3, y: -34.5 });

    let empty = RouteGeometry {
        geometry: LineString::new(vec![]),
        distance_meters: 0.0,
        duration_seconds: 0.0,
    };
    assert!(empty.bounds().is_none());
}
