use async_trait::async_trait;
use geo_types::LineString;
use serde::{Deserialize, Serialize};
use std::env;

use crate::{
    entities::{Coordinates, RouteGeometry},
    error::{no_route_error, reconciliation_mismatch_error, upstream_error, Error},
    external::{Directions, OptimizationRequest, Optimizer},
};

const SERVICE: &str = "routing service";
const DEFAULT_API_BASE: &str = "api.openrouteservice.org";
const DEFAULT_PROFILE: &str = "driving-car";

#[derive(Clone, Debug)]
pub struct OpenRouteService {
    api_base: String,
    api_key: String,
    profile: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct OptimizationPayload {
    jobs: Vec<JobPayload>,
    vehicles: Vec<VehiclePayload>,
}

#[derive(Debug, Serialize)]
struct JobPayload {
    id: usize,
    location: [f64; 2],
}

#[derive(Debug, Serialize)]
struct VehiclePayload {
    id: usize,
    profile: String,
    start: [f64; 2],
    end: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct OptimizationResponse {
    #[serde(default)]
    routes: Vec<OptimizedVehicleRoute>,
}

#[derive(Debug, Deserialize)]
struct OptimizedVehicleRoute {
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    #[serde(rename = "type")]
    kind: String,
    job: Option<usize>,
}

#[derive(Debug, Serialize)]
struct DirectionsPayload {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: FeatureGeometry,
    properties: FeatureProperties,
}

#[derive(Debug, Deserialize)]
struct FeatureGeometry {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    summary: Summary,
}

#[derive(Debug, Deserialize)]
struct Summary {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

// Job ids on the wire are 1-based.
fn to_payload(request: &OptimizationRequest, profile: &str) -> OptimizationPayload {
    OptimizationPayload {
        jobs: request
            .jobs
            .iter()
            .map(|job| JobPayload {
                id: job.index + 1,
                location: job.position.to_lng_lat(),
            })
            .collect(),
        vehicles: vec![VehiclePayload {
            id: 1,
            profile: profile.into(),
            start: request.start.to_lng_lat(),
            end: request.end.to_lng_lat(),
        }],
    }
}

fn visit_order(response: OptimizationResponse) -> Result<Vec<usize>, Error> {
    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| no_route_error())?;

    route
        .steps
        .into_iter()
        .filter(|step| step.kind == "job")
        .map(|step| {
            step.job
                .and_then(|id| id.checked_sub(1))
                .ok_or_else(|| reconciliation_mismatch_error())
        })
        .collect()
}

fn route_geometry(response: DirectionsResponse) -> Result<RouteGeometry, Error> {
    let feature = response
        .features
        .into_iter()
        .next()
        .ok_or_else(|| no_route_error())?;

    let geometry: LineString<f64> = feature
        .geometry
        .coordinates
        .into_iter()
        .map(|[lng, lat]| (lng, lat))
        .collect::<Vec<_>>()
        .into();

    Ok(RouteGeometry {
        geometry,
        distance_meters: feature.properties.summary.distance,
        duration_seconds: feature.properties.summary.duration,
    })
}

fn check_status(status_code: u16) -> Result<(), Error> {
    match status_code {
        200 => Ok(()),
        401 | 403 => Err(upstream_error(SERVICE)),
        400..=499 => Err(no_route_error()),
        _ => Err(upstream_error(SERVICE)),
    }
}

impl OpenRouteService {
    pub fn new(api_base: String, api_key: String, profile: String) -> Self {
        Self {
            api_base,
            api_key,
            profile,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, Error> {
        let api_key = env::var("ORS_API_KEY")?;
        let api_base = env::var("ORS_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into());
        let profile = env::var("ORS_PROFILE").unwrap_or_else(|_| DEFAULT_PROFILE.into());

        Ok(Self::new(api_base, api_key, profile))
    }
}

#[async_trait]
impl Optimizer for OpenRouteService {
    #[tracing::instrument(skip(self))]
    async fn optimize(&self, request: &OptimizationRequest) -> Result<Vec<usize>, Error> {
        let url = format!("https://{}/optimization", self.api_base);

        let res = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .json(&to_payload(request, &self.profile))
            .send()
            .await?;

        check_status(res.status().as_u16())?;

        let data: OptimizationResponse = res.json().await?;

        visit_order(data)
    }
}

#[async_trait]
impl Directions for OpenRouteService {
    #[tracing::instrument(skip(self))]
    async fn route(&self, positions: &[Coordinates]) -> Result<RouteGeometry, Error> {
        let url = format!(
            "https://{}/v2/directions/{}/geojson",
            self.api_base, self.profile
        );

        let payload = DirectionsPayload {
            coordinates: positions.iter().map(|p| p.to_lng_lat()).collect(),
        };

        let res = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .json(&payload)
            .send()
            .await?;

        check_status(res.status().as_u16())?;

        let data: DirectionsResponse = res.json().await?;

        route_geometry(data)
    }
}

#[test]
fn optimization_payload_shape() {
    use crate::external::Job;
    use serde_json::json;

    let request = OptimizationRequest {
        start: Coordinates::new(-34.60, -58.38),
        end: Coordinates::new(-34.61, -58.40),
        jobs: vec![
            Job {
                index: 0,
                position: Coordinates::new(-34.62, -58.41),
            },
            Job {
                index: 1,
                position: Coordinates::new(-34.63, -58.42),
            },
        ],
    };

    let payload = serde_json::to_value(to_payload(&request, "driving-car")).unwrap();

    assert_eq!(
        payload,
        json!({
            "jobs": [
                {"id": 1, "location": [-58.41, -34.62]},
                {"id": 2, "location": [-58.42, -34.63]},
            ],
            "vehicles": [
                {"id": 1, "profile": "driving-car", "start": [-58.38, -34.60], "end": [-58.40, -34.61]},
            ],
        })
    );
}

#[test]
fn visit_order_skips_start_and_end_steps() {
    let response: OptimizationResponse = serde_json::from_str(
        r#"{"code": 0, "routes": [{"vehicle": 1, "steps": [
            {"type": "start", "location": [0, 0]},
            {"type": "job", "job": 2},
            {"type": "job", "job": 1},
            {"type": "end", "location": [1, 1]}
        ]}]}"#,
    )
    .unwrap();

    assert_eq!(visit_order(response).unwrap(), vec![1, 0]);
}

#[test]
fn visit_order_without_routes() {
    let response: OptimizationResponse =
        serde_json::from_str(r#"{"code": 0, "routes": []}"#).unwrap();

    assert!(visit_order(response)
        .unwrap_err()
        .is(crate::error::ErrorKind::NoRoute));
}

#[test]
fn route_geometry_from_geojson() {
    let response: DirectionsResponse = serde_json::from_str(
        r#"{"type": "FeatureCollection", "features": [{
            "type": "Feature",
            "geometry": {"type": "LineString", "coordinates": [[-58.38, -34.60], [-58.40, -34.61]]},
            "properties": {"summary": {"distance": 2512.3, "duration": 410.8}}
        }]}"#,
    )
    .unwrap();

    let route = route_geometry(response).unwrap();

    assert_eq!(route.geometry.0.len(), 2);
    assert_eq!(route.geometry.0[0].x, -58.38);
    assert_eq!(route.distance_meters, 2512.3);
    assert_eq!(route.duration_seconds, 410.8);
}

#[test]
fn route_geometry_without_features() {
    let response: DirectionsResponse = serde_json::from_str(r#"{"features": []}"#).unwrap();

    assert!(route_geometry(response)
        .unwrap_err()
        .is(crate::error::ErrorKind::NoRoute));
}

#[test]
fn status_mapping() {
    assert!(check_status(200).is_ok());
    assert!(check_status(404)
        .unwrap_err()
        .is(crate::error::ErrorKind::NoRoute));
    assert!(check_status(403)
        .unwrap_err()
        .is(crate::error::ErrorKind::ServiceError));
    let err = check_status(503).unwrap_err();
    assert!(err.is(crate::error::ErrorKind::ServiceError));
    assert!(err.message.starts_with(SERVICE));
}
