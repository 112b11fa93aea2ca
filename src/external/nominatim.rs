use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;

use crate::{
    entities::{Coordinates, Location},
    error::{invalid_input_error, not_found_error, upstream_error, Error},
    external::Geocoder,
};

const SERVICE: &str = "geocoding service";
const DEFAULT_API_BASE: &str = "nominatim.openstreetmap.org";
const USER_AGENT: &str = concat!("waypointer/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    display_name: String,
}

impl Place {
    fn into_location(self) -> Result<Location, Error> {
        let lat: f64 = self.lat.parse().map_err(|_| upstream_error(SERVICE))?;
        let lng: f64 = self.lon.parse().map_err(|_| upstream_error(SERVICE))?;

        Ok(Location::new(Coordinates::new(lat, lng), self.display_name))
    }
}

#[derive(Clone, Debug)]
pub struct Nominatim {
    api_base: String,
    query_suffix: String,
    client: reqwest::Client,
}

impl Nominatim {
    pub fn new(api_base: String, query_suffix: String) -> Self {
        Self {
            api_base,
            query_suffix,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        let api_base = env::var("NOMINATIM_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into());
        let query_suffix = env::var("NOMINATIM_QUERY_SUFFIX").unwrap_or_default();

        Self::new(api_base, query_suffix)
    }

    fn query(&self, text: &str) -> String {
        format!("{}{}", text, self.query_suffix)
    }
}

#[async_trait]
impl Geocoder for Nominatim {
    #[tracing::instrument(skip(self))]
    async fn lookup(&self, text: &str) -> Result<Location, Error> {
        let url = format!("https://{}/search", self.api_base);

        let res = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[("format", "json")])
            .query(&[("q", self.query(text))])
            .query(&[("addressdetails", "1")])
            .send()
            .await?;

        let status_code = res.status().as_u16();

        if status_code >= 400 && status_code < 500 {
            return Err(invalid_input_error());
        } else if status_code != 200 {
            return Err(upstream_error(SERVICE));
        }

        let data: Vec<Place> = res.json().await?;

        data.into_iter()
            .next()
            .ok_or_else(|| not_found_error())?
            .into_location()
    }
}

#[test]
fn place_into_location() {
    let place: Place = serde_json::from_str(
        r#"{"lat": "-34.6083", "lon": "-58.3712", "display_name": "Plaza de Mayo, Buenos Aires"}"#,
    )
    .unwrap();

    let location = place.into_location().unwrap();
    assert_eq!(location.coordinates, Coordinates::new(-34.6083, -58.3712));
    assert_eq!(location.description, "Plaza de Mayo, Buenos Aires");
}

#[test]
fn malformed_place_is_upstream_error() {
    let place = Place {
        lat: "north".into(),
        lon: "0".into(),
        display_name: "".into(),
    };

    let err = place.into_location().unwrap_err();

    assert!(err.is(crate::error::ErrorKind::ServiceError));
    assert!(err.message.starts_with(SERVICE));
}

#[test]
fn query_suffix_is_appended() {
    let geocoder = Nominatim::new(DEFAULT_API_BASE.into(), ", Buenos Aires".into());

    assert_eq!(geocoder.query("Florida 100"), "Florida 100, Buenos Aires");
}
