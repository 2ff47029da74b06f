//! USGS Earthquake API client.
//!
//! Provides blocking HTTP access to the FDSN event query endpoint.
//! Uses reqwest with rustls for TLS.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use tracing::{debug, instrument};

use crate::errors::QuakemapError;
use crate::models::FeatureCollection;

/// Default request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent string for API requests.
const USER_AGENT: &str = concat!("quakemap/", env!("CARGO_PKG_VERSION"));

/// USGS FDSN event query endpoint.
pub const USGS_QUERY_URL: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";

/// Date format used by the FDSN query parameters.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fixed filter sent with the event query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryParams {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub min_magnitude: f64,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2020, 1, 20).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2020, 1, 30).unwrap_or_default(),
            min_magnitude: 2.5,
        }
    }
}

impl QueryParams {
    /// Check the parameters describe a usable query.
    pub fn validate(&self) -> Result<(), QuakemapError> {
        if self.start > self.end {
            return Err(QuakemapError::InvalidQuery(format!(
                "start date {} is after end date {}",
                self.start, self.end
            )));
        }
        if !self.min_magnitude.is_finite() {
            return Err(QuakemapError::InvalidQuery(format!(
                "minimum magnitude must be finite, got {}",
                self.min_magnitude
            )));
        }
        Ok(())
    }

    /// Full query URL against `endpoint`.
    #[must_use]
    pub fn query_url(&self, endpoint: &str) -> String {
        format!(
            "{endpoint}?format=geojson&starttime={}&endtime={}&minmagnitude={}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT),
            self.min_magnitude
        )
    }
}

/// Parse a `YYYY-MM-DD` date (CLI value parser).
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| format!("invalid date '{s}' (expected YYYY-MM-DD): {e}"))
}

/// Anything that can produce a feature collection for a query.
pub trait EventSource {
    /// Fetch the events matching `params`.
    ///
    /// # Errors
    ///
    /// Returns an error if the events cannot be retrieved or parsed.
    fn fetch_events(&self, params: &QueryParams) -> Result<FeatureCollection, QuakemapError>;
}

/// Client for the USGS earthquake API.
pub struct UsgsClient {
    client: Client,
    endpoint: String,
}

impl UsgsClient {
    /// Create a client for the given query endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, QuakemapError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl EventSource for UsgsClient {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    fn fetch_events(&self, params: &QueryParams) -> Result<FeatureCollection, QuakemapError> {
        params.validate()?;
        let url = params.query_url(&self.endpoint);

        debug!("fetching events from {}", url);

        let response = self.client.get(&url).send()?;

        // Check status before parsing
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(QuakemapError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let feed: FeatureCollection = response.json()?;
        feed.validate()?;

        debug!("fetched {} events", feed.features.len());
        Ok(feed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Answer one request on a local port with a canned HTTP response and
    /// return the query endpoint pointing at it.
    fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}/query")
    }

    #[test]
    fn test_query_url() {
        let params = QueryParams::default();
        assert_eq!(
            params.query_url(USGS_QUERY_URL),
            "https://earthquake.usgs.gov/fdsnws/event/1/query?format=geojson\
             &starttime=2020-01-20&endtime=2020-01-30&minmagnitude=2.5"
        );
    }

    #[test]
    fn test_whole_magnitude_in_url() {
        let params = QueryParams {
            min_magnitude: 4.0,
            ..QueryParams::default()
        };
        assert!(params.query_url("http://x").ends_with("&minmagnitude=4"));
    }

    #[test]
    fn test_validate() {
        assert!(QueryParams::default().validate().is_ok());

        let reversed = QueryParams {
            start: parse_date("2020-02-01").unwrap(),
            ..QueryParams::default()
        };
        assert!(matches!(
            reversed.validate(),
            Err(QuakemapError::InvalidQuery(_))
        ));

        let nan = QueryParams {
            min_magnitude: f64::NAN,
            ..QueryParams::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_parse_date() {
        let d = parse_date("2020-01-20").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2020, 1, 20).unwrap());
        assert!(parse_date("20/01/2020").is_err());
    }

    #[test]
    fn test_invalid_query_fails_before_request() {
        let client = UsgsClient::new("http://127.0.0.1:9/query").unwrap();
        let params = QueryParams {
            start: parse_date("2021-01-01").unwrap(),
            ..QueryParams::default()
        };
        assert!(matches!(
            client.fetch_events(&params),
            Err(QuakemapError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_error_status_maps_to_api_error() {
        let endpoint = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\n\
             Content-Length: 11\r\n\
             Connection: close\r\n\r\n\
             unavailable",
        );
        let client = UsgsClient::new(endpoint).unwrap();

        match client.fetch_events(&QueryParams::default()) {
            Err(QuakemapError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "unavailable");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_json_body_is_an_error() {
        let endpoint = serve_once(
            "HTTP/1.1 200 OK\r\n\
             Content-Type: application/json\r\n\
             Content-Length: 8\r\n\
             Connection: close\r\n\r\n\
             not json",
        );
        let client = UsgsClient::new(endpoint).unwrap();

        assert!(matches!(
            client.fetch_events(&QueryParams::default()),
            Err(QuakemapError::Http(_))
        ));
    }

    #[test]
    fn test_unreachable_endpoint_is_an_error() {
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let client = UsgsClient::new(format!("http://{addr}/query")).unwrap();

        assert!(matches!(
            client.fetch_events(&QueryParams::default()),
            Err(QuakemapError::Http(_))
        ));
    }
}
