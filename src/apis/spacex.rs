use crate::app::ports::{HttpClientPort, HttpGetResult};
use crate::constants::PAST_LAUNCHES_PATH;
use crate::error::{EtlError, Result};
use crate::pipeline::ingestion::resolver::{Attributes, ReferenceResolver};
use crate::types::{EntityKind, RawLaunch};
use metrics::counter;
use serde_json::Value;
use std::cell::Cell;
use tracing::{debug, info, instrument};

/// Read-only client for the SpaceX v4 REST API
pub struct SpacexApi<'a> {
    http: &'a dyn HttpClientPort,
    base_url: String,
    requests: Cell<usize>,
}

impl<'a> SpacexApi<'a> {
    pub fn new(http: &'a dyn HttpClientPort, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            requests: Cell::new(0),
        }
    }

    /// Number of HTTP requests issued so far
    pub fn request_count(&self) -> usize {
        self.requests.get()
    }

    pub fn past_launches_url(&self) -> String {
        format!("{}/{}", self.base_url, PAST_LAUNCHES_PATH)
    }

    pub fn entity_url(&self, kind: EntityKind, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, kind.path(), id)
    }

    fn get(&self, url: &str) -> Result<HttpGetResult> {
        self.requests.set(self.requests.get() + 1);
        self.http
            .get(url)
            .map_err(|reason| EtlError::RemoteUnavailable {
                url: url.to_string(),
                reason,
            })
    }

    fn decode(url: &str, resp: &HttpGetResult) -> Result<Value> {
        if !resp.is_json() {
            return Err(EtlError::malformed(
                url.to_string(),
                format!("expected a JSON body, got '{}'", resp.content_type),
            ));
        }
        serde_json::from_slice(&resp.bytes)
            .map_err(|e| EtlError::malformed(url.to_string(), format!("invalid JSON body: {e}")))
    }

    /// Fetch the full collection of past launches
    #[instrument(skip(self))]
    pub fn get_past_launches(&self) -> Result<Vec<RawLaunch>> {
        let url = self.past_launches_url();
        debug!("Fetching {}", url);

        let resp = self.get(&url)?;
        if !resp.is_success() {
            return Err(EtlError::RemoteUnavailable {
                url,
                reason: format!("unexpected status {}", resp.status),
            });
        }

        let body = Self::decode(&url, &resp)?;
        let launches: Vec<RawLaunch> = serde_json::from_value(body)
            .map_err(|e| EtlError::malformed("launch collection", e.to_string()))?;

        info!("Fetched {} past launches", launches.len());
        Ok(launches)
    }
}

impl ReferenceResolver for SpacexApi<'_> {
    fn resolve(&self, kind: EntityKind, id: &str) -> Result<Attributes> {
        if id.trim().is_empty() {
            return Err(EtlError::NotFound {
                kind,
                id: id.to_string(),
            });
        }

        let url = self.entity_url(kind, id);
        debug!(%kind, id, "Resolving reference");
        counter!("launch_etl_resolver_requests_total", "kind" => kind.as_str()).increment(1);

        let resp = self.get(&url)?;
        match resp.status {
            404 => Err(EtlError::NotFound {
                kind,
                id: id.to_string(),
            }),
            _ if resp.is_success() => {
                let body = Self::decode(&url, &resp)?;
                Attributes::from_value(kind, id, body)
            }
            status => Err(EtlError::RemoteUnavailable {
                url,
                reason: format!("unexpected status {status}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    struct CannedHttp {
        responses: HashMap<String, (u16, String)>,
        content_type: &'static str,
    }

    impl CannedHttp {
        fn new(entries: &[(&str, u16, Value)]) -> Self {
            Self {
                responses: entries
                    .iter()
                    .map(|(url, status, body)| (url.to_string(), (*status, body.to_string())))
                    .collect(),
                content_type: "application/json; charset=utf-8",
            }
        }

        fn with_content_type(mut self, content_type: &'static str) -> Self {
            self.content_type = content_type;
            self
        }
    }

    impl HttpClientPort for CannedHttp {
        fn get(&self, url: &str) -> std::result::Result<HttpGetResult, String> {
            let (status, body) = self
                .responses
                .get(url)
                .cloned()
                .ok_or_else(|| format!("connection refused: {url}"))?;
            Ok(HttpGetResult {
                status,
                bytes: body.into_bytes(),
                content_type: self.content_type.to_string(),
            })
        }
    }

    const BASE: &str = "http://spacex.test/v4";

    #[test]
    fn test_urls() {
        let http = CannedHttp::new(&[]);
        let api = SpacexApi::new(&http, "http://spacex.test/v4/");
        assert_eq!(api.past_launches_url(), "http://spacex.test/v4/launches/past");
        assert_eq!(
            api.entity_url(EntityKind::Launchpad, "abc"),
            "http://spacex.test/v4/launchpads/abc"
        );
        assert_eq!(
            api.entity_url(EntityKind::Core, "c1"),
            "http://spacex.test/v4/cores/c1"
        );
    }

    #[test]
    fn test_resolve_success() {
        let http = CannedHttp::new(&[(
            "http://spacex.test/v4/rockets/f9",
            200,
            json!({ "name": "Falcon 9", "active": true }),
        )]);
        let api = SpacexApi::new(&http, BASE);

        let attrs = api.resolve(EntityKind::Rocket, "f9").unwrap();
        assert_eq!(attrs.required_str("name").unwrap(), "Falcon 9");
        assert_eq!(api.request_count(), 1);
    }

    #[test]
    fn test_resolve_rejects_non_json_body() {
        let http = CannedHttp::new(&[(
            "http://spacex.test/v4/rockets/f9",
            200,
            json!("<html>maintenance</html>"),
        )])
        .with_content_type("text/html");
        let api = SpacexApi::new(&http, BASE);

        match api.resolve(EntityKind::Rocket, "f9").unwrap_err() {
            EtlError::MalformedResponse { context, detail } => {
                assert_eq!(context, "http://spacex.test/v4/rockets/f9");
                assert!(detail.contains("text/html"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_content_type_is_accepted() {
        let http = CannedHttp::new(&[(
            "http://spacex.test/v4/rockets/f9",
            200,
            json!({ "name": "Falcon 9" }),
        )])
        .with_content_type("");
        let api = SpacexApi::new(&http, BASE);
        assert!(api.resolve(EntityKind::Rocket, "f9").is_ok());
    }

    #[test]
    fn test_resolve_not_found() {
        let http = CannedHttp::new(&[(
            "http://spacex.test/v4/cores/nope",
            404,
            json!("Not Found"),
        )]);
        let api = SpacexApi::new(&http, BASE);

        let err = api.resolve(EntityKind::Core, "nope").unwrap_err();
        assert!(matches!(err, EtlError::NotFound { kind: EntityKind::Core, .. }));
    }

    #[test]
    fn test_resolve_transport_failure() {
        let http = CannedHttp::new(&[]);
        let api = SpacexApi::new(&http, BASE);

        let err = api.resolve(EntityKind::Payload, "p1").unwrap_err();
        match err {
            EtlError::RemoteUnavailable { url, reason } => {
                assert_eq!(url, "http://spacex.test/v4/payloads/p1");
                assert!(reason.contains("connection refused"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_server_error() {
        let http = CannedHttp::new(&[(
            "http://spacex.test/v4/rockets/f9",
            503,
            json!({ "error": "busy" }),
        )]);
        let api = SpacexApi::new(&http, BASE);
        assert!(matches!(
            api.resolve(EntityKind::Rocket, "f9"),
            Err(EtlError::RemoteUnavailable { .. })
        ));
    }

    #[test]
    fn test_resolve_empty_id_skips_request() {
        let http = CannedHttp::new(&[]);
        let api = SpacexApi::new(&http, BASE);
        assert!(api.resolve(EntityKind::Rocket, "").is_err());
        assert_eq!(api.request_count(), 0);
    }

    #[test]
    fn test_get_past_launches() {
        let http = CannedHttp::new(&[(
            "http://spacex.test/v4/launches/past",
            200,
            json!([{
                "flight_number": 1,
                "date_utc": "2006-03-24T22:30:00.000Z",
                "rocket": "f1",
                "launchpad": "kwaj",
                "payloads": ["p1"],
                "cores": [{ "core": "c1", "flight": 1, "gridfins": false, "legs": false,
                            "reused": false, "landing_success": null,
                            "landing_type": null, "landpad": null }]
            }]),
        )]);
        let api = SpacexApi::new(&http, BASE);

        let launches = api.get_past_launches().unwrap();
        assert_eq!(launches.len(), 1);
        assert_eq!(launches[0].rocket.as_deref(), Some("f1"));
    }

    #[test]
    fn test_get_past_launches_malformed() {
        let http = CannedHttp::new(&[(
            "http://spacex.test/v4/launches/past",
            200,
            json!([{ "date_utc": "2006-03-24T22:30:00.000Z" }]),
        )]);
        let api = SpacexApi::new(&http, BASE);
        assert!(matches!(
            api.get_past_launches(),
            Err(EtlError::MalformedResponse { .. })
        ));
    }
}
