use launch_etl::app::ports::{HttpClientPort, HttpGetResult};
use launch_etl::config::Config;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

pub const BASE_URL: &str = "http://spacex.test/v4";

/// Serves canned JSON bodies by URL and records every request
#[derive(Default)]
pub struct FakeSpacexHttp {
    responses: HashMap<String, (u16, String)>,
    pub requests: RefCell<Vec<String>>,
}

impl FakeSpacexHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, body: Value) -> Self {
        self.responses
            .insert(format!("{BASE_URL}/{path}"), (200, body.to_string()));
        self
    }

    pub fn with_status(mut self, path: &str, status: u16, body: Value) -> Self {
        self.responses
            .insert(format!("{BASE_URL}/{path}"), (status, body.to_string()));
        self
    }

    pub fn request_count(&self, prefix: &str) -> usize {
        let prefix = format!("{BASE_URL}/{prefix}");
        self.requests
            .borrow()
            .iter()
            .filter(|url| url.starts_with(&prefix))
            .count()
    }
}

impl HttpClientPort for FakeSpacexHttp {
    fn get(&self, url: &str) -> Result<HttpGetResult, String> {
        self.requests.borrow_mut().push(url.to_string());
        let (status, body) = self
            .responses
            .get(url)
            .cloned()
            .ok_or_else(|| format!("connection refused: {url}"))?;
        Ok(HttpGetResult {
            status,
            bytes: body.into_bytes(),
            content_type: "application/json".into(),
        })
    }
}

pub fn config_in(dir: &Path) -> Config {
    let mut config = Config::default();
    config.api.base_url = BASE_URL.to_string();
    config.output.csv_path = dir.join("dataset_part_1.csv");
    config.output.html_path = dir.join("table1.html");
    config
}

pub fn core(core_id: Option<&str>, landing_success: Option<bool>, landing_type: Option<&str>) -> Value {
    json!({
        "core": core_id,
        "flight": 1,
        "gridfins": core_id.is_some(),
        "legs": core_id.is_some(),
        "reused": false,
        "landing_attempt": landing_success.is_some(),
        "landing_success": landing_success,
        "landing_type": landing_type,
        "landpad": null
    })
}

pub fn launch(flight_number: u32, date_utc: &str, rocket: &str, payloads: &[&str], cores: Vec<Value>) -> Value {
    json!({
        "flight_number": flight_number,
        "name": format!("Mission {flight_number}"),
        "date_utc": date_utc,
        "rocket": rocket,
        "launchpad": "slc40",
        "payloads": payloads,
        "cores": cores
    })
}

pub fn with_entities(http: FakeSpacexHttp) -> FakeSpacexHttp {
    http.with("rockets/f1", json!({ "name": "Falcon 1", "stages": 2 }))
        .with("rockets/f9", json!({ "name": "Falcon 9", "stages": 2 }))
        .with(
            "launchpads/slc40",
            json!({
                "name": "CCSFS SLC 40",
                "full_name": "Cape Canaveral Space Force Station Space Launch Complex 40",
                "longitude": -80.577366,
                "latitude": 28.5618571
            }),
        )
        .with("cores/b1049", json!({ "block": 5, "reuse_count": 6, "serial": "B1049" }))
}
