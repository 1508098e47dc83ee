//! Mock control panel built on wiremock

use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xunlei_client::{ClientConfig, GATEWAY_PREFIX, XunleiClient};

pub const DEVICE_ID: &str = "device-001";
pub const ROOT_FOLDER_ID: &str = "folder-root";

pub const COMPLETED_FILTER: &str =
    r#"{"phase":{"in":"PHASE_TYPE_COMPLETE"},"type":{"in":"user#download-url,user#download"}}"#;
pub const UNCOMPLETED_FILTER: &str = r#"{"phase":{"in":"PHASE_TYPE_PENDING,PHASE_TYPE_RUNNING,PHASE_TYPE_PAUSED,PHASE_TYPE_ERROR"},"type":{"in":"user#download-url,user#download"}}"#;

/// Path of an API call under the gateway prefix
pub fn api_path(p: &str) -> String {
    format!("{GATEWAY_PREFIX}{p}")
}

/// A running mock panel plus the config that points at it
pub struct MockPanel {
    pub server: MockServer,
}

impl MockPanel {
    /// Start a panel that hands out a token, a device id and one root folder
    pub async fn start() -> Self {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(api_path("/")))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<html><script>function uiauth(value){ return "live-token" }</script></html>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(api_path("/device/info/watch")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "target": DEVICE_ID })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(api_path("/drive/v1/files")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "files": [{ "id": ROOT_FOLDER_ID, "name": "downloads", "kind": "drive#folder" }]
            })))
            .mount(&server)
            .await;

        Self { server }
    }

    pub fn config(&self) -> ClientConfig {
        let addr = self.server.address();
        ClientConfig {
            host: addr.ip().to_string(),
            port: addr.port(),
            download_root_dir: Some("downloads".to_string()),
            request_timeout: Duration::from_secs(5),
            resource_timeout: Duration::from_secs(5),
            ..Default::default()
        }
    }

    pub async fn connect(&self) -> XunleiClient {
        XunleiClient::connect(self.config())
            .await
            .expect("connect to mock panel")
    }

    /// Serve the given `resources` array for every resource lookup
    pub async fn resources(&self, resources: Value) {
        Mock::given(method("POST"))
            .and(path(api_path("/drive/v1/resource/list")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "list": { "resources": resources } })),
            )
            .mount(&self.server)
            .await;
    }

    /// Serve fixed completed and uncompleted task listings
    pub async fn tasks(&self, completed: Value, uncompleted: Value) {
        for (filter, tasks) in [(COMPLETED_FILTER, completed), (UNCOMPLETED_FILTER, uncompleted)] {
            Mock::given(method("GET"))
                .and(path(api_path("/drive/v1/tasks")))
                .and(query_param("filters", filter))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({ "tasks": tasks, "next_page_token": "" })),
                )
                .mount(&self.server)
                .await;
        }
    }

    /// Accept task creation with the given `HttpStatus`, expecting `calls` requests
    pub async fn task_creation(&self, http_status: i64, calls: u64) {
        Mock::given(method("POST"))
            .and(path(api_path("/drive/v1/task")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "HttpStatus": http_status })))
            .expect(calls)
            .mount(&self.server)
            .await;
    }

    /// JSON bodies of every POST the panel received on `p`
    pub async fn posted(&self, p: &str) -> Vec<Value> {
        let full = api_path(p);
        self.server
            .received_requests()
            .await
            .expect("request recording enabled")
            .into_iter()
            .filter(|r| r.url.path() == full && r.method.as_str() == "POST")
            .map(|r| r.body_json::<Value>().expect("json body"))
            .collect()
    }
}

/// One 1 GiB file resource
pub fn one_gib_file(name: &str) -> Value {
    json!([{
        "name": name,
        "file_count": 1,
        "file_size": "1073741824",
        "file_index": 0,
        "is_dir": false
    }])
}
