//! Shared test helpers for driving XunleiClient against a mock control panel.

use crate::client::tasks::task_filters;
use crate::client::{GATEWAY_PREFIX, XunleiClient};
use crate::config::ClientConfig;
use crate::types::TaskPhase;
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Token the mock entry page hands out
pub(crate) const TEST_TOKEN: &str = "tok";
/// Device id the mock panel reports
pub(crate) const TEST_DEVICE: &str = "dev1";
/// Id of the default root folder
pub(crate) const ROOT_FOLDER_ID: &str = "root-id";

/// Path of an API call under the gateway prefix
pub(crate) fn api_path(p: &str) -> String {
    format!("{GATEWAY_PREFIX}{p}")
}

/// Entry page embedding the given token
pub(crate) fn token_page(token: &str) -> String {
    format!(
        "<html><head><script>function uiauth(value){{ return \"{}\" }}</script></head></html>",
        token
    )
}

/// Config pointing at the mock server
pub(crate) fn test_config(server: &MockServer) -> ClientConfig {
    let addr = server.address();
    ClientConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        request_timeout: Duration::from_secs(5),
        resource_timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

/// Client for the mock server, with no requests made yet
pub(crate) fn offline_client(server: &MockServer) -> XunleiClient {
    XunleiClient::new(test_config(server)).unwrap()
}

pub(crate) async fn mount_token(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(api_path("/")))
        .respond_with(ResponseTemplate::new(200).set_body_string(token_page(TEST_TOKEN)))
        .mount(server)
        .await;
}

pub(crate) async fn mount_device(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(api_path("/device/info/watch")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "target": TEST_DEVICE })))
        .mount(server)
        .await;
}

/// Mount the folder listing with `(id, name)` pairs
pub(crate) async fn mount_folders(server: &MockServer, folders: &[(&str, &str)]) {
    let files: Vec<Value> = folders
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name, "kind": "drive#folder" }))
        .collect();
    Mock::given(method("GET"))
        .and(path(api_path("/drive/v1/files")))
        .and(query_param("space", TEST_DEVICE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": files })))
        .mount(server)
        .await;
}

/// Mount a single-page task listing for the given phases
pub(crate) async fn mount_tasks(server: &MockServer, phases: &[TaskPhase], tasks: Value) {
    Mock::given(method("GET"))
        .and(path(api_path("/drive/v1/tasks")))
        .and(query_param("filters", task_filters(phases)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "tasks": tasks, "next_page_token": "" })),
        )
        .mount(server)
        .await;
}

/// Token, device and a single `downloads` root folder
pub(crate) async fn mount_panel(server: &MockServer) {
    mount_token(server).await;
    mount_device(server).await;
    mount_folders(server, &[(ROOT_FOLDER_ID, "downloads")]).await;
}

/// Empty completed and uncompleted listings
pub(crate) async fn mount_no_tasks(server: &MockServer) {
    mount_tasks(server, &[TaskPhase::Complete], json!([])).await;
    mount_tasks(server, &TaskPhase::UNCOMPLETED, json!([])).await;
}

/// Resource listing returning the given `resources` array
pub(crate) async fn mount_resources(server: &MockServer, resources: Value) {
    Mock::given(method("POST"))
        .and(path(api_path("/drive/v1/resource/list")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "list": { "resources": resources } })),
        )
        .mount(server)
        .await;
}

/// A single 1 GiB file resource named `name`
pub(crate) fn single_file(name: &str) -> Value {
    json!([{
        "name": name,
        "file_count": 1,
        "file_size": "1073741824",
        "file_index": 0,
        "is_dir": false
    }])
}

/// Client connected to a mock panel with the default mounts
pub(crate) async fn connected_client(server: &MockServer) -> XunleiClient {
    mount_panel(server).await;
    XunleiClient::connect(test_config(server)).await.unwrap()
}

/// JSON bodies of every request the server saw on `p`
pub(crate) async fn request_bodies(server: &MockServer, p: &str) -> Vec<Value> {
    let full = api_path(p);
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == full && r.method.as_str() == "POST")
        .map(|r| r.body_json::<Value>().unwrap())
        .collect()
}

/// Number of requests the server saw on `p`
pub(crate) async fn request_count(server: &MockServer, p: &str) -> usize {
    let full = api_path(p);
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == full)
        .count()
}
