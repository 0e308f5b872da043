//! End-to-end orchestrator behavior against a mock dashboard.

mod support;

use edgeward::deploy::{deploy_site, DeployRequest, DeployStage};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{client, fast_settings, missing_edge_body, provisioned_edge_body};

fn request(site: &str, service_id: &str) -> DeployRequest {
    DeployRequest {
        site: site.into(),
        service_id: service_id.into(),
        activate: true,
        percent: 100,
    }
}

#[tokio::test]
async fn existing_site_is_not_recreated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/corps/acme/sites/siteA/edgeDeployment"))
        .respond_with(ResponseTemplate::new(404).set_body_string(missing_edge_body()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/corps/acme/sites/siteA"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"name": "siteA"}"#))
        .mount(&server)
        .await;

    // A site that already exists must never be re-created.
    Mock::given(method("POST"))
        .and(path("/corps/acme/sites"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/corps/acme/sites/siteA/edgeDeployment"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/corps/acme/sites/siteA/edgeDeployment/SID1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let settings = fast_settings(&server.uri());
    let report = deploy_site(&client(&server.uri()), &settings, &request("siteA", "SID1")).await;

    assert!(report.mapped(), "report: {report:?}");
    assert_eq!(report.stage, DeployStage::Mapped);
}

#[tokio::test]
async fn absent_site_is_created_with_mirrored_display_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/corps/acme/sites/siteB/edgeDeployment"))
        .respond_with(ResponseTemplate::new(404).set_body_string(missing_edge_body()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/corps/acme/sites/siteB"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"message": "Site not found"}"#),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/corps/acme/sites"))
        .and(body_json(json!({
            "name": "siteB",
            "displayName": "siteB",
            "agentLevel": "log",
            "blockHTTPCode": 406,
            "blockDurationSeconds": 86400,
            "blockRedirectURL": ""
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/corps/acme/sites/siteB/edgeDeployment"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/corps/acme/sites/siteB/edgeDeployment/SID2"))
        .and(body_json(json!({"activateVersion": true, "percentEnabled": 100})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let settings = fast_settings(&server.uri());
    let report = deploy_site(&client(&server.uri()), &settings, &request("siteB", "SID2")).await;

    assert!(report.mapped(), "report: {report:?}");
}

#[tokio::test]
async fn provisioned_edge_object_skips_creation_and_site_checks() {
    let server = MockServer::start().await;

    // Probe answers once; with skip_wait there is no propagation polling.
    Mock::given(method("GET"))
        .and(path("/corps/acme/sites/siteC/edgeDeployment"))
        .respond_with(ResponseTemplate::new(200).set_body_string(provisioned_edge_body()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/corps/acme/sites/siteC"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/corps/acme/sites/siteC/edgeDeployment"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/corps/acme/sites/siteC/edgeDeployment/SID3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let settings = fast_settings(&server.uri());
    let report = deploy_site(&client(&server.uri()), &settings, &request("siteC", "SID3")).await;

    assert!(report.mapped(), "report: {report:?}");
}

#[tokio::test]
async fn edge_creation_failure_aborts_before_mapping() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/corps/acme/sites/siteD/edgeDeployment"))
        .respond_with(ResponseTemplate::new(404).set_body_string(missing_edge_body()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/corps/acme/sites/siteD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    // Transient failure on every attempt exhausts the retry ceiling.
    Mock::given(method("PUT"))
        .and(path("/corps/acme/sites/siteD/edgeDeployment"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream broke"))
        .expect(3)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/corps/acme/sites/siteD/edgeDeployment/SID4"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let settings = fast_settings(&server.uri());
    let report = deploy_site(&client(&server.uri()), &settings, &request("siteD", "SID4")).await;

    assert!(!report.mapped());
    assert_eq!(report.stage, DeployStage::SiteEnsured);
    let error = report.error.expect("abort carries the error");
    assert_eq!(error.stage(), "edge object creation");
    assert_eq!(error.status(), Some(500));
}

#[tokio::test]
async fn mapping_retries_once_when_deployment_not_yet_complete() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/corps/acme/sites/siteE/edgeDeployment"))
        .respond_with(ResponseTemplate::new(200).set_body_string(provisioned_edge_body()))
        .mount(&server)
        .await;

    // First bind races the propagation window, second lands.
    Mock::given(method("PUT"))
        .and(path("/corps/acme/sites/siteE/edgeDeployment/SID5"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string(r#"{"message": "edge deployment is not yet complete"}"#),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/corps/acme/sites/siteE/edgeDeployment/SID5"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let settings = fast_settings(&server.uri());
    let report = deploy_site(&client(&server.uri()), &settings, &request("siteE", "SID5")).await;

    assert!(report.mapped(), "report: {report:?}");
}

#[tokio::test]
async fn mapping_gives_up_after_the_single_extra_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/corps/acme/sites/siteF/edgeDeployment"))
        .respond_with(ResponseTemplate::new(200).set_body_string(provisioned_edge_body()))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/corps/acme/sites/siteF/edgeDeployment/SID6"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string(r#"{"message": "edge deployment is not yet complete"}"#),
        )
        .expect(2)
        .mount(&server)
        .await;

    let settings = fast_settings(&server.uri());
    let report = deploy_site(&client(&server.uri()), &settings, &request("siteF", "SID6")).await;

    assert!(!report.mapped());
    let error = report.error.expect("abort carries the error");
    assert_eq!(error.stage(), "service mapping");
    assert_eq!(error.status(), Some(400));
}

#[tokio::test]
async fn unauthorized_site_lookup_gets_exactly_one_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/corps/acme/sites/siteG/edgeDeployment"))
        .respond_with(ResponseTemplate::new(404).set_body_string(missing_edge_body()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/corps/acme/sites/siteG"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"message": "Unauthorized"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let settings = fast_settings(&server.uri());
    let report = deploy_site(&client(&server.uri()), &settings, &request("siteG", "SID7")).await;

    assert!(!report.mapped());
    assert_eq!(report.stage, DeployStage::Start);
    let error = report.error.expect("abort carries the error");
    assert_eq!(error.stage(), "site lookup");
    assert_eq!(error.status(), Some(401));
}

#[tokio::test]
async fn unrecognized_lookup_message_aborts_without_creation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/corps/acme/sites/siteH/edgeDeployment"))
        .respond_with(ResponseTemplate::new(404).set_body_string(missing_edge_body()))
        .mount(&server)
        .await;

    // An unrecognized message on a not-found status is transient, so the
    // lookup burns its full retry budget before aborting.
    Mock::given(method("GET"))
        .and(path("/corps/acme/sites/siteH"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"message": "malformed site name"}"#),
        )
        .expect(3)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/corps/acme/sites"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let settings = fast_settings(&server.uri());
    let report = deploy_site(&client(&server.uri()), &settings, &request("siteH", "SID8")).await;

    assert!(!report.mapped());
    let error = report.error.expect("abort carries the error");
    assert_eq!(error.stage(), "site lookup");
    assert_eq!(error.status(), Some(400));
}
