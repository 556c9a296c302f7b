//! Dashboard flows end to end against one mocked backend.

use std::sync::Arc;

use serde_json::json;
use tanzania_social_auth::MockSessionProvider;
use tanzania_social_core::Tier;
use tanzania_social_gateway::{
    Dashboard, DashboardError, FirestoreConfig, FirestoreHistory, FunctionsConfig, GatewayError,
    NoopHistory, RequestGateway,
};
use wiremock::matchers::{any, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dashboard_for(server: &MockServer) -> Dashboard {
    let session = Arc::new(MockSessionProvider::signed_in("uid-42", "tok123"));
    let functions = FunctionsConfig::new("us-central1", "tz-social").with_base_url(server.uri());
    let firestore = FirestoreConfig {
        base_url: server.uri(),
        ..FirestoreConfig::new("tz-social")
    };

    let gateway = RequestGateway::new(functions, session.clone());
    let history = Arc::new(FirestoreHistory::new(firestore, session));
    Dashboard::new(gateway, history)
}

fn search_body() -> serde_json::Value {
    json!({
        "predictions": [{
            "deploymentResourceId": "dep-1",
            "content": "Community radio drove malaria net uptake in Mtwara.",
            "confidence": 0.86,
            "metadata": { "source": "radio", "timestamp": "2024-02-11T08:30:00Z" }
        }]
    })
}

#[tokio::test]
async fn search_decodes_and_records_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ragQuery"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("/searchHistory/uid-42$"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path_regex("/searchHistory/uid-42$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&server);
    let results = dashboard.search("malaria nets").await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source, "radio");
    assert_eq!(results[0].tier(), Tier::High);
}

#[tokio::test]
async fn search_survives_history_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ragQuery"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .mount(&server)
        .await;
    Mock::given(path_regex("/searchHistory/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&server);
    let results = dashboard.search("malaria nets").await.unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn blank_query_makes_no_call() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&server);
    assert!(matches!(
        dashboard.search("   ").await,
        Err(DashboardError::EmptyQuery)
    ));
}

#[tokio::test]
async fn invalid_url_makes_no_call() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&server);
    for raw in ["ftp://bad.example", "not a url", "instagram.com/p/1"] {
        assert!(matches!(
            dashboard.analyze(raw).await,
            Err(DashboardError::InvalidUrl(_))
        ));
    }
}

#[tokio::test]
async fn analyze_decodes_metrics() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/analyzeSocialContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metrics": { "likes": 1200, "comments": 85, "shares": 40 },
            "engagementRate": 0.55,
            "sentiment": { "label": "Positive", "confidence": 0.87 }
        })))
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&server);
    let analysis = dashboard
        .analyze("https://www.instagram.com/p/Cx1yZ/")
        .await
        .unwrap();

    assert_eq!(analysis.metrics.likes, 1200);
    assert_eq!(analysis.engagement_tier(), Tier::Medium);
    assert_eq!(analysis.sentiment.tier(), Tier::High);
}

#[tokio::test]
async fn recommendations_accept_wrapped_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/getRecommendations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recommendations": [
                { "id": "r1", "type": "video", "title": "Short clips", "description": "d", "effectiveness": 85 }
            ]
        })))
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&server);
    let recs = dashboard.recommendations().await.unwrap();
    assert_eq!(recs.len(), 1);
    assert!(recs[0].is_video());
    assert_eq!(recs[0].tier(), Tier::High);
}

#[tokio::test]
async fn unexpected_shape_is_shape_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/getRecommendations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": 3 })))
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&server);
    assert!(matches!(
        dashboard.recommendations().await,
        Err(DashboardError::Shape(_))
    ));
}

#[tokio::test]
async fn gateway_errors_pass_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/getRecommendations"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "error": { "message": "quota" } })),
        )
        .mount(&server)
        .await;

    let dashboard = dashboard_for(&server);
    match dashboard.recommendations().await {
        Err(DashboardError::Gateway(GatewayError::RemoteError(msg))) => assert_eq!(msg, "quota"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn noop_history_records_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ragQuery"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .mount(&server)
        .await;

    let session = Arc::new(MockSessionProvider::signed_in("uid-42", "tok123"));
    let functions = FunctionsConfig::default().with_base_url(server.uri());
    let dashboard = Dashboard::new(
        RequestGateway::new(functions, session),
        Arc::new(NoopHistory::new()),
    );

    dashboard.search("elimu").await.unwrap();
    assert!(dashboard.history().await.unwrap().is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
