use daybreak_signals::{MarketApi, MarketSentiment, NewsApi};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn market_snapshot_buckets_positive_change() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/global"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "active_cryptocurrencies": 17000,
                "market_cap_change_percentage_24h_usd": 4.2
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = MarketApi::new(Some(&server.uri())).unwrap();
    let snapshot = api.global_snapshot().await.unwrap();

    assert_eq!(snapshot.change_24h, 4.2);
    assert_eq!(snapshot.sentiment, MarketSentiment::Bullish);
}

#[tokio::test]
async fn market_server_error_surfaces_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/global"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let api = MarketApi::new(Some(&server.uri())).unwrap();
    let err = api.global_snapshot().await.unwrap_err();
    assert!(err.to_string().contains("500"), "got: {err}");
}

#[tokio::test]
async fn headlines_are_capped_and_keep_feed_order() {
    let server = MockServer::start().await;
    let results: Vec<_> = (1..=7)
        .map(|i| json!({"title": format!("headline {i}"), "kind": "news"}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/posts/"))
        .and(query_param("public", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": results })))
        .expect(1)
        .mount(&server)
        .await;

    let api = NewsApi::new(Some(&server.uri()), None).unwrap();
    let headlines = api.top_headlines(5).await.unwrap();

    assert_eq!(headlines.len(), 5);
    assert_eq!(headlines[0], "headline 1");
    assert_eq!(headlines[4], "headline 5");
}

#[tokio::test]
async fn auth_token_rides_along_as_query_param() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/"))
        .and(query_param("public", "true"))
        .and(query_param("auth_token", "cp-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"title": "paid tier headline"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = NewsApi::new(Some(&server.uri()), Some("cp-secret".to_string())).unwrap();
    let headlines = api.top_headlines(5).await.unwrap();
    assert_eq!(headlines, vec!["paid tier headline".to_string()]);
}

#[tokio::test]
async fn missing_results_field_means_no_headlines() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let api = NewsApi::new(Some(&server.uri()), None).unwrap();
    let headlines = api.top_headlines(5).await.unwrap();
    assert!(headlines.is_empty());

    // Blank titles are dropped too, not rendered as empty bullets.
    let server2 = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"title": "  "}, {"kind": "media"}, {"title": "real one"}]
        })))
        .mount(&server2)
        .await;

    let api2 = NewsApi::new(Some(&server2.uri()), None).unwrap();
    let headlines2 = api2.top_headlines(5).await.unwrap();
    assert_eq!(headlines2, vec!["real one".to_string()]);
}
