use chrono::DateTime;
use config_manager::SystemConfig;
use gas_core::PriceFetcher;
use mockito::Matcher;
use price_client::{PriceClient, PriceClientError, PricePointSource, PriceResolver};
use rust_decimal_macros::dec;

fn price_config(url: &str, api_key: &str) -> config_manager::PriceConfig {
    let mut config = SystemConfig::default().price;
    config.api_base_url = url.to_string();
    config.api_key = api_key.to_string();
    config
}

#[tokio::test]
async fn resolver_formats_window_and_reads_first_point() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/prices/historical")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("symbol".into(), "ETH".into()),
            Matcher::UrlEncoded("startTime".into(), "2023-11-14T22:13:20.000Z".into()),
            Matcher::UrlEncoded("endTime".into(), "2023-11-14T23:13:20.000Z".into()),
            Matcher::UrlEncoded("interval".into(), "1h".into()),
        ]))
        .match_header("x-api-key", "price-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data": [{"value": "2045.17", "timestamp": 1700000000000}, {"value": 2050.0}]}"#)
        .create_async()
        .await;

    let resolver = PriceResolver::from_config(&price_config(&server.url(), "price-key")).unwrap();
    let timestamp = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();

    assert_eq!(
        resolver.fetch_historical_price(timestamp).await,
        Some(dec!(2045.17))
    );

    mock.assert_async().await;
}

#[tokio::test]
async fn resolver_treats_failures_as_absent() {
    let bodies = [
        (500, "internal error"),
        (200, "not json"),
        (200, r#"{"data": []}"#),
        (200, r#"{"data": null}"#),
        (200, "{}"),
    ];

    for (status, body) in bodies {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/prices/historical")
            .match_query(Matcher::Any)
            .with_status(status)
            .with_body(body)
            .create_async()
            .await;

        let resolver = PriceResolver::from_config(&price_config(&server.url(), "")).unwrap();
        let timestamp = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();

        assert_eq!(
            resolver.fetch_historical_price(timestamp).await,
            None,
            "status {status} body {body}"
        );
    }
}

#[tokio::test]
async fn client_surfaces_rate_limit() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/prices/historical")
        .match_query(Matcher::Any)
        .with_status(429)
        .create_async()
        .await;

    let client = PriceClient::new(&price_config(&server.url(), "")).unwrap();
    let resolver = PriceResolver::new(client, "ETH");
    let request = resolver.request_for(DateTime::from_timestamp_millis(0).unwrap());

    let err = resolver.source().fetch_price_points(&request).await.unwrap_err();
    assert!(matches!(err, PriceClientError::RateLimit));
}
