use chrono::{Duration, Utc};
use market_data_collector::{
    models::{request_params::BarsRequestParams, time_span::TimeSpan, timeframe::TimeFrame},
    providers::{
        DataProvider,
        alpaca_rest::{AlpacaConfig, AlpacaProvider},
    },
};
use serial_test::serial;

#[tokio::test]
#[serial]
#[ignore]
async fn test_alpaca_provider_fetch_bars() {
    // This test requires APCA_API_KEY_ID and APCA_API_SECRET_KEY to be set in the environment.
    if std::env::var("APCA_API_KEY_ID").is_err() || std::env::var("APCA_API_SECRET_KEY").is_err() {
        println!("Skipping test_alpaca_provider_fetch_bars: API keys not set.");
        return;
    }

    let provider =
        AlpacaProvider::new(AlpacaConfig::default()).expect("Failed to create AlpacaProvider");

    let end = (Utc::now() - Duration::days(1)).fixed_offset();
    let params = BarsRequestParams {
        symbol: "AAPL".to_string(),
        timeframe: TimeFrame::one_minute(),
        span: TimeSpan::new(end - Duration::days(10), end),
    };

    let result = provider.fetch_bars(params.clone()).await;
    assert!(result.is_ok(), "fetch_bars returned an error: {:?}", result.err());

    let bars = result.unwrap();
    assert!(!bars.is_empty(), "Expected to fetch at least one bar for AAPL");

    // Sorted ascending and inside the requested window.
    assert!(
        bars.as_slice()
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp)
    );
    let span = bars.time_span().unwrap();
    assert!(params.span.contains(&span.start));
    assert!(params.span.contains(&span.end));
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_alpaca_provider_rejects_bad_credentials() {
    let provider = AlpacaProvider::with_credentials(
        "not-a-key".to_string().into(),
        "not-a-secret".to_string().into(),
        AlpacaConfig {
            retry_limit: 0,
            ..AlpacaConfig::default()
        },
    )
    .expect("Failed to create AlpacaProvider");

    let end = (Utc::now() - Duration::days(1)).fixed_offset();
    let params = BarsRequestParams {
        symbol: "AAPL".to_string(),
        timeframe: TimeFrame::one_minute(),
        span: TimeSpan::new(end - Duration::days(1), end),
    };

    let err = provider.fetch_bars(params).await.unwrap_err();
    assert!(!err.is_transient(), "unexpected transient error: {err}");
}
