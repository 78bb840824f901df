/*
[INPUT]:  Mock HTTP responses
[OUTPUT]: Test results for client construction and the decode protocol
[POS]:    Integration tests - HTTP client
[UPDATE]: When client construction or decoding changes
*/

mod common;

use std::sync::Arc;

use common::{
    CountingTransport, Instrument, Instruments, mock_client, mock_config, mock_token,
    setup_mock_server,
};
use oanda_adapter::{ApiError, Client, ClientConfig, Environment, OandaError, Transport};
use reqwest::Method;
use rstest::rstest;
use tokio_test::assert_ok;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[rstest]
#[case(Environment::FxPractice)]
#[case(Environment::FxTrade)]
fn test_empty_token_fails_without_network(#[case] env: Environment) {
    let transport = Arc::new(CountingTransport::default());
    let shared: Arc<dyn Transport> = transport.clone();

    let result = match env {
        Environment::FxPractice => {
            Client::fx_practice_with_config("", ClientConfig::default(), Some(shared))
        }
        _ => Client::fx_trade_with_config("", ClientConfig::default(), Some(shared)),
    };

    let err = result.unwrap_err();
    assert!(err.is_config_error(), "unexpected error: {err:?}");
    assert_eq!(transport.calls(), 0);
}

#[test]
fn test_token_clients_target_environment_hosts() {
    let practice = assert_ok!(Client::fx_practice(&mock_token()));
    let live = assert_ok!(Client::fx_trade(&mock_token()));

    let request = assert_ok!(practice.build_request(Method::GET, "/v1/accounts", None));
    assert_eq!(
        assert_ok!(request.url()).as_str(),
        "https://api-fxpractice.oanda.com/v1/accounts"
    );

    let request = assert_ok!(live.build_request(Method::GET, "/v1/accounts", None));
    assert_eq!(
        assert_ok!(request.url()).as_str(),
        "https://api-fxtrade.oanda.com/v1/accounts"
    );
    assert_eq!(
        request.header("authorization"),
        Some(format!("Bearer {}", mock_token()).as_str())
    );
}

#[test]
fn test_clients_share_explicit_transport() {
    let transport: Arc<dyn Transport> = Arc::new(CountingTransport::default());
    let practice = assert_ok!(Client::fx_practice_with_config(
        &mock_token(),
        ClientConfig::default(),
        Some(transport.clone()),
    ));
    let live = assert_ok!(Client::fx_trade_with_config(
        &mock_token(),
        ClientConfig::default(),
        Some(transport.clone()),
    ));

    assert!(Arc::ptr_eq(practice.transport(), &transport));
    assert!(Arc::ptr_eq(live.transport(), &transport));
}

#[tokio::test]
async fn test_get_and_decode_success() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/v1/instruments"))
        .and(query_param("accountId", "12345"))
        .and(header("authorization", format!("Bearer {}", mock_token()).as_str()))
        .and(header("x-accept-datetime-format", "RFC3339"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "instruments": [
                {"instrument": "EUR_USD", "displayName": "EUR/USD"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let instruments: Instruments = assert_ok!(
        client
            .get_and_decode("/v1/instruments?accountId=12345")
            .await
    );

    assert_eq!(
        instruments.instruments,
        vec![Instrument {
            instrument: "EUR_USD".to_string(),
            display_name: "EUR/USD".to_string(),
        }]
    );

    let received = server.received_requests().await.expect("recording enabled");
    assert!(!received[0].headers.contains_key("content-type"));
}

#[tokio::test]
async fn test_business_error_in_success_response() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/v1/instruments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 123,
            "message": "x",
            "moreInfo": "y"
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let err = client
        .get_and_decode::<Instruments>("/v1/instruments")
        .await
        .unwrap_err();

    assert_eq!(
        err.api_error(),
        Some(&ApiError {
            code: 123,
            message: "x".to_string(),
            more_info: "y".to_string(),
        })
    );
    let rendered = err.to_string();
    assert!(rendered.contains("123"));
    assert!(rendered.contains("Message: x"));
    assert!(rendered.contains("MoreInfo: y"));
}

#[tokio::test]
async fn test_business_error_with_http_error_status() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/v1/accounts/999"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": 1,
            "message": "Invalid account",
            "moreInfo": "http://developer.oanda.com/docs/v1/troubleshooting"
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let err = client
        .get_and_decode::<ApiError>("/v1/accounts/999")
        .await
        .unwrap_err();

    assert!(err.is_api_error());
    assert_eq!(err.api_error().map(|e| e.code), Some(1));
}

#[rstest]
#[case("not json at all")]
#[case(r#"{"code":"abc"}"#)]
#[case(r#"{"instruments": 5}"#)]
#[tokio::test]
async fn test_malformed_body_is_decode_error(#[case] body: &str) {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/v1/instruments"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let err = client
        .get_and_decode::<Instruments>("/v1/instruments")
        .await
        .unwrap_err();

    assert!(matches!(err, OandaError::Decode(_)), "unexpected error: {err:?}");
}

#[rstest]
#[case("[]")]
#[case(r#"[7,"x","y"]"#)]
#[tokio::test]
async fn test_non_object_envelope_is_decode_error(#[case] body: &str) {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/v1/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let err = client
        .get_and_decode::<ApiError>("/v1/accounts")
        .await
        .unwrap_err();

    assert!(matches!(err, OandaError::Decode(_)), "unexpected error: {err:?}");
    assert!(!err.is_api_error());
}

#[tokio::test]
async fn test_error_status_without_envelope() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/v1/instruments"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let err = client
        .get_and_decode::<Instruments>("/v1/instruments")
        .await
        .unwrap_err();

    match err {
        OandaError::Status { status, body } => {
            assert_eq!(status, 502);
            assert!(body.contains("bad gateway"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_request_and_decode_posts_form() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts/12345/orders"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("instrument=EUR_USD&units=10&side=buy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "instrument": "EUR_USD",
            "time": "2014-03-01T12:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let envelope: ApiError = assert_ok!(
        client
            .request_and_decode(
                Method::POST,
                "/v1/accounts/12345/orders",
                &[("instrument", "EUR_USD"), ("units", "10"), ("side", "buy")],
            )
            .await
    );
    assert_eq!(envelope, ApiError::default());
}

#[tokio::test]
async fn test_override_url_bypasses_environment_host() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/v1/instruments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "instruments": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    // No host override: the absolute URL alone routes to the mock server.
    let client = assert_ok!(
        Client::builder(Environment::Sandbox)
            .token(mock_token())
            .build()
    );
    let url = format!("{}/v1/instruments", server.uri());
    let instruments: Instruments = assert_ok!(client.get_and_decode(&url).await);
    assert!(instruments.instruments.is_empty());
}

#[tokio::test]
async fn test_transport_error_is_surfaced() {
    let config = ClientConfig::default().with_host_override("127.0.0.1:1");
    let client = assert_ok!(
        Client::builder(Environment::Sandbox)
            .token(mock_token())
            .config(config)
            .build()
    );

    let err = client
        .get_and_decode::<Instruments>("/v1/instruments")
        .await
        .unwrap_err();
    assert!(matches!(err, OandaError::Http(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_cancel_is_gated_on_transport_capability() {
    let server = setup_mock_server().await;

    let offline: Arc<dyn Transport> = Arc::new(CountingTransport::default());
    let client = assert_ok!(
        Client::builder(Environment::Sandbox)
            .token(mock_token())
            .config(mock_config(&server))
            .transport(offline)
            .build()
    );
    let request = assert_ok!(client.build_request(Method::GET, "/v1/prices", None));
    client.cancel(&request);
    assert!(!request.is_cancelled());

    let client = mock_client(&server);
    let request = assert_ok!(client.build_request(Method::GET, "/v1/prices", None));
    client.cancel(&request);
    assert!(request.is_cancelled());

    let err = client.execute(&request).await.unwrap_err();
    assert!(matches!(err, OandaError::Cancelled));
}
