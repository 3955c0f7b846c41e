//! Remote data client wire behavior against a mock authority.

use botfleet::{Client, Error, ErrorCategory, NewInstance, RemoteApi};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> Client {
    Client::new(&server.uri()).unwrap()
}

// ============================================================================
// Instances
// ============================================================================

mod instances {
    use super::*;

    #[tokio::test]
    async fn test_list_instances_decodes_integer_flag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instances"))
            .and(query_param("user_id", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "id": 10,
                    "user_id": 1,
                    "country_code": "US",
                    "phone_number": "+15550100",
                    "active": 1,
                    "created_at": 1_700_000_000
                },
                {
                    "id": 11,
                    "user_id": 1,
                    "country_code": "DE",
                    "phone_number": "+49301234",
                    "active": false,
                    "created_at": 1_700_000_100
                }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let instances = client_for(&server).await.list_instances(1).await.unwrap();
        assert_eq!(instances.len(), 2);
        assert!(instances[0].active);
        assert!(!instances[1].active);
        assert_eq!(instances[1].country_code, "DE");
    }

    #[tokio::test]
    async fn test_create_instance_posts_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/instances"))
            .and(body_json(json!({
                "user_id": 1,
                "country_code": "US",
                "phone_number": "+15550100"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 12,
                "user_id": 1,
                "country_code": "US",
                "phone_number": "+15550100",
                "active": 0,
                "created_at": 1_700_000_200
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = NewInstance::new(1, " us ", "+15550100");
        let created = client_for(&server)
            .await
            .create_instance(&request)
            .await
            .unwrap();
        assert_eq!(created.id, 12);
        assert!(!created.active);
    }

    #[tokio::test]
    async fn test_activate_and_deactivate_accept_plain_text() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/instances/7/activate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Instance activated"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/instances/7/deactivate"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        client.set_instance_active(7, true).await.unwrap();
        client.set_instance_active(7, false).await.unwrap();
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instances"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"instances": []})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .list_instances(1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                endpoint: "/instances",
                ..
            }
        ));
        assert_eq!(err.category(), ErrorCategory::Internal);
    }

    #[tokio::test]
    async fn test_invalid_active_flag_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instances"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 10,
                "user_id": 1,
                "country_code": "US",
                "phone_number": "+15550100",
                "active": 2,
                "created_at": 0
            }])))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .list_instances(1)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }
}

// ============================================================================
// Billing
// ============================================================================

mod billing {
    use super::*;

    fn summary_body(user_id: i64) -> serde_json::Value {
        json!({
            "user_id": user_id,
            "records": [
                {
                    "id": 1,
                    "instance_id": 10,
                    "user_id": user_id,
                    "started_at": 0,
                    "ended_at": 7200,
                    "amount_cents": 67
                },
                {
                    "id": 2,
                    "instance_id": 10,
                    "user_id": user_id,
                    "started_at": 10_000,
                    "ended_at": null,
                    "amount_cents": 0
                }
            ],
            "total_cents": 67
        })
    }

    #[tokio::test]
    async fn test_billing_summary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/billing"))
            .and(query_param("user_id", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(summary_body(3)))
            .expect(1)
            .mount(&server)
            .await;

        let summary = client_for(&server).await.billing_summary(3).await.unwrap();
        assert_eq!(summary.user_id, 3);
        assert_eq!(summary.total_cents, 67);
        assert_eq!(summary.open_records().count(), 1);
        assert_eq!(summary.records[0].duration_secs(), Some(7200));
    }

    #[tokio::test]
    async fn test_summary_for_other_user_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/billing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(summary_body(4)))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .billing_summary(3)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                endpoint: "/billing",
                ..
            }
        ));
    }
}

// ============================================================================
// Errors, auth, health
// ============================================================================

mod transport {
    use super::*;

    #[tokio::test]
    async fn test_non_success_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/instances/99/activate"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Instance not found"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .set_instance_active(99, true)
            .await
            .unwrap_err();
        match &err {
            Error::Remote { status, body } => {
                assert_eq!(*status, 404);
                assert_eq!(body, "Instance not found");
            }
            other => panic!("expected remote error, got {other:?}"),
        }
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.category(), ErrorCategory::Rejected);
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("Instance not found"));
    }

    #[tokio::test]
    async fn test_truncated_error_body_keeps_status() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket
                .write_all(
                    b"HTTP/1.1 503 Service Unavailable\r\n\
                      Content-Length: 100\r\n\
                      Connection: close\r\n\r\n\
                      partial",
                )
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let client = Client::new(&format!("http://{addr}")).unwrap();
        let err = client.list_instances(1).await.unwrap_err();
        assert!(matches!(err, Error::Remote { status: 503, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_server_error_is_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/billing"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Database error"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .billing_summary(1)
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Transient);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_session_token_sent_as_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/instances"))
            .and(header("authorization", "Bearer jwt-abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/instances"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Missing token"))
            .mount(&server)
            .await;

        let authed = Client::builder()
            .base_url(server.uri())
            .session_token("jwt-abc")
            .build()
            .unwrap();
        assert!(authed.list_instances(1).await.unwrap().is_empty());

        let anonymous = client_for(&server).await;
        let err = anonymous.list_instances(1).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.category(), ErrorCategory::Authorization);
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .mount(&server)
            .await;

        client_for(&server).await.health().await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_authority_is_transport_error() {
        // Port 9 (discard) is not expected to be listening.
        let client = Client::new("http://127.0.0.1:9").unwrap();
        let err = client.list_instances(1).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(err.category(), ErrorCategory::Transient);
    }
}
