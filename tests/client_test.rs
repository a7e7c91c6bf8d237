#[cfg(test)]
mod client_tests {
    use std::time::Duration;

    use automator::{
        AgentApi, ClientConfig, HttpAgentClient, Phase, RunController,
        error::{FailureCause, GENERIC_FAILURE_MESSAGE},
        models::{ExecuteRequest, GoalRequest, MaxSteps},
    };
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method, path},
    };

    fn request(goal: &str) -> ExecuteRequest {
        GoalRequest::new(goal, MaxSteps::new(5)).unwrap().into()
    }

    fn client_for(server: &MockServer) -> HttpAgentClient {
        let config = ClientConfig::default().with_base_url(format!("{}/api/v1", server.uri()));
        HttpAgentClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_execute_posts_envelope_and_returns_body_unchanged() {
        let server = MockServer::start().await;
        let body = json!({
            "plan": [],
            "intermediate": [],
            "final_summary": "done",
            "timeline": [],
            "extra": { "kept": true },
        });
        Mock::given(method("POST"))
            .and(path("/api/v1/agent/execute"))
            .and(body_json(json!({ "plan_request": { "goal": "Find crates", "max_steps": 5 } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let returned = client_for(&server).execute(&request("Find crates")).await.unwrap();
        assert_eq!(returned, body);
    }

    #[tokio::test]
    async fn test_plan_uses_its_own_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/agent/plan"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "plan": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let returned = client_for(&server).plan(&request("Find crates")).await.unwrap();
        assert_eq!(returned, json!({ "plan": [] }));
    }

    #[tokio::test]
    async fn test_api_key_header_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "final_summary": "" })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = ClientConfig::default().with_base_url(server.uri());
        config.api_key = Some("secret".to_string());
        let client = HttpAgentClient::new(config).unwrap();
        client.execute(&request("goal")).await.unwrap();
    }

    #[tokio::test]
    async fn test_error_status_carries_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "rate limited" })))
            .mount(&server)
            .await;

        let failure = client_for(&server).execute(&request("goal")).await.unwrap_err();
        assert_eq!(
            failure.cause,
            FailureCause::Status {
                status: 500,
                detail: Some("rate limited".to_string())
            }
        );
        assert_eq!(failure.resolved_message(), "rate limited");
    }

    #[tokio::test]
    async fn test_error_status_without_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let failure = client_for(&server).execute(&request("goal")).await.unwrap_err();
        assert_eq!(failure.resolved_message(), "Request failed with status code 401");
    }

    #[tokio::test]
    async fn test_timeout_is_normalised() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "final_summary": "late" }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let config = ClientConfig::default()
            .with_base_url(server.uri())
            .with_timeout(Duration::from_millis(100));
        let failure = HttpAgentClient::new(config)
            .unwrap()
            .execute(&request("goal"))
            .await
            .unwrap_err();
        assert_eq!(failure.cause, FailureCause::Timeout);
        assert_eq!(failure.resolved_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_a_transport_failure() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let base_url = format!("http://127.0.0.1:{port}/api/v1");
        let client = HttpAgentClient::new(ClientConfig::default().with_base_url(base_url)).unwrap();

        let failure = client.execute(&request("goal")).await.unwrap_err();
        assert_eq!(failure.cause, FailureCause::Transport);
        assert!(!failure.resolved_message().is_empty());
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_a_decode_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let failure = client_for(&server).execute(&request("goal")).await.unwrap_err();
        assert_eq!(failure.cause, FailureCause::Decode);
    }

    #[tokio::test]
    async fn test_controller_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/agent/execute"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "rate limited" })))
            .expect(1)
            .mount(&server)
            .await;

        let controller = RunController::new(client_for(&server));
        controller.set_goal("Compare the latest Groq models").await;
        assert_eq!(controller.submit().await.unwrap(), Phase::Failed);
        assert_eq!(controller.snapshot().await.error.as_deref(), Some("rate limited"));
    }
}
