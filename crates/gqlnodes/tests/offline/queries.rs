use super::*;
use gqlnodes::{Argument, Arguments, NodesError, Variable};

// ── Request body ────────────────────────────────────────────────────────────

#[tokio::test]
async fn query_sends_compiled_document() {
    let (server, client) = setup(serde_json::json!({"data": {"user": null}})).await;
    let request = user_request(&server).build().unwrap();
    let _ = client.query::<User>(&request).await;

    let body = extract_body(&server.received_requests().await.unwrap());
    assert_eq!(
        body["query"],
        "query { user (login:null) { login name repositories { name stargazerCount } } } "
    );
    assert_eq!(body["variables"], serde_json::json!({}));
}

#[tokio::test]
async fn injected_arguments_reach_the_wire() {
    let (server, client) = setup(serde_json::json!({"data": {"user": null}})).await;
    let request = user_request(&server)
        .arguments(Arguments::new("user", [Argument::new("login", "octocat")]))
        .arguments(Arguments::new(
            "user.repositories",
            [Argument::new("first", 5)],
        ))
        .build()
        .unwrap();
    let _ = client.query::<User>(&request).await;

    let body = extract_body(&server.received_requests().await.unwrap());
    let query = body["query"].as_str().unwrap();
    assert!(query.contains("user (login:\"octocat\")"));
    assert!(query.contains("repositories (first:5) {"));
}

#[tokio::test]
async fn variables_are_sent_alongside() {
    let (server, client) = setup(serde_json::json!({"data": {"user": null}})).await;
    let request = user_request(&server)
        .arguments(Arguments::new(
            ".",
            [Argument::new("login", gqlnodes::Value::variable("login"))],
        ))
        .variable(Variable::new("login", "octocat"))
        .build()
        .unwrap();
    let _ = client.query::<User>(&request).await;

    let body = extract_body(&server.received_requests().await.unwrap());
    assert!(body["query"].as_str().unwrap().contains("(login:$login)"));
    assert_eq!(body["variables"]["login"], "octocat");
}

#[tokio::test]
async fn raw_documents_are_sent_verbatim() {
    let (server, client) = setup(serde_json::json!({"data": {"viewer": {"login": "me"}}})).await;
    let request = GraphQLRequest::builder()
        .url(server.uri())
        .document("{ viewer { login } }")
        .build()
        .unwrap();
    let response = client.query::<Value>(&request).await.unwrap();

    let body = extract_body(&server.received_requests().await.unwrap());
    assert_eq!(body["query"], "{ viewer { login } }");
    assert_eq!(response.data.unwrap()["viewer"]["login"], "me");
}

// ── Response unwrapping ─────────────────────────────────────────────────────

#[tokio::test]
async fn resource_is_unwrapped_from_the_top_level_key() {
    let (server, client) = setup(serde_json::json!({
        "data": {
            "user": {
                "login": "octocat",
                "name": "The Octocat",
                "company": "ignored",
                "repositories": [
                    {"name": "hello-world", "stargazerCount": 3},
                    {"name": "spoon-knife", "stargazerCount": null}
                ]
            }
        }
    }))
    .await;
    let request = user_request(&server).build().unwrap();
    let response = client.query::<User>(&request).await.unwrap();

    assert_eq!(response.status, 200);
    assert!(response.errors.is_none());
    let user = response.data.unwrap();
    assert_eq!(user.login, "octocat");
    assert_eq!(user.name.as_deref(), Some("The Octocat"));
    let repositories = user.repositories.unwrap();
    assert_eq!(repositories.len(), 2);
    assert_eq!(repositories[0].stargazer_count, Some(3));
    assert_eq!(repositories[1].stargazer_count, None);
}

#[tokio::test]
async fn partial_results_keep_errors() {
    let (server, client) = setup(serde_json::json!({
        "data": {"user": null},
        "errors": [{
            "message": "Could not resolve to a User with the login of 'nobody'.",
            "locations": [{"line": 1, "column": 9}],
            "path": ["user"],
            "extensions": {"classification": "NOT_FOUND"}
        }]
    }))
    .await;
    let request = user_request(&server).build().unwrap();
    let response = client.query::<User>(&request).await.unwrap();

    assert!(response.data.is_none());
    let errors = response.errors.unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].locations[0].column, 9);
    assert_eq!(errors[0].classification(), Some("NOT_FOUND"));
}

#[tokio::test]
async fn mismatched_payload_is_a_protocol_error() {
    let (server, client) = setup(serde_json::json!({
        "data": {"user": {"login": 42}}
    }))
    .await;
    let request = user_request(&server).build().unwrap();
    let err = client.query::<User>(&request).await.unwrap_err();

    assert!(matches!(err, NodesError::Protocol { .. }));
    assert_eq!(err.status(), Some(200));
}

// ── Failures ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn error_status_exposes_status_and_errors() {
    let (server, client) = setup_status(
        400,
        r#"{"errors":[{"message":"Field 'nope' doesn't exist on type 'User'"}]}"#,
    )
    .await;
    let request = user_request(&server).build().unwrap();
    let err = client.query::<User>(&request).await.unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.message(), "HTTP error 400: Bad Request");
    let errors = err.errors().unwrap();
    assert_eq!(errors[0].message, "Field 'nope' doesn't exist on type 'User'");
}

#[tokio::test]
async fn error_status_with_html_body_has_description() {
    let (server, client) = setup_status(503, "<html>Service Unavailable</html>").await;
    let request = user_request(&server).build().unwrap();
    let err = client.query::<User>(&request).await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(err.errors().is_none());
    assert!(err.description().is_some());
}

#[tokio::test]
async fn garbage_success_body_is_a_protocol_error() {
    let (server, client) = setup_status(200, "definitely not json").await;
    let request = user_request(&server).build().unwrap();
    let err = client.query::<User>(&request).await.unwrap_err();

    assert!(matches!(err, NodesError::Protocol { .. }));
    assert!(err.description().is_some());
}
