use super::*;
use gqlnodes::{Argument, Arguments, InputObject, Method};

#[derive(GraphQLObject, Deserialize, Debug)]
#[graphql(operation(
    name = "AddStar",
    method = "mutation",
    variable(name = "starrableId", scalar = "ID!"),
    property(name = "addStar", argument(name = "input", variable = "starrableId"))
))]
#[serde(rename_all = "camelCase")]
struct AddStar {
    client_mutation_id: Option<String>,
}

#[derive(GraphQLObject, Deserialize, Debug)]
#[graphql(property(name = "createIssue", argument(name = "input")))]
struct CreateIssue {
    id: String,
    title: String,
}

#[tokio::test]
async fn execute_uses_the_declared_method() {
    let (server, client) = setup(serde_json::json!({
        "data": {"addStar": {"clientMutationId": "abc"}}
    }))
    .await;
    let request = GraphQLRequest::builder()
        .url(server.uri())
        .request::<AddStar>()
        .variable(gqlnodes::Variable::new("starrableId", "R_1"))
        .build()
        .unwrap();
    let response = client.execute::<AddStar>(&request).await.unwrap();

    let body = extract_body(&server.received_requests().await.unwrap());
    assert_eq!(
        body["query"],
        "mutation AddStar ($starrableId:ID!){ addStar (input:$starrableId) { clientMutationId } } "
    );
    assert_eq!(body["variables"]["starrableId"], "R_1");
    assert_eq!(
        response.data.unwrap().client_mutation_id.as_deref(),
        Some("abc")
    );
}

#[tokio::test]
async fn mutate_overrides_the_method() {
    let (server, client) = setup(serde_json::json!({
        "data": {"createIssue": {"id": "1", "title": "Broken"}}
    }))
    .await;
    let input = InputObject::builder()
        .put("title", "Broken")
        .put("labels", vec!["bug"])
        .build();
    let request = GraphQLRequest::builder()
        .url(server.uri())
        .request::<CreateIssue>()
        .arguments(Arguments::new("createIssue", [Argument::new("input", input)]))
        .build()
        .unwrap();
    assert_eq!(request.method(), Some(Method::Query));

    let response = client.mutate::<CreateIssue>(&request).await.unwrap();

    let body = extract_body(&server.received_requests().await.unwrap());
    assert_eq!(
        body["query"],
        "mutation { createIssue (input:{title:\"Broken\",labels:[\"bug\"]}) { id title } } "
    );
    let issue = response.data.unwrap();
    assert_eq!(issue.id, "1");
    assert_eq!(issue.title, "Broken");
}

#[tokio::test]
async fn query_overrides_a_declared_mutation() {
    let (server, client) = setup(serde_json::json!({"data": {"addStar": null}})).await;
    let request = GraphQLRequest::builder()
        .url(server.uri())
        .request::<AddStar>()
        .build()
        .unwrap();
    let response = client.query::<AddStar>(&request).await.unwrap();

    let body = extract_body(&server.received_requests().await.unwrap());
    assert!(body["query"]
        .as_str()
        .unwrap()
        .starts_with("query AddStar "));
    assert!(response.data.is_none());
}
