//! Session state machine and protocol dispatch, exercised through the
//! router exactly as the HTTP front end drives it.

use std::sync::Arc;

use serde_json::{json, Value};

use notevault_access::{AccessGate, IgnoreRules};
use notevault_mcp::prompts::VaultPrompts;
use notevault_mcp::registry::Registry;
use notevault_mcp::resources::VaultResources;
use notevault_mcp::session::{RouterError, SessionRouter};
use notevault_mcp::tools::{build_tools, ToolContext};
use notevault_note::MemoryVault;

async fn router_fixture() -> (SessionRouter, MemoryVault) {
    let vault = MemoryVault::new();
    vault.insert("inbox.md", "# Inbox\n- idea\n").await;
    vault
        .insert("prompts/review.md", "---\ndescription: Review\n---\nReview {{note}}.\n")
        .await;

    let store = Arc::new(vault.clone());
    let gate = Arc::new(AccessGate::new(IgnoreRules::disabled(), false));
    let ctx = ToolContext {
        store: store.clone(),
        gate: gate.clone(),
        query: None,
    };
    let registry = Arc::new(Registry::new(
        build_tools(ctx),
        Arc::new(VaultResources::new(store.clone(), gate.clone())),
        Arc::new(VaultPrompts::new(store, gate)),
    ));
    (SessionRouter::new(registry), vault)
}

fn request(id: u64, method: &str, params: Value) -> Vec<u8> {
    json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params })
        .to_string()
        .into_bytes()
}

fn notification(method: &str) -> Vec<u8> {
    json!({ "jsonrpc": "2.0", "method": method })
        .to_string()
        .into_bytes()
}

async fn handshake(router: &SessionRouter) -> String {
    let reply = router
        .handle(None, &request(1, "initialize", json!({})))
        .await
        .expect("initialize");
    let body = reply.body.expect("initialize has a response");
    assert_eq!(body["result"]["serverInfo"]["name"], "notevault-mcp");

    let reply = router
        .handle(Some(reply.session_id.as_str()), &notification("notifications/initialized"))
        .await
        .expect("initialized notification");
    assert!(reply.body.is_none());
    reply.session_id
}

#[tokio::test]
async fn two_fresh_sessions_get_distinct_identifiers() {
    let (router, _vault) = router_fixture().await;
    let first = handshake(&router).await;
    let second = handshake(&router).await;
    assert_ne!(first, second);
    assert_eq!(router.session_count().await, 2);
}

#[tokio::test]
async fn unknown_session_is_rejected_with_reinitialize_error() {
    let (router, _vault) = router_fixture().await;
    let err = router
        .handle(Some("nv-deadbeef-0000"), &request(1, "tools/list", json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, RouterError::UnknownSession(_)));
}

#[tokio::test]
async fn request_without_session_must_be_initialize() {
    let (router, _vault) = router_fixture().await;
    let err = router
        .handle(None, &request(1, "tools/list", json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, RouterError::NoSession));
}

#[tokio::test]
async fn closed_session_identifier_is_never_reused() {
    let (router, _vault) = router_fixture().await;
    let id = handshake(&router).await;
    router.close(&id).await.unwrap();

    // A request on the closed id is rejected as expired, not recreated.
    let err = router
        .handle(Some(id.as_str()), &request(2, "ping", json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, RouterError::UnknownSession(_)));

    // New sessions never reissue the retired id.
    for _ in 0..8 {
        assert_ne!(handshake(&router).await, id);
    }
}

#[tokio::test]
async fn uninitialized_session_cannot_call_tools() {
    let (router, _vault) = router_fixture().await;
    let reply = router
        .handle(None, &request(1, "initialize", json!({})))
        .await
        .unwrap();
    // Skipping notifications/initialized: calls must be rejected.
    let reply = router
        .handle(Some(reply.session_id.as_str()), &request(2, "tools/list", json!({})))
        .await
        .unwrap();
    let body = reply.body.unwrap();
    assert_eq!(body["error"]["code"], -32002);
}

#[tokio::test]
async fn sessions_do_not_observe_each_others_handshake_state() {
    let (router, _vault) = router_fixture().await;

    // First session fully initialized.
    let first = handshake(&router).await;

    // Second session created but left uninitialized.
    let second = router
        .handle(None, &request(1, "initialize", json!({})))
        .await
        .unwrap()
        .session_id;

    // The first session keeps working; the second is still gated.
    let ok = router
        .handle(Some(first.as_str()), &request(3, "tools/list", json!({})))
        .await
        .unwrap();
    assert!(ok.body.unwrap()["result"]["tools"].is_array());

    let gated = router
        .handle(Some(second.as_str()), &request(2, "tools/list", json!({})))
        .await
        .unwrap();
    assert_eq!(gated.body.unwrap()["error"]["code"], -32002);
}

#[tokio::test]
async fn malformed_framing_is_a_transport_error() {
    let (router, _vault) = router_fixture().await;
    let err = router.handle(None, b"{not json").await.unwrap_err();
    assert!(matches!(err, RouterError::Malformed(_)));
}

#[tokio::test]
async fn tools_list_advertises_schemas() {
    let (router, _vault) = router_fixture().await;
    let id = handshake(&router).await;
    let reply = router
        .handle(Some(id.as_str()), &request(2, "tools/list", json!({})))
        .await
        .unwrap();
    let body = reply.body.unwrap();
    let tools = body["result"]["tools"].as_array().unwrap().clone();
    let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
    for expected in [
        "list_notes",
        "read_note",
        "write_note",
        "fuzzy_replace",
        "edit_lines",
        "patch_note",
        "reload_ignore",
    ] {
        assert!(names.contains(&expected), "missing tool {expected}");
    }
    // No engine configured, so query_vault is absent.
    assert!(!names.contains(&"query_vault"));
    assert!(tools[0]["inputSchema"].is_object());
}

#[tokio::test]
async fn unknown_method_is_method_not_found() {
    let (router, _vault) = router_fixture().await;
    let id = handshake(&router).await;
    let reply = router
        .handle(Some(id.as_str()), &request(9, "vault/compact", json!({})))
        .await
        .unwrap();
    assert_eq!(reply.body.unwrap()["error"]["code"], -32601);
}

#[tokio::test]
async fn resources_and_prompts_are_served() {
    let (router, _vault) = router_fixture().await;
    let id = handshake(&router).await;

    let reply = router
        .handle(Some(id.as_str()), &request(2, "resources/list", json!({})))
        .await
        .unwrap();
    let body = reply.body.unwrap();
    let resources = body["result"]["resources"].as_array().unwrap().clone();
    assert!(resources
        .iter()
        .any(|r| r["uri"] == "note:///inbox.md" && r["mimeType"] == "text/markdown"));

    let reply = router
        .handle(
            Some(id.as_str()),
            &request(3, "resources/read", json!({ "uri": "note:///inbox.md" })),
        )
        .await
        .unwrap();
    let body = reply.body.unwrap();
    assert_eq!(body["result"]["contents"][0]["text"], "# Inbox\n- idea\n");

    let reply = router
        .handle(Some(id.as_str()), &request(4, "prompts/list", json!({})))
        .await
        .unwrap();
    let body = reply.body.unwrap();
    assert_eq!(body["result"]["prompts"][0]["name"], "review");

    let reply = router
        .handle(
            Some(id.as_str()),
            &request(5, "prompts/get", json!({ "name": "review" })),
        )
        .await
        .unwrap();
    let body = reply.body.unwrap();
    assert_eq!(body["result"]["description"], "Review");
    assert_eq!(
        body["result"]["messages"][0]["content"]["text"],
        "Review {{note}}."
    );
}
