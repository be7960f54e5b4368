//! Session multiplexing. Each agent connection owns one isolated
//! protocol session with its own handshake state machine
//! (`Uninitialized -> Active -> Closed`); all sessions dispatch into
//! the same shared registries.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::protocol::{
    json_rpc_error, json_rpc_response, JsonRpcRequest, INVALID_PARAMS, METHOD_NOT_FOUND,
    NOT_INITIALIZED, PROTOCOL_VERSION, SERVER_NAME, SERVER_VERSION,
};
use crate::registry::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    /// Created by `initialize`, waiting for `notifications/initialized`.
    Uninitialized,
    Active,
}

/// Transport-level routing failures. Surfaced as transport errors, not
/// operation errors, and never corrupt other sessions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    /// The identifier is expired or was never issued; the client must
    /// reinitialize. Deliberately distinct from "unauthorized" and from
    /// first contact.
    #[error("unknown session '{0}': reinitialize")]
    UnknownSession(String),

    /// A request with no identifier that is not first contact.
    #[error("no session identifier: send initialize first")]
    NoSession,

    #[error("malformed request framing: {0}")]
    Malformed(String),
}

#[derive(Debug)]
pub struct RouterReply {
    pub session_id: String,
    /// `None` for notifications.
    pub body: Option<Value>,
}

pub struct SessionRouter {
    registry: Arc<Registry>,
    sessions: Mutex<HashMap<String, SessionState>>,
    /// Identifiers of closed sessions. Never reused, and kept so a late
    /// request on a closed session gets the reinitialize error instead
    /// of silently creating a new session.
    retired: Mutex<HashSet<String>>,
    counter: AtomicU64,
}

impl SessionRouter {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            sessions: Mutex::new(HashMap::new()),
            retired: Mutex::new(HashSet::new()),
            counter: AtomicU64::new(1),
        }
    }

    /// Route one raw request. `session_id` is the transport-carried
    /// identifier, absent on first contact.
    pub async fn handle(
        &self,
        session_id: Option<&str>,
        raw: &[u8],
    ) -> Result<RouterReply, RouterError> {
        let request: JsonRpcRequest = serde_json::from_slice(raw).map_err(|err| {
            RouterError::Malformed(err.to_string())
        })?;

        let session_id = match session_id {
            Some(id) => {
                let known = self.sessions.lock().await.contains_key(id);
                if !known {
                    return Err(RouterError::UnknownSession(id.to_string()));
                }
                id.to_string()
            }
            None => {
                if request.method != "initialize" {
                    return Err(RouterError::NoSession);
                }
                self.create_session().await
            }
        };

        let body = self.dispatch(&session_id, request).await;
        Ok(RouterReply { session_id, body })
    }

    /// Explicit close: `active -> closed`. The identifier is retired
    /// and all session resources are released.
    pub async fn close(&self, session_id: &str) -> Result<(), RouterError> {
        let removed = self.sessions.lock().await.remove(session_id);
        if removed.is_none() {
            return Err(RouterError::UnknownSession(session_id.to_string()));
        }
        self.retired.lock().await.insert(session_id.to_string());
        log::info!("session {session_id} closed");
        Ok(())
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    async fn create_session(&self) -> String {
        // Monotonic counter keeps ids unique for the process lifetime;
        // retired ids are checked anyway so a closed id can never come
        // back.
        loop {
            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            let id = format!("nv-{n:08x}-{:04x}", pseudo_entropy(n));
            if self.retired.lock().await.contains(&id) {
                continue;
            }
            self.sessions
                .lock()
                .await
                .insert(id.clone(), SessionState::Uninitialized);
            log::debug!("session {id} created");
            return id;
        }
    }

    async fn dispatch(&self, session_id: &str, request: JsonRpcRequest) -> Option<Value> {
        let method = request.method.as_str();

        if method == "initialize" {
            return Some(json_rpc_response(
                request.id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION },
                    "capabilities": { "tools": {}, "resources": {}, "prompts": {} },
                }),
            ));
        }

        if method == "notifications/initialized" {
            self.sessions
                .lock()
                .await
                .insert(session_id.to_string(), SessionState::Active);
            return None;
        }

        if method == "ping" {
            return Some(json_rpc_response(request.id, json!({})));
        }

        let state = self
            .sessions
            .lock()
            .await
            .get(session_id)
            .copied()
            .unwrap_or(SessionState::Uninitialized);
        if state != SessionState::Active {
            return Some(json_rpc_error(
                request.id,
                NOT_INITIALIZED,
                "Session not initialized",
            ));
        }

        match method {
            "tools/list" => Some(self.tools_list(request.id)),
            "tools/call" => Some(self.tools_call(request.id, request.params).await),
            "resources/list" => Some(self.resources_list(request.id).await),
            "resources/read" => Some(self.resources_read(request.id, request.params).await),
            "prompts/list" => Some(self.prompts_list(request.id).await),
            "prompts/get" => Some(self.prompts_get(request.id, request.params).await),
            other => Some(json_rpc_error(
                request.id,
                METHOD_NOT_FOUND,
                &format!("Method not found: {other}"),
            )),
        }
    }

    fn tools_list(&self, id: Option<Value>) -> Value {
        let tools: Vec<Value> = self
            .registry
            .tools()
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "inputSchema": tool.input_schema,
                })
            })
            .collect();
        json_rpc_response(id, json!({ "tools": tools }))
    }

    async fn tools_call(&self, id: Option<Value>, params: Option<Value>) -> Value {
        let Some(params) = params.as_ref().and_then(Value::as_object) else {
            return json_rpc_error(id, INVALID_PARAMS, "params must be an object");
        };
        let name = params.get("name").and_then(Value::as_str).unwrap_or("");
        let args = params
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| json!({}));

        let Some(tool) = self.registry.tool(name) else {
            return json_rpc_error(id, INVALID_PARAMS, &format!("Unknown tool: {name}"));
        };

        // Operation failures become structured payloads here, at the
        // boundary; they never travel up as transport faults.
        let (payload, is_error) = match tool.handler.call(args).await {
            Ok(value) => (value, false),
            Err(err) => (
                serde_json::to_value(&err).unwrap_or_else(|_| json!({"message": err.message})),
                true,
            ),
        };

        let text = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string());
        json_rpc_response(
            id,
            json!({
                "content": [{ "type": "text", "text": text }],
                "isError": is_error,
            }),
        )
    }

    async fn resources_list(&self, id: Option<Value>) -> Value {
        match self.registry.resources().list().await {
            Ok(entries) => {
                let resources: Vec<Value> = entries
                    .iter()
                    .map(|e| {
                        json!({ "uri": e.uri, "name": e.name, "mimeType": e.mime_type })
                    })
                    .collect();
                json_rpc_response(id, json!({ "resources": resources }))
            }
            Err(err) => json_rpc_error(id, INVALID_PARAMS, &err.message),
        }
    }

    async fn resources_read(&self, id: Option<Value>, params: Option<Value>) -> Value {
        let uri = params
            .as_ref()
            .and_then(|p| p.get("uri"))
            .and_then(Value::as_str);
        let Some(uri) = uri else {
            return json_rpc_error(id, INVALID_PARAMS, "missing 'uri' parameter");
        };
        match self.registry.resources().read(uri).await {
            Ok(body) => json_rpc_response(
                id,
                json!({
                    "contents": [{
                        "uri": body.uri,
                        "mimeType": body.mime_type,
                        "text": body.text,
                    }],
                }),
            ),
            Err(err) => json_rpc_error(id, INVALID_PARAMS, &err.message),
        }
    }

    async fn prompts_list(&self, id: Option<Value>) -> Value {
        match self.registry.prompts().list().await {
            Ok(entries) => {
                let prompts: Vec<Value> = entries
                    .iter()
                    .map(|p| match &p.description {
                        Some(desc) => json!({ "name": p.name, "description": desc }),
                        None => json!({ "name": p.name }),
                    })
                    .collect();
                json_rpc_response(id, json!({ "prompts": prompts }))
            }
            Err(err) => json_rpc_error(id, INVALID_PARAMS, &err.message),
        }
    }

    async fn prompts_get(&self, id: Option<Value>, params: Option<Value>) -> Value {
        let name = params
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str);
        let Some(name) = name else {
            return json_rpc_error(id, INVALID_PARAMS, "missing 'name' parameter");
        };
        match self.registry.prompts().get(name).await {
            Ok(body) => json_rpc_response(
                id,
                json!({
                    "description": body.description,
                    "messages": [{
                        "role": "user",
                        "content": { "type": "text", "text": body.text },
                    }],
                }),
            ),
            Err(err) => json_rpc_error(id, INVALID_PARAMS, &err.message),
        }
    }
}

/// Cheap id suffix so ids are not trivially guessable across restarts.
fn pseudo_entropy(n: u64) -> u64 {
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64)
        .unwrap_or(0);
    (t ^ n.wrapping_mul(0x9e37_79b9_7f4a_7c15)) & 0xffff
}
