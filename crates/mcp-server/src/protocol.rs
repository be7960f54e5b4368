//! JSON-RPC framing and the structured error payload every operation
//! failure is converted into at the operation boundary.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const PROTOCOL_VERSION: &str = "2025-03-26";
pub const SERVER_NAME: &str = "notevault-mcp";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

// JSON-RPC error codes used by the router.
pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_PARAMS: i64 = -32602;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const NOT_INITIALIZED: i64 = -32002;
/// Unknown/expired session: the client must reinitialize. Distinct from
/// unauthorized and from "server not initialized".
pub const SESSION_EXPIRED: i64 = -32001;
pub const NO_SESSION: i64 = -32000;

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[allow(dead_code)]
    pub jsonrpc: Option<String>,
    /// Absent for notifications.
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

pub fn json_rpc_response(id: Option<Value>, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

pub fn json_rpc_error(id: Option<Value>, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    })
}

/// Machine-readable failure codes carried in tool error payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    AccessDenied,
    ReadOnly,
    Validation,
    TargetNotFound,
    External,
}

/// Structured error payload returned from a failed tool invocation. A
/// tool returns either a success payload or this, never both, and never
/// an uncaught fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorPayload {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }
}

impl From<notevault_access::AccessError> for ErrorPayload {
    fn from(err: notevault_access::AccessError) -> Self {
        use notevault_access::AccessError;
        let code = match err {
            AccessError::Denied(_) => ErrorCode::AccessDenied,
            AccessError::ReadOnly => ErrorCode::ReadOnly,
            AccessError::InvalidPath(_) => ErrorCode::Validation,
        };
        Self::new(code, err.to_string())
    }
}

impl From<notevault_note::StoreError> for ErrorPayload {
    fn from(err: notevault_note::StoreError) -> Self {
        use notevault_note::StoreError;
        let code = match err {
            StoreError::NotFound(_) => ErrorCode::NotFound,
            StoreError::Io(_) | StoreError::Other(_) => ErrorCode::External,
        };
        Self::new(code, err.to_string())
    }
}

impl From<notevault_patch::PatchError> for ErrorPayload {
    fn from(err: notevault_patch::PatchError) -> Self {
        use notevault_patch::PatchError;
        let code = match err {
            PatchError::TargetNotFound(_) => ErrorCode::TargetNotFound,
            PatchError::MalformedFrontmatter | PatchError::Validation(_) => ErrorCode::Validation,
        };
        Self::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_payload_serializes_snake_case_codes() {
        let payload = ErrorPayload::new(ErrorCode::TargetNotFound, "missing");
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["code"], "target_not_found");
        assert_eq!(value["message"], "missing");
    }

    #[test]
    fn access_errors_map_to_distinct_codes() {
        let denied: ErrorPayload = notevault_access::AccessError::Denied("x".into()).into();
        assert_eq!(denied.code, ErrorCode::AccessDenied);
        let ro: ErrorPayload = notevault_access::AccessError::ReadOnly.into();
        assert_eq!(ro.code, ErrorCode::ReadOnly);
    }
}
