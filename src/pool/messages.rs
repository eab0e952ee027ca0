// GBT Miner - Free and Open Source Software Statement
//
// This project, gbt-miner, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/pool/messages.rs
// Version: 2.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file defines the JSON-RPC envelope exchanged with the pool and the
// interpretation of pool answers: unwrapping results and classifying what
// `submitblock` returned.
//
// Tree Location:
// - src/pool/messages.rs (pool message types and parsing)
// - Depends on: serde, serde_json, crate::core::error

use crate::core::error::RpcError;
use crate::core::types::SubmitOutcome;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const LOG_TARGET: &str = "gbt_miner::pool::messages";

#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a> {
    pub id: u64,
    pub method: &'a str,
    pub params: &'a Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl RpcResponse {
    /// Unwrap the result, turning an error object into `RpcError::Server`.
    pub fn into_result(self) -> Result<Value, RpcError> {
        match self.error {
            Some(err) => Err(RpcError::Server {
                code: err.code,
                message: err.message,
            }),
            None => Ok(self.result),
        }
    }
}

/// Parse a raw pool reply body.
pub fn parse_response(body: &str) -> Result<Value, RpcError> {
    if body.trim().is_empty() {
        return Err(RpcError::Empty);
    }
    let response: RpcResponse = serde_json::from_str(body)?;
    debug!(target: LOG_TARGET, "Pool response: {:?}", response);
    response.into_result()
}

/// JSON falsiness: null, false, zero, empty string, empty array or object.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// An empty answer means accepted; anything else is the rejection reason.
pub fn classify_submit_result(result: &Value) -> SubmitOutcome {
    if is_falsy(result) {
        return SubmitOutcome::Accepted;
    }
    let reason = match result {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    SubmitOutcome::Rejected { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_result() {
        let value = parse_response(r#"{"id":1,"result":{"height":5},"error":null}"#).unwrap();
        assert_eq!(value["height"], 5);
    }

    #[test]
    fn test_parse_error_object() {
        let err = parse_response(r#"{"id":1,"result":null,"error":{"code":-8,"message":"bad"}}"#).unwrap_err();
        assert!(matches!(err, RpcError::Server { code: -8, ref message } if message == "bad"));
    }

    #[test]
    fn test_parse_empty_and_garbage() {
        assert!(matches!(parse_response("  "), Err(RpcError::Empty)));
        assert!(matches!(parse_response("<html>"), Err(RpcError::Malformed { .. })));
    }

    #[test]
    fn test_classify_accepted() {
        assert_eq!(classify_submit_result(&Value::Null), SubmitOutcome::Accepted);
        assert_eq!(classify_submit_result(&json!(false)), SubmitOutcome::Accepted);
        assert_eq!(classify_submit_result(&json!("")), SubmitOutcome::Accepted);
    }

    #[test]
    fn test_classify_rejected_reason() {
        assert_eq!(
            classify_submit_result(&json!("duplicate")),
            SubmitOutcome::Rejected {
                reason: "duplicate".to_string()
            }
        );
        assert_eq!(
            classify_submit_result(&json!(true)),
            SubmitOutcome::Rejected {
                reason: "true".to_string()
            }
        );
    }
}

// Changelog:
// - v2.0.0: Replaced Stratum message parsing with JSON-RPC envelopes.
//   - Added submit result classification (empty = accepted, else rejected).
