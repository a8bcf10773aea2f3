//! Newline-delimited JSON host harness.
//!
//! The Terraform RPC wire transport is an external collaborator; this
//! module is the seam the core serves instead. Each stdin line carries one
//! operation request; each response line carries the resulting state and
//! diagnostics. Requests run concurrently in their own tasks — the host
//! bounds parallelism, the provider shares nothing between operations
//! beyond the API handle.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::error::{Diagnostic, ProviderError, ProviderResult};
use crate::provider::SleuthProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostOp {
    Schema,
    Create,
    Read,
    Update,
    Delete,
    Import,
}

/// One operation request from the host.
#[derive(Debug, Deserialize)]
pub struct HostRequest {
    pub id: u64,
    pub resource: String,
    pub op: HostOp,
    #[serde(default)]
    pub plan: Option<Value>,
    #[serde(default)]
    pub state: Option<Value>,
    #[serde(default)]
    pub import_id: Option<String>,
}

/// One operation response. `removed` marks a read that found the remote
/// entity gone, telling the host to drop the state entry.
#[derive(Debug, Serialize)]
pub struct HostResponse {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub removed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl HostResponse {
    fn empty(id: u64) -> Self {
        HostResponse {
            id,
            schema: None,
            state: None,
            removed: false,
            diagnostics: Vec::new(),
        }
    }

    fn failure(id: u64, err: ProviderError) -> Self {
        HostResponse {
            diagnostics: vec![err.into_diagnostic()],
            ..Self::empty(id)
        }
    }
}

fn require(value: Option<Value>, what: &str, op: HostOp) -> ProviderResult<Value> {
    value.ok_or_else(|| ProviderError::Validation(format!("{op:?} request is missing {what}")))
}

/// Dispatch one request against the provider's registry.
pub async fn dispatch(provider: &SleuthProvider, request: HostRequest) -> HostResponse {
    let Some(resource) = provider.resource(&request.resource) else {
        return HostResponse::failure(
            request.id,
            ProviderError::Validation(format!("unknown resource type: {}", request.resource)),
        );
    };
    let ctx = provider.context();
    debug!(resource = %request.resource, op = ?request.op, "dispatching host request");

    let outcome = match request.op {
        HostOp::Schema => match serde_json::to_value(resource.schema()) {
            Ok(schema) => {
                return HostResponse {
                    schema: Some(schema),
                    ..HostResponse::empty(request.id)
                }
            }
            Err(e) => Err(ProviderError::Validation(format!(
                "failed to encode schema: {e}"
            ))),
        },
        HostOp::Create => match require(request.plan, "plan", HostOp::Create) {
            Ok(plan) => resource.create(ctx, plan).await.map(Some),
            Err(e) => Err(e),
        },
        HostOp::Read => match require(request.state, "state", HostOp::Read) {
            Ok(state) => match resource.read(ctx, state).await {
                Ok(Some(state)) => Ok(Some(state)),
                Ok(None) => {
                    return HostResponse {
                        removed: true,
                        ..HostResponse::empty(request.id)
                    }
                }
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        },
        HostOp::Update => {
            match (
                require(request.plan, "plan", HostOp::Update),
                require(request.state, "state", HostOp::Update),
            ) {
                (Ok(plan), Ok(state)) => resource.update(ctx, plan, state).await.map(Some),
                (Err(e), _) | (_, Err(e)) => Err(e),
            }
        }
        HostOp::Delete => match require(request.state, "state", HostOp::Delete) {
            Ok(state) => resource.delete(ctx, state).await.map(|()| None),
            Err(e) => Err(e),
        },
        HostOp::Import => match request.import_id {
            Some(id) => resource.import(ctx, &id).await.map(Some),
            None => Err(ProviderError::Validation(
                "Import request is missing import_id".to_string(),
            )),
        },
    };

    match outcome {
        Ok(state) => HostResponse {
            state,
            ..HostResponse::empty(request.id)
        },
        Err(err) => HostResponse::failure(request.id, err),
    }
}

async fn handle_line(provider: &SleuthProvider, line: &str) -> HostResponse {
    match serde_json::from_str::<HostRequest>(line) {
        Ok(request) => dispatch(provider, request).await,
        Err(err) => HostResponse {
            diagnostics: vec![Diagnostic::error(
                "malformed host request",
                err.to_string(),
            )],
            ..HostResponse::empty(0)
        },
    }
}

/// Serve requests from stdin until EOF. Each request runs in its own task;
/// responses are serialized through a single writer.
pub async fn serve(provider: Arc<SleuthProvider>) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let (tx, mut rx) = mpsc::channel::<String>(16);

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = rx.recv().await {
            stdout.write_all(line.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        Ok::<(), std::io::Error>(())
    });

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let provider = Arc::clone(&provider);
        let tx = tx.clone();
        tokio::spawn(async move {
            let response = handle_line(&provider, &line).await;
            match serde_json::to_string(&response) {
                Ok(encoded) => {
                    let _ = tx.send(encoded).await;
                }
                Err(err) => error!(%err, "failed to encode host response"),
            }
        });
    }

    drop(tx);
    match writer.await {
        Ok(result) => result,
        Err(join_err) => Err(std::io::Error::other(join_err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_request_decodes_with_optional_fields() {
        let request: HostRequest = serde_json::from_str(
            r#"{"id": 7, "resource": "sleuth_project", "op": "create", "plan": {"name": "P"}}"#,
        )
        .expect("deserialize");
        assert_eq!(request.id, 7);
        assert_eq!(request.op, HostOp::Create);
        assert!(request.plan.is_some());
        assert!(request.state.is_none());
        assert!(request.import_id.is_none());
    }

    #[test]
    fn test_host_response_omits_empty_fields() {
        let response = HostResponse::empty(3);
        let value = serde_json::to_value(&response).expect("serialize");
        assert_eq!(value, serde_json::json!({ "id": 3 }));
    }
}
