//! Getwork JSON-RPC client.
//!
//! The getwork protocol is a single RPC method over HTTP: called with no
//! parameters it returns a work payload, called with a solved payload it
//! returns whether the share was accepted. The payload's `data` field is
//! the padded block header as 32-bit big-endian words; this client
//! normalizes it into the serialized header on fetch and restores the
//! wire order when submitting.

use async_trait::async_trait;
use bitcoin::pow::Target;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{JobSource, SourceError, WorkItem};
use crate::tracing::prelude::*;

/// Getwork payloads carry the 80-byte header plus SHA-256 padding.
const PAYLOAD_LEN: usize = 128;
const HEADER_LEN: usize = 80;

#[derive(Serialize)]
struct RpcRequest<'a> {
    method: &'a str,
    params: Vec<Value>,
    id: u64,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<Value>,
}

#[derive(Deserialize)]
struct GetworkPayload {
    data: String,
    target: String,
}

/// JSON-RPC getwork client with HTTP basic authentication.
///
/// No retry or backoff: a failed call surfaces immediately and the
/// caller decides whether the process survives it.
pub struct GetworkClient {
    http: reqwest::Client,
    url: String,
    username: String,
    password: String,
    next_id: u64,
}

impl GetworkClient {
    pub fn new(server: &str, username: &str, password: &str) -> Self {
        let url = if server.contains("://") {
            server.to_string()
        } else {
            format!("http://{server}")
        };
        Self {
            http: reqwest::Client::new(),
            url,
            username: username.to_string(),
            password: password.to_string(),
            next_id: 1,
        }
    }

    async fn rpc(&mut self, params: Vec<Value>) -> Result<Value, SourceError> {
        let request = RpcRequest {
            method: "getwork",
            params,
            id: self.next_id,
        };
        self.next_id += 1;

        let response = self
            .http
            .post(&self.url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&request)
            .send()
            .await?;
        let body: RpcResponse = response.json().await?;

        if let Some(error) = body.error {
            if !error.is_null() {
                return Err(SourceError::Rpc(error.to_string()));
            }
        }
        body.result
            .ok_or_else(|| SourceError::Rpc("response carried no result".into()))
    }
}

#[async_trait]
impl JobSource for GetworkClient {
    async fn fetch_work(&mut self) -> Result<WorkItem, SourceError> {
        let result = self.rpc(Vec::new()).await?;
        let payload: GetworkPayload = serde_json::from_value(result)
            .map_err(|e| SourceError::MalformedWork(format!("getwork result: {e}")))?;
        let work = parse_work(&payload)?;
        debug!(share_target = %payload.target, "work received");
        Ok(work)
    }

    async fn submit_solution(
        &mut self,
        work: &WorkItem,
        nonce: u32,
    ) -> Result<bool, SourceError> {
        let payload = submit_payload(work, nonce)?;
        let result = self.rpc(vec![json!(payload)]).await?;
        Ok(result.as_bool().unwrap_or(false))
    }
}

fn parse_work(payload: &GetworkPayload) -> Result<WorkItem, SourceError> {
    let data = hex::decode(&payload.data)
        .map_err(|e| SourceError::MalformedWork(format!("data hex: {e}")))?;
    if data.len() != PAYLOAD_LEN {
        return Err(SourceError::MalformedWork(format!(
            "data is {} bytes, expected {PAYLOAD_LEN}",
            data.len()
        )));
    }

    let header = header_from_payload(&data);

    let target = hex::decode(&payload.target)
        .map_err(|e| SourceError::MalformedWork(format!("target hex: {e}")))?;
    let target: [u8; 32] = target
        .try_into()
        .map_err(|_| SourceError::MalformedWork("target is not 32 bytes".into()))?;

    Ok(WorkItem {
        data,
        header,
        // getwork targets are little-endian byte strings
        target: Target::from_le_bytes(target),
    })
}

/// Undo the per-word big-endian layout of the payload's header portion.
fn header_from_payload(data: &[u8]) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    for (out, word) in header
        .chunks_exact_mut(4)
        .zip(data[..HEADER_LEN].chunks_exact(4))
    {
        out.copy_from_slice(&[word[3], word[2], word[1], word[0]]);
    }
    header
}

/// Rebuild the submission payload: the original data blob with the nonce
/// written into header word 19 (big-endian, like every payload word).
fn submit_payload(work: &WorkItem, nonce: u32) -> Result<String, SourceError> {
    if work.data.len() != PAYLOAD_LEN {
        return Err(SourceError::MalformedWork(
            "work payload is not resubmittable".into(),
        ));
    }
    let mut data = work.data.clone();
    data[76..80].copy_from_slice(&nonce.to_be_bytes());
    Ok(hex::encode(data))
}
