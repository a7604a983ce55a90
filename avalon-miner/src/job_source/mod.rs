//! Work sources.
//!
//! A work source hands out hashing work and takes back solved nonces.
//! The chip driver only ever sees the [`JobSource`] trait; the one
//! concrete implementation talks getwork JSON-RPC to a pool or node
//! (`getwork`). Solution checking is a pure predicate so the driver can
//! filter bogus chip output before bothering the network.

pub mod getwork;
pub mod validate;

pub use getwork::GetworkClient;

use async_trait::async_trait;
use bitcoin::pow::Target;
use thiserror::Error;

/// One unit of hashing work, immutable for the duration of a cycle.
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Raw work payload exactly as the source supplied it. Kept opaque;
    /// only the source itself interprets it again at submission time.
    pub data: Vec<u8>,

    /// The 80-byte serialized block header derived from `data`.
    pub header: [u8; 80],

    /// Difficulty threshold a solution hash must stay under.
    pub target: Target,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("http transport: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("malformed work: {0}")]
    MalformedWork(String),
}

/// Remote work source boundary.
#[async_trait]
pub trait JobSource: Send {
    /// Fetch a fresh work item.
    async fn fetch_work(&mut self) -> Result<WorkItem, SourceError>;

    /// Report a solved nonce. Returns whether the source accepted it.
    async fn submit_solution(
        &mut self,
        work: &WorkItem,
        nonce: u32,
    ) -> Result<bool, SourceError>;

    /// Whether `nonce` solves `work`. Pure; no side effects, no I/O.
    fn is_valid_solution(&self, work: &WorkItem, nonce: u32) -> bool {
        validate::solution_meets_target(work, nonce)
    }
}
