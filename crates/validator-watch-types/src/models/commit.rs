//! Commit records returned by the node's consensus API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope of `GET /api/consensus/blocklastcommit`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommitResponse {
    pub result: CommitRecord,
}

/// Precommit record for the latest block the node has seen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommitRecord {
    /// Block height
    pub height: i64,
    /// Consensus round the commit was reached in
    pub round: i32,
    /// Committed block identifier
    pub block_id: BlockId,
    /// Precommit signatures, one per validator slot
    #[serde(default)]
    pub signatures: Vec<Signature>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockId {
    pub hash: String,
    #[serde(default)]
    pub parts: serde_json::Value,
}

/// A single validator's precommit vote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Signature {
    pub block_id_flag: i32,
    pub validator_address: String,
    /// RFC 3339 time the vote was cast
    pub timestamp: String,
    /// Absent-vote slots carry no signature bytes
    #[serde(default)]
    pub signature: Option<String>,
}

impl Signature {
    /// Parse the vote timestamp.
    pub fn signed_at(&self) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(&self.timestamp).map(|t| t.with_timezone(&Utc))
    }
}

impl CommitRecord {
    /// Signature cast by `validator_address`, if any.
    ///
    /// Addresses are compared exactly; the node reports them upper-case hex.
    pub fn signature_from(&self, validator_address: &str) -> Option<&Signature> {
        self.signatures.iter().find(|s| s.validator_address == validator_address)
    }
}
