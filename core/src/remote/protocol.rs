//! Wire types for the remote strategy protocol.

use crate::{
    public_info::PublicInformation,
    strategy::PrivateInformation,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The server did not recognise the method.
pub const FAULT_UNKNOWN_METHOD: i64 = 1;
/// The request line or its params could not be decoded.
pub const FAULT_BAD_REQUEST: i64 = 2;
/// The hosted strategy returned an error.
pub const FAULT_STRATEGY: i64 = 3;

pub const METHOD_BID: &str = "bid";
pub const METHOD_JOIN_LAUNCH: &str = "join_launch";
pub const METHOD_BEGIN: &str = "begin";
pub const METHOD_END: &str = "end";
pub const METHOD_BROADCAST: &str = "broadcast";
pub const METHOD_PING: &str = "ping";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// Params for bid, join_launch, begin and end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionParams {
    pub private: PrivateInformation,
    pub public: PublicInformation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastParams {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<Fault>,
}

impl Response {
    pub fn ok(id: u64, result: Value) -> Self {
        Self { id, result: Some(result), fault: None }
    }

    pub fn fault(id: u64, code: i64, message: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            fault: Some(Fault { code, message: message.into() }),
        }
    }
}
