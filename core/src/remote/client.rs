//! The game-side proxy for a strategy hosted elsewhere.
//!
//! Every capability is forwarded as one blocking request. Any I/O error,
//! timeout, closed connection, undecodable line or id mismatch surfaces
//! as `StrategyError::Transport`; a fault line surfaces as
//! `StrategyError::Fault`. Deciding what to do about either is the
//! player's job.

use super::{
    address::StrategyAddress,
    protocol::{self, BroadcastParams, DecisionParams, Request, Response},
};
use crate::{
    error::{GameResult, StrategyError, StrategyResult},
    public_info::PublicInformation,
    strategy::{coerce_amount, coerce_flag, Bid, PrivateInformation, Strategy},
};
use serde_json::Value;
use std::{
    io::{BufRead, BufReader, Write},
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

struct Connection {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

pub struct RemoteStrategy {
    address: StrategyAddress,
    /// Connect and write timeout; also the read timeout outside decisions.
    timeout: Duration,
    decision_timeout: Duration,
    conn: Option<Connection>,
    next_id: u64,
}

impl RemoteStrategy {
    /// Parse the descriptor. No connection is made until the first call.
    pub fn new(descriptor: &str, timeout: Duration) -> GameResult<Self> {
        Ok(Self {
            address: StrategyAddress::parse(descriptor)?,
            timeout,
            decision_timeout: timeout,
            conn: None,
            next_id: 1,
        })
    }

    /// Read timeout for `bid` and `join_launch`. Defaults to the call timeout.
    pub fn with_decision_timeout(mut self, timeout: Duration) -> Self {
        self.decision_timeout = timeout;
        self
    }

    pub fn address(&self) -> &StrategyAddress {
        &self.address
    }

    fn connect(&self) -> StrategyResult<Connection> {
        let targets = (self.address.host.as_str(), self.address.port).to_socket_addrs()?;
        let mut last_err = None;
        for target in targets {
            match TcpStream::connect_timeout(&target, self.timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.timeout))?;
                    stream.set_write_timeout(Some(self.timeout))?;
                    stream.set_nodelay(true)?;
                    let writer = stream.try_clone()?;
                    log::debug!("connected to remote strategy at {}", self.address);
                    return Ok(Connection { reader: BufReader::new(stream), writer });
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(match last_err {
            Some(e) => StrategyError::from(e),
            None => StrategyError::Transport(format!("{} did not resolve", self.address)),
        })
    }

    /// One request/response exchange. Drops the connection on any
    /// transport failure so a later call would reconnect from scratch.
    fn call(&mut self, method: &str, params: Value) -> StrategyResult<Value> {
        let read_timeout = match method {
            protocol::METHOD_BID | protocol::METHOD_JOIN_LAUNCH => self.decision_timeout,
            _ => self.timeout,
        };
        let result = self.exchange(method, params, read_timeout);
        if matches!(result, Err(StrategyError::Transport(_))) {
            self.conn = None;
        }
        result
    }

    fn exchange(&mut self, method: &str, params: Value, read_timeout: Duration) -> StrategyResult<Value> {
        if self.conn.is_none() {
            self.conn = Some(self.connect()?);
        }
        let id = self.next_id;
        self.next_id += 1;

        let request = Request { id, method: method.to_string(), params };
        let mut line = serde_json::to_string(&request)
            .map_err(|e| StrategyError::Transport(format!("cannot encode request: {e}")))?;
        line.push('\n');

        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| StrategyError::Transport("not connected".into()))?;
        conn.reader.get_ref().set_read_timeout(Some(read_timeout))?;
        conn.writer.write_all(line.as_bytes())?;
        conn.writer.flush()?;

        let mut buffer = String::new();
        let bytes_read = conn.reader.read_line(&mut buffer)?;
        if bytes_read == 0 {
            return Err(StrategyError::Transport("connection closed by peer".into()));
        }

        let response: Response = serde_json::from_str(&buffer)
            .map_err(|e| StrategyError::Transport(format!("malformed response: {e}")))?;
        if response.id != id {
            return Err(StrategyError::Transport(format!(
                "response id {} does not match request id {id}",
                response.id
            )));
        }
        if let Some(fault) = response.fault {
            return Err(StrategyError::Fault { code: fault.code, message: fault.message });
        }
        Ok(response.result.unwrap_or(Value::Null))
    }

    fn decision_params(private: &PrivateInformation, public: &PublicInformation) -> StrategyResult<Value> {
        serde_json::to_value(DecisionParams { private: private.clone(), public: public.clone() })
            .map_err(|e| StrategyError::Transport(format!("cannot encode params: {e}")))
    }
}

/// Accepts `[amount, launching]` or `{"amount": .., "launching": ..}`.
/// Anything else is a malformed decision and becomes a pass.
pub fn bid_from_reply(reply: &Value) -> Bid {
    match reply {
        Value::Array(items) => Bid::new(
            items.first().map(coerce_amount).unwrap_or(0),
            items.get(1).map(coerce_flag).unwrap_or(false),
        ),
        Value::Object(fields) => Bid::new(
            fields.get("amount").map(coerce_amount).unwrap_or(0),
            fields.get("launching").map(coerce_flag).unwrap_or(false),
        ),
        other => Bid::new(coerce_amount(other), false),
    }
}

impl Strategy for RemoteStrategy {
    fn label(&self) -> String {
        format!("remote {}", self.address)
    }

    /// Reachability is checked up front.
    fn validate(&mut self) -> StrategyResult<()> {
        match self.ping()? {
            true => Ok(()),
            false => Err(StrategyError::Transport(format!("{} refused ping", self.address))),
        }
    }

    fn bid(&mut self, private: &PrivateInformation, public: &PublicInformation) -> StrategyResult<Bid> {
        let params = Self::decision_params(private, public)?;
        let reply = self.call(protocol::METHOD_BID, params)?;
        Ok(bid_from_reply(&reply))
    }

    fn join_launch(&mut self, private: &PrivateInformation, public: &PublicInformation) -> StrategyResult<bool> {
        let params = Self::decision_params(private, public)?;
        let reply = self.call(protocol::METHOD_JOIN_LAUNCH, params)?;
        Ok(coerce_flag(&reply))
    }

    fn begin(&mut self, private: &PrivateInformation, public: &PublicInformation) -> StrategyResult<()> {
        let params = Self::decision_params(private, public)?;
        self.call(protocol::METHOD_BEGIN, params).map(|_| ())
    }

    fn end(&mut self, private: &PrivateInformation, public: &PublicInformation) -> StrategyResult<()> {
        let params = Self::decision_params(private, public)?;
        self.call(protocol::METHOD_END, params).map(|_| ())
    }

    fn broadcast(&mut self, message: &str) -> StrategyResult<()> {
        let params = serde_json::to_value(BroadcastParams { message: message.to_string() })
            .map_err(|e| StrategyError::Transport(format!("cannot encode params: {e}")))?;
        self.call(protocol::METHOD_BROADCAST, params).map(|_| ())
    }

    fn ping(&mut self) -> StrategyResult<bool> {
        let reply = self.call(protocol::METHOD_PING, Value::Null)?;
        Ok(coerce_flag(&reply))
    }
}
