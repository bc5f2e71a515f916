//! Hosts a local strategy for games running elsewhere.
//!
//! Connections are served one at a time, one request line at a time.
//! Strategy errors become fault lines; the connection stays open.

use super::protocol::{
    self, BroadcastParams, DecisionParams, Request, Response, FAULT_BAD_REQUEST,
    FAULT_STRATEGY, FAULT_UNKNOWN_METHOD,
};
use crate::{
    error::{GameResult, StrategyError},
    strategy::Strategy,
};
use serde_json::{json, Value};
use std::{
    io::{BufRead, BufReader, Write},
    net::{TcpListener, TcpStream},
};

pub struct StrategyServer<S: Strategy> {
    strategy: S,
}

impl<S: Strategy> StrategyServer<S> {
    pub fn new(strategy: S) -> Self {
        Self { strategy }
    }

    /// Accept and serve connections until the listener fails.
    pub fn serve(&mut self, listener: &TcpListener) -> GameResult<()> {
        self.serve_connections(listener, None)
    }

    /// Serve at most `limit` connections, or forever when `None`.
    pub fn serve_connections(&mut self, listener: &TcpListener, limit: Option<usize>) -> GameResult<()> {
        let mut served = 0usize;
        for stream in listener.incoming() {
            let stream = stream?;
            let peer = stream
                .peer_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| "unknown peer".into());
            log::info!("game connected from {peer}");
            if let Err(e) = self.serve_connection(stream) {
                log::warn!("connection from {peer} ended with error: {e}");
            }
            served += 1;
            if limit.is_some_and(|n| served >= n) {
                break;
            }
        }
        Ok(())
    }

    /// Answer request lines until the peer hangs up.
    pub fn serve_connection(&mut self, stream: TcpStream) -> GameResult<()> {
        let mut writer = stream.try_clone()?;
        let mut reader = BufReader::new(stream);
        let mut buffer = String::new();

        loop {
            buffer.clear();
            let bytes_read = reader.read_line(&mut buffer)?;
            if bytes_read == 0 {
                break; // EOF
            }
            if buffer.trim().is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<Request>(&buffer) {
                Ok(request) => self.handle(request),
                Err(e) => Response::fault(0, FAULT_BAD_REQUEST, e.to_string()),
            };
            writeln!(writer, "{}", serde_json::to_string(&response)?)?;
            writer.flush()?;
        }
        Ok(())
    }

    /// Dispatch one request to the hosted strategy.
    pub fn handle(&mut self, request: Request) -> Response {
        let id = request.id;
        match self.dispatch(&request.method, request.params) {
            Ok(result) => Response::ok(id, result),
            Err(fault) => fault.into_response(id),
        }
    }

    fn dispatch(&mut self, method: &str, params: Value) -> Result<Value, DispatchFault> {
        match method {
            protocol::METHOD_BID => {
                let p = decision_params(params)?;
                let bid = self.strategy.bid(&p.private, &p.public)?;
                Ok(json!([bid.amount, bid.launching]))
            }
            protocol::METHOD_JOIN_LAUNCH => {
                let p = decision_params(params)?;
                Ok(json!(self.strategy.join_launch(&p.private, &p.public)?))
            }
            protocol::METHOD_BEGIN => {
                let p = decision_params(params)?;
                self.strategy.begin(&p.private, &p.public)?;
                Ok(Value::Null)
            }
            protocol::METHOD_END => {
                let p = decision_params(params)?;
                self.strategy.end(&p.private, &p.public)?;
                Ok(Value::Null)
            }
            protocol::METHOD_BROADCAST => {
                let p: BroadcastParams = serde_json::from_value(params)
                    .map_err(|e| DispatchFault::BadRequest(e.to_string()))?;
                self.strategy.broadcast(&p.message)?;
                Ok(Value::Null)
            }
            protocol::METHOD_PING => Ok(json!(self.strategy.ping()?)),
            other => Err(DispatchFault::UnknownMethod(other.to_string())),
        }
    }
}

enum DispatchFault {
    UnknownMethod(String),
    BadRequest(String),
    Strategy(StrategyError),
}

impl From<StrategyError> for DispatchFault {
    fn from(e: StrategyError) -> Self {
        DispatchFault::Strategy(e)
    }
}

impl DispatchFault {
    fn into_response(self, id: u64) -> Response {
        match self {
            Self::UnknownMethod(m) => {
                Response::fault(id, FAULT_UNKNOWN_METHOD, format!("unknown method '{m}'"))
            }
            Self::BadRequest(msg) => Response::fault(id, FAULT_BAD_REQUEST, msg),
            Self::Strategy(StrategyError::Fault { code, message }) => Response::fault(id, code, message),
            Self::Strategy(other) => Response::fault(id, FAULT_STRATEGY, other.to_string()),
        }
    }
}

fn decision_params(params: Value) -> Result<DecisionParams, DispatchFault> {
    serde_json::from_value(params).map_err(|e| DispatchFault::BadRequest(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        public_info::PublicInformation,
        strategy::{AlwaysLaunch, PrivateInformation},
    };

    fn decision(method: &str) -> Request {
        let params = DecisionParams {
            private: PrivateInformation {
                name: "x".into(),
                tech: 3,
                bankroll: 100,
                launching: false,
                last_bid: 0,
            },
            public: PublicInformation::new(),
        };
        Request {
            id: 7,
            method: method.into(),
            params: serde_json::to_value(params).unwrap(),
        }
    }

    #[test]
    fn bid_answers_with_a_pair() {
        let mut server = StrategyServer::new(AlwaysLaunch);
        let response = server.handle(decision("bid"));
        assert_eq!(response.id, 7);
        assert_eq!(response.result, Some(json!([0, true])));
        assert!(response.fault.is_none());
    }

    #[test]
    fn unknown_methods_fault() {
        let mut server = StrategyServer::new(AlwaysLaunch);
        let response = server.handle(decision("self_destruct"));
        assert_eq!(response.fault.map(|f| f.code), Some(FAULT_UNKNOWN_METHOD));
    }

    #[test]
    fn malformed_params_fault() {
        let mut server = StrategyServer::new(AlwaysLaunch);
        let response = server.handle(Request { id: 1, method: "bid".into(), params: json!({"x": 1}) });
        assert_eq!(response.fault.map(|f| f.code), Some(FAULT_BAD_REQUEST));
    }
}
