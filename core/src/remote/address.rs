use crate::error::{GameError, GameResult};
use std::fmt;

/// `[identifier@]host:port`. The identifier is cosmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyAddress {
    pub identifier: Option<String>,
    pub host: String,
    pub port: u16,
}

impl StrategyAddress {
    pub fn parse(descriptor: &str) -> GameResult<Self> {
        let invalid = |reason: &str| GameError::InvalidAddress {
            address: descriptor.to_string(),
            reason: reason.to_string(),
        };

        let (identifier, location) = match descriptor.rsplit_once('@') {
            Some((id, loc)) => (Some(id.to_string()).filter(|s| !s.is_empty()), loc),
            None => (None, descriptor),
        };
        let (host, port) = location
            .trim()
            .rsplit_once(':')
            .ok_or_else(|| invalid("expected host:port"))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(invalid("empty host"));
        }
        let port: u16 = port.parse().map_err(|_| invalid("port is not a number in 0..=65535"))?;
        Ok(Self { identifier, host: host.to_string(), port })
    }

    /// True when the descriptor looks like an address rather than a policy name.
    pub fn looks_like_address(descriptor: &str) -> bool {
        descriptor.contains(':') || descriptor.contains('@')
    }
}

impl fmt::Display for StrategyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_is_optional_and_ignored_for_location() {
        let a = StrategyAddress::parse("ati@10.0.0.5:49000").unwrap();
        assert_eq!(a.identifier.as_deref(), Some("ati"));
        assert_eq!(a.to_string(), "10.0.0.5:49000");

        let b = StrategyAddress::parse("localhost:49001").unwrap();
        assert_eq!(b.identifier, None);
        assert_eq!(b.host, "localhost");
        assert_eq!(b.port, 49001);
    }

    #[test]
    fn ipv6_hosts_keep_brackets_in_display() {
        let a = StrategyAddress::parse("[::1]:5000").unwrap();
        assert_eq!(a.host, "::1");
        assert_eq!(a.to_string(), "[::1]:5000");
    }

    #[test]
    fn rejects_garbage() {
        assert!(StrategyAddress::parse("nobody@").is_err());
        assert!(StrategyAddress::parse("host:notaport").is_err());
        assert!(StrategyAddress::parse(":80").is_err());
        assert!(StrategyAddress::parse("host:70000").is_err());
    }

    #[test]
    fn tells_addresses_from_policy_names() {
        assert!(StrategyAddress::looks_like_address("a@b:1"));
        assert!(StrategyAddress::looks_like_address("localhost:49000"));
        assert!(!StrategyAddress::looks_like_address("sponge_bob"));
    }
}
