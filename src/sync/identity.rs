use std::collections::BTreeMap;
use std::fmt;

/// Read endpoints the cache knows how to key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Endpoint {
    Status,
    Config,
    Logs,
    Events,
}

impl Endpoint {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Config => "config",
            Self::Logs => "logs",
            Self::Events => "events",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cache key: endpoint plus its parameters.
///
/// Parameters live in a `BTreeMap`, so two identities built from the same
/// pairs in any order hash and compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryIdentity {
    pub endpoint: Endpoint,
    pub params: BTreeMap<String, String>,
}

impl QueryIdentity {
    #[must_use]
    pub const fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            params: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn with_params(endpoint: Endpoint, params: BTreeMap<String, String>) -> Self {
        Self { endpoint, params }
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

impl fmt::Display for QueryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint.as_str())?;
        for (i, (key, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_equality_is_structural() {
        let a = QueryIdentity::with_params(
            Endpoint::Events,
            params(&[("page", "1"), ("pageSize", "50"), ("unitName", "101")]),
        );
        let b = QueryIdentity::with_params(
            Endpoint::Events,
            params(&[("unitName", "101"), ("pageSize", "50"), ("page", "1")]),
        );
        assert_eq!(a, b);

        let mut map = HashMap::new();
        map.insert(a, 1);
        assert_eq!(map.get(&b), Some(&1));
    }

    #[test]
    fn test_endpoint_and_values_distinguish() {
        let events = QueryIdentity::with_params(Endpoint::Events, params(&[("page", "1")]));
        let logs = QueryIdentity::with_params(Endpoint::Logs, params(&[("page", "1")]));
        let page2 = QueryIdentity::with_params(Endpoint::Events, params(&[("page", "2")]));
        assert_ne!(events, logs);
        assert_ne!(events, page2);
    }

    #[test]
    fn test_display_is_stable() {
        let identity = QueryIdentity::with_params(
            Endpoint::Logs,
            params(&[("pageSize", "100"), ("level", "error"), ("page", "2")]),
        );
        assert_eq!(identity.to_string(), "logs?level=error&page=2&pageSize=100");
        assert_eq!(QueryIdentity::new(Endpoint::Status).to_string(), "status");
    }
}
