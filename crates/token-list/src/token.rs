use std::collections::HashMap;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::network::NetworkId;

/// Token metadata. Only `address` is meaningful to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    pub address: String,

    pub symbol: String,

    pub name: String,

    pub decimals: u8,

    /// Address of the same token on mainnet, for bridged tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_mainnet: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl TokenDetails {
    pub fn new(address: &str, symbol: &str, name: &str, decimals: u8) -> Self {
        Self {
            id: None,
            address: address.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            decimals,
            address_mainnet: None,
            image: None,
        }
    }

    /// Format an amount in base units using this token's decimals.
    pub fn format_amount(&self, amount: &BigUint) -> String {
        format_with_decimals(amount, self.decimals)
    }
}

fn format_with_decimals(amount: &BigUint, decimals: u8) -> String {
    let s = amount.to_string();
    let decimals = decimals as usize;

    if decimals == 0 {
        return s;
    }

    // Left-pad so there is always at least one integer digit.
    let padded = if s.len() <= decimals {
        format!("{}{s}", "0".repeat(decimals + 1 - s.len()))
    } else {
        s
    };

    let (integer_part, decimal_part) = padded.split_at(padded.len() - decimals);
    let trimmed = decimal_part.trim_end_matches('0');
    if trimmed.is_empty() {
        integer_part.to_string()
    } else {
        format!("{integer_part}.{trimmed}")
    }
}

/// Trait for read-only default token lists.
pub trait TokenSource {
    fn tokens_by_network(&self, network_id: NetworkId) -> Vec<TokenDetails>;
}

/// A token source with no tokens on any network.
pub struct EmptyTokenSource;

impl TokenSource for EmptyTokenSource {
    fn tokens_by_network(&self, _network_id: NetworkId) -> Vec<TokenDetails> {
        Vec::new()
    }
}

/// In-memory token source, filled programmatically.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenList {
    tokens: HashMap<NetworkId, Vec<TokenDetails>>,
}

impl StaticTokenList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, network_id: NetworkId, token: TokenDetails) {
        self.tokens.entry(network_id).or_default().push(token);
    }

    pub fn with_tokens(mut self, network_id: NetworkId, tokens: Vec<TokenDetails>) -> Self {
        self.tokens.entry(network_id).or_default().extend(tokens);
        self
    }
}

impl TokenSource for StaticTokenList {
    fn tokens_by_network(&self, network_id: NetworkId) -> Vec<TokenDetails> {
        self.tokens.get(&network_id).cloned().unwrap_or_default()
    }
}

const BUILTIN_TOKEN_LIST_JSON: &str = include_str!("../data/token_list.json");

/// The default token list shipped with the crate.
///
/// The embedded document maps a network id (as a string) to its ordered
/// token list.
#[derive(Debug, Clone)]
pub struct BuiltinTokenList {
    inner: StaticTokenList,
}

impl BuiltinTokenList {
    pub fn new() -> Self {
        Self::from_json(BUILTIN_TOKEN_LIST_JSON).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Built-in token list is malformed, using empty list");
            Self {
                inner: StaticTokenList::new(),
            }
        })
    }

    /// Parse a token list document of the form `{ "<networkId>": [TokenDetails] }`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let by_network: HashMap<NetworkId, Vec<TokenDetails>> = serde_json::from_str(json)?;
        Ok(Self {
            inner: StaticTokenList {
                tokens: by_network,
            },
        })
    }
}

impl Default for BuiltinTokenList {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenSource for BuiltinTokenList {
    fn tokens_by_network(&self, network_id: NetworkId) -> Vec<TokenDetails> {
        self.inner.tokens_by_network(network_id)
    }
}
