use std::collections::{HashMap, HashSet};

use crate::address::{normalize_address, AddressNetworkKey};
use crate::config::RegistryConfig;
use crate::network::NetworkId;
use crate::storage::{
    load_token_list, save_token_list, storage_key, KeyValueStore, DEFAULT_STORAGE_KEY_PREFIX,
};
use crate::subscriptions::{Observable, Subscriptions};
use crate::token::{TokenDetails, TokenSource};

/// Per-network token lists: the static default list merged with tokens the
/// user added, which are persisted in a [`KeyValueStore`].
///
/// Subscribers (see [`Observable`]) receive a network's full list after
/// every change.
#[derive(Debug)]
pub struct TokenRegistry<K: KeyValueStore> {
    tokens_by_network: HashMap<NetworkId, Vec<TokenDetails>>,
    token_address_network_set: HashSet<AddressNetworkKey>,
    store: K,
    storage_key_prefix: String,
    subscriptions: Subscriptions<Vec<TokenDetails>>,
}

impl<K: KeyValueStore> TokenRegistry<K> {
    /// Build the registry for `network_ids` using the default storage prefix.
    pub fn new(network_ids: &[NetworkId], source: &dyn TokenSource, store: K) -> Self {
        Self::with_storage_prefix(network_ids, source, store, DEFAULT_STORAGE_KEY_PREFIX)
    }

    /// Build the registry for the configured networks and storage prefix.
    pub fn from_config(config: &RegistryConfig, source: &dyn TokenSource, store: K) -> Self {
        Self::with_storage_prefix(
            &config.network_ids,
            source,
            store,
            &config.storage_key_prefix,
        )
    }

    /// Build the registry, reading user lists from `<prefix><network id>`.
    pub fn with_storage_prefix(
        network_ids: &[NetworkId],
        source: &dyn TokenSource,
        store: K,
        storage_key_prefix: &str,
    ) -> Self {
        let mut registry = Self {
            tokens_by_network: HashMap::new(),
            token_address_network_set: HashSet::new(),
            store,
            storage_key_prefix: storage_key_prefix.to_string(),
            subscriptions: Subscriptions::new(),
        };

        for &network_id in network_ids {
            let token_list = merge_token_lists(
                source.tokens_by_network(network_id),
                registry.user_tokens(network_id),
            );

            for token in &token_list {
                registry
                    .token_address_network_set
                    .insert(AddressNetworkKey::new(&token.address, network_id));
            }

            tracing::debug!(network_id, tokens = token_list.len(), "Loaded token list");
            registry.tokens_by_network.insert(network_id, token_list);
        }

        tracing::info!(
            networks = registry.tokens_by_network.len(),
            tokens = registry.token_address_network_set.len(),
            "Initialized TokenRegistry"
        );

        registry
    }

    /// Current list for a network; empty if the network is unknown.
    pub fn tokens(&self, network_id: NetworkId) -> &[TokenDetails] {
        self.tokens_by_network
            .get(&network_id)
            .map(|tokens| tokens.as_slice())
            .unwrap_or(&[])
    }

    /// Case-insensitive membership test.
    pub fn has_token(&self, network_id: NetworkId, token_address: &str) -> bool {
        self.token_address_network_set
            .contains(&AddressNetworkKey::new(token_address, network_id))
    }

    /// Case-insensitive lookup in the current list.
    pub fn find_token(&self, network_id: NetworkId, token_address: &str) -> Option<&TokenDetails> {
        let address = normalize_address(token_address);
        self.tokens(network_id)
            .iter()
            .find(|token| normalize_address(&token.address) == address)
    }

    /// Networks the registry holds a list for, in ascending order.
    pub fn network_ids(&self) -> Vec<NetworkId> {
        let mut ids: Vec<NetworkId> = self.tokens_by_network.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// The user token list as currently persisted.
    pub fn user_tokens(&self, network_id: NetworkId) -> Vec<TokenDetails> {
        load_token_list(&self.store, &self.storage_key(network_id))
    }

    /// The backing key/value store.
    pub fn store(&self) -> &K {
        &self.store
    }

    /// Same as [`add_tokens`](Self::add_tokens) with a single token.
    pub fn add_token(&mut self, network_id: NetworkId, token: TokenDetails) {
        self.add_tokens(network_id, vec![token]);
    }

    /// Append the tokens not yet known on `network_id`, persist them as user
    /// tokens and notify subscribers. Does nothing if every token is known.
    pub fn add_tokens(&mut self, network_id: NetworkId, tokens: Vec<TokenDetails>) {
        let mut added_tokens = Vec::new();
        for token in tokens {
            let key = AddressNetworkKey::new(&token.address, network_id);
            if !self.token_address_network_set.insert(key) {
                tracing::debug!(network_id, address = %token.address, "Token already listed");
                continue;
            }
            tracing::debug!(
                network_id,
                address = %token.address,
                symbol = %token.symbol,
                "Added new token to user list"
            );
            added_tokens.push(token);
        }
        if added_tokens.is_empty() {
            return;
        }

        self.tokens_by_network
            .entry(network_id)
            .or_default()
            .extend(added_tokens.iter().cloned());
        self.persist_new_user_tokens(network_id, added_tokens);

        if let Some(tokens) = self.tokens_by_network.get(&network_id) {
            self.subscriptions.trigger(tokens);
        }
    }

    /// Replace the list for `network_id` with `token_list`, both in memory
    /// and in storage, then notify subscribers.
    ///
    /// The list is taken as-is: no dedup and no merge with the static
    /// source. The membership index is rebuilt for this network.
    pub fn persist_tokens(&mut self, network_id: NetworkId, token_list: Vec<TokenDetails>) {
        if let Some(previous) = self.tokens_by_network.get(&network_id) {
            for token in previous {
                self.token_address_network_set
                    .remove(&AddressNetworkKey::new(&token.address, network_id));
            }
        }
        for token in &token_list {
            self.token_address_network_set
                .insert(AddressNetworkKey::new(&token.address, network_id));
        }

        let key = self.storage_key(network_id);
        self.tokens_by_network.insert(network_id, token_list);

        let token_list = &self.tokens_by_network[&network_id];
        if let Err(err) = save_token_list(&mut self.store, &key, token_list) {
            tracing::warn!(network_id, key, error = %err, "Failed to persist token list");
        }
        self.subscriptions.trigger(token_list);
    }

    fn storage_key(&self, network_id: NetworkId) -> String {
        storage_key(&self.storage_key_prefix, network_id)
    }

    /// Append newly added tokens to the persisted user list. The static list
    /// is never written.
    fn persist_new_user_tokens(&mut self, network_id: NetworkId, tokens: Vec<TokenDetails>) {
        let key = self.storage_key(network_id);
        let mut user_list = load_token_list(&self.store, &key);
        user_list.extend(tokens);

        if let Err(err) = save_token_list(&mut self.store, &key, &user_list) {
            tracing::warn!(network_id, key, error = %err, "Failed to persist user tokens");
        }
    }
}

impl<K: KeyValueStore> Observable<Vec<TokenDetails>> for TokenRegistry<K> {
    fn subscriptions(&self) -> &Subscriptions<Vec<TokenDetails>> {
        &self.subscriptions
    }
}

/// Concatenate `base` and `new`, keeping the first token seen per
/// lowercase address.
fn merge_token_lists(base: Vec<TokenDetails>, new: Vec<TokenDetails>) -> Vec<TokenDetails> {
    let mut seen_addresses = HashSet::new();
    base.into_iter()
        .chain(new)
        .filter(|token| seen_addresses.insert(normalize_address(&token.address)))
        .collect()
}
