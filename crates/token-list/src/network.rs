/// Identifier partitioning all token state (EVM chain id).
pub type NetworkId = u64;

pub const MAINNET: NetworkId = 1;
pub const RINKEBY: NetworkId = 4;
pub const XDAI: NetworkId = 100;

/// Known network ids → human-readable names.
pub fn network_name(network_id: NetworkId) -> String {
    match network_id {
        1 => "Mainnet".to_string(),
        4 => "Rinkeby".to_string(),
        5 => "Goerli".to_string(),
        10 => "Optimism".to_string(),
        56 => "BNB Chain".to_string(),
        100 => "xDAI".to_string(),
        137 => "Polygon".to_string(),
        8453 => "Base".to_string(),
        42161 => "Arbitrum One".to_string(),
        11155111 => "Sepolia".to_string(),
        _ => format!("Network {network_id}"),
    }
}
