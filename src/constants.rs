use std::time::Duration;

// https://eips.ethereum.org/EIPS/eip-6963
pub const EIP6963_REQUEST_EVENT: &str = "eip6963:requestProvider";
pub const EIP6963_ANNOUNCE_EVENT: &str = "eip6963:announceProvider";

pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_millis(150);
pub const DEFAULT_CONNECTOR_INFO_TIMEOUT: Duration = Duration::from_millis(1000);

pub const UNKNOWN_WALLET_NAME: &str = "Unknown Wallet";
pub const UNKNOWN_CONNECTOR_NAME: &str = "Unknown";

// https://eips.ethereum.org/EIPS/eip-1193#provider-errors
pub const USER_REJECTED_REQUEST: i64 = 4001;
pub const UNAUTHORIZED: i64 = 4100;
pub const UNSUPPORTED_METHOD: i64 = 4200;
pub const DISCONNECTED: i64 = 4900;
pub const CHAIN_DISCONNECTED: i64 = 4901;
