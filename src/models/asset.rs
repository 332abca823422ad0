//! Assets a swap can spend or receive.

use std::{fmt, str::FromStr};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{NATIVE_ALIASES, NATIVE_SENTINEL_ADDRESS},
    models::ConfigError,
};

/// Either the chain's native currency or an ERC-20 token.
///
/// A token's decimals may be supplied up front; when they are not, the executor
/// fetches them once through `decimals()` and reuses the value for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    Native,
    Token {
        address: Address,
        decimals: Option<u8>,
    },
}

impl Asset {
    pub fn token(address: Address) -> Self {
        Asset::Token {
            address,
            decimals: None,
        }
    }

    pub fn token_with_decimals(address: Address, decimals: u8) -> Self {
        Asset::Token {
            address,
            decimals: Some(decimals),
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }

    /// Returns a copy with the given decimals; no-op for the native currency.
    pub fn with_decimals(self, decimals: u8) -> Self {
        match self {
            Asset::Native => Asset::Native,
            Asset::Token { address, .. } => Asset::token_with_decimals(address, decimals),
        }
    }
}

impl FromStr for Asset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if NATIVE_ALIASES
            .iter()
            .any(|alias| trimmed.eq_ignore_ascii_case(alias))
            || trimmed.eq_ignore_ascii_case(NATIVE_SENTINEL_ADDRESS)
        {
            return Ok(Asset::Native);
        }

        trimmed
            .parse::<Address>()
            .map(Asset::token)
            .map_err(|_| ConfigError::InvalidAsset(s.to_string()))
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => write!(f, "native"),
            Asset::Token { address, .. } => write!(f, "{address}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_parse_native_aliases() {
        assert_eq!("native".parse::<Asset>().unwrap(), Asset::Native);
        assert_eq!("ETH".parse::<Asset>().unwrap(), Asset::Native);
        assert_eq!(
            "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"
                .parse::<Asset>()
                .unwrap(),
            Asset::Native
        );
    }

    #[test]
    fn test_parse_token_address() {
        let asset: Asset = " 0x742d35Cc6634C0532925a3b844Bc454e4438f44e "
            .parse()
            .unwrap();
        assert_eq!(
            asset,
            Asset::token(address!("742d35Cc6634C0532925a3b844Bc454e4438f44e"))
        );
        assert!(!asset.is_native());
    }

    #[test]
    fn test_parse_invalid_asset() {
        let err = "not-an-address".parse::<Asset>().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAsset(_)));
    }

    #[test]
    fn test_with_decimals() {
        let token = Asset::token(Address::repeat_byte(0x11)).with_decimals(6);
        assert_eq!(
            token,
            Asset::Token {
                address: Address::repeat_byte(0x11),
                decimals: Some(6)
            }
        );
        assert_eq!(Asset::Native.with_decimals(18), Asset::Native);
    }
}
