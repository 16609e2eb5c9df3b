use crate::{GasError, Result};

/// Validate wallet address format for EVM chains (`0x` + 40 hex chars)
pub fn validate_wallet_address(address: &str) -> Result<()> {
    let invalid = || GasError::InvalidAddress {
        address: address.to_string(),
    };

    let hex = address.strip_prefix("0x").ok_or_else(invalid)?;
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    Ok(())
}
