//! Decimal formatting for on-chain integer amounts.

use alloy_primitives::U256;

/// Format a raw amount with the given number of decimals as a decimal string.
///
/// Trailing fractional zeros are trimmed, but one fractional digit is always
/// kept ("1.0", "0.0") to match the common provider-library output shape.
pub fn format_units(amount: U256, decimals: u32) -> String {
    let scale = U256::from(10u64).pow(U256::from(decimals));
    let integer = amount / scale;
    let fraction = amount % scale;

    let mut frac_str = format!("{fraction:0>width$}", width = decimals as usize);
    while frac_str.len() > 1 && frac_str.ends_with('0') {
        frac_str.pop();
    }
    format!("{integer}.{frac_str}")
}

/// Wei to ether (18 decimals).
pub fn format_ether(wei: U256) -> String {
    format_units(wei, 18)
}

/// Wei to gwei (9 decimals).
pub fn format_gwei(wei: U256) -> String {
    format_units(wei, 9)
}
