//! Display helpers for addresses and fixed-point token amounts.

use ethers::types::U256;
use ethers::utils::format_units;
use crate::error::{Result, WalletError};

/// Decimals declared by the payment token.
pub const TOKEN_DECIMALS: u8 = 6;

const ADDRESS_HEAD: usize = 6;
const ADDRESS_TAIL: usize = 4;
/// Largest exponent ethers' unit conversions accept.
const MAX_UNIT_EXPONENT: u8 = 77;

/// Shortens an address to `0xABCD...7890`. Inputs too short to shorten are returned as is.
pub fn format_address(address: &str) -> String {
    let len = address.chars().count();
    if len < ADDRESS_HEAD + ADDRESS_TAIL {
        return address.to_string();
    }

    let head: String = address.chars().take(ADDRESS_HEAD).collect();
    let tail: String = address.chars().skip(len - ADDRESS_TAIL).collect();
    format!("{}...{}", head, tail)
}

pub fn parse_amount(text: &str) -> Result<U256> {
    parse_amount_with(text, TOKEN_DECIMALS)
}

/// Parses a non-negative decimal string into an integer scaled by `10^decimals`.
pub fn parse_amount_with(text: &str, decimals: u8) -> Result<U256> {
    let text = text.trim();
    let invalid = |reason: &str| WalletError::InvalidAmount(format!("{:?}: {}", text, reason));

    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("empty amount"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("not a non-negative decimal number"));
    }
    if fraction.len() > decimals as usize {
        return Err(invalid(&format!("more than {} fractional digits", decimals)));
    }

    // Scale by appending the fraction padded to `decimals` digits; from_dec_str rejects overflow
    let scaled = format!("{}{:0<width$}", whole, fraction, width = decimals as usize);
    if scaled.is_empty() {
        return Err(invalid("empty amount"));
    }

    U256::from_dec_str(&scaled).map_err(|e| invalid(&format!("out of range: {:?}", e)))
}

pub fn format_amount(amount: U256) -> String {
    format_amount_with(amount, TOKEN_DECIMALS)
}

/// Renders a scaled integer as a decimal string, keeping at least one fractional digit.
pub fn format_amount_with(amount: U256, decimals: u8) -> String {
    let rendered = if decimals > MAX_UNIT_EXPONENT {
        split_digits(&amount.to_string(), decimals as usize)
    } else {
        match format_units(amount, u32::from(decimals)) {
            Ok(rendered) => rendered,
            Err(_) => split_digits(&amount.to_string(), decimals as usize),
        }
    };

    match rendered.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{}.0", whole)
            } else {
                format!("{}.{}", whole, fraction)
            }
        }
        None => format!("{}.0", rendered),
    }
}

fn split_digits(digits: &str, decimals: usize) -> String {
    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    format!("{}.{}", whole, fraction)
}
