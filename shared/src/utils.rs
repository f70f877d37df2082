use std::{future::Future, time::Duration};

use alloy_primitives::{Address, U256};
use tokio::time::sleep;

/// Decimals of the chain's native currency.
pub const NATIVE_DECIMALS: usize = 18;

pub const DESCRIPTION_PREVIEW: usize = 60;

pub async fn retry<T, E, F, Fut, P>(
    retry_fn: F,
    max_retries: u32,
    delay: u64,
    should_retry: P,
) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
    F: Fn() -> Fut,
    P: Fn(&E) -> bool, {
    let mut retries = 0;
    let d = Duration::from_millis(delay);
    loop {
        match retry_fn().await {
            Ok(value) => return Ok(value),
            Err(err) if retries < max_retries && should_retry(&err) => {
                retries += 1;
                tracing::debug!("retrying ({retries}/{max_retries})");
                sleep(d).await;
            }
            Err(err) => {
                return Err(err);
            }
        }
    }
}

/// Renders `amount` scaled down by `decimals`, without trailing fractional zeros.
pub fn format_units(amount: U256, decimals: usize) -> String {
    let digits = amount.to_string();
    if decimals == 0 {
        return digits;
    }
    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (int, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        int.to_string()
    } else {
        format!("{int}.{frac}")
    }
}

/// Native-token amount in wei, in whole units of `currency`.
pub fn format_reward(amount: U256, currency: &str) -> String {
    format!("{} {currency}", format_units(amount, NATIVE_DECIMALS))
}

pub fn shorten_text(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max).collect();
    format!("{head}...")
}

pub fn shorten_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}
