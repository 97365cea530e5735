use std::collections::HashSet;
use std::fmt::Display;
use std::future::Future;

use log::warn;
use serde_json::Value;
use url::Url;

use crate::types::WalletCandidate;

/// Accounts as reported by the wallet, or empty when the payload is not an
/// array of strings.
pub fn coerce_accounts(value: &Value) -> Vec<String> {
    value
        .as_array()
        .and_then(|items| {
            items
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
        })
        .unwrap_or_default()
}

/// Drop candidates whose [`WalletCandidate::dedup_key`] was already seen.
/// The first occurrence wins and order is preserved.
pub fn dedupe_candidates(candidates: Vec<WalletCandidate>) -> Vec<WalletCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.dedup_key().to_string()))
        .collect()
}

/// Run an optional step. A failure is logged and turned into `None`, it never
/// reaches the caller of the surrounding operation.
pub async fn best_effort<T, E, F>(step: &str, fut: F) -> Option<T>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match fut.await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{step} failed, continuing without it: {e}");
            None
        }
    }
}

pub fn is_data_uri(value: &str) -> bool {
    Url::parse(value)
        .map(|u| u.scheme() == "data")
        .unwrap_or(false)
}
