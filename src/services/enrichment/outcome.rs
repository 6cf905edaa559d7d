use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::error::ClientError;

/// Outcome of one remote lookup inside an enrichment phase.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    /// The provider answered but had nothing for this key.
    Missing,
    Failed(String),
}

impl<T> Lookup<T> {
    pub fn from_result(result: Result<T, ClientError>) -> Self {
        match result {
            Ok(value) => Lookup::Found(value),
            Err(ClientError::NotFound(_)) => Lookup::Missing,
            Err(err) => Lookup::Failed(err.to_string()),
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Lookup<U>) -> Lookup<U> {
        match self {
            Lookup::Found(value) => f(value),
            Lookup::Missing => Lookup::Missing,
            Lookup::Failed(reason) => Lookup::Failed(reason),
        }
    }
}

/// What a map stores for a key whose lookup did not succeed.
#[derive(Debug, Clone)]
pub enum DegradePolicy<T> {
    /// Leave the key out.
    Omit,
    /// Store this value instead.
    Substitute(T),
}

/// Fold a phase's outcomes into a map. Unsuccessful lookups never abort the
/// fold; each one is resolved by `policy` on its own.
pub fn resolve<K, T>(
    phase: &str,
    outcomes: Vec<(K, Lookup<T>)>,
    policy: &DegradePolicy<T>,
) -> BTreeMap<K, T>
where
    K: Ord + Debug,
    T: Clone,
{
    let mut resolved = BTreeMap::new();
    for (key, outcome) in outcomes {
        let value = match outcome {
            Lookup::Found(value) => Some(value),
            Lookup::Missing => {
                log::debug!("{}: nothing found for {:?}", phase, key);
                match policy {
                    DegradePolicy::Omit => None,
                    DegradePolicy::Substitute(value) => Some(value.clone()),
                }
            }
            Lookup::Failed(reason) => {
                log::warn!("{}: lookup for {:?} failed: {}", phase, key, reason);
                match policy {
                    DegradePolicy::Omit => None,
                    DegradePolicy::Substitute(value) => Some(value.clone()),
                }
            }
        };
        if let Some(value) = value {
            resolved.insert(key, value);
        }
    }
    resolved
}
