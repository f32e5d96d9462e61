//! Version chain configuration.

use serde::{Deserialize, Serialize};

/// Default number of versions kept in the active chain.
pub const DEFAULT_MAX_CHAIN_LENGTH: usize = 150;

/// Version chain settings.
///
/// # Examples
///
/// ```
/// use u_cpm::history::ChainConfig;
///
/// let config = ChainConfig::default().with_max_chain_length(20);
/// assert_eq!(config.max_chain_length(), 20);
///
/// // Zero falls back to the default cap.
/// assert_eq!(ChainConfig::default().with_max_chain_length(0).max_chain_length(), 150);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Maximum versions kept in the active chain; the oldest is evicted first.
    max_chain_length: usize,
}

impl ChainConfig {
    /// Sets the chain cap. A cap of zero falls back to
    /// [`DEFAULT_MAX_CHAIN_LENGTH`].
    pub fn with_max_chain_length(mut self, max_chain_length: usize) -> Self {
        self.max_chain_length = max_chain_length;
        self
    }

    /// Effective chain cap.
    pub fn max_chain_length(&self) -> usize {
        if self.max_chain_length == 0 {
            DEFAULT_MAX_CHAIN_LENGTH
        } else {
            self.max_chain_length
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_chain_length: DEFAULT_MAX_CHAIN_LENGTH,
        }
    }
}
