use super::constants::*;
use crate::errors::ConfigError;
use crate::network::NetworkType;
use crate::Target;
use consensus_pow::{bits_to_target, target_to_bits};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Network specific relaxation of the standard retargeting rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExceptionPolicy {
    /// Standard retargeting applies to every block
    #[default]
    None,
    /// A block whose timestamp is more than two spacings after its parent may
    /// declare the maximum target. While the parent's height is below
    /// `threshold`, blocks outside that exception are not retarget-checked.
    TimestampGapMinimumDifficulty { threshold: u64 },
}

impl ExceptionPolicy {
    pub fn allows_min_difficulty_after_gap(&self) -> bool {
        matches!(self, ExceptionPolicy::TimestampGapMinimumDifficulty { .. })
    }

    /// Height below which the previous header exempts its successor from retargeting
    pub fn bootstrap_threshold(&self) -> Option<u64> {
        match self {
            ExceptionPolicy::None => None,
            ExceptionPolicy::TimestampGapMinimumDifficulty { threshold } => Some(*threshold),
        }
    }
}

/// Immutable difficulty parameters of one network.
///
/// Fields are private so every instance has passed [`NetworkParams::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkParams {
    network: NetworkType,
    retarget_interval: u64,
    target_timespan: u64,
    target_spacing: u64,
    max_target: Target,
    exception_policy: ExceptionPolicy,
}

impl NetworkParams {
    /// Create a validated parameter set
    pub fn new(
        network: NetworkType,
        retarget_interval: u64,
        target_timespan: u64,
        target_spacing: u64,
        max_target: Target,
        exception_policy: ExceptionPolicy,
    ) -> Result<Self, ConfigError> {
        let params =
            Self { network, retarget_interval, target_timespan, target_spacing, max_target, exception_policy };
        params.validate()?;
        Ok(params)
    }

    /// Reference main network parameters: the `0x1d00ffff` limit with a two
    /// week, 2016 block interval. Illustrative values for a chain without the
    /// minimum difficulty exception, not a deployment registry.
    pub fn mainnet() -> Self {
        Self {
            network: NetworkType::Mainnet,
            retarget_interval: RETARGET_INTERVAL,
            target_timespan: TARGET_TIMESPAN,
            target_spacing: TARGET_SPACING,
            max_target: Target::from(0xffffu64) << 208,
            exception_policy: ExceptionPolicy::None,
        }
    }

    /// Parameters of the public test network. The `0x1e00ffff` limit and the
    /// enforcement height are network specific; the cadence is the shared
    /// 2016 block, ten minute default.
    pub fn testnet() -> Self {
        Self {
            network: NetworkType::Testnet,
            retarget_interval: RETARGET_INTERVAL,
            target_timespan: TARGET_TIMESPAN,
            target_spacing: TARGET_SPACING,
            max_target: Target::from(0xffffu64) << 216,
            exception_policy: ExceptionPolicy::TimestampGapMinimumDifficulty {
                threshold: TESTNET_RETARGET_ENFORCEMENT_HEIGHT,
            },
        }
    }

    /// Built-in parameters for a network identity. Devnets have no built-in
    /// values and must be loaded from configuration.
    pub fn from_network(network: NetworkType) -> Result<Self, ConfigError> {
        match network {
            NetworkType::Mainnet => Ok(Self::mainnet()),
            NetworkType::Testnet => Ok(Self::testnet()),
            NetworkType::Devnet => {
                Err(ConfigError::Invalid("devnet parameters must be loaded from a config file".to_string()))
            }
        }
    }

    /// Parse and validate parameters from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: NetworkConfig = serde_json::from_str(json)?;
        Self::try_from(config)
    }

    /// Load parameters from a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let params = Self::from_json_str(&content)?;
        tracing::info!(network = %params.network, path = %path.display(), "loaded network parameters");
        Ok(params)
    }

    /// Check the configuration-time invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retarget_interval == 0 {
            return Err(ConfigError::Invalid("retarget interval must be positive".to_string()));
        }
        if self.target_spacing == 0 {
            return Err(ConfigError::Invalid("target spacing must be positive".to_string()));
        }
        if self.target_timespan == 0 {
            return Err(ConfigError::Invalid("target timespan must be positive".to_string()));
        }
        if self.target_timespan > MAX_CONFIG_SECONDS || self.target_spacing > MAX_CONFIG_SECONDS {
            return Err(ConfigError::Invalid(format!(
                "target timespan and spacing must not exceed {} seconds",
                MAX_CONFIG_SECONDS
            )));
        }
        if self.retarget_interval.checked_mul(self.target_spacing) != Some(self.target_timespan) {
            return Err(ConfigError::Invalid(format!(
                "target timespan {} does not equal retarget interval {} times spacing {}",
                self.target_timespan, self.retarget_interval, self.target_spacing
            )));
        }
        if self.max_target.is_zero() {
            return Err(ConfigError::Invalid("maximum target must be non-zero".to_string()));
        }
        // Minimum difficulty blocks declare the maximum target in compact form
        if bits_to_target(target_to_bits(&self.max_target))? != self.max_target {
            return Err(ConfigError::Invalid(format!(
                "maximum target {:#x} is not exactly representable in compact form",
                self.max_target
            )));
        }
        Ok(())
    }

    pub fn network(&self) -> NetworkType {
        self.network
    }

    /// Blocks between difficulty recomputations
    pub fn retarget_interval(&self) -> u64 {
        self.retarget_interval
    }

    /// Expected seconds for one retarget interval
    pub fn target_timespan(&self) -> u64 {
        self.target_timespan
    }

    /// Expected seconds between blocks
    pub fn target_spacing(&self) -> u64 {
        self.target_spacing
    }

    /// Easiest acceptable target
    pub fn max_target(&self) -> Target {
        self.max_target
    }

    pub fn max_target_bits(&self) -> u32 {
        target_to_bits(&self.max_target)
    }

    pub fn exception_policy(&self) -> ExceptionPolicy {
        self.exception_policy
    }

    /// Whether the block after `height` is at a retarget boundary
    pub fn is_retarget_height(&self, next_height: u64) -> bool {
        next_height % self.retarget_interval == 0
    }

    /// Seconds after its parent beyond which a block may use minimum difficulty
    pub fn min_difficulty_gap(&self) -> u64 {
        self.target_spacing * MIN_DIFFICULTY_GAP_SPACINGS
    }
}

/// On-disk form of [`NetworkParams`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub network: NetworkType,
    pub retarget_interval: u64,
    pub target_timespan: u64,
    pub target_spacing: u64,
    /// Maximum target in compact form, a number or a hex string such as "0x1e00ffff"
    #[serde(with = "compact_bits")]
    pub max_target_bits: u32,
    #[serde(default)]
    pub exception_policy: ExceptionPolicy,
}

impl TryFrom<NetworkConfig> for NetworkParams {
    type Error = ConfigError;

    fn try_from(config: NetworkConfig) -> Result<Self, Self::Error> {
        let max_target = bits_to_target(config.max_target_bits)?;
        NetworkParams::new(
            config.network,
            config.retarget_interval,
            config.target_timespan,
            config.target_spacing,
            max_target,
            config.exception_policy,
        )
    }
}

impl From<&NetworkParams> for NetworkConfig {
    fn from(params: &NetworkParams) -> Self {
        Self {
            network: params.network,
            retarget_interval: params.retarget_interval,
            target_timespan: params.target_timespan,
            target_spacing: params.target_spacing,
            max_target_bits: params.max_target_bits(),
            exception_policy: params.exception_policy,
        }
    }
}

mod compact_bits {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bits: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:#010x}", bits))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u32),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(bits) => Ok(bits),
            Repr::Text(text) => {
                let digits = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")).unwrap_or(&text);
                u32::from_str_radix(digits, 16).map_err(de::Error::custom)
            }
        }
    }
}
