use serde::{Deserialize, Serialize};

/// Identity-tree depth used when nothing else is configured.
pub const DEFAULT_MT_LEVEL: usize = 40;
/// Comparison-value array length used when nothing else is configured.
pub const DEFAULT_VALUE_ARRAY_SIZE: usize = 64;
/// Global identity-state tree depth used when nothing else is configured.
pub const DEFAULT_MT_LEVEL_ON_CHAIN: usize = 64;
/// Credential content-merklization depth used when nothing else is configured.
pub const DEFAULT_MT_LEVEL_CLAIM: usize = 32;

/// Depth and array-size parameters of one circuit build.
///
/// The encoder that produced a prover input and the decoder that reads the
/// prover's output must agree on these values, otherwise decoding fails on a
/// length mismatch. Unset values fall back to the `DEFAULT_*` constants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mt_level: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mt_level_on_chain: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mt_level_claim: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value_array_size: Option<usize>,
}

impl CircuitParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mt_level(mut self, levels: usize) -> Self {
        self.mt_level = Some(levels);
        self
    }

    pub fn with_mt_level_on_chain(mut self, levels: usize) -> Self {
        self.mt_level_on_chain = Some(levels);
        self
    }

    pub fn with_mt_level_claim(mut self, levels: usize) -> Self {
        self.mt_level_claim = Some(levels);
        self
    }

    pub fn with_value_array_size(mut self, size: usize) -> Self {
        self.value_array_size = Some(size);
        self
    }

    pub fn mt_level(&self) -> usize {
        self.mt_level.unwrap_or(DEFAULT_MT_LEVEL)
    }

    pub fn mt_level_on_chain(&self) -> usize {
        self.mt_level_on_chain.unwrap_or(DEFAULT_MT_LEVEL_ON_CHAIN)
    }

    pub fn mt_level_claim(&self) -> usize {
        self.mt_level_claim.unwrap_or(DEFAULT_MT_LEVEL_CLAIM)
    }

    pub fn value_array_size(&self) -> usize {
        self.value_array_size.unwrap_or(DEFAULT_VALUE_ARRAY_SIZE)
    }

    /// Layer `overrides` on top of `self`: every value set in `overrides` wins.
    pub fn merged(self, overrides: &CircuitParams) -> Self {
        Self {
            mt_level: overrides.mt_level.or(self.mt_level),
            mt_level_on_chain: overrides.mt_level_on_chain.or(self.mt_level_on_chain),
            mt_level_claim: overrides.mt_level_claim.or(self.mt_level_claim),
            value_array_size: overrides.value_array_size.or(self.value_array_size),
        }
    }
}
