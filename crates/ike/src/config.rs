//! Fragmentation configuration
//!
//! Controls whether outbound encrypted messages are split into SKF
//! fragments (RFC 7383) and how large each fragment packet may be.

use crate::ikev2::constants::{
    GENERIC_PAYLOAD_HEADER_SIZE, IKE_HEADER_SIZE, MAX_IKE_MESSAGE_SIZE, SKF_HEADER_SIZE,
};
use crate::{Error, Result};

/// Default maximum fragment packet size (IPv6 minimum MTU)
pub const DEFAULT_MAX_FRAGMENT_SIZE: usize = 1280;

/// Outbound fragmentation settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentationConfig {
    /// Split messages that exceed `max_fragment_size`
    pub enabled: bool,

    /// Maximum size of one IKE packet, headers included
    pub max_fragment_size: usize,
}

impl Default for FragmentationConfig {
    fn default() -> Self {
        FragmentationConfig {
            enabled: false,
            max_fragment_size: DEFAULT_MAX_FRAGMENT_SIZE,
        }
    }
}

impl FragmentationConfig {
    /// Create builder for fragmentation configuration
    pub fn builder() -> FragmentationConfigBuilder {
        FragmentationConfigBuilder::new()
    }

    /// Fragmentation disabled
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Fragmentation enabled with the given packet size
    pub fn enabled(max_fragment_size: usize) -> Result<Self> {
        Self::builder()
            .with_enabled(true)
            .with_max_fragment_size(max_fragment_size)
            .build()
    }

    /// Validate configuration
    ///
    /// The size must leave room for the fixed headers of an SKF packet and
    /// fit in the IKE length field.
    pub fn validate(&self) -> Result<()> {
        let fixed = IKE_HEADER_SIZE + GENERIC_PAYLOAD_HEADER_SIZE + SKF_HEADER_SIZE;
        if self.max_fragment_size <= fixed {
            return Err(Error::InvalidParameter(format!(
                "max_fragment_size must exceed {} bytes of SKF headers, got {}",
                fixed, self.max_fragment_size
            )));
        }
        if self.max_fragment_size > MAX_IKE_MESSAGE_SIZE as usize {
            return Err(Error::InvalidParameter(format!(
                "max_fragment_size cannot exceed {}, got {}",
                MAX_IKE_MESSAGE_SIZE, self.max_fragment_size
            )));
        }
        Ok(())
    }
}

/// Builder for FragmentationConfig
#[derive(Default)]
pub struct FragmentationConfigBuilder {
    enabled: Option<bool>,
    max_fragment_size: Option<usize>,
}

impl FragmentationConfigBuilder {
    /// Create new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable fragmentation
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Set maximum fragment packet size
    pub fn with_max_fragment_size(mut self, size: usize) -> Self {
        self.max_fragment_size = Some(size);
        self
    }

    /// Build configuration
    pub fn build(self) -> Result<FragmentationConfig> {
        let defaults = FragmentationConfig::default();
        let config = FragmentationConfig {
            enabled: self.enabled.unwrap_or(defaults.enabled),
            max_fragment_size: self.max_fragment_size.unwrap_or(defaults.max_fragment_size),
        };

        config.validate()?;
        Ok(config)
    }
}
