//! Configuration options for range deletion aggregation.

/// Default maximum size of a tombstone start or end user key (8KB).
pub const DEFAULT_MAX_TOMBSTONE_KEY_SIZE: usize = 8 * 1024;

/// Hard ceiling for `max_tombstone_key_size` (1MB).
pub const MAX_TOMBSTONE_KEY_SIZE_LIMIT: usize = 1024 * 1024;

/// Aggregator configuration options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeDelOptions {
    /// Enable extra verification of ingested tombstones.
    ///
    /// When set, a tombstone source that is not sorted by internal key, or a
    /// tombstone whose start or end key exceeds `max_tombstone_key_size`, is
    /// reported as corruption.
    pub paranoid_checks: bool,

    /// Largest start or end user key accepted under `paranoid_checks`.
    pub max_tombstone_key_size: usize,
}

impl Default for RangeDelOptions {
    fn default() -> Self {
        Self {
            paranoid_checks: false,
            max_tombstone_key_size: DEFAULT_MAX_TOMBSTONE_KEY_SIZE,
        }
    }
}

impl RangeDelOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the options.
    pub fn validate(&self) -> crate::Result<()> {
        if self.max_tombstone_key_size == 0 {
            return Err(crate::Error::InvalidConfiguration(
                "max_tombstone_key_size must be non-zero".into(),
            ));
        }

        if self.max_tombstone_key_size > MAX_TOMBSTONE_KEY_SIZE_LIMIT {
            return Err(crate::Error::InvalidConfiguration(format!(
                "max_tombstone_key_size cannot exceed {}",
                MAX_TOMBSTONE_KEY_SIZE_LIMIT
            )));
        }

        Ok(())
    }
}

/// Builder for RangeDelOptions.
#[derive(Debug, Clone, Default)]
pub struct RangeDelOptionsBuilder {
    options: RangeDelOptions,
}

impl RangeDelOptionsBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set paranoid_checks.
    pub fn paranoid_checks(mut self, value: bool) -> Self {
        self.options.paranoid_checks = value;
        self
    }

    /// Set max_tombstone_key_size.
    pub fn max_tombstone_key_size(mut self, size: usize) -> Self {
        self.options.max_tombstone_key_size = size;
        self
    }

    /// Build the options.
    pub fn build(self) -> crate::Result<RangeDelOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}
