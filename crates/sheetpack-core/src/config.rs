use serde::{Deserialize, Serialize};

/// Packing configuration.
/// Key notes:
///   - `sort_by_height` only changes the order frames are visited in; sprite ids keep input order
///   - `max_sheet_size` bounds the initial estimate, not the grown canvas
///   - `debug_overlay` paints leftover free rectangles onto the composed sheet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackerConfig {
    /// Visit frames tallest first (stable).
    #[serde(default = "default_sort_by_height")]
    pub sort_by_height: bool,
    /// Largest accepted side for the estimated square sheet, in pixels.
    #[serde(default = "default_max_sheet_size")]
    pub max_sheet_size: u32,
    /// Alignment applied to the square root of the total frame area.
    #[serde(default = "default_size_alignment")]
    pub size_alignment: u32,
    /// The estimate is padded by `size / size_adjustment`.
    #[serde(default = "default_size_adjustment")]
    pub size_adjustment: u32,
    /// Fill remaining free rectangles with their debug color (debug).
    #[serde(default)]
    pub debug_overlay: bool,
    /// Run overlap and pixel checks on the composed sheet.
    #[serde(default)]
    pub verify: bool,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            sort_by_height: default_sort_by_height(),
            max_sheet_size: default_max_sheet_size(),
            size_alignment: default_size_alignment(),
            size_adjustment: default_size_adjustment(),
            debug_overlay: false,
            verify: false,
        }
    }
}

impl PackerConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - `max_sheet_size` is zero
    /// - `size_alignment` is zero or not a power of two
    /// - `size_adjustment` is zero
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::SheetPackError;

        if self.max_sheet_size == 0 {
            return Err(SheetPackError::InvalidConfig(
                "max_sheet_size must be greater than zero".into(),
            ));
        }
        if self.size_alignment == 0 || !self.size_alignment.is_power_of_two() {
            return Err(SheetPackError::InvalidConfig(format!(
                "size_alignment ({}) must be a non-zero power of two",
                self.size_alignment
            )));
        }
        if self.size_adjustment == 0 {
            return Err(SheetPackError::InvalidConfig(
                "size_adjustment must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}

fn default_sort_by_height() -> bool {
    true
}
fn default_max_sheet_size() -> u32 {
    4096
}
fn default_size_alignment() -> u32 {
    8
}
fn default_size_adjustment() -> u32 {
    16
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn sort_by_height(mut self, v: bool) -> Self {
        self.cfg.sort_by_height = v;
        self
    }
    pub fn max_sheet_size(mut self, v: u32) -> Self {
        self.cfg.max_sheet_size = v;
        self
    }
    pub fn size_alignment(mut self, v: u32) -> Self {
        self.cfg.size_alignment = v;
        self
    }
    pub fn size_adjustment(mut self, v: u32) -> Self {
        self.cfg.size_adjustment = v;
        self
    }
    pub fn debug_overlay(mut self, v: bool) -> Self {
        self.cfg.debug_overlay = v;
        self
    }
    pub fn verify(mut self, v: bool) -> Self {
        self.cfg.verify = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(PackerConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_odd_alignment() {
        let cfg = PackerConfig::builder().size_alignment(6).build();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: PackerConfig = serde_json::from_str(r#"{"debug_overlay": true}"#).unwrap();
        assert!(cfg.debug_overlay);
        assert!(cfg.sort_by_height);
        assert_eq!(cfg.max_sheet_size, 4096);
    }
}
