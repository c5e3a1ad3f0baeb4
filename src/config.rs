// src/config.rs
//
// YAML config loading. Values are validated on load so a bad threshold
// fails at startup instead of silently disabling the boundary analysis.

use crate::types::Config;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.boundary.blur_kernel % 2 == 0 {
            bail!("boundary.blur_kernel must be odd, got {}", self.boundary.blur_kernel);
        }
        if self.boundary.max_stripe_angle_deg <= 0.0 {
            bail!(
                "boundary.max_stripe_angle_deg must be positive, got {}",
                self.boundary.max_stripe_angle_deg
            );
        }
        if self.cues.slow_tempo <= 0.0 {
            bail!("cues.slow_tempo must be positive, got {}", self.cues.slow_tempo);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_error_names_the_path() {
        let err = Config::load("does/not/exist.yaml").unwrap_err();
        assert!(format!("{err:#}").contains("does/not/exist.yaml"));
    }

    #[test]
    fn test_partial_yaml_rejects_even_kernel() {
        let yaml = "
boundary:
  blur_kernel: 14
  blur_sigma: 6.0
  white_sat_max: 80
  white_val_min: 180
  gray_threshold: 180
  min_stripe_area: 2000
  max_stripe_angle_deg: 15.0
guidance:
  detector_to_view_scale: 2.0
  view_width: 640.0
cues:
  flash_window_ms: 1000
  audio_stop_delay_ms: 1000
  audio_silence_timeout_ms: 3000
  slow_tempo: 0.5
language: en
logging:
  level: info
";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_defaults_pass_validation() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_load_roundtrips_through_file() {
        let path = std::env::temp_dir().join("crossight_config_test.yaml");
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        fs::write(&path, yaml).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.boundary.min_stripe_area, 2000);
        assert_eq!(config.cues.slow_tempo, 0.5);

        let _ = fs::remove_file(&path);
    }
}
