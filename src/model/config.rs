/// Overlay configuration, resolved once per mount.
pub const DEFAULT_BUTTON_PRESS_DURATION_MS: f64 = 250.0;

/// The resolved configuration the overlay runs with. Created at activation
/// from caller overrides merged over defaults and never mutated afterwards;
/// consumers receive it (or the field they need) as an explicit parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DevUiConfig {
    /// How long a tap on a mapped button key keeps the emulated controller
    /// button "held", in milliseconds. Not validated: non-positive values
    /// pass through and simply make taps release on the next frame.
    pub button_press_duration_ms: f64,
}

impl Default for DevUiConfig {
    fn default() -> Self {
        Self {
            button_press_duration_ms: DEFAULT_BUTTON_PRESS_DURATION_MS,
        }
    }
}

/// Caller-supplied partial overrides, passed through the mount façade
/// unmodified and resolved by the overlay controller.
#[derive(Debug, Clone, Copy, Default)]
pub struct DevUiOptions {
    pub button_press_duration_ms: Option<f64>,
}

impl DevUiOptions {
    /// Merge over defaults. A supplied value wins if finite; NaN/inf fall
    /// back to the default rather than poisoning press timing.
    pub fn resolve(self) -> DevUiConfig {
        DevUiConfig {
            button_press_duration_ms: self
                .button_press_duration_ms
                .filter(|d| d.is_finite())
                .unwrap_or(DEFAULT_BUTTON_PRESS_DURATION_MS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_options_resolve_to_defaults() {
        let config = DevUiOptions::default().resolve();
        assert_eq!(config.button_press_duration_ms, 250.0);
    }

    #[test]
    fn test_supplied_duration_wins() {
        let config = DevUiOptions {
            button_press_duration_ms: Some(500.0),
        }
        .resolve();
        assert_eq!(config.button_press_duration_ms, 500.0);
    }

    #[test]
    fn test_non_finite_duration_falls_back() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let config = DevUiOptions {
                button_press_duration_ms: Some(bad),
            }
            .resolve();
            assert_eq!(
                config.button_press_duration_ms, 250.0,
                "non-finite override must not survive resolution"
            );
        }
    }

    #[test]
    fn test_non_positive_duration_is_accepted() {
        // Policy belongs to the consumer; resolution does not clamp.
        let config = DevUiOptions {
            button_press_duration_ms: Some(0.0),
        }
        .resolve();
        assert_eq!(config.button_press_duration_ms, 0.0);
    }
}
