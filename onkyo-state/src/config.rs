//! Session configuration
//!
//! Everything the session would otherwise read from application preferences
//! is passed in here at construction time.

use std::time::Duration;

use onkyo_api::InputSelector;
use serde::Deserialize;

use crate::error::{Result, SessionError};

/// Configuration for a [`Session`](crate::Session)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Coalescing window for state change notifications
    /// Default: 500 ms
    pub refresh_delay: Duration,

    /// Number of time info messages ignored after a seek
    /// Default: 2
    pub time_skip_after_seek: u32,

    /// Upper bound on circular auto-play retransmissions, `None` for unbounded
    /// Default: None
    pub autoplay_retry_limit: Option<u32>,

    /// Send the power-state query group when the session starts
    /// Default: true
    pub send_initial_queries: bool,

    /// Input selectors that behave like USB storage
    /// Default: [UsbFront, UsbRear]
    pub usb_selectors: Vec<InputSelector>,

    /// Model name to report until (or unless) the receiver describes itself
    /// Default: None
    pub model: Option<String>,

    /// Offset used in structured list requests
    /// Default: 0
    pub xml_list_offset: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_delay: Duration::from_millis(500),
            time_skip_after_seek: 2,
            autoplay_retry_limit: None,
            send_initial_queries: true,
            usb_selectors: vec![InputSelector::UsbFront, InputSelector::UsbRear],
            model: None,
            xml_list_offset: 0,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.refresh_delay.is_zero() {
            return Err(SessionError::Configuration(
                "refresh delay must be greater than 0".to_string(),
            ));
        }
        if self.autoplay_retry_limit == Some(0) {
            return Err(SessionError::Configuration(
                "autoplay retry limit of 0 disables auto-play; use None or a positive bound"
                    .to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_usb_selector(&self, selector: InputSelector) -> bool {
        self.usb_selectors.contains(&selector)
    }

    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    pub fn with_time_skip_after_seek(mut self, count: u32) -> Self {
        self.time_skip_after_seek = count;
        self
    }

    pub fn with_autoplay_retry_limit(mut self, limit: u32) -> Self {
        self.autoplay_retry_limit = Some(limit);
        self
    }

    pub fn with_initial_queries(mut self, enabled: bool) -> Self {
        self.send_initial_queries = enabled;
        self
    }

    pub fn with_usb_selectors(mut self, selectors: Vec<InputSelector>) -> Self {
        self.usb_selectors = selectors;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_xml_list_offset(mut self, offset: u16) -> Self {
        self.xml_list_offset = offset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.refresh_delay, Duration::from_millis(500));
        assert_eq!(config.time_skip_after_seek, 2);
        assert_eq!(config.autoplay_retry_limit, None);
        assert!(config.send_initial_queries);
        assert!(config.is_usb_selector(InputSelector::UsbRear));
        assert!(!config.is_usb_selector(InputSelector::Net));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = SessionConfig::new().with_refresh_delay(Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(SessionError::Configuration(_))
        ));

        let config = SessionConfig::new().with_autoplay_retry_limit(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_config_from_json() {
        let config: SessionConfig = serde_json::from_str(
            r#"{ "time_skip_after_seek": 3, "model": "TX-8270", "usb_selectors": ["UsbFront"] }"#,
        )
        .unwrap();
        assert_eq!(config.time_skip_after_seek, 3);
        assert_eq!(config.model.as_deref(), Some("TX-8270"));
        assert_eq!(config.usb_selectors, vec![InputSelector::UsbFront]);
        assert_eq!(config.refresh_delay, Duration::from_millis(500));
    }
}
