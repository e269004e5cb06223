//! Tunables for the fishing simulation.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Configuration parameters for a fishing session. Distances are meters, times seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimConfig {
    /// Shortest cast; casts at this distance earn no distance bonus.
    pub base_cast: f64,
    /// Longest cast; also the far edge of the fishing area.
    pub max_cast: f64,
    /// Closest the bobber is assumed to sit when fish react to it.
    pub min_sink_distance: f64,

    /// Vertical band every fish is confined to (distance from shore).
    pub water_min: f64,
    pub water_max: f64,

    /// Radius around the bobber that opens a timing circle.
    pub detection_range: f64,
    /// Radius around the bobber that fish actively swim away from.
    pub avoidance_radius: f64,
    /// Half-height of the band a fish wanders in around its home distance.
    pub vertical_home_range: f64,
    /// Band widening while a fish is escaping.
    pub vertical_escape_mult: f64,

    /// Seconds a fresh timing circle lives before it closes on its own.
    pub circle_base_life: f64,
    /// Screen pixels per meter used to size timing circles.
    pub px_per_meter: f64,

    /// Upper bound applied to every simulated step.
    pub max_dt: f64,

    /// Fish within this radius of the bobber scatter when it lands.
    pub splash_radius: f64,
    pub splash_duration: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            base_cast: 30.0,
            max_cast: 200.0,
            min_sink_distance: 24.0,
            water_min: 30.0,
            water_max: 200.0,
            detection_range: 5.0,
            avoidance_radius: 12.0,
            vertical_home_range: 32.0,
            vertical_escape_mult: 1.9,
            circle_base_life: 1.8,
            px_per_meter: 4.0,
            max_dt: 1.0 / 30.0,
            splash_radius: 18.0,
            splash_duration: 0.8,
        }
    }
}

impl SimConfig {
    /// Parse a (possibly partial) JSON override on top of the defaults.
    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: SimConfig = serde_json::from_str(json).map_err(SimError::Config)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SimResult<()> {
        let positive = [
            ("detectionRange", self.detection_range),
            ("avoidanceRadius", self.avoidance_radius),
            ("circleBaseLife", self.circle_base_life),
            ("pxPerMeter", self.px_per_meter),
            ("maxDt", self.max_dt),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::InvalidConfig(format!("{name} must be positive, got {value}")));
            }
        }
        if !(self.max_cast > self.base_cast) {
            return Err(SimError::InvalidConfig(format!(
                "maxCast ({}) must exceed baseCast ({})",
                self.max_cast, self.base_cast
            )));
        }
        if !(self.water_max > self.water_min) {
            return Err(SimError::InvalidConfig(format!(
                "waterMax ({}) must exceed waterMin ({})",
                self.water_max, self.water_min
            )));
        }
        if self.vertical_home_range < 0.0 || self.vertical_escape_mult < 1.0 {
            return Err(SimError::InvalidConfig(
                "verticalHomeRange must be >= 0 and verticalEscapeMult >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Bobber point the fish react to, kept inside the sink range.
    pub fn bobber_reaction_distance(&self, bobber_distance: f64) -> f64 {
        bobber_distance.clamp(self.min_sink_distance, self.water_max)
    }
}

/// Player equipment tiers consulted by the line-break rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerGear {
    pub rod_tier: u8,
    pub line_tier: u8,
}

impl Default for PlayerGear {
    fn default() -> Self {
        Self { rod_tier: 1, line_tier: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = SimConfig::from_json(r#"{ "detectionRange": 7.5 }"#).unwrap();
        assert_eq!(config.detection_range, 7.5);
        assert_eq!(config.avoidance_radius, 12.0);
    }

    #[test]
    fn rejects_inverted_cast_range() {
        let err = SimConfig::from_json(r#"{ "baseCast": 250 }"#).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(SimConfig::from_json("{"), Err(SimError::Config(_))));
    }

    #[test]
    fn bobber_reaction_distance_is_clamped() {
        let config = SimConfig::default();
        assert_eq!(config.bobber_reaction_distance(0.0), 24.0);
        assert_eq!(config.bobber_reaction_distance(500.0), 200.0);
        assert_eq!(config.bobber_reaction_distance(80.0), 80.0);
    }
}
