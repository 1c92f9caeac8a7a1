//! Confidence ladders: call-path depth to confidence score.

/// Maps call depth (edges between test and target, >= 1) to a confidence
/// in `[0, 1]`.
///
/// `Stepwise` is the default ladder; `Linear` is selectable via
/// `graph.confidence_ladder = "linear"` in the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLadder {
    /// 1 -> 1.0, 2-3 -> 0.8, 4-6 -> 0.6, deeper -> 0.4.
    Stepwise,
    /// `max(0.1, 1.0 - 0.15 * depth)`.
    Linear,
}

impl ConfidenceLadder {
    pub fn from_name(name: &str) -> Self {
        match name {
            "linear" => Self::Linear,
            _ => Self::Stepwise,
        }
    }

    pub fn confidence(&self, call_depth: u32) -> f64 {
        match self {
            Self::Stepwise => match call_depth {
                0 | 1 => 1.0,
                2 | 3 => 0.8,
                4..=6 => 0.6,
                _ => 0.4,
            },
            Self::Linear => (1.0 - 0.15 * f64::from(call_depth)).max(0.1),
        }
    }
}

impl Default for ConfidenceLadder {
    fn default() -> Self {
        Self::Stepwise
    }
}
