//! Verdict classification for completed diagnostic runs

use crate::{config::VerdictRules, events::LogEvent};

/// Outcome category for a completed run.
///
/// Rules are checked in a fixed precedence order and the first match wins:
/// bandwidth depletion outranks every latency rule, congestion outranks the
/// distance notice, and a run that trips nothing is optimal.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Measured throughput fell below the depletion threshold
    Depleted { mbps: f64 },
    /// Latency exceeded the congestion threshold
    Congested { latency_ms: u64 },
    /// Latency sits in the band explained by client-to-node distance
    Distant { latency_ms: u64 },
    /// No rule fired
    Optimal,
}

impl Verdict {
    /// Classify a completed run against the configured thresholds.
    ///
    /// `mbps` is `None` when the download stage did not run; bandwidth rules
    /// only ever apply to measured throughput.
    pub fn classify(latency_ms: u64, mbps: Option<f64>, rules: &VerdictRules) -> Self {
        if let Some(mbps) = mbps {
            if mbps < rules.depleted_mbps {
                return Self::Depleted { mbps };
            }
        }

        if latency_ms > rules.congested_ms {
            return Self::Congested { latency_ms };
        }

        if latency_ms > rules.distant_ms {
            return Self::Distant { latency_ms };
        }

        Self::Optimal
    }

    /// Short name used in structured logs
    pub fn category(&self) -> &'static str {
        match self {
            Self::Depleted { .. } => "depleted",
            Self::Congested { .. } => "congested",
            Self::Distant { .. } => "distant",
            Self::Optimal => "optimal",
        }
    }

    /// Render the verdict block lines for the given vantage label.
    ///
    /// The optimal verdict repeats the location exactly as the client
    /// submitted it.
    pub fn events(&self, location: &str) -> Vec<LogEvent> {
        match self {
            Self::Depleted { .. } => vec![
                LogEvent::alert(
                    "[ALERT] RESOURCE DEPLETION: Proxy node bandwidth is severely limited.",
                ),
                LogEvent::alert(
                    "[ADVICE] Rotate IP immediately to avoid behavioral detection flags.",
                ),
            ],
            Self::Congested { .. } => vec![LogEvent::warn(
                "[WARN] NOISY NEIGHBOR: High wait time detected. Node is likely congested.",
            )],
            Self::Distant { .. } => vec![LogEvent::info(
                "[NOTICE] GEOGRAPHIC DISTANCE: Elevated latency attributable to client-to-node distance.",
            )],
            Self::Optimal => vec![LogEvent::ok(format!(
                "[VERDICT] PROXY OPTIMAL: Healthy for {} requests.",
                location
            ))],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::LogColor;

    fn rules() -> VerdictRules {
        VerdictRules::default()
    }

    #[test]
    fn test_depleted_below_threshold() {
        let verdict = Verdict::classify(100, Some(1.49), &rules());
        assert_eq!(verdict, Verdict::Depleted { mbps: 1.49 });
    }

    #[test]
    fn test_depletion_threshold_is_strict() {
        // Exactly at the threshold is not depleted
        let verdict = Verdict::classify(100, Some(1.5), &rules());
        assert_eq!(verdict, Verdict::Optimal);
    }

    #[test]
    fn test_depleted_outranks_congestion() {
        let verdict = Verdict::classify(5000, Some(0.5), &rules());
        assert_eq!(verdict, Verdict::Depleted { mbps: 0.5 });
    }

    #[test]
    fn test_congested_above_threshold() {
        let verdict = Verdict::classify(1501, Some(8.39), &rules());
        assert_eq!(verdict, Verdict::Congested { latency_ms: 1501 });

        let without_download = Verdict::classify(1600, None, &rules());
        assert_eq!(without_download, Verdict::Congested { latency_ms: 1600 });
    }

    #[test]
    fn test_congestion_threshold_is_strict() {
        // Exactly 1500ms falls into the distance band instead
        let verdict = Verdict::classify(1500, None, &rules());
        assert_eq!(verdict, Verdict::Distant { latency_ms: 1500 });
    }

    #[test]
    fn test_distant_band() {
        assert_eq!(
            Verdict::classify(801, None, &rules()),
            Verdict::Distant { latency_ms: 801 }
        );
        assert_eq!(
            Verdict::classify(900, Some(5.0), &rules()),
            Verdict::Distant { latency_ms: 900 }
        );
    }

    #[test]
    fn test_distance_threshold_is_strict() {
        assert_eq!(Verdict::classify(800, None, &rules()), Verdict::Optimal);
    }

    #[test]
    fn test_optimal_fast_run() {
        assert_eq!(
            Verdict::classify(120, Some(8.39), &rules()),
            Verdict::Optimal
        );
    }

    #[test]
    fn test_custom_rules() {
        let rules = VerdictRules {
            depleted_mbps: 10.0,
            congested_ms: 300,
            distant_ms: 100,
        };
        assert_eq!(
            Verdict::classify(50, Some(9.9), &rules),
            Verdict::Depleted { mbps: 9.9 }
        );
        assert_eq!(
            Verdict::classify(301, None, &rules),
            Verdict::Congested { latency_ms: 301 }
        );
        assert_eq!(
            Verdict::classify(150, None, &rules),
            Verdict::Distant { latency_ms: 150 }
        );
    }

    #[test]
    fn test_depleted_events_are_an_alert_pair() {
        let events = Verdict::Depleted { mbps: 0.8 }.events("Spain");
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0].message,
            "[ALERT] RESOURCE DEPLETION: Proxy node bandwidth is severely limited."
        );
        assert_eq!(
            events[1].message,
            "[ADVICE] Rotate IP immediately to avoid behavioral detection flags."
        );
        assert!(events.iter().all(|e| e.color == Some(LogColor::Alert)));
    }

    #[test]
    fn test_congested_event() {
        let events = Verdict::Congested { latency_ms: 1600 }.events("Spain");
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].message,
            "[WARN] NOISY NEIGHBOR: High wait time detected. Node is likely congested."
        );
        assert_eq!(events[0].color, Some(LogColor::Warn));
    }

    #[test]
    fn test_distant_event() {
        let events = Verdict::Distant { latency_ms: 900 }.events("Spain");
        assert_eq!(events.len(), 1);
        assert!(events[0].message.starts_with("[NOTICE] GEOGRAPHIC DISTANCE:"));
        assert_eq!(events[0].color, Some(LogColor::Info));
    }

    #[test]
    fn test_optimal_event_preserves_location_case() {
        let events = Verdict::Optimal.events("new york");
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].message,
            "[VERDICT] PROXY OPTIMAL: Healthy for new york requests."
        );
        assert_eq!(events[0].color, Some(LogColor::Ok));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn depletion_outranks_every_latency_rule(
                latency_ms in 0u64..60_000,
                mbps in 0.0f64..1.5,
            ) {
                let verdict = Verdict::classify(latency_ms, Some(mbps), &rules());
                prop_assert_eq!(verdict, Verdict::Depleted { mbps });
            }

            #[test]
            fn healthy_throughput_never_triggers_depletion(
                latency_ms in 0u64..60_000,
                mbps in 1.5f64..1_000.0,
            ) {
                let verdict = Verdict::classify(latency_ms, Some(mbps), &rules());
                prop_assert_ne!(verdict, Verdict::Depleted { mbps });
            }

            #[test]
            fn latency_bands_partition_without_throughput(latency_ms in 0u64..60_000) {
                let verdict = Verdict::classify(latency_ms, None, &rules());
                let expected = if latency_ms > 1500 {
                    Verdict::Congested { latency_ms }
                } else if latency_ms > 800 {
                    Verdict::Distant { latency_ms }
                } else {
                    Verdict::Optimal
                };
                prop_assert_eq!(verdict, expected);
            }
        }
    }
}
