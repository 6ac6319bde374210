//! Command-line configuration.
//!
//! Flags map onto [`LifecycleConfig`] for the watch and
//! [`CompanionConfig`] for the simulated phone.

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use hotc_core::{
    LateCompletionPolicy, LifecycleConfig,
    lifecycle::{DEFAULT_PROMPT, DEFAULT_SEND_TIMEOUT, DEFAULT_STATUS_RESET_DELAY},
};

use crate::companion::CompanionConfig;

/// Mood picker watch face in the terminal
#[derive(Parser, Debug, Clone)]
#[command(name = "hotc-watch")]
#[command(about = "Pick a mood and send it to a simulated companion app")]
#[command(version)]
pub struct WatchArgs {
    /// Database file holding the persisted mood
    #[arg(long, default_value = "hotc-watch.redb")]
    pub db: PathBuf,

    /// Time allowed for the companion to report an outcome
    #[arg(long, default_value_t = DEFAULT_SEND_TIMEOUT.as_millis() as u64)]
    pub send_timeout_ms: u64,

    /// How long a result stays on screen before the prompt returns
    #[arg(long, default_value_t = DEFAULT_STATUS_RESET_DELAY.as_millis() as u64)]
    pub status_delay_ms: u64,

    /// Companion latency per hop
    #[arg(long, default_value_t = 300)]
    pub latency_ms: u64,

    /// Extra random companion delay, up to this much
    #[arg(long, default_value_t = 0)]
    pub jitter_ms: u64,

    /// Probability the companion reports a failed send
    #[arg(long, default_value_t = 0.0, value_parser = parse_rate)]
    pub failure_rate: f64,

    /// Probability a report vanishes without any outcome
    #[arg(long, default_value_t = 0.0, value_parser = parse_rate)]
    pub loss_rate: f64,

    /// Probability the companion's ack is dropped
    #[arg(long, default_value_t = 0.0, value_parser = parse_rate)]
    pub drop_rate: f64,

    /// Let completions that arrive after a timeout overwrite the status
    #[arg(long)]
    pub legacy_late_completion: bool,

    /// Seed for the companion's RNG. Random if omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Log file. The terminal itself is in raw mode.
    #[arg(long, default_value = "hotc-watch.log")]
    pub log_file: PathBuf,
}

impl WatchArgs {
    /// Lifecycle tunables.
    pub fn lifecycle_config(&self) -> LifecycleConfig {
        let late_completion = if self.legacy_late_completion {
            LateCompletionPolicy::Apply
        } else {
            LateCompletionPolicy::Ignore
        };

        LifecycleConfig {
            send_timeout: Duration::from_millis(self.send_timeout_ms),
            status_reset_delay: Duration::from_millis(self.status_delay_ms),
            prompt: DEFAULT_PROMPT.to_string(),
            late_completion,
        }
    }

    /// Companion behaviour.
    pub fn companion_config(&self) -> CompanionConfig {
        CompanionConfig {
            latency: Duration::from_millis(self.latency_ms),
            jitter: Duration::from_millis(self.jitter_ms),
            loss_rate: self.loss_rate,
            failure_rate: self.failure_rate,
            drop_rate: self.drop_rate,
        }
    }
}

fn parse_rate(s: &str) -> Result<f64, String> {
    let rate: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(format!("{rate} is not a probability in [0, 1]"))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn defaults_match_the_lifecycle_defaults() {
        let args = WatchArgs::try_parse_from(["hotc-watch"]).unwrap();

        assert_eq!(args.lifecycle_config(), LifecycleConfig::default());
        assert_eq!(args.companion_config(), CompanionConfig::default());
        assert_eq!(args.seed, None);
    }

    #[test]
    fn flags_reach_both_configs() {
        let args = WatchArgs::try_parse_from([
            "hotc-watch",
            "--send-timeout-ms",
            "500",
            "--status-delay-ms",
            "100",
            "--loss-rate",
            "0.5",
            "--legacy-late-completion",
            "--seed",
            "9",
        ])
        .unwrap();

        let lifecycle = args.lifecycle_config();
        assert_eq!(lifecycle.send_timeout, Duration::from_millis(500));
        assert_eq!(lifecycle.status_reset_delay, Duration::from_millis(100));
        assert_eq!(lifecycle.late_completion, LateCompletionPolicy::Apply);
        assert!((args.companion_config().loss_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(args.seed, Some(9));
    }

    #[test]
    fn rates_outside_unit_interval_are_rejected() {
        assert!(WatchArgs::try_parse_from(["hotc-watch", "--failure-rate", "1.5"]).is_err());
        assert!(WatchArgs::try_parse_from(["hotc-watch", "--drop-rate", "nope"]).is_err());
    }

    proptest! {
        #[test]
        fn prop_rate_accepts_exactly_the_unit_interval(rate in -2.0f64..3.0) {
            let parsed = parse_rate(&rate.to_string());
            prop_assert_eq!(parsed.is_ok(), (0.0..=1.0).contains(&rate));
        }
    }
}
