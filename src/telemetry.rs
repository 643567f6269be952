//! Opt-in tracing setup for hosts embedding the plotting core.
//!
//! The core emits structured `tracing` events from tick selection, the
//! rasterizer, and the compositor; it never installs a subscriber on its
//! own. Hosts with their own telemetry wire a subscriber themselves and
//! ignore this module entirely.

/// Filter applied when `RUST_LOG` is unset: this crate at `info`, every
/// other target at `warn`.
#[cfg(feature = "telemetry")]
const DEFAULT_FILTER: &str = "warn,plotcore_rs=info";

/// Installs a compact stderr subscriber scoped to this crate.
///
/// Honors `RUST_LOG` when set and falls back to the crate-scoped default
/// otherwise. Returns `false` when the `telemetry` feature is disabled or
/// when the host already installed a global subscriber.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_never_wins() {
        // With the feature off both calls decline; with it on, the global
        // subscriber slot is taken by the first call at the latest.
        let _ = init_default_tracing();
        assert!(!init_default_tracing());
    }
}
