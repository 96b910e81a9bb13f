//! Tracing setup with a runtime-adjustable filter

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "debug";

/// Handle used by the `verbose` shell command
pub struct LogControl {
    handle: reload::Handle<EnvFilter, Registry>,
    verbose: bool,
}

impl LogControl {
    /// Switch between the default filter and debug output
    ///
    /// Returns the new verbose state.
    pub fn toggle(&mut self) -> Result<bool> {
        let verbose = !self.verbose;
        self.handle.modify(|filter| *filter = build_filter(verbose))?;
        self.verbose = verbose;
        Ok(verbose)
    }
}

fn build_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber, logging to stderr
pub fn init(verbose: bool) -> LogControl {
    let (filter, handle) = reload::Layer::new(build_filter(verbose));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    LogControl { handle, verbose }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_filter_enables_debug() {
        let filter = build_filter(true);
        assert_eq!(filter.to_string(), "debug");
    }
}
