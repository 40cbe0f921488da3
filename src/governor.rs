//! Resource governor - process-local limits that keep recursive descent over
//! untrusted syntax trees from running away in time, node count, or depth.

use std::time::{Duration, Instant};

use crate::config::Config;

/// The kind of recursion depth being tracked. The three kinds share a single
/// `max_depth_reached` statistic but are capped against independent budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthKind {
    Object,
    Chain,
    Argument,
}

/// A tagged fault raised by the governor. Callers either surface it as a
/// file-level error diagnostic or convert it to a boolean failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    Timeout,
    NodeLimit,
    DepthLimit,
    SizeLimit,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            ValidationError::Timeout => "validation timed out",
            ValidationError::NodeLimit => "node count limit exceeded",
            ValidationError::DepthLimit => "depth limit exceeded",
            ValidationError::SizeLimit => "size limit exceeded",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ValidationError {}

/// Snapshot of the governor's counters, returned by `stats()`.
#[derive(Debug, Clone, Copy)]
pub struct GovernorStats {
    pub node_count: u64,
    pub elapsed: Duration,
    pub max_depth_reached: u32,
}

/// One governor per run. Not `Clone` - a run owns exactly one.
pub struct Governor<'c> {
    config: &'c Config,
    node_count: u64,
    start_time: Instant,
    last_time_check: Instant,
    max_depth_reached: u32,
}

const TIME_CHECK_INTERVAL: Duration = Duration::from_millis(100);

impl<'c> Governor<'c> {
    pub fn new(config: &'c Config) -> Self {
        let now = Instant::now();
        Self {
            config,
            node_count: 0,
            start_time: now,
            last_time_check: now,
            max_depth_reached: 0,
        }
    }

    /// Zero counters and stamp a fresh start time.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.node_count = 0;
        self.start_time = now;
        self.last_time_check = now;
        self.max_depth_reached = 0;
    }

    fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Strict post-check: trips once the full budget has been consumed.
    pub fn check_timeout(&self) -> Result<(), ValidationError> {
        if self.elapsed().as_millis() as u64 > self.config.timeout_ms {
            Err(ValidationError::Timeout)
        } else {
            Ok(())
        }
    }

    /// Aggressive pre-check: trips at 90% of the budget, called before a unit
    /// of work begins so a slow step doesn't blow past the strict limit.
    pub fn check_timeout_aggressive(&self) -> Result<(), ValidationError> {
        let budget = (self.config.timeout_ms.saturating_mul(9)) / 10;
        if self.elapsed().as_millis() as u64 > budget {
            Err(ValidationError::Timeout)
        } else {
            Ok(())
        }
    }

    /// Increment the node counter; periodically evaluates the timeout and
    /// always evaluates the node cap.
    pub fn increment_node(&mut self) -> Result<(), ValidationError> {
        self.node_count += 1;
        let now = Instant::now();
        if now.duration_since(self.last_time_check) >= TIME_CHECK_INTERVAL {
            self.last_time_check = now;
            self.check_timeout()?;
        }
        if self.node_count > self.config.max_node_count {
            return Err(ValidationError::NodeLimit);
        }
        Ok(())
    }

    /// Compare `depth` against the cap for `kind`, updating the shared
    /// high-water mark regardless of outcome.
    pub fn track_depth(&mut self, depth: u32, kind: DepthKind) -> Result<(), ValidationError> {
        let cap = match kind {
            DepthKind::Object => self.config.max_object_depth,
            DepthKind::Chain => self.config.max_chain_depth,
            DepthKind::Argument => self.config.max_argument_nesting,
        };
        if depth > self.max_depth_reached {
            self.max_depth_reached = depth;
        }
        if depth > cap {
            return Err(ValidationError::DepthLimit);
        }
        Ok(())
    }

    pub fn validate_size(&self, n: usize, cap: usize, _label: &str) -> Result<(), ValidationError> {
        if n > cap {
            Err(ValidationError::SizeLimit)
        } else {
            Ok(())
        }
    }

    pub fn stats(&self) -> GovernorStats {
        GovernorStats {
            node_count: self.node_count,
            elapsed: self.elapsed(),
            max_depth_reached: self.max_depth_reached,
        }
    }

    pub fn config(&self) -> &Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::presets;

    #[test]
    fn node_limit_trips() {
        let mut config = presets::relaxed();
        config.max_node_count = 2;
        let mut gov = Governor::new(&config);
        assert!(gov.increment_node().is_ok());
        assert!(gov.increment_node().is_ok());
        assert_eq!(gov.increment_node(), Err(ValidationError::NodeLimit));
    }

    #[test]
    fn depth_limit_trips_per_kind() {
        let config = presets::extremely_safe();
        let mut gov = Governor::new(&config);
        assert!(gov.track_depth(config.max_object_depth, DepthKind::Object).is_ok());
        assert_eq!(
            gov.track_depth(config.max_object_depth + 1, DepthKind::Object),
            Err(ValidationError::DepthLimit)
        );
        // Chain depth is independent of object depth.
        assert!(gov.track_depth(config.max_chain_depth, DepthKind::Chain).is_ok());
    }

    #[test]
    fn reset_clears_counters() {
        let config = presets::relaxed();
        let mut gov = Governor::new(&config);
        gov.increment_node().unwrap();
        gov.track_depth(3, DepthKind::Object).unwrap();
        gov.reset();
        let stats = gov.stats();
        assert_eq!(stats.node_count, 0);
        assert_eq!(stats.max_depth_reached, 0);
    }

    #[test]
    fn size_limit() {
        let config = presets::relaxed();
        let gov = Governor::new(&config);
        assert!(gov.validate_size(10, 20, "properties").is_ok());
        assert_eq!(
            gov.validate_size(21, 20, "properties"),
            Err(ValidationError::SizeLimit)
        );
    }
}
