use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use crate::workload::Operation;
use crate::DatabaseResult;

/// Outcome counters and latency aggregates for one operation kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpStats {
    /// Operations that returned [`DatabaseResult::Ok`].
    pub ok: u64,
    /// Operations that returned [`DatabaseResult::Fail`].
    pub fail: u64,
    total_latency: Duration,
    max_latency: Duration,
}

impl OpStats {
    /// Records one operation outcome.
    pub fn record(&mut self, result: DatabaseResult, elapsed: Duration) {
        match result {
            DatabaseResult::Ok => self.ok += 1,
            DatabaseResult::Fail => self.fail += 1,
        }
        self.total_latency += elapsed;
        if elapsed > self.max_latency {
            self.max_latency = elapsed;
        }
    }

    /// Folds another worker's counters into this one.
    pub fn merge(&mut self, other: &OpStats) {
        self.ok += other.ok;
        self.fail += other.fail;
        self.total_latency += other.total_latency;
        if other.max_latency > self.max_latency {
            self.max_latency = other.max_latency;
        }
    }

    /// Total operations recorded, successes and failures.
    pub fn count(&self) -> u64 {
        self.ok + self.fail
    }

    fn avg_latency(&self) -> Duration {
        match self.count() {
            0 => Duration::ZERO,
            n => self.total_latency / n as u32,
        }
    }
}

/// Merged outcome of one job run, rendered as a fixed-width table.
#[derive(Debug, Default, Clone)]
pub struct RunReport {
    /// Insert outcomes.
    pub insert: OpStats,
    /// Read outcomes.
    pub read: OpStats,
    /// Update outcomes.
    pub update: OpStats,
    /// Delete outcomes.
    pub delete: OpStats,
    /// Wall time of the whole run, set by the runner after workers join.
    pub elapsed: Duration,
}

impl RunReport {
    /// Records one operation outcome under its kind.
    pub fn record(&mut self, op: Operation, result: DatabaseResult, elapsed: Duration) {
        match op {
            Operation::Insert => self.insert.record(result, elapsed),
            Operation::Read => self.read.record(result, elapsed),
            Operation::Update => self.update.record(result, elapsed),
            Operation::Delete => self.delete.record(result, elapsed),
        }
    }

    /// Folds another worker's report into this one. `elapsed` is left
    /// alone; wall time belongs to the runner, not to any worker.
    pub fn merge(&mut self, other: &RunReport) {
        self.insert.merge(&other.insert);
        self.read.merge(&other.read);
        self.update.merge(&other.update);
        self.delete.merge(&other.delete);
    }

    /// Total operations across all kinds.
    pub fn total_ops(&self) -> u64 {
        self.insert.count() + self.read.count() + self.update.count() + self.delete.count()
    }

    /// Total failed operations across all kinds.
    pub fn total_failures(&self) -> u64 {
        self.insert.fail + self.read.fail + self.update.fail + self.delete.fail
    }
}

fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos() as f64;
    if nanos < 1_000.0 {
        format!("{:.2} ns", nanos)
    } else if nanos < 1_000_000.0 {
        format!("{:.2} µs", nanos / 1_000.0)
    } else if nanos < 1_000_000_000.0 {
        format!("{:.2} ms", nanos / 1_000_000.0)
    } else {
        format!("{:.2} s", nanos / 1_000_000_000.0)
    }
}

impl Display for RunReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<12} {:>10} {:>10} {:>10} {:>12} {:>12}",
            "Operation", "Count", "OK", "Fail", "Avg", "Max"
        )?;
        writeln!(f, "{:-<70}", "")?;

        for (name, stats) in [
            ("Inserts", &self.insert),
            ("Reads", &self.read),
            ("Updates", &self.update),
            ("Deletes", &self.delete),
        ] {
            if stats.count() == 0 {
                continue;
            }
            writeln!(
                f,
                "{:<12} {:>10} {:>10} {:>10} {:>12} {:>12}",
                name,
                stats.count(),
                stats.ok,
                stats.fail,
                format_duration(stats.avg_latency()),
                format_duration(stats.max_latency),
            )?;
        }

        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            writeln!(
                f,
                "{} operations in {} ({:.2} ops/sec, {} failed)",
                self.total_ops(),
                format_duration(self.elapsed),
                self.total_ops() as f64 / secs,
                self.total_failures(),
            )?;
        }

        Ok(())
    }
}
