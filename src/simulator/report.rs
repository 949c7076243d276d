//! Simulation report generation.

use crate::core::formulas::TIER_NAMES;

/// Statistics from a single simulated run.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub starting_prestige: u32,
    pub final_level: u32,
    pub final_prestige: u32,
    pub final_qi: f64,
    pub total_seconds: u64,
    pub reached_target: bool,

    pub total_taps: u64,
    pub qi_from_taps: f64,
    pub qi_from_auto: f64,
    pub qi_from_events: f64,
    pub qi_lost_to_failures: f64,

    pub break_attempts: u64,
    pub break_successes: u64,
    pub charms_consumed: u64,

    pub events_opened: u64,
    pub gambles_won: u64,
    pub gambles_lost: u64,

    pub ascensions: u64,
    pub rebirths: u64,
    pub first_ascension_at: Option<u64>,

    /// Second at which each tier was first reached in the current life.
    pub tier_reached_at: Vec<Option<u64>>,
}

impl RunStats {
    pub fn failure_rate(&self) -> f64 {
        if self.break_attempts == 0 {
            0.0
        } else {
            (self.break_attempts - self.break_successes) as f64 / self.break_attempts as f64
        }
    }
}

/// Aggregated results from multiple simulation runs.
#[derive(Debug, Clone)]
pub struct SimReport {
    pub num_runs: u32,
    pub runs_completed: u32,
    pub runs_timed_out: u32,

    pub avg_final_level: f64,
    pub avg_final_prestige: f64,
    pub avg_seconds_to_complete: f64,
    pub avg_break_attempts: f64,
    pub avg_failure_rate: f64,
    pub avg_events_opened: f64,
    pub avg_qi_from_events: f64,
    pub tap_share: f64,

    /// Average second each tier was first reached, over the runs that did.
    pub avg_tier_reach_seconds: Vec<Option<f64>>,
    /// Fraction of runs that reached each tier.
    pub tier_reach_rate: Vec<f64>,

    pub run_stats: Vec<RunStats>,
}

impl SimReport {
    /// Create a new report from completed run stats.
    pub fn from_runs(runs: Vec<RunStats>, max_seconds: u64) -> Self {
        let num_runs = runs.len() as u32;
        let runs_completed = runs.iter().filter(|r| r.reached_target).count() as u32;
        let runs_timed_out = runs
            .iter()
            .filter(|r| !r.reached_target && r.total_seconds >= max_seconds)
            .count() as u32;
        let n = num_runs.max(1) as f64;

        let avg_final_level = mean(&runs, |r| r.final_level as f64);
        let avg_final_prestige = mean(&runs, |r| r.final_prestige as f64);
        let avg_break_attempts = mean(&runs, |r| r.break_attempts as f64);
        let avg_failure_rate = mean(&runs, RunStats::failure_rate);
        let avg_events_opened = mean(&runs, |r| r.events_opened as f64);
        let avg_qi_from_events = mean(&runs, |r| r.qi_from_events);
        let avg_seconds_to_complete = runs
            .iter()
            .filter(|r| r.reached_target)
            .map(|r| r.total_seconds as f64)
            .sum::<f64>()
            / runs_completed.max(1) as f64;

        // Share of earned qi that came from tapping, across all runs
        let tap_qi: f64 = runs.iter().map(|r| r.qi_from_taps).sum();
        let earned: f64 = runs
            .iter()
            .map(|r| r.qi_from_taps + r.qi_from_auto + r.qi_from_events.max(0.0))
            .sum();
        let tap_share = if earned > 0.0 { tap_qi / earned } else { 0.0 };

        let tiers = TIER_NAMES.len();
        let mut avg_tier_reach_seconds = vec![None; tiers];
        let mut tier_reach_rate = vec![0.0; tiers];
        for (i, slot) in avg_tier_reach_seconds.iter_mut().enumerate() {
            let reached: Vec<u64> = runs
                .iter()
                .filter_map(|r| r.tier_reached_at.get(i).copied().flatten())
                .collect();
            if !reached.is_empty() {
                *slot = Some(reached.iter().sum::<u64>() as f64 / reached.len() as f64);
            }
            tier_reach_rate[i] = reached.len() as f64 / n;
        }

        Self {
            num_runs,
            runs_completed,
            runs_timed_out,
            avg_final_level,
            avg_final_prestige,
            avg_seconds_to_complete,
            avg_break_attempts,
            avg_failure_rate,
            avg_events_opened,
            avg_qi_from_events,
            tap_share,
            avg_tier_reach_seconds,
            tier_reach_rate,
            run_stats: runs,
        }
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                 CULTIVATION SIMULATION REPORT\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str(&format!(
            "Runs: {} total, {} completed, {} timed out\n\n",
            self.num_runs, self.runs_completed, self.runs_timed_out
        ));

        report.push_str("── PROGRESSION ──────────────────────────────────────────────────\n");
        report.push_str(&format!("  Avg Final Level:     {:.1}\n", self.avg_final_level));
        report.push_str(&format!("  Avg Final Prestige:  {:.2}\n", self.avg_final_prestige));
        report.push_str(&format!(
            "  Avg Time to Target:  {}\n",
            format_seconds(self.avg_seconds_to_complete as u64)
        ));
        report.push_str(&format!("  Tap Share of Qi:     {:.1}%\n\n", self.tap_share * 100.0));

        report.push_str("── BREAKTHROUGHS ────────────────────────────────────────────────\n");
        report.push_str(&format!("  Avg Attempts:        {:.1}\n", self.avg_break_attempts));
        report.push_str(&format!(
            "  Avg Failure Rate:    {:.1}%\n\n",
            self.avg_failure_rate * 100.0
        ));

        report.push_str("── EVENTS ───────────────────────────────────────────────────────\n");
        report.push_str(&format!("  Avg Events Opened:   {:.1}\n", self.avg_events_opened));
        report.push_str(&format!("  Avg Qi from Events:  {:.0}\n\n", self.avg_qi_from_events));

        report.push_str("── TIER PACING ──────────────────────────────────────────────────\n");
        for (i, name) in TIER_NAMES.iter().enumerate() {
            let pct = self.tier_reach_rate[i] * 100.0;
            if pct == 0.0 {
                continue;
            }
            let when = self.avg_tier_reach_seconds[i]
                .map(|s| format_seconds(s as u64))
                .unwrap_or_default();
            let bar = "█".repeat((pct / 5.0) as usize);
            report.push_str(&format!("  {:<8} {:>5.1}% {:>12}  {}\n", name, pct, when, bar));
        }
        report.push('\n');

        report.push_str("── BALANCE ASSESSMENT ───────────────────────────────────────────\n");
        let completion_rate = (self.runs_completed as f64 / self.num_runs.max(1) as f64) * 100.0;
        report.push_str(&format!("  Completion Rate: {:.1}%\n", completion_rate));
        if self.avg_failure_rate > 0.35 {
            report.push_str("  ⚠️  Breakthroughs fail often - odds curve too steep?\n");
        }
        if self.tap_share > 0.9 {
            report.push_str("  ⚠️  Tapping dominates - automatic gain too weak?\n");
        }

        report
    }

    /// One line for `--quiet` output.
    pub fn summary_line(&self) -> String {
        format!(
            "runs={} completed={} level={:.1} prestige={:.2} fail_rate={:.3} events={:.1}",
            self.num_runs,
            self.runs_completed,
            self.avg_final_level,
            self.avg_final_prestige,
            self.avg_failure_rate,
            self.avg_events_opened
        )
    }
}

fn mean(runs: &[RunStats], f: impl Fn(&RunStats) -> f64) -> f64 {
    if runs.is_empty() {
        return 0.0;
    }
    runs.iter().map(f).sum::<f64>() / runs.len() as f64
}

/// Formats seconds as `1d 02h 03m` / `02h 03m 04s`.
pub fn format_seconds(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;
    if days > 0 {
        format!("{}d {:02}h {:02}m", days, hours, minutes)
    } else {
        format!("{:02}h {:02}m {:02}s", hours, minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(level: u32, attempts: u64, successes: u64, reached: bool) -> RunStats {
        RunStats {
            final_level: level,
            break_attempts: attempts,
            break_successes: successes,
            reached_target: reached,
            total_seconds: 100,
            tier_reached_at: vec![Some(0), Some(50)],
            ..Default::default()
        }
    }

    #[test]
    fn test_report_averages() {
        let report = SimReport::from_runs(
            vec![run(10, 10, 9, true), run(20, 20, 18, false)],
            100,
        );
        assert_eq!(report.num_runs, 2);
        assert_eq!(report.runs_completed, 1);
        assert_eq!(report.runs_timed_out, 1);
        assert!((report.avg_final_level - 15.0).abs() < 1e-9);
        assert!((report.avg_failure_rate - 0.1).abs() < 1e-9);
        assert_eq!(report.avg_tier_reach_seconds[1], Some(50.0));
        assert_eq!(report.tier_reach_rate[2], 0.0);
    }

    #[test]
    fn test_empty_report_has_no_nan() {
        let report = SimReport::from_runs(Vec::new(), 100);
        assert_eq!(report.avg_final_level, 0.0);
        assert!(report.to_text().contains("Runs: 0 total"));
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(3_661), "01h 01m 01s");
        assert_eq!(format_seconds(90_000), "1d 01h 00m");
    }
}
