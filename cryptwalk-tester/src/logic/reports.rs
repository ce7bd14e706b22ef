use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use super::simulation::{RunOutcome, RunRecord};

/// Per-strategy roll-up of many runs.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyAggregate {
    pub strategy: String,
    pub runs: usize,
    pub victories: usize,
    pub defeats: usize,
    pub stalled: usize,
    pub victory_rate: f64,
    pub boss_reach_rate: f64,
    pub mean_events: f64,
    pub mean_combats_won: f64,
    pub mean_transitions: f64,
    pub violations: usize,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    aggregates: &'a [StrategyAggregate],
    runs: &'a [RunRecord],
}

#[allow(clippy::cast_precision_loss)]
fn mean(total: u64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: usize, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        part as f64 / count as f64
    }
}

/// Group records by strategy, keeping first-seen order.
#[must_use]
pub fn aggregate_runs(records: &[RunRecord]) -> Vec<StrategyAggregate> {
    let mut order: Vec<&str> = Vec::new();
    for record in records {
        if !order.contains(&record.strategy.as_str()) {
            order.push(record.strategy.as_str());
        }
    }

    order
        .into_iter()
        .map(|strategy| {
            let runs: Vec<&RunRecord> = records
                .iter()
                .filter(|record| record.strategy == strategy)
                .collect();
            let count = runs.len();
            let tally = |outcome: RunOutcome| runs.iter().filter(|r| r.outcome == outcome).count();
            let victories = tally(RunOutcome::Victory);
            let sum = |f: fn(&RunRecord) -> u32| runs.iter().map(|r| u64::from(f(r))).sum::<u64>();
            StrategyAggregate {
                strategy: strategy.to_string(),
                runs: count,
                victories,
                defeats: tally(RunOutcome::Defeat),
                stalled: tally(RunOutcome::Stalled),
                victory_rate: ratio(victories, count),
                boss_reach_rate: ratio(runs.iter().filter(|r| r.boss_spawned).count(), count),
                mean_events: mean(sum(|r| r.events), count),
                mean_combats_won: mean(sum(|r| r.combats_won), count),
                mean_transitions: mean(sum(|r| r.madness_transitions), count),
                violations: runs.iter().map(|r| r.violations.len()).sum(),
            }
        })
        .collect()
}

pub fn generate_console_report<W: Write + ?Sized>(
    writer: &mut W,
    records: &[RunRecord],
    aggregates: &[StrategyAggregate],
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Simulation Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "=====================".cyan())?;
    writeln!(writer, "Total runs: {}", records.len())?;
    writeln!(writer, "Total time: {total_duration:?}")?;
    writeln!(writer)?;

    for aggregate in aggregates {
        let status = if aggregate.violations == 0 {
            "✅ CLEAN".green()
        } else {
            "❌ BROKEN".red()
        };
        writeln!(writer, "{} {}", status, aggregate.strategy.bold())?;
        writeln!(
            writer,
            "   Outcomes: {} won / {} lost / {} stalled",
            aggregate.victories.to_string().green(),
            aggregate.defeats.to_string().red(),
            aggregate.stalled.to_string().yellow()
        )?;
        writeln!(
            writer,
            "   Victory rate: {:.1}%  Boss reached: {:.1}%",
            aggregate.victory_rate * 100.0,
            aggregate.boss_reach_rate * 100.0
        )?;
        writeln!(
            writer,
            "   Mean events: {:.1}  Mean combats won: {:.1}  Mean transitions: {:.2}",
            aggregate.mean_events, aggregate.mean_combats_won, aggregate.mean_transitions
        )?;
        writeln!(writer)?;
    }

    let broken: Vec<&RunRecord> = records.iter().filter(|r| !r.is_clean()).collect();
    if !broken.is_empty() {
        writeln!(writer, "{}", "⚠️  Invariant violations".bright_red().bold())?;
        for record in broken {
            for violation in &record.violations {
                writeln!(
                    writer,
                    "   • [{} seed {}] {}",
                    record.strategy,
                    record.seed,
                    violation.red()
                )?;
            }
        }
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(
    writer: &mut W,
    records: &[RunRecord],
    aggregates: &[StrategyAggregate],
) -> Result<()> {
    let report = JsonReport {
        aggregates,
        runs: records,
    };
    let json_output = serde_json::to_string_pretty(&report)?;
    writeln!(writer, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    writer: &mut W,
    records: &[RunRecord],
    aggregates: &[StrategyAggregate],
) -> Result<()> {
    writeln!(writer, "# Cryptwalk Simulation Results\n")?;
    writeln!(writer, "- **Total runs**: {}\n", records.len())?;
    writeln!(
        writer,
        "| Strategy | Runs | Victory rate | Boss reached | Mean events | Mean transitions | Violations |"
    )?;
    writeln!(writer, "| --- | --- | --- | --- | --- | --- | --- |")?;
    for aggregate in aggregates {
        writeln!(
            writer,
            "| {} | {} | {:.1}% | {:.1}% | {:.1} | {:.2} | {} |",
            aggregate.strategy,
            aggregate.runs,
            aggregate.victory_rate * 100.0,
            aggregate.boss_reach_rate * 100.0,
            aggregate.mean_events,
            aggregate.mean_transitions,
            aggregate.violations
        )?;
    }

    let broken: Vec<&RunRecord> = records.iter().filter(|r| !r.is_clean()).collect();
    if !broken.is_empty() {
        writeln!(writer, "\n## Violations\n")?;
        for record in broken {
            for violation in &record.violations {
                writeln!(writer, "- {} seed {}: {violation}", record.strategy, record.seed)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptwalk_game::Player;

    fn record(strategy: &str, outcome: RunOutcome, events: u32) -> RunRecord {
        RunRecord {
            seed: 1,
            strategy: strategy.to_string(),
            outcome,
            steps: 10,
            events,
            combats_won: 2,
            decisions: 1,
            madness_transitions: 1,
            boss_spawned: outcome == RunOutcome::Victory,
            final_player: Player::default(),
            violations: Vec::new(),
        }
    }

    #[test]
    fn aggregates_group_by_strategy() {
        let records = vec![
            record("cautious", RunOutcome::Victory, 60),
            record("reckless", RunOutcome::Defeat, 10),
            record("cautious", RunOutcome::Defeat, 20),
        ];
        let aggregates = aggregate_runs(&records);
        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates[0].strategy, "cautious");
        assert_eq!(aggregates[0].runs, 2);
        assert!((aggregates[0].victory_rate - 0.5).abs() < f64::EPSILON);
        assert!((aggregates[0].mean_events - 40.0).abs() < f64::EPSILON);
        assert_eq!(aggregates[1].defeats, 1);
    }

    #[test]
    fn markdown_lists_violations() {
        let mut broken = record("random", RunOutcome::Stalled, 3);
        broken.violations.push("player out of bounds".to_string());
        let records = vec![broken];
        let mut out = Vec::new();
        generate_markdown_report(&mut out, &records, &aggregate_runs(&records)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("# Cryptwalk Simulation Results"));
        assert!(text.contains("| random | 1 |"));
        assert!(text.contains("player out of bounds"));
    }

    #[test]
    fn json_carries_runs_and_aggregates() {
        let records = vec![record("cautious", RunOutcome::Victory, 51)];
        let mut out = Vec::new();
        generate_json_report(&mut out, &records, &aggregate_runs(&records)).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["runs"][0]["outcome"], "victory");
        assert_eq!(value["aggregates"][0]["victories"], 1);
    }
}
