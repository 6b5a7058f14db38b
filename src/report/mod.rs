//! Result sink: flat CSV export and the end-of-run summary table.

use std::fs::File;
use std::io::{BufWriter, Write as IoWrite};
use std::path::Path;
use tabled::{Table, Tabled};
use tracing::info;

use crate::auction::AuctionKind;
use crate::error::Result;
use crate::sim::TrialRecord;

const CSV_HEADER: &str =
    "trial,auction_type,winner,winning_bid,winner_value,utility,is_reasoning_agent,bid_trace";

/// Write trial records as flat CSV with fixed columns. The bid trace is
/// JSON-serialized into the final column.
pub fn export_csv<P: AsRef<Path>>(path: P, records: &[TrialRecord]) -> Result<()> {
    let path = path.as_ref();
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "{CSV_HEADER}")?;

    for record in records {
        let outcome = &record.outcome;
        let trace = serde_json::to_string(&outcome.bid_trace)?;
        writeln!(
            file,
            "{},{},{},{},{},{},{},{}",
            record.trial,
            record.auction.label(),
            outcome.winner.as_deref().unwrap_or(""),
            outcome.winning_bid,
            outcome.winner_value,
            outcome.utility,
            outcome.is_reasoning,
            csv_quote(&trace),
        )?;
    }

    file.flush()?;
    info!(path = %path.display(), rows = records.len(), "exported results");
    Ok(())
}

fn csv_quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// One summary line per auction type and agent class.
#[derive(Debug, Tabled)]
pub struct SummaryRow {
    #[tabled(rename = "auction")]
    pub auction: &'static str,
    #[tabled(rename = "agent type")]
    pub agent_type: &'static str,
    #[tabled(rename = "wins")]
    pub wins: usize,
    #[tabled(rename = "win rate")]
    pub win_rate: String,
    #[tabled(rename = "avg utility")]
    pub avg_utility: String,
    #[tabled(rename = "avg price")]
    pub avg_price: String,
}

/// Aggregate records by auction type and winner agent class, mirroring the
/// comparison the experiment is after: who wins, how often, at what surplus.
pub fn summarize(records: &[TrialRecord]) -> Vec<SummaryRow> {
    let mut rows = Vec::new();

    for kind in AuctionKind::ALL {
        let of_kind: Vec<&TrialRecord> =
            records.iter().filter(|r| r.auction == kind).collect();
        if of_kind.is_empty() {
            continue;
        }
        let total = of_kind.len();

        for (agent_type, is_reasoning) in [("reasoning", true), ("classical", false)] {
            let winners: Vec<&TrialRecord> = of_kind
                .iter()
                .copied()
                .filter(|r| r.outcome.has_winner() && r.outcome.is_reasoning == is_reasoning)
                .collect();

            let wins = winners.len();
            let mean = |f: fn(&TrialRecord) -> f64| -> f64 {
                if winners.is_empty() {
                    0.0
                } else {
                    winners.iter().map(|r| f(r)).sum::<f64>() / winners.len() as f64
                }
            };

            rows.push(SummaryRow {
                auction: kind.label(),
                agent_type,
                wins,
                win_rate: format!("{:.2}", wins as f64 / total as f64),
                avg_utility: format!("{:.2}", mean(|r| r.outcome.utility)),
                avg_price: format!("{:.2}", mean(|r| r.outcome.winning_bid)),
            });
        }
    }

    rows
}

pub fn render_summary(rows: &[SummaryRow]) -> String {
    if rows.is_empty() {
        return "(no results)".to_string();
    }
    Table::new(rows).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::AuctionOutcome;

    fn record(trial: usize, kind: AuctionKind, winner: Option<&str>, reasoning: bool) -> TrialRecord {
        let outcome = match winner {
            Some(name) => AuctionOutcome {
                winner: Some(name.to_string()),
                winning_bid: 80.0,
                winner_value: 90.0,
                utility: 10.0,
                is_reasoning: reasoning,
                bid_trace: vec![],
            },
            None => AuctionOutcome::no_winner(),
        };
        TrialRecord {
            trial,
            auction: kind,
            outcome,
        }
    }

    #[test]
    fn test_summary_win_rates() {
        let records = vec![
            record(0, AuctionKind::Vickrey, Some("agent_1"), true),
            record(1, AuctionKind::Vickrey, Some("agent_0"), false),
            record(2, AuctionKind::Vickrey, Some("agent_2"), false),
            record(3, AuctionKind::Vickrey, None, false),
        ];
        let rows = summarize(&records);
        assert_eq!(rows.len(), 2);
        let reasoning = rows.iter().find(|r| r.agent_type == "reasoning").unwrap();
        assert_eq!(reasoning.wins, 1);
        assert_eq!(reasoning.win_rate, "0.25");
        let classical = rows.iter().find(|r| r.agent_type == "classical").unwrap();
        assert_eq!(classical.wins, 2);
        assert_eq!(classical.win_rate, "0.50");
    }

    #[test]
    fn test_summary_skips_absent_mechanisms() {
        let records = vec![record(0, AuctionKind::Dutch, Some("agent_0"), false)];
        let rows = summarize(&records);
        assert!(rows.iter().all(|r| r.auction == "Dutch"));
    }

    #[test]
    fn test_export_writes_header_and_quoted_trace() {
        let records = vec![
            record(0, AuctionKind::English, Some("agent_3"), true),
            record(1, AuctionKind::English, None, false),
        ];
        let path = std::env::temp_dir().join(format!(
            "gavel_export_test_{}.csv",
            std::process::id()
        ));
        export_csv(&path, &records).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let mut lines = contents.lines();
        assert_eq!(lines.next().unwrap(), CSV_HEADER);
        let first = lines.next().unwrap();
        assert!(first.starts_with("0,English,agent_3,80,90,10,true,"));
        let second = lines.next().unwrap();
        assert!(second.starts_with("1,English,,0,0,0,false,"));
        assert!(second.ends_with("\"[]\""));
    }

    #[test]
    fn test_render_summary_handles_empty_input() {
        assert_eq!(render_summary(&[]), "(no results)");
    }
}
