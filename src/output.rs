//! Structured output writer for the CLI: human-readable tables or raw JSON,
//! mirroring the teacher's `OutputWriter`/`OutputMode` split in
//! `src/output.rs` (JSON via `serde_json`, human via `comfy-table`/`console`
//! instead of the teacher's plain `println!` rows, since this CLI's output
//! is tabular triage cards rather than per-file transfer lines).

use comfy_table::{Cell, Color, ContentArrangement, Table};
use console::style;
use serde::Serialize;

use destill_contracts::{ProgressUpdate, RequestStatus, Severity};
use destill_ranker::RankedCard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

#[derive(Debug, Clone)]
pub struct OutputWriter {
    pub mode: OutputMode,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self {
            mode: if json { OutputMode::Json } else { OutputMode::Human },
        }
    }

    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    pub fn progress(&self, update: &ProgressUpdate) {
        match self.mode {
            OutputMode::Json => print_json(update),
            OutputMode::Human => {
                eprintln!(
                    "  {} {} ({}/{})",
                    style("›").dim(),
                    update.stage,
                    update.current,
                    update.total
                );
            }
        }
    }

    pub fn ranked_cards(&self, cards: &[RankedCard]) {
        match self.mode {
            OutputMode::Json => print_json(&cards),
            OutputMode::Human => {
                if cards.is_empty() {
                    println!("{}", style("no findings").dim());
                    return;
                }
                println!("{}", render_card_table(cards));
            }
        }
    }

    pub fn status(&self, status: &RequestStatus) {
        match self.mode {
            OutputMode::Json => print_json(status),
            OutputMode::Human => {
                println!("request    {}", status.request_id);
                println!("build      {}", status.build_url);
                println!("status     {:?}", status.status);
                println!(
                    "chunks     {}/{}",
                    status.chunks_processed, status.chunks_total
                );
                println!("findings   {}", status.findings_count);
            }
        }
    }

    pub fn error(&self, message: &str, hint: Option<&str>) {
        match self.mode {
            OutputMode::Json => {
                let payload = ErrorPayload {
                    error: message.to_string(),
                    hint: hint.map(str::to_string),
                };
                print_json(&payload);
            }
            OutputMode::Human => {
                eprintln!("{} {}", style("error:").red().bold(), message);
                if let Some(hint) = hint {
                    eprintln!("{} {}", style("Hint:").yellow(), hint);
                }
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed to serialize output: {e}"),
    }
}

fn render_card_table(cards: &[RankedCard]) -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["rank", "tier", "job", "severity", "conf", "message"]);

    for ranked in cards {
        let tier_label = match ranked.tier {
            destill_ranker::Tier::Unique => "unique",
            destill_ranker::Tier::Noise => "noise",
        };
        table.add_row(vec![
            Cell::new(ranked.rank),
            Cell::new(tier_label),
            Cell::new(&ranked.card.job_name),
            severity_cell(ranked.card.severity),
            Cell::new(format!("{:.2}", ranked.card.confidence_score)),
            Cell::new(truncate(&ranked.card.normalized_message, 80)),
        ]);
    }

    table
}

fn severity_cell(severity: Severity) -> Cell {
    let cell = Cell::new(severity.as_str());
    match severity {
        Severity::Fatal => cell.fg(Color::Red),
        Severity::Error => cell.fg(Color::Red),
        Severity::Warn => cell.fg(Color::Yellow),
        Severity::Info => cell.fg(Color::Grey),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}…", &s[..max])
    }
}

#[derive(Debug, Serialize)]
struct ErrorPayload {
    error: String,
    hint: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use destill_contracts::{ContextNote, MetadataBuilder, TriageCard};
    use destill_ranker::Tier;

    fn ranked(message: &str, tier: Tier) -> RankedCard {
        RankedCard {
            card: TriageCard {
                id: "req-1-job-1-abcd1234-10".into(),
                request_id: "req-1".into(),
                message_hash: "abcd1234".into(),
                source: "buildkite".into(),
                job_name: "build".into(),
                job_id: "job-1".into(),
                build_url: "https://buildkite.com/acme/ci/builds/1".into(),
                chunk_index: 0,
                line_in_chunk: 1,
                metadata: MetadataBuilder::new().build(),
                timestamp: Utc::now(),
                line_number: 10,
                raw_message: message.into(),
                normalized_message: message.into(),
                severity: Severity::Error,
                confidence_score: 0.9,
                pre_context: vec![],
                post_context: vec![],
                context_note: ContextNote::None,
            },
            tier,
            rank: 1,
        }
    }

    #[test]
    fn json_mode_is_detected() {
        assert!(OutputWriter::new(true).is_json());
        assert!(!OutputWriter::new(false).is_json());
    }

    #[test]
    fn card_table_renders_without_panicking_on_empty_input() {
        let writer = OutputWriter::new(false);
        writer.ranked_cards(&[]);
    }

    #[test]
    fn card_table_contains_job_name_and_severity() {
        let cards = vec![ranked("boom", Tier::Unique)];
        let table = render_card_table(&cards);
        let rendered = table.to_string();
        assert!(rendered.contains("build"));
        assert!(rendered.contains("ERROR"));
    }

    #[test]
    fn truncate_adds_ellipsis_only_when_needed() {
        assert_eq!(truncate("short", 80), "short");
        let long = "a".repeat(100);
        assert!(truncate(&long, 80).ends_with('…'));
    }
}
