//! Terminal output for command results

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};

use graft_core::{GraphStats, SchemaReport};
use graft_pipeline::{LoadReport, SourceReport};

/// Failures listed individually before the rest are summarized
const MAX_LISTED_FAILURES: usize = 20;

pub fn info(message: &str) {
    println!("{} {}", "•".cyan(), message);
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn warning(message: &str) {
    println!("{} {}", "!".yellow(), message.yellow());
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count == 0 {
        Cell::new(count)
    } else {
        Cell::new(count).fg(color)
    }
}

fn source_row(report: &SourceReport) -> Vec<Cell> {
    vec![
        Cell::new(&report.name),
        Cell::new(report.succeeded),
        count_cell(report.failed(), Color::Red),
        Cell::new(report.entities),
        Cell::new(report.mentions),
        Cell::new(report.relations),
        Cell::new(report.tables),
        match &report.read_error {
            Some(err) => Cell::new(err).fg(Color::Red),
            None => Cell::new(""),
        },
    ]
}

/// Render the per-source table for a load
pub fn load_table(report: &LoadReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Source",
        "Processed",
        "Failed",
        "Entities",
        "Mentions",
        "Relations",
        "Tables",
        "Read error",
    ]);

    for source in &report.sources {
        table.add_row(source_row(source));
    }

    let sum = |f: fn(&SourceReport) -> usize| report.sources.iter().map(f).sum::<usize>();
    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(report.total_succeeded()),
        count_cell(report.total_failed(), Color::Red),
        Cell::new(sum(|s| s.entities)),
        Cell::new(sum(|s| s.mentions)),
        Cell::new(sum(|s| s.relations)),
        Cell::new(sum(|s| s.tables)),
        count_cell(report.unreadable_sources(), Color::Red),
    ]);
    table
}

pub fn print_load_report(report: &LoadReport) {
    println!("{}", load_table(report));

    let mut failures = report.failures().peekable();
    if failures.peek().is_some() {
        println!("\n{}", "Failed records:".red().bold());
        for (source, failure) in failures.by_ref().take(MAX_LISTED_FAILURES) {
            println!("  {} {}", source.dimmed(), failure);
        }
        let rest = failures.count();
        if rest > 0 {
            println!("  ... and {} more (see the log for details)", rest);
        }
    }

    let verb = if report.dry_run { "Checked" } else { "Loaded" };
    let summary = format!(
        "{} {} record(s), {} failed, from {} file(s) in {:.1?}",
        verb,
        report.total_succeeded(),
        report.total_failed(),
        report.sources.len(),
        report.elapsed
    );
    println!();
    if report.total_failed() == 0 && report.unreadable_sources() == 0 {
        success(&summary);
    } else {
        warning(&summary);
    }
}

pub fn print_schema_report(report: &SchemaReport) {
    if report.constraints_created.is_empty() {
        info(&format!(
            "All {} uniqueness constraints already present",
            report.constraints_ensured
        ));
    } else {
        let kinds: Vec<String> = report
            .constraints_created
            .iter()
            .map(|k| k.to_string())
            .collect();
        success(&format!("Created uniqueness constraints on {}", kinds.join(", ")));
    }

    if report.index_created {
        success(&format!("Created vector index {}", report.index_name));
    } else {
        info(&format!("Vector index {} already present", report.index_name));
    }
    success(&format!(
        "Vector index {} is online (after {} status check(s))",
        report.index_name, report.polls
    ));
}

pub fn stats_table(stats: &GraphStats) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Metric", "Count"]);
    let rows = [
        ("Documents", stats.documents),
        ("Chunks", stats.chunks),
        ("Table chunks", stats.table_chunks),
        ("Chunks with document id", stats.chunks_with_document),
        ("Entities", stats.entities),
        ("Edges", stats.edges),
        ("PART_OF edges", stats.part_of_edges),
    ];
    for (name, count) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(count)]);
    }
    table
}

pub fn print_stats(stats: &GraphStats) {
    println!("{}", "Graph Statistics".bold());
    println!("{}", stats_table(stats));

    match &stats.sample_table_chunk {
        Some(sample) => {
            println!("\n{}", "Sample table chunk".bold());
            println!("  id:      {}", sample.id);
            println!("  summary: {}", sample.summary.as_deref().unwrap_or("-"));
            println!("  html:    {}", sample.html_prefix.as_deref().unwrap_or("-"));
        }
        None => {
            println!();
            warning("No table chunks found. Check that table records carry \"type\": \"table\".");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_pipeline::{FailureKind, RecordFailure};

    #[test]
    fn load_table_has_a_total_row() {
        let mut source = SourceReport::new("a.jsonl");
        source.succeeded = 8;
        source.failures = vec![RecordFailure {
            line: 5,
            chunk_id: None,
            kind: FailureKind::Parse,
            reason: "EOF".into(),
        }];
        let report = LoadReport {
            sources: vec![source],
            ..Default::default()
        };

        let rendered = load_table(&report).to_string();
        assert!(rendered.contains("a.jsonl"));
        assert!(rendered.contains("Total"));
        assert!(rendered.contains('8'));
    }

    #[test]
    fn stats_table_lists_every_metric() {
        let rendered = stats_table(&GraphStats {
            chunks: 12,
            ..Default::default()
        })
        .to_string();
        assert!(rendered.contains("Chunks with document id"));
        assert!(rendered.contains("12"));
    }
}
