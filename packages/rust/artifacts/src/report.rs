//! Markdown report body.
//!
//! Layout: title, generation time, query information, executive summary,
//! then one section per source present in the record, then an end marker.
//! Absent sources produce no section at all.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use mednexa_shared::{AggregatedRecord, SourceId};

use crate::format::{format_currency, format_percentage, format_thousands};

type Section = Map<String, Value>;

pub const REPORT_TITLE: &str = "MedNexa Report";
pub const END_MARKER: &str = "--- End of Report ---";

/// Build the full report body.
pub fn build_report(summary: &str, record: &AggregatedRecord, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {REPORT_TITLE}\n\n"));
    out.push_str(&format!(
        "_Generated: {}_\n\n",
        generated_at.format("%B %d, %Y at %H:%M UTC")
    ));

    query_information(&mut out, record);
    executive_summary(&mut out, summary);

    // Fixed section order, independent of which sources ran.
    let sections: [(SourceId, fn(&mut String, &Section)); 6] = [
        (SourceId::Iqvia, market_section),
        (SourceId::Patent, patent_section),
        (SourceId::ClinicalTrials, trials_section),
        (SourceId::Exim, trade_section),
        (SourceId::InternalKnowledge, internal_section),
        (SourceId::WebIntelligence, web_section),
    ];
    for (source, render) in sections {
        if let Some(data) = record.section(source) {
            render(&mut out, data);
        }
    }

    out.push_str(&format!("---\n\n{END_MARKER}\n"));
    out
}

// ---------------------------------------------------------------------------
// Fixed sections
// ---------------------------------------------------------------------------

fn query_information(out: &mut String, record: &AggregatedRecord) {
    let ctx = &record.query_context;
    let entities = &ctx.entities;

    heading(out, "Query Information");
    out.push_str(&format!("- **Query:** {}\n", ctx.original_query));
    out.push_str(&format!("- **Drug:** {}\n", entities.subject));
    out.push_str(&format!("- **Therapeutic Area:** {}\n", entities.category));
    out.push_str(&format!("- **Regions:** {}\n", entities.regions.join(", ")));
    out.push_str(&format!("- **Time Window:** {}\n\n", entities.time_window));
}

/// Model output normalized to plain Markdown: `#` lines become
/// sub-headings, `-`/`•` lines become bullets, `*` emphasis is dropped.
fn executive_summary(out: &mut String, summary: &str) {
    heading(out, "Executive Summary");

    for line in summary.lines() {
        let clean = line.replace('*', "");
        let clean = clean.trim();
        if clean.is_empty() {
            continue;
        }

        if clean.starts_with('#') {
            out.push_str(&format!("### {}\n\n", clean.trim_start_matches('#').trim()));
        } else if clean.starts_with('-') || clean.starts_with('•') {
            out.push_str(&format!("- {}\n\n", clean.trim_start_matches(['-', '•']).trim()));
        } else {
            out.push_str(&format!("{clean}\n\n"));
        }
    }
}

// ---------------------------------------------------------------------------
// Source sections
// ---------------------------------------------------------------------------

fn market_section(out: &mut String, data: &Section) {
    heading(out, "Market Intelligence (IQVIA)");
    table(
        out,
        &["Metric", "Value"],
        &[
            row(["Market Size", &format_currency(uint(data, "market_size_usd"))]),
            row(["Growth Rate (CAGR)", &format_percentage(float(data, "growth_rate_cagr"))]),
        ],
    );

    let trends: Vec<Vec<String>> = array(data, "prescription_trends")
        .iter()
        .map(|point| {
            let year = point.get("year").and_then(Value::as_u64).unwrap_or(0);
            let count = point.get("prescriptions").and_then(Value::as_u64).unwrap_or(0);
            row([&year.to_string(), &format_thousands(count)])
        })
        .collect();
    if !trends.is_empty() {
        table(out, &["Year", "Prescriptions"], &trends);
    }

    if let Some(Value::Object(shares)) = data.get("competitor_share") {
        let rows: Vec<Vec<String>> = shares
            .iter()
            .map(|(name, share)| row([name, &format_percentage(share.as_f64().unwrap_or(0.0))]))
            .collect();
        if !rows.is_empty() {
            table(out, &["Competitor", "Market Share"], &rows);
        }
    }
}

fn patent_section(out: &mut String, data: &Section) {
    heading(out, "Patent Landscape");
    table(
        out,
        &["Metric", "Value"],
        &[
            row(["Active Patents", &uint(data, "active_patents").to_string()]),
            row(["Competitor Filings", &uint(data, "competitor_filings").to_string()]),
            row([
                "Exclusivity Window",
                &format!("{} years", uint(data, "exclusivity_window_years")),
            ]),
        ],
    );

    let expiring: Vec<Vec<String>> = array(data, "expiring_soon")
        .iter()
        .map(|patent| {
            let id = patent.get("patent_id").and_then(Value::as_str).unwrap_or("N/A");
            let expiry = patent.get("expiry_date").and_then(Value::as_str).unwrap_or("N/A");
            row([id, expiry])
        })
        .collect();
    if !expiring.is_empty() {
        table(out, &["Expiring Patent", "Expiry Date"], &expiring);
    }
}

fn trials_section(out: &mut String, data: &Section) {
    heading(out, "Clinical Trials Overview");
    table(
        out,
        &["Metric", "Value"],
        &[
            row(["Total Trials", &uint(data, "total_trials").to_string()]),
            row(["Completion Rate", &format_percentage(float(data, "completion_rate"))]),
            row(["Competitive Trials", &uint(data, "competitive_trials").to_string()]),
        ],
    );

    let phases = data.get("phase_distribution");
    let count = |key: &str| {
        phases
            .and_then(|p| p.get(key))
            .and_then(Value::as_u64)
            .unwrap_or(0)
            .to_string()
    };
    table(
        out,
        &["Phase 1", "Phase 2", "Phase 3", "Phase 4"],
        &[vec![count("phase_1"), count("phase_2"), count("phase_3"), count("phase_4")]],
    );
}

fn trade_section(out: &mut String, data: &Section) {
    heading(out, "Trade & EXIM Analysis");
    table(
        out,
        &["Metric", "Value"],
        &[
            row(["Import Volume", &format!("{} kg", format_thousands(uint(data, "import_volume_kg")))]),
            row(["Export Volume", &format!("{} kg", format_thousands(uint(data, "export_volume_kg")))]),
            row(["Tariff Impact", &format_percentage(float(data, "tariff_impact_pct"))]),
        ],
    );
    bullets(out, "Trade Barriers", array(data, "trade_barriers"));
    bullets(out, "Top Exporters", array(data, "top_exporters"));
}

fn internal_section(out: &mut String, data: &Section) {
    heading(out, "Internal Analysis");
    let priority = data
        .get("strategic_priority")
        .and_then(Value::as_str)
        .unwrap_or("N/A")
        .to_uppercase();
    table(
        out,
        &["Metric", "Value"],
        &[
            row(["R&D Budget", &format_currency(uint(data, "rd_budget_usd"))]),
            row([
                "Manufacturing Capacity",
                &format!(
                    "{} units/year",
                    format_thousands(uint(data, "manufacturing_capacity_units_per_year"))
                ),
            ]),
            row(["2025 Revenue Forecast", &format_currency(uint(data, "forecast_revenue_2025_usd"))]),
            row(["Strategic Priority", &priority]),
        ],
    );
}

fn web_section(out: &mut String, data: &Section) {
    heading(out, "Web Intelligence");
    table(
        out,
        &["Metric", "Value"],
        &[
            row(["Sentiment Score", &format!("{:.2}", float(data, "sentiment_score"))]),
            row(["News Mentions", &uint(data, "news_mentions").to_string()]),
        ],
    );
    bullets(out, "Regulatory Updates", array(data, "regulatory_updates"));
    bullets(out, "Market Rumors", array(data, "market_rumors"));
}

// ---------------------------------------------------------------------------
// Markdown helpers
// ---------------------------------------------------------------------------

fn heading(out: &mut String, title: &str) {
    out.push_str(&format!("## {title}\n\n"));
}

fn row<const N: usize>(cells: [&str; N]) -> Vec<String> {
    cells.iter().map(|c| (*c).to_string()).collect()
}

fn table(out: &mut String, header: &[&str], rows: &[Vec<String>]) {
    out.push_str(&format!("| {} |\n", header.join(" | ")));
    out.push_str(&format!("|{}\n", "---|".repeat(header.len())));
    for cells in rows {
        let escaped: Vec<String> = cells.iter().map(|c| c.replace('|', "\\|")).collect();
        out.push_str(&format!("| {} |\n", escaped.join(" | ")));
    }
    out.push('\n');
}

/// Bulleted list of string items; nothing when empty.
fn bullets(out: &mut String, title: &str, items: &[Value]) {
    let items: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("**{title}:**\n\n"));
    for item in items {
        out.push_str(&format!("- {item}\n"));
    }
    out.push('\n');
}

fn uint(data: &Section, key: &str) -> u64 {
    data.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn float(data: &Section, key: &str) -> f64 {
    data.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn array<'a>(data: &'a Section, key: &str) -> &'a [Value] {
    data.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
