//! Text and markdown rendering of engagement analytics.
//!
//! Rendering truncates the ranked sections to the configured top-N; the
//! underlying report data is never altered.

use crate::engagement::EngagementReport;
use crate::pipeline::{client_sessions, AnalyticsOutcome};
use sessionlog_core::config::ReportConfig;

/// Report generator for terminal and markdown output.
pub struct ReportGenerator;

impl ReportGenerator {
    /// Generate a compact summary suitable for terminal display.
    pub fn text_summary(outcome: &AnalyticsOutcome, config: &ReportConfig) -> String {
        let report = &outcome.report;
        let mut output = String::new();

        output.push_str(&format!(
            "  Clients: {}  Sessions: {}  Skipped records: {}\n",
            report.session_counts.len(),
            report.total_sessions,
            outcome.skipped.len()
        ));
        output.push_str(&format!(
            "  Avg session: {}\n",
            format_minutes(report.average_session_duration_minutes)
        ));

        let engaged = &report.most_engaged;
        if !engaged.is_empty() {
            output.push_str("  Most engaged:\n");
            for entry in engaged.iter().take(config.top_clients) {
                output.push_str(&format!(
                    "    {}  {}\n",
                    entry.client_ip,
                    format_minutes(entry.duration_minutes)
                ));
            }
        }

        let urls = ranked_urls(report);
        if !urls.is_empty() {
            output.push_str("  Top URLs:\n");
            for (url, count) in urls.iter().take(config.top_urls) {
                output.push_str(&format!("    {url}  {count}\n"));
            }
        }

        output
    }

    /// Generate a full markdown report with all four analytic outputs.
    pub fn markdown_report(outcome: &AnalyticsOutcome, config: &ReportConfig) -> String {
        let report = &outcome.report;
        let mut md = String::new();

        md.push_str("# Engagement Report\n\n");

        md.push_str("## Overview\n\n");
        md.push_str(&format!("- **Clients:** {}\n", report.session_counts.len()));
        md.push_str(&format!("- **Sessions:** {}\n", report.total_sessions));
        md.push_str(&format!(
            "- **Average Session Duration:** {}\n",
            format_minutes(report.average_session_duration_minutes)
        ));
        md.push_str(&format!(
            "- **Skipped Records:** {}\n\n",
            outcome.skipped.len()
        ));

        md.push_str("## Sessions per Client\n\n");
        md.push_str("| Client | Sessions |\n");
        md.push_str("|--------|----------|\n");
        for (client, count) in ranked_session_counts(report).iter().take(config.top_clients) {
            md.push_str(&format!("| {client} | {count} |\n"));
        }
        md.push('\n');

        md.push_str("## Most Engaged Clients\n\n");
        md.push_str("| Client | Session Duration |\n");
        md.push_str("|--------|------------------|\n");
        for entry in report.most_engaged.iter().take(config.top_clients) {
            md.push_str(&format!(
                "| {} | {} |\n",
                entry.client_ip,
                format_minutes(entry.duration_minutes)
            ));
        }
        md.push('\n');

        md.push_str("## Top URLs\n\n");
        md.push_str("| URL | Sessions Visited |\n");
        md.push_str("|-----|------------------|\n");
        for (url, count) in ranked_urls(report).iter().take(config.top_urls) {
            md.push_str(&format!("| {url} | {count} |\n"));
        }
        md.push('\n');

        md
    }

    /// Per-client drill-down: the client's sessions in id order with their
    /// time bounds and distinct URL counts.
    pub fn client_report(outcome: &AnalyticsOutcome, client_ip: &str) -> String {
        let sessions = client_sessions(outcome, client_ip);
        if sessions.is_empty() {
            return format!("Client {client_ip}: no sessions\n");
        }

        let mut output = format!("Client {client_ip}: {} sessions\n", sessions.len());
        for session in sessions {
            output.push_str(&format!(
                "  #{}  {} → {}  {}  {} distinct URLs\n",
                session.session_id,
                session.start_time.format("%Y-%m-%d %H:%M:%S"),
                session.end_time.format("%Y-%m-%d %H:%M:%S"),
                format_minutes(session.duration_minutes),
                session.distinct_url_count()
            ));
        }
        output
    }
}

/// Format fractional minutes as a human-readable duration string.
pub fn format_minutes(minutes: f64) -> String {
    if minutes >= 60.0 {
        let hours = (minutes / 60.0).floor();
        format!("{}h {:.1}m", hours as u64, minutes - hours * 60.0)
    } else {
        format!("{minutes:.1}m")
    }
}

/// URL popularity sorted by visit count descending, URL ascending.
fn ranked_urls(report: &EngagementReport) -> Vec<(&str, u64)> {
    let mut urls: Vec<(&str, u64)> = report
        .url_visits
        .iter()
        .map(|(url, count)| (url.as_str(), *count))
        .collect();
    urls.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    urls
}

/// Session counts sorted by count descending, client ascending.
fn ranked_session_counts(report: &EngagementReport) -> Vec<(&str, u64)> {
    let mut counts: Vec<(&str, u64)> = report
        .session_counts
        .iter()
        .map(|(client, count)| (client.as_str(), *count))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    counts
}
