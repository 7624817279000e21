//! Fixed-width tabular report rendering.

use std::io::Write;

use humansize::{BINARY, format_size};

use whodu_core::{NamedUsage, ReportOptions, SizeHistogram, UsageReport};

use crate::error::ReportError;
use crate::select::{compile_filter, filter_users, sort_by_metric};

/// Render a report as aligned text tables: one overall summary row, a
/// per-group table, and a per-user table (filtered and sorted per options).
pub fn render_report<W: Write>(
    options: &ReportOptions,
    report: &UsageReport,
    out: &mut W,
) -> Result<(), ReportError> {
    let filter = compile_filter(options)?;

    let title = format!("Usage summary : {}", report.path.display());
    writeln!(out)?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(title.len()))?;
    writeln!(out)?;

    let labels = bucket_labels(report.overall.histogram.upper_borders());

    // Overall
    let widths = bucket_widths(&labels, &[&report.overall.histogram]);
    let header = format!(
        "{:>8} | {:>7} | {:>12} | {:>9} | {:>10} | {:>9} | {:>10} | {}",
        "#Groups",
        "#Users",
        "#Directories",
        "#Symlinks",
        "#Files",
        "Size [MB]",
        "#Blocks",
        bucket_header(&labels, &widths)
    );
    writeln!(out, "{header}")?;
    writeln!(out, "{}", "-".repeat(header.len()))?;
    let overall = &report.overall;
    writeln!(
        out,
        "{:>8} | {:>7} | {:>12} | {:>9} | {:>10} | {:>9} | {:>10} | {}",
        report.group_count(),
        report.user_count(),
        overall.directories,
        overall.symlinks,
        overall.files,
        overall.size_mb(),
        overall.blocks,
        bucket_row(&overall.histogram, &widths)
    )?;
    writeln!(out)?;

    // Groups
    let mut groups = report.by_group.clone();
    sort_by_metric(&mut groups, options.sort);
    render_table(out, "By group", &groups, &labels)?;

    // Users
    let mut users = filter_users(&report.by_user, filter.as_ref());
    sort_by_metric(&mut users, options.sort);
    render_table(out, "By user", &users, &labels)?;

    Ok(())
}

/// Render one per-name table. Bucket column widths are computed once for the
/// whole table so every row shares the same column boundaries.
fn render_table<W: Write>(
    out: &mut W,
    section: &str,
    rows: &[NamedUsage],
    labels: &[String],
) -> Result<(), ReportError> {
    let histograms: Vec<&SizeHistogram> = rows.iter().map(|row| &row.usage.histogram).collect();
    let widths = bucket_widths(labels, &histograms);

    let header = format!(
        "{:<22} | {:>12} | {:>9} | {:>10} | {:>9} | {:>10} | {}",
        format!("{section}: {}", rows.len()),
        "#Directories",
        "#Symlinks",
        "#Files",
        "Size [MB]",
        "#Blocks",
        bucket_header(labels, &widths)
    );
    writeln!(out, "{header}")?;
    writeln!(out, "{}", "-".repeat(header.len()))?;

    for row in rows {
        let usage = &row.usage;
        writeln!(
            out,
            "{:>22} | {:>12} | {:>9} | {:>10} | {:>9} | {:>10} | {}",
            row.name,
            usage.directories,
            usage.symlinks,
            usage.files,
            usage.size_mb(),
            usage.blocks,
            bucket_row(&usage.histogram, &widths)
        )?;
    }
    writeln!(out)?;

    Ok(())
}

/// Column labels for the bucket borders plus the open overflow bucket.
fn bucket_labels(borders: &[u64]) -> Vec<String> {
    let mut labels: Vec<String> = borders
        .iter()
        .map(|border| format_size(*border, BINARY))
        .collect();
    if let Some(last) = borders.last() {
        labels.push(format!("> {}", format_size(*last, BINARY)));
    }
    labels
}

/// Per-bucket column widths: wide enough for the label and for the widest
/// count in any of the given histograms.
fn bucket_widths(labels: &[String], histograms: &[&SizeHistogram]) -> Vec<usize> {
    labels
        .iter()
        .enumerate()
        .map(|(slot, label)| {
            let widest_count = histograms
                .iter()
                .map(|hist| digits(hist.counts()[slot]))
                .max()
                .unwrap_or(1);
            label.len().max(widest_count)
        })
        .collect()
}

fn digits(n: u64) -> usize {
    n.to_string().len()
}

fn bucket_header(labels: &[String], widths: &[usize]) -> String {
    labels
        .iter()
        .zip(widths)
        .map(|(label, width)| format!("{label:>width$}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn bucket_row(histogram: &SizeHistogram, widths: &[usize]) -> String {
    histogram
        .counts()
        .iter()
        .zip(widths)
        .map(|(count, width)| format!("{count:0width$}"))
        .collect::<Vec<_>>()
        .join(" ")
}
