//! Plain-text report.
//!
//! ```text
//! daily (/data/2014/08/19/*)
//! 	age (env=prod): 5000
//! 	size (env=prod): 400
//! broken (error: Invalid path name: '3x')
//! ```

use std::io::{self, Write};

use pathmetrics::pipeline::{MetricDatum, PathMetrics};

pub fn write_report<W: Write>(out: &mut W, results: &[PathMetrics]) -> io::Result<()> {
    for path_metrics in results {
        write_path_metrics(out, path_metrics)?;
    }
    Ok(())
}

pub fn write_path_metrics<W: Write>(out: &mut W, path_metrics: &PathMetrics) -> io::Result<()> {
    match (&path_metrics.path_status, &path_metrics.error) {
        (Some(status), None) => {
            writeln!(out, "{} ({})", status.name, status.value)?;
            for datum in path_metrics.metric_data.iter().flatten() {
                write_metric_datum(out, datum)?;
            }
            Ok(())
        }
        (_, Some(error)) => writeln!(out, "{} (error: {})", path_metrics.path.name, error),
        (None, None) => writeln!(out, "{} (no status)", path_metrics.path.name),
    }
}

fn write_metric_datum<W: Write>(out: &mut W, datum: &MetricDatum) -> io::Result<()> {
    let tags: Vec<String> = datum
        .id
        .tags
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    writeln!(out, "\t{} ({}): {:.0}", datum.id.name, tags.join(" "), datum.value)
}
