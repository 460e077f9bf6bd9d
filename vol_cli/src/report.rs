use std::io::Write;

use vol_core::{DiurnalReport, Estimate};

fn cell(estimate: Option<&Estimate>) -> String {
    match estimate.and_then(Estimate::value) {
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

/// Writes `time,full,block_0,...` with one row per intraday position.
/// Undefined estimates are left as empty cells.
pub fn write_patterns<W: Write>(report: &DiurnalReport, out: W) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    let mut header = vec!["time".to_string(), "full".to_string()];
    header.extend((0..report.rolling.len()).map(|i| format!("block_{}", i)));
    wtr.write_record(&header)?;

    let full = &report.full;
    for (pos, time) in full.time_of_day().iter().enumerate() {
        let mut row = vec![time.format("%H:%M:%S").to_string(), cell(full.values().get(pos))];
        row.extend(report.rolling.iter().map(|p| cell(p.values().get(pos))));
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// One-line-per-fact summary for the terminal
pub fn summary(report: &DiurnalReport) -> String {
    let undefined: usize = report.volatilities.iter().map(|v| v.undefined_count()).sum();
    let alignment = report.full.alignment();
    format!(
        "days used: {}\ndays skipped: {}\npattern positions: {} ({} dropped to align days)\nundefined day estimates: {}\nrolling blocks: {}",
        report.full.days(),
        report.skipped.len(),
        report.full.len(),
        alignment.dropped_positions(),
        undefined,
        report.rolling.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use vol_core::{DiurnalAnalyzer, PriceSeries, VolConfig};

    fn report() -> DiurnalReport {
        let open = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let day = |shift: f64| {
            let prices = vec![100.0, 100.2 + shift, 100.1, 100.4, 100.3];
            let dt = (0..prices.len()).map(|i| open + Duration::seconds(i as i64)).collect();
            PriceSeries::new(dt, prices).unwrap()
        };
        let config = VolConfig {
            window: 2,
            window_pattern: 2,
            ..VolConfig::default()
        };
        DiurnalAnalyzer::new(config)
            .unwrap()
            .run(&[day(0.0), day(0.1), day(0.2)])
            .unwrap()
    }

    #[test]
    fn test_write_patterns() {
        let mut buf = Vec::new();
        write_patterns(&report(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "time,full,block_0");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("09:30:02,"));
    }

    #[test]
    fn test_summary() {
        let text = summary(&report());
        assert!(text.contains("days used: 3"));
        assert!(text.contains("rolling blocks: 1"));
    }
}
