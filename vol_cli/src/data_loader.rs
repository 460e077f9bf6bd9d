use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, info, warn};
use vol_core::{PriceSeries, VolException};

const DT_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

#[derive(Debug, Deserialize)]
struct PriceRecord {
    #[serde(rename = "DT")]
    dt: String,
    price: f64,
}

/// One day of prices read from disk
#[derive(Debug)]
pub struct DayPrices {
    pub date: NaiveDate,
    pub series: PriceSeries,
}

/// Price files `<asset>_<YYYY-MM-DD>.csv` in `dir`, sorted by date
pub fn discover_days(dir: &Path, asset: &str) -> anyhow::Result<Vec<(NaiveDate, PathBuf)>> {
    let prefix = format!("{}_", asset);
    let mut days = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("reading {:?}", dir))? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) != Some("csv") {
            continue;
        }
        let Some(date) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|stem| stem.strip_prefix(&prefix))
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        else {
            debug!(?path, "not a price file, ignored");
            continue;
        };
        days.push((date, path));
    }
    days.sort_by_key(|(date, _)| *date);
    Ok(days)
}

/// Dates listed one per line; blank lines and `#` comments are ignored
pub fn read_exclusions(path: &Path) -> anyhow::Result<BTreeSet<NaiveDate>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    parse_exclusions(&text).with_context(|| format!("parsing {:?}", path))
}

fn parse_exclusions(text: &str) -> anyhow::Result<BTreeSet<NaiveDate>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            NaiveDate::parse_from_str(line, "%Y-%m-%d")
                .map_err(|e| anyhow::anyhow!("bad date {:?}: {}", line, e))
        })
        .collect()
}

pub fn load_day(path: &Path, date: NaiveDate) -> anyhow::Result<DayPrices> {
    let file = File::open(path).with_context(|| format!("opening {:?}", path))?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut dt = Vec::new();
    let mut prices = Vec::new();
    for result in rdr.deserialize::<PriceRecord>() {
        let record = result.with_context(|| format!("parsing {:?}", path))?;
        dt.push(parse_dt(&record.dt)?);
        prices.push(record.price);
    }
    let series = PriceSeries::new(dt, prices).with_context(|| format!("loading {:?}", path))?;
    Ok(DayPrices { date, series })
}

/// Load every day of `asset` in `dir` except the excluded dates.
///
/// Days whose prices fail validation are skipped; unreadable files abort.
pub fn load_days(
    dir: &Path,
    asset: &str,
    excluded: &BTreeSet<NaiveDate>,
) -> anyhow::Result<Vec<DayPrices>> {
    let files = discover_days(dir, asset)?;
    let total = files.len();
    let mut days = Vec::with_capacity(total);
    for (date, path) in files.into_iter().filter(|(date, _)| !excluded.contains(date)) {
        match load_day(&path, date) {
            Ok(day) => days.push(day),
            Err(e) if is_data_err(&e) => warn!(%date, error = %e, "skipping invalid day"),
            Err(e) => return Err(e),
        }
    }
    info!(found = total, kept = days.len(), "loaded price files");
    Ok(days)
}

fn is_data_err(err: &anyhow::Error) -> bool {
    err.downcast_ref::<VolException>()
        .map_or(false, VolException::is_data_err)
}

fn parse_dt(s: &str) -> anyhow::Result<NaiveDateTime> {
    DT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| anyhow::anyhow!("Failed to parse datetime: {}", s))
}
