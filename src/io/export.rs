//! CSV export for interval records and buckets.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::aggregate::{Bucket, Usage};
use crate::meter::IntervalRecord;
use crate::meter::sample::TIMESTAMP_FORMAT;

/// Column header for interval record export.
const RECORD_HEADER: &str = "timestamp,usage_kwh,cost,tier";

/// Column header for bucket export. `tier` is empty for daily buckets.
const BUCKET_HEADER: &str = "label,usage_kwh,cost,tier";

/// Exports interval records to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_records(records: &[IntervalRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_records(records, io::BufWriter::new(file))
}

/// Writes interval records as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_records(records: &[IntervalRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(RECORD_HEADER.split(','))?;

    for r in records {
        wtr.write_record(&[
            r.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format!("{:.4}", r.usage_kwh),
            format!("{:.4}", r.cost),
            r.tier.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports hourly or daily buckets to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_buckets(buckets: &[Bucket], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_buckets(buckets, io::BufWriter::new(file))
}

/// Writes buckets as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_buckets(buckets: &[Bucket], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(BUCKET_HEADER.split(','))?;

    for b in buckets {
        wtr.write_record(&[
            b.label(),
            format!("{:.4}", b.usage_kwh()),
            format!("{:.4}", b.cost()),
            b.tier().map(|t| t.to_string()).unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::aggregate::{DailyBucket, HourlyBucket};
    use crate::tariff::PriceTier;

    fn record(minute: u32) -> IntervalRecord {
        IntervalRecord {
            timestamp: NaiveDate::from_ymd_opt(2025, 6, 2)
                .unwrap()
                .and_hms_opt(0, minute, 0)
                .unwrap(),
            usage_kwh: 0.25,
            cost: 0.2,
            tier: PriceTier::Low,
        }
    }

    fn output(buf: Vec<u8>) -> Vec<String> {
        String::from_utf8(buf)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn records_have_header_and_one_row_each() {
        let mut buf = Vec::new();
        write_records(&[record(15), record(30)], &mut buf).unwrap();
        let lines = output(buf);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "timestamp,usage_kwh,cost,tier");
        assert_eq!(lines[1], "2025-06-02 00:15,0.2500,0.2000,low");
    }

    #[test]
    fn daily_buckets_have_empty_tier() {
        let buckets = [
            Bucket::from(HourlyBucket {
                hour: 7,
                usage_kwh: 1.0,
                cost: 1.3,
                tier: PriceTier::High,
            }),
            Bucket::from(DailyBucket {
                date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
                usage_kwh: 12.0,
                cost: 13.5,
            }),
        ];
        let mut buf = Vec::new();
        write_buckets(&buckets, &mut buf).unwrap();
        let lines = output(buf);
        assert_eq!(lines[1], "07:00,1.0000,1.3000,high");
        assert_eq!(lines[2], "2025-06-02,12.0000,13.5000,");
    }

    #[test]
    fn deterministic_output() {
        let records: Vec<IntervalRecord> = (1..4).map(|q| record(q * 15)).collect();
        let mut buf1 = Vec::new();
        let mut buf2 = Vec::new();
        write_records(&records, &mut buf1).unwrap();
        write_records(&records, &mut buf2).unwrap();
        assert_eq!(buf1, buf2);
    }
}
