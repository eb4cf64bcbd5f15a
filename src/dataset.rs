use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::model::ScoredRecord;
use crate::util::ensure_parent_directory;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
pub const DATASET_COLUMNS: [&str; 4] = [
    "comment",
    "rating",
    "sentiment_ground_truth",
    "sentiment_predicted",
];

#[derive(Debug, Serialize, Deserialize)]
struct DatasetRow {
    comment: String,
    rating: i64,
    sentiment_ground_truth: i8,
    sentiment_predicted: u8,
}

impl From<&ScoredRecord> for DatasetRow {
    fn from(record: &ScoredRecord) -> Self {
        Self {
            comment: record.text().to_string(),
            rating: record.raw_rating(),
            sentiment_ground_truth: record.ground_truth().code(),
            sentiment_predicted: record.predicted().code(),
        }
    }
}

pub fn write_dataset(path: &Path, records: &[ScoredRecord]) -> Result<()> {
    ensure_parent_directory(path)?;

    let file = File::create(path)
        .with_context(|| format!("failed to create dataset file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_dataset_to(&mut writer, records)
        .with_context(|| format!("failed to write dataset file: {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to finalize dataset file: {}", path.display()))?;

    Ok(())
}

/// BOM, header row, then one row per record in order.
pub fn write_dataset_to<W: Write>(mut output: W, records: &[ScoredRecord]) -> Result<()> {
    output.write_all(UTF8_BOM)?;

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(output);
    writer.write_record(DATASET_COLUMNS)?;
    for record in records {
        writer.serialize(DatasetRow::from(record))?;
    }
    writer.flush()?;

    Ok(())
}

pub fn read_dataset(path: &Path) -> Result<Vec<ScoredRecord>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open dataset file: {}", path.display()))?;
    read_dataset_from(file).with_context(|| format!("failed to read dataset: {}", path.display()))
}

pub fn read_dataset_from<R: Read>(mut input: R) -> Result<Vec<ScoredRecord>> {
    let mut raw = Vec::new();
    input.read_to_end(&mut raw)?;
    let body = raw.strip_prefix(UTF8_BOM).unwrap_or(&raw[..]);

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(body);
    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<DatasetRow>().enumerate() {
        let row = row.with_context(|| format!("malformed dataset row {}", index + 1))?;
        let record = ScoredRecord::from_parts(
            row.comment,
            row.rating,
            row.sentiment_ground_truth,
            row.sentiment_predicted,
        )
        .with_context(|| format!("invalid dataset row {}", index + 1))?;
        records.push(record);
    }

    Ok(records)
}

pub fn count_dataset_rows(path: &Path) -> Result<usize> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let body = raw.strip_prefix(UTF8_BOM).unwrap_or(&raw[..]);
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(body);

    let mut count = 0usize;
    for row in reader.records() {
        row.with_context(|| format!("malformed row in {}", path.display()))?;
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::{UTF8_BOM, read_dataset, read_dataset_from, write_dataset, write_dataset_to};
    use crate::model::{CommentRecord, ScoredRecord, Sentiment};

    fn sample_records() -> Vec<ScoredRecord> {
        vec![
            ScoredRecord::new(CommentRecord::new("마동석 최고!!", 10), Sentiment::Positive),
            ScoredRecord::new(
                CommentRecord::new("별로, \"진짜\" 별로\n두 번은 안 봄", 2),
                Sentiment::Negative,
            ),
            ScoredRecord::new(CommentRecord::new("그냥 그럼", 5), Sentiment::Positive),
            ScoredRecord::new(CommentRecord::new("", 0), Sentiment::Negative),
        ]
    }

    #[test]
    fn written_dataset_starts_with_bom_and_header() {
        let mut buffer = Vec::new();
        write_dataset_to(&mut buffer, &sample_records()).expect("write should succeed");

        assert!(buffer.starts_with(UTF8_BOM));
        let text = String::from_utf8(buffer[UTF8_BOM.len()..].to_vec()).expect("utf-8");
        let header = text.lines().next().expect("header line");
        assert_eq!(
            header,
            "comment,rating,sentiment_ground_truth,sentiment_predicted"
        );
        assert!(text.contains("그냥 그럼,5,-1,1"));
    }

    #[test]
    fn dataset_round_trips_all_fields_through_a_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("out").join("dataset.csv");
        let records = sample_records();

        write_dataset(&path, &records).expect("write should succeed");
        let restored = read_dataset(&path).expect("read should succeed");

        assert_eq!(restored, records);
    }

    #[test]
    fn empty_dataset_still_has_a_header() {
        let mut buffer = Vec::new();
        write_dataset_to(&mut buffer, &[]).expect("write should succeed");
        let restored = read_dataset_from(buffer.as_slice()).expect("read should succeed");
        assert!(restored.is_empty());
        assert!(buffer.len() > UTF8_BOM.len());
    }

    #[test]
    fn reader_accepts_files_without_bom() {
        let raw = "comment,rating,sentiment_ground_truth,sentiment_predicted\n재밌다,8,1,1\n";
        let restored = read_dataset_from(raw.as_bytes()).expect("read should succeed");
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].text(), "재밌다");
        assert_eq!(restored[0].predicted(), Sentiment::Positive);
    }

    #[test]
    fn reader_reports_row_number_for_bad_labels() {
        let raw = "comment,rating,sentiment_ground_truth,sentiment_predicted\n좋다,8,1,1\n싫다,2,1,0\n";
        let error = read_dataset_from(raw.as_bytes()).expect_err("row 2 is inconsistent");
        assert!(
            error.to_string().contains("invalid dataset row 2"),
            "unexpected error: {error}"
        );
    }
}
