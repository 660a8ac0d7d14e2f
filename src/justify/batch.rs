use std::io;

use serde::Serialize;
use tracing::{info, warn};

use super::processor::{Justification, ProcessError, RecordProcessor};
use super::record::JustificationRecord;
use crate::gemini::GenerationClient;
use crate::pubmed::LiteratureSource;
use crate::render::citation_cell;

/// Header names that must be present in a batch CSV. `Concerns` is optional.
const REQUIRED_COLUMNS: &[&str] = &["Drug Name", "Excipient", "Formulation Type", "Excipient Role"];

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("input is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Outcome for one input row. A failed row keeps its record so the output
/// can still identify it.
#[derive(Debug)]
pub struct BatchResult {
    pub record: JustificationRecord,
    pub outcome: Result<Justification, ProcessError>,
}

#[derive(Serialize)]
struct OutputRow<'a> {
    #[serde(rename = "Drug Name")]
    drug_name: &'a str,
    #[serde(rename = "Excipient")]
    excipient: &'a str,
    #[serde(rename = "Formulation Type")]
    formulation_type: &'a str,
    #[serde(rename = "Excipient Role")]
    excipient_role: &'a str,
    #[serde(rename = "Concerns")]
    concerns: &'a str,
    #[serde(rename = "Justification")]
    justification: String,
    #[serde(rename = "Citations")]
    citations: String,
}

/// A batch row whose bytes could not be decoded, with a lossy copy of its
/// fields so the output can still identify it.
#[derive(Debug)]
pub struct UnreadableRow {
    pub record: JustificationRecord,
    pub line: u64,
    pub reason: String,
}

pub type InputRow = Result<JustificationRecord, UnreadableRow>;

/// Parses batch CSV input. Fails as a whole if a required column is absent;
/// short rows come back with blank fields and fail validation per row, and
/// undecodable rows (e.g. invalid UTF-8) come back as `Err` in place.
pub fn read_records<R: io::Read>(reader: R) -> Result<Vec<InputRow>, BatchError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let missing: Vec<_> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        return Err(BatchError::MissingColumns(missing));
    }

    let byte_headers = reader.byte_headers()?.clone();
    let mut rows = Vec::new();
    let mut raw = csv::ByteRecord::new();
    while reader.read_byte_record(&mut raw)? {
        match raw.deserialize::<JustificationRecord>(Some(&byte_headers)) {
            Ok(record) => rows.push(Ok(record)),
            Err(e) => {
                let line = raw.position().map_or(0, |p| p.line());
                warn!(line, error = %e, "unreadable CSV row");
                rows.push(Err(UnreadableRow {
                    record: lossy_record(&byte_headers, &raw),
                    line,
                    reason: e.to_string(),
                }));
            }
        }
    }
    Ok(rows)
}

fn lossy_record(headers: &csv::ByteRecord, raw: &csv::ByteRecord) -> JustificationRecord {
    let field = |name: &str| {
        headers
            .iter()
            .position(|h| h == name.as_bytes())
            .and_then(|i| raw.get(i))
            .map(|v| String::from_utf8_lossy(v).into_owned())
            .unwrap_or_default()
    };
    JustificationRecord::new(
        field("Drug Name"),
        field("Excipient"),
        field("Formulation Type"),
        field("Excipient Role"),
        field("Concerns"),
    )
}

/// Processes rows one at a time in input order. Always returns exactly
/// one result per row; a failing or unreadable row does not stop the batch.
pub async fn run_batch<G, S>(
    processor: &RecordProcessor<G, S>,
    rows: Vec<InputRow>,
) -> Vec<BatchResult>
where
    G: GenerationClient,
    S: LiteratureSource,
{
    let total = rows.len();
    let mut results = Vec::with_capacity(total);

    for (i, row) in rows.into_iter().enumerate() {
        let (record, outcome) = match row {
            Ok(record) => {
                let outcome = processor.process(&record).await;
                (record, outcome)
            }
            Err(UnreadableRow {
                record,
                line,
                reason,
            }) => (record, Err(ProcessError::UnreadableRow { line, reason })),
        };
        match &outcome {
            Ok(_) => info!(row = i + 1, total, excipient = %record.excipient, "row processed"),
            Err(e) => warn!(row = i + 1, total, error = %e, "row failed"),
        }
        results.push(BatchResult { record, outcome });
    }

    results
}

/// Writes one CSV row per result. Failed rows carry `ERROR: <message>` in
/// the `Justification` column and no citations.
pub fn write_results<W: io::Write>(writer: W, results: &[BatchResult]) -> Result<(), BatchError> {
    let mut writer = csv::Writer::from_writer(writer);
    for result in results {
        let (justification, citations) = match &result.outcome {
            Ok(j) => (j.text.clone(), citation_cell(&j.citations)),
            Err(e) => (format!("ERROR: {e}"), String::new()),
        };
        let record = &result.record;
        writer.serialize(OutputRow {
            drug_name: &record.drug_name,
            excipient: &record.excipient,
            formulation_type: &record.formulation_type,
            excipient_role: &record.excipient_role,
            concerns: &record.concerns,
            justification,
            citations,
        })?;
    }
    writer.flush()?;
    Ok(())
}
