use crate::error::NormalizeError;
use crate::source::{RecordSet, RowMapper, SourceReader, decode_text};

pub struct CsvSource;

impl SourceReader for CsvSource {
    fn supported_extensions(&self) -> &[&str] {
        &["csv"]
    }

    fn read(&self, data: &[u8], platform: &str) -> Result<RecordSet, NormalizeError> {
        let (text, warning) = decode_text(data);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut records = reader.records();

        // First record is the header
        let header_record = match records.next() {
            Some(Ok(rec)) => rec,
            Some(Err(e)) => {
                return Err(NormalizeError::MalformedDocument {
                    reason: format!("failed to parse CSV header: {e}"),
                });
            }
            None => {
                return Ok(RecordSet {
                    platform: platform.to_string(),
                    warnings: warning.into_iter().collect(),
                    ..Default::default()
                });
            }
        };

        let mapper = RowMapper::new(platform, header_record.iter());

        let mut rows = Vec::new();
        for (i, result) in records.enumerate() {
            let record = result?;
            rows.push(mapper.map_row(i + 1, record.iter().map(Some))?);
        }

        Ok(RecordSet {
            platform: platform.to_string(),
            columns: mapper.columns(),
            records: rows,
            warnings: warning.into_iter().collect(),
        })
    }
}
