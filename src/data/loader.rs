use log::{info, warn};

use super::error::IngestError;
use super::model::{Dataset, FieldValue, VehicleRecord};
use super::source::TextSource;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Fetch the document from `source` and parse it into a [`Dataset`].
///
/// Either the whole document parses or an error is returned; callers never
/// see a partial record list.
pub fn load(source: &dyn TextSource) -> Result<Dataset, IngestError> {
    let location = source.describe();
    let text = source.fetch_text()?;
    let dataset = parse_csv(&text)?;
    info!(
        "Loaded {} records with {} columns from {location}",
        dataset.len(),
        dataset.column_names.len()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV parser
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, comma-delimited, `"` quoting,
/// blank lines ignored. Every cell goes through [`FieldValue::coerce`].
pub fn parse_csv(text: &str) -> Result<Dataset, IngestError> {
    if let Some(line) = find_unterminated_quote(text) {
        return Err(IngestError::parse(Some(line), "unterminated quoted field"));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .quote(b'"')
        .flexible(false)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    warn_on_duplicate_headers(&headers);

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(csv_error)?;
        let record: VehicleRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(col, value)| (col.clone(), FieldValue::coerce(value)))
            .collect();
        records.push(record);
    }

    Ok(Dataset::new(headers, records))
}

fn csv_error(err: csv::Error) -> IngestError {
    let line = err.position().map(|p| p.line());
    let message = match err.kind() {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {expected_len} fields, found {len}"),
        _ => err.to_string(),
    };
    IngestError::parse(line, message)
}

fn warn_on_duplicate_headers(headers: &[String]) {
    for (i, h) in headers.iter().enumerate() {
        if headers[..i].contains(h) {
            warn!("Duplicate CSV column '{h}'; the rightmost value wins");
        }
    }
}

/// Line on which a quoted field is opened but never closed.
///
/// The csv reader silently runs such a field to end of input, so this is
/// checked up front. A quote only opens a quoted field at the start of a
/// field; elsewhere it is literal.
fn find_unterminated_quote(text: &str) -> Option<u64> {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        FieldStart,
        Unquoted,
        Quoted,
        QuoteInQuoted,
    }

    let mut state = State::FieldStart;
    let mut line: u64 = 1;
    let mut opened_on = 0;

    for c in text.chars() {
        state = match (state, c) {
            (State::FieldStart, '"') => {
                opened_on = line;
                State::Quoted
            }
            (State::FieldStart | State::Unquoted | State::QuoteInQuoted, ',' | '\n' | '\r') => {
                State::FieldStart
            }
            (State::FieldStart | State::Unquoted, _) => State::Unquoted,
            (State::Quoted, '"') => State::QuoteInQuoted,
            (State::Quoted, _) => State::Quoted,
            // `""` is an escaped quote inside the field.
            (State::QuoteInQuoted, '"') => State::Quoted,
            (State::QuoteInQuoted, _) => State::Unquoted,
        };
        if c == '\n' {
            line += 1;
        }
    }

    (state == State::Quoted).then_some(opened_on)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::columns;
    use crate::data::source::InlineSource;

    const SAMPLE: &str = "\
VIN (1-10),City,Model Year,Make,Model,Electric Vehicle Type,Electric Range,Base MSRP
5YJ3E1EB4L,Seattle,2020,TESLA,MODEL 3,Battery Electric Vehicle (BEV),322,0

1N4AZ0CP5D,\"Bellevue, East\",2013,NISSAN,LEAF,Battery Electric Vehicle (BEV),75,
WBY8P6C58K,Olympia,2019,BMW,I3,\"Plug-in Hybrid Electric Vehicle (PHEV)\",126 miles,44100
";

    #[test]
    fn test_parse_sample() {
        let ds = parse_csv(SAMPLE).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.column_names.len(), 8);
        assert_eq!(ds.column_names[0], "VIN (1-10)");

        let tesla = &ds.records[0];
        assert_eq!(tesla.make().as_deref(), Some("TESLA"));
        assert_eq!(tesla.model_year(), Some(2020));
        assert_eq!(tesla.electric_range(), Some(322.0));
        assert_eq!(tesla.base_msrp(), Some(0.0));

        let nissan = &ds.records[1];
        assert_eq!(nissan.city().as_deref(), Some("Bellevue, East"));
        assert_eq!(nissan.get(columns::BASE_MSRP), Some(&FieldValue::Null));
        assert_eq!(nissan.base_msrp(), None);

        let bmw = &ds.records[2];
        assert_eq!(bmw.electric_range(), None);
        assert_eq!(
            bmw.get(columns::ELECTRIC_RANGE),
            Some(&FieldValue::Text("126 miles".into()))
        );
        assert_eq!(bmw.ev_type().as_deref(), Some("Plug-in Hybrid Electric Vehicle (PHEV)"));
    }

    #[test]
    fn test_header_only_is_empty_dataset() {
        let ds = parse_csv("Make,Model\n").unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.column_names, vec!["Make", "Model"]);
    }

    #[test]
    fn test_empty_document() {
        let ds = parse_csv("").unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn test_wrong_field_count_fails_whole_load() {
        let text = "Make,Model,Electric Range\nTESLA,MODEL Y,291\nKIA,NIRO\nBMW,I3,153\n";
        let err = parse_csv(text).unwrap_err();
        match err {
            IngestError::Parse { line, message } => {
                assert_eq!(line, Some(3));
                assert!(message.contains("expected 3 fields, found 2"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unterminated_quote() {
        let text = "Make,City\nTESLA,Seattle\nKIA,\"Spokane\nBMW,Tacoma\n";
        let err = parse_csv(text).unwrap_err();
        assert!(matches!(err, IngestError::Parse { line: Some(3), .. }));
    }

    #[test]
    fn test_escaped_and_literal_quotes_are_fine() {
        let text = "Make,Model\nTESLA,\"MODEL \"\"S\"\"\"\nAUDI,E-TRON 5\" trim\n";
        let ds = parse_csv(text).unwrap();
        assert_eq!(ds.records[0].model().as_deref(), Some("MODEL \"S\""));
        assert_eq!(ds.records[1].model().as_deref(), Some("E-TRON 5\" trim"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let ds = parse_csv("Make,Model Year\r\nFORD,2022\r\n\r\nKIA,2021\r\n").unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[1].model_year(), Some(2021));
    }

    #[test]
    fn test_load_from_inline_source() {
        let source = InlineSource::new("inline", SAMPLE);
        let ds = load(&source).unwrap();
        assert_eq!(ds.len(), 3);
    }
}
