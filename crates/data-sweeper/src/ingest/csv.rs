use polars::prelude::*;
use std::io::Cursor;

use crate::error::Result;
use crate::utils::MISSING_MARKERS;

/// Decode CSV bytes: header row, comma separated, `"` quoted.
pub(crate) fn read_csv(bytes: &[u8], infer_schema_length: Option<usize>) -> Result<DataFrame> {
    let null_values = NullValues::AllColumns(MISSING_MARKERS.iter().map(|m| (*m).into()).collect());

    let parse_options = CsvParseOptions::default()
        .with_separator(b',')
        .with_quote_char(Some(b'"'))
        .with_null_values(Some(null_values));

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(infer_schema_length)
        .with_parse_options(parse_options)
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()?;

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_csv_infers_types() {
        let df = read_csv(b"name,qty,price\nA,1,2.5\nB,2,3.0\n", None).unwrap();
        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.column("qty").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("price").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_read_csv_missing_markers() {
        let df = read_csv(b"x,y\n1,a\nNA,\n3,null\n", None).unwrap();
        assert_eq!(df.column("x").unwrap().null_count(), 1);
        assert_eq!(df.column("y").unwrap().null_count(), 2);
        assert_eq!(df.column("x").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_read_csv_quoted_fields() {
        let df = read_csv(b"name,note\n\"Smith, J\",\"said \"\"hi\"\"\"\n", None).unwrap();
        let name = df.column("name").unwrap().str().unwrap().get(0);
        assert_eq!(name, Some("Smith, J"));
    }
}
