//! CSV writer
//!
//! Writes a [`Table`] back out as UTF-8 CSV. Names ending in `.gz` are
//! gzip-compressed and `.tsv` names are tab delimited, mirroring the reader.

use crate::reader::delimiter_for;
use crate::{Result, Table};
use csv::WriterBuilder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write `table` as delimited text to any writer.
pub fn write_table<W: Write>(table: &Table, writer: W, delimiter: u8) -> Result<()> {
    let mut wtr = WriterBuilder::new().delimiter(delimiter).from_writer(writer);

    wtr.write_record(table.columns())?;
    let mut fields: Vec<String> = Vec::with_capacity(table.width());
    for row in table.rows() {
        fields.clear();
        fields.extend(row.iter().map(|cell| cell.to_string()));
        wtr.write_record(&fields)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write `table` to `path`, picking delimiter and compression from the name.
pub fn write_table_file<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let path = path.as_ref();
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let delimiter = delimiter_for(&filename);
    let mut file = BufWriter::new(File::create(path)?);

    if filename.to_ascii_lowercase().ends_with(".gz") {
        let mut encoder = GzEncoder::new(file, Compression::default());
        write_table(table, &mut encoder, delimiter)?;
        encoder.finish()?.flush()?;
    } else {
        write_table(table, &mut file, delimiter)?;
        file.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_reader::parse_text;
    use crate::reader::{load_file, LoaderConfig};
    use crate::{Cell, ColumnType};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_write_renders_cells() {
        let date = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let table = Table::new(
            vec!["id".into(), "price".into(), "note".into(), "date".into(), "ok".into()],
            vec![
                ColumnType::Integer,
                ColumnType::Float,
                ColumnType::Text,
                ColumnType::DateTime,
                ColumnType::Boolean,
            ],
            vec![
                vec![
                    Cell::Int(1),
                    Cell::Float(3.0),
                    Cell::Text("a, b".into()),
                    Cell::DateTime(date),
                    Cell::Bool(false),
                ],
                vec![Cell::Int(2), Cell::Null, Cell::Null, Cell::Null, Cell::Bool(true)],
            ],
        )
        .unwrap();

        let mut out = Vec::new();
        write_table(&table, &mut out, b',').unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "id,price,note,date,ok\n1,3.0,\"a, b\",2021-06-01,False\n2,,,,True\n"
        );
    }

    #[test]
    fn test_written_file_reads_back() {
        let original = parse_text("price,city\n100.5,Kent\n,Renton\n", b',').unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv.gz");
        write_table_file(&original, &path).unwrap();

        let reloaded = load_file(&path, &LoaderConfig::default()).unwrap();
        assert_eq!(reloaded.table, original);
    }

    #[test]
    fn test_tsv_output() {
        let table = parse_text("a,b\n1,2\n", b',').unwrap();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.tsv");
        write_table_file(&table, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "a\tb\n1\t2\n");
    }
}
