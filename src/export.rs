use csv::{QuoteStyle, Terminator, WriterBuilder};
use time::Date;

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Download name for a lead export made on `date`.
pub fn export_filename(date: Date) -> String {
    format!("verifiedmeasure_leads_{date}.csv")
}

/// Serializes string-keyed records into CSV text.
///
/// Returns `None` for an empty slice. The first record's keys, in order, form
/// the header; later records are read by those keys and missing keys come out
/// empty. Every data value is quoted with inner quotes doubled.
pub fn write_records<K, V>(rows: &[Vec<(K, V)>]) -> Result<Option<String>, csv::Error>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let Some(first) = rows.first() else {
        return Ok(None);
    };
    let headers: Vec<&str> = first.iter().map(|(k, _)| k.as_ref()).collect();

    let mut buf = Vec::new();
    {
        let mut header_writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(&mut buf);
        header_writer.write_record(&headers)?;
        header_writer.flush()?;
    }
    {
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(&mut buf);
        for row in rows {
            let values = headers.iter().map(|h| {
                row.iter()
                    .find(|(k, _)| k.as_ref() == *h)
                    .map(|(_, v)| v.as_ref())
                    .unwrap_or("")
            });
            writer.write_record(values)?;
        }
        writer.flush()?;
    }

    // Both writers only ever receive &str input.
    let text = String::from_utf8(buf)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    Ok(Some(text))
}
