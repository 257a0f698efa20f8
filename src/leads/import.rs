//! Admin lead upload: maps an uploaded CSV onto [`NewLead`] records.
//!
//! The header row decides column positions. Each target field accepts one or
//! more header aliases; unknown columns are ignored and missing ones come back
//! empty (company name falls back to `Unknown`).

use csv::{ReaderBuilder, StringRecord, Trim};
use time::OffsetDateTime;

use super::repo_types::{NewLead, STATUS_AVAILABLE};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("CSV must have header + rows.")]
    TooFewLines,
    #[error("No rows found.")]
    NoRows,
    #[error("CSV parse failed.")]
    Parse(#[from] csv::Error),
    #[error("Only .csv files are accepted.")]
    NotCsv,
    #[error("{0}")]
    Store(anyhow::Error),
}

struct Header(Vec<String>);

impl Header {
    fn new(record: &StringRecord) -> Self {
        Header(record.iter().map(clean).map(|h| h.to_lowercase()).collect())
    }

    /// First non-empty value among the aliases, in alias order.
    fn get(&self, row: &StringRecord, aliases: &[&str]) -> String {
        aliases
            .iter()
            .filter_map(|alias| self.0.iter().position(|h| h == alias))
            .map(|i| row.get(i).map(clean).unwrap_or_default())
            .find(|v| !v.is_empty())
            .unwrap_or_default()
    }
}

fn clean(value: &str) -> String {
    value.replace('"', "").trim().to_string()
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|f| f.trim().is_empty())
}

/// True when the upload name carries a `.csv` extension.
pub fn has_csv_extension(file_name: &str) -> bool {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// Parses upload text into leads stamped with `LEAD-<millis>-<row>` codes.
pub fn parse_leads(text: &str, now: OffsetDateTime) -> Result<Vec<NewLead>, ImportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        if !is_blank(&record) {
            records.push(record);
        }
    }

    if records.len() < 2 {
        return Err(ImportError::TooFewLines);
    }

    let header = Header::new(&records[0]);
    let millis = now.unix_timestamp_nanos() / 1_000_000;

    let leads: Vec<NewLead> = records[1..]
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let company = header.get(row, &["company_name", "company"]);
            NewLead {
                lead_id: format!("LEAD-{}-{}", millis, i + 1),
                company_name: if company.is_empty() { "Unknown".into() } else { company },
                contact_name: header.get(row, &["contact_name", "contact"]),
                email: header.get(row, &["email"]),
                phone: header.get(row, &["phone"]),
                industry: header.get(row, &["industry"]),
                location: header.get(row, &["location"]),
                company_size: header.get(row, &["company_size"]),
                revenue_range: header.get(row, &["revenue_range"]),
                capital_need: header.get(row, &["capital_need"]),
                status: STATUS_AVAILABLE.into(),
            }
        })
        .collect();

    if leads.is_empty() {
        return Err(ImportError::NoRows);
    }
    Ok(leads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);

    #[test]
    fn single_row_import() {
        let leads = parse_leads("company_name,email\nAcme,a@x.com\n", NOW).unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].company_name, "Acme");
        assert_eq!(leads[0].email, "a@x.com");
        assert_eq!(leads[0].status, "available");
        assert_eq!(leads[0].phone, "");
    }

    #[test]
    fn header_only_is_rejected() {
        let err = parse_leads("company_name,email\n", NOW).unwrap_err();
        assert!(matches!(err, ImportError::TooFewLines));
        assert_eq!(err.to_string(), "CSV must have header + rows.");
    }

    #[test]
    fn blank_lines_do_not_count() {
        let err = parse_leads("\n\ncompany,email\n\n   \n", NOW).unwrap_err();
        assert!(matches!(err, ImportError::TooFewLines));
    }

    #[test]
    fn header_aliases_case_and_quotes() {
        let text = "\"Company\", CONTACT ,Industry\nGlobex,Hank,Energy\n";
        let leads = parse_leads(text, NOW).unwrap();
        assert_eq!(leads[0].company_name, "Globex");
        assert_eq!(leads[0].contact_name, "Hank");
        assert_eq!(leads[0].industry, "Energy");
    }

    #[test]
    fn missing_company_defaults_to_unknown() {
        let leads = parse_leads("email,phone\nb@y.com,555-0100\n", NOW).unwrap();
        assert_eq!(leads[0].company_name, "Unknown");
        assert_eq!(leads[0].phone, "555-0100");
    }

    #[test]
    fn quoted_commas_stay_in_one_field() {
        let text = "company_name,location,capital_need\n\"Initech, LLC\",\"Austin, TX\",\"$50k\"\n";
        let leads = parse_leads(text, NOW).unwrap();
        assert_eq!(leads[0].company_name, "Initech, LLC");
        assert_eq!(leads[0].location, "Austin, TX");
        assert_eq!(leads[0].capital_need, "$50k");
    }

    #[test]
    fn short_rows_fill_with_empty_strings() {
        let text = "company_name,email,phone\nAcme\nGlobex,g@globex.com\n";
        let leads = parse_leads(text, NOW).unwrap();
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].email, "");
        assert_eq!(leads[1].email, "g@globex.com");
        assert_eq!(leads[1].phone, "");
    }

    #[test]
    fn lead_codes_use_time_and_row_index() {
        let text = "company\nA\nB\n";
        let leads = parse_leads(text, NOW).unwrap();
        let millis = NOW.unix_timestamp() * 1000;
        assert_eq!(leads[0].lead_id, format!("LEAD-{millis}-1"));
        assert_eq!(leads[1].lead_id, format!("LEAD-{millis}-2"));
    }

    #[test]
    fn csv_extension_check() {
        assert!(has_csv_extension("leads.csv"));
        assert!(has_csv_extension("LEADS.CSV"));
        assert!(!has_csv_extension("leads.xlsx"));
        assert!(!has_csv_extension("csv"));
    }
}
