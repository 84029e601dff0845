//! Spreadsheet import/export for client records.
//!
//! Import: first worksheet, first row is the header. Header matching is
//! case- and whitespace-insensitive; only "company name" is required. Rows
//! are materialized one at a time so the caller can keep earlier inserts
//! when a later row fails.
//!
//! Export: fixed column order and the fixed `client_list.xlsx` filename.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;

use crate::errors::{AppError, Result};
use crate::models::client::{default_year, Client, QuickbookStatus};

pub const EXPORT_FILENAME: &str = "client_list.xlsx";

pub const EXPORT_HEADERS: [&str; 10] = [
    "Company Name",
    "Group",
    "Account No",
    "First Allocated Person",
    "Review Person",
    "Year",
    "Months",
    "Remark",
    "Email",
    "Bank Name",
];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Render the months mapping as `MonthName (Person)` pairs in month order.
/// Keys that do not name a month 1..12 are skipped, not errors.
pub fn format_months_column(months: &HashMap<String, String>) -> String {
    let mut entries: Vec<(u32, &String)> = months
        .iter()
        .filter_map(|(key, person)| {
            key.parse::<u32>()
                .ok()
                .filter(|n| (1..=12).contains(n))
                .map(|n| (n, person))
        })
        .collect();
    entries.sort_by_key(|(n, _)| *n);

    entries
        .iter()
        .map(|(n, person)| format!("{} ({})", MONTH_NAMES[(*n - 1) as usize], person))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn build_client_workbook(clients: &[Client]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, header) in EXPORT_HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }

    for (i, client) in clients.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &client.company_name)?;
        sheet.write_string(row, 1, client.group.as_deref().unwrap_or(""))?;
        sheet.write_string(row, 2, client.account_no.as_deref().unwrap_or(""))?;
        sheet.write_string(row, 3, &client.first_allocated_person)?;
        sheet.write_string(row, 4, &client.review_person)?;
        sheet.write_number(row, 5, client.year as f64)?;
        sheet.write_string(row, 6, format_months_column(&client.months))?;
        sheet.write_string(row, 7, client.remark.as_deref().unwrap_or(""))?;
        sheet.write_string(row, 8, client.email.join(", "))?;
        sheet.write_string(row, 9, client.bank_name.as_deref().unwrap_or(""))?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// The parsed first worksheet: normalized header positions plus raw data
/// rows. Rows convert to clients lazily via [`ClientSheet::client_for_row`].
pub struct ClientSheet {
    headers: HashMap<String, usize>,
    rows: Vec<Vec<Data>>,
}

pub fn read_client_sheet(bytes: &[u8]) -> Result<ClientSheet> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes.to_vec()))
        .map_err(|e| AppError::Spreadsheet(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::spreadsheet("Workbook has no sheets"))?
        .map_err(|e| AppError::Spreadsheet(e.to_string()))?;

    let mut rows_iter = range.rows();
    let header_row = rows_iter
        .next()
        .ok_or_else(|| AppError::spreadsheet("Sheet is empty"))?;

    let headers: HashMap<String, usize> = header_row
        .iter()
        .enumerate()
        .filter_map(|(i, cell)| cell_to_string(cell).map(|name| (name.to_lowercase(), i)))
        .collect();

    if !headers.contains_key("company name") {
        return Err(AppError::spreadsheet("Missing columns: company name"));
    }

    Ok(ClientSheet {
        headers,
        rows: rows_iter.map(|row| row.to_vec()).collect(),
    })
}

impl ClientSheet {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Build the client for 0-based data row `idx`. Errors carry the
    /// 1-based data row number.
    pub fn client_for_row(&self, idx: usize) -> Result<Client> {
        let row = &self.rows[idx];
        let row_num = idx + 1;

        let cell = |name: &str| -> Option<String> {
            self.headers
                .get(name)
                .and_then(|&i| row.get(i))
                .and_then(cell_to_string)
        };

        let company_name = cell("company name").ok_or_else(|| AppError::ImportRow {
            row: row_num,
            column: "company name".to_string(),
        })?;

        let year = match cell("year") {
            Some(value) => value.parse::<i32>().map_err(|_| AppError::ImportRow {
                row: row_num,
                column: "year".to_string(),
            })?,
            None => default_year(),
        };

        // A 'month' column is accepted but ignored: the original wrote a
        // non-mapping value there that later reads normalized away.
        Ok(Client {
            _id: None,
            company_name,
            company_id: None,
            company_password: None,
            group: cell("group"),
            account_no: cell("account no"),
            bank_name: cell("bank name"),
            email: Vec::new(),
            first_allocated_person: cell("first allocated person").unwrap_or_default(),
            review_person: cell("review person").unwrap_or_default(),
            quickbook_status: QuickbookStatus::default(),
            year,
            months: HashMap::new(),
            remark: cell("remark"),
        })
    }
}

fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        other => {
            let text = other.to_string().trim().to_string();
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn sheet_bytes(headers: &[&str], rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                sheet.write_string((r + 1) as u32, c as u16, *value).unwrap();
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn months_column_is_ordered_and_named() {
        let months = map(&[("10", "CAROL"), ("1", "ALICE"), ("2", "BOB")]);
        assert_eq!(
            format_months_column(&months),
            "January (ALICE), February (BOB), October (CAROL)"
        );
    }

    #[test]
    fn months_column_skips_out_of_range_keys() {
        let months = map(&[("1", "ALICE"), ("13", "GHOST"), ("zero", "GHOST")]);
        assert_eq!(format_months_column(&months), "January (ALICE)");
    }

    #[test]
    fn months_column_is_empty_for_no_assignments() {
        assert_eq!(format_months_column(&HashMap::new()), "");
    }

    #[test]
    fn header_matching_ignores_case_and_whitespace() {
        let bytes = sheet_bytes(&["  Company NAME ", "Group"], &[&["ACME", "G1"]]);
        let sheet = read_client_sheet(&bytes).unwrap();
        let client = sheet.client_for_row(0).unwrap();
        assert_eq!(client.company_name, "ACME");
        assert_eq!(client.group.as_deref(), Some("G1"));
    }

    #[test]
    fn missing_company_name_column_is_a_sheet_level_error() {
        let bytes = sheet_bytes(&["Group"], &[&["G1"]]);
        match read_client_sheet(&bytes) {
            Err(AppError::Spreadsheet(msg)) => assert!(msg.contains("company name")),
            other => panic!("expected spreadsheet error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn row_without_company_name_reports_row_and_column() {
        let bytes = sheet_bytes(
            &["Company Name", "Group"],
            &[&["ACME", "G1"], &["", "G2"], &["OTHER", "G3"]],
        );
        let sheet = read_client_sheet(&bytes).unwrap();

        assert!(sheet.client_for_row(0).is_ok());
        match sheet.client_for_row(1) {
            Err(AppError::ImportRow { row, column }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "company name");
            }
            other => panic!("expected import row error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn bad_year_value_reports_the_year_column() {
        let bytes = sheet_bytes(&["Company Name", "Year"], &[&["ACME", "soon"]]);
        let sheet = read_client_sheet(&bytes).unwrap();
        match sheet.client_for_row(0) {
            Err(AppError::ImportRow { row, column }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "year");
            }
            other => panic!("expected import row error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn empty_year_cell_falls_back_to_default() {
        let bytes = sheet_bytes(&["Company Name", "Year"], &[&["ACME", ""]]);
        let sheet = read_client_sheet(&bytes).unwrap();
        assert_eq!(sheet.client_for_row(0).unwrap().year, default_year());
    }

    #[test]
    fn month_column_is_ignored_on_import() {
        let bytes = sheet_bytes(&["Company Name", "Month"], &[&["ACME", "January"]]);
        let sheet = read_client_sheet(&bytes).unwrap();
        assert!(sheet.client_for_row(0).unwrap().months.is_empty());
    }

    #[test]
    fn export_round_trips_through_the_reader() {
        let client = Client {
            _id: None,
            company_name: "ACME".to_string(),
            company_id: None,
            company_password: None,
            group: Some("G1".to_string()),
            account_no: Some("A-1".to_string()),
            bank_name: Some("BANK".to_string()),
            email: vec!["a@x.com".to_string(), "b@y.com".to_string()],
            first_allocated_person: "ALICE".to_string(),
            review_person: "BOB".to_string(),
            quickbook_status: QuickbookStatus::Done,
            year: 2025,
            months: map(&[("1", "ALICE")]),
            remark: None,
        };

        let bytes = build_client_workbook(std::slice::from_ref(&client)).unwrap();
        let sheet = read_client_sheet(&bytes).unwrap();
        assert_eq!(sheet.row_count(), 1);
        let parsed = sheet.client_for_row(0).unwrap();
        assert_eq!(parsed.company_name, "ACME");
        assert_eq!(parsed.year, 2025);
        assert_eq!(parsed.bank_name.as_deref(), Some("BANK"));
    }
}
