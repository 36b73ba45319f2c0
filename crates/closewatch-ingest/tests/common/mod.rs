//! Fixture builders shared by the ingest integration tests

#![allow(dead_code)]

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use rust_xlsxwriter::{Format, Workbook};

pub const JIRA_HEADERS: [&str; 7] = [
    "Key",
    "Summary",
    "Status",
    "Description",
    "Reporter",
    "Planned start date",
    "Planned end date",
];

pub const MAXIMO_HEADERS: [&str; 7] = [
    "change_number",
    "summary",
    "status",
    "details",
    "owner_name",
    "schedule_start",
    "schedule_finish",
];

/// A fixture cell
#[derive(Clone, Copy, Debug)]
pub enum Value<'a> {
    Text(&'a str),
    Date(NaiveDateTime),
    /// Raw number written with the date format
    Serial(f64),
    Blank,
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, min, 0)
        .unwrap()
}

/// Write a single-page workbook with a header row and typed cells
pub fn write_xlsx(path: &Path, sheet: &str, headers: &[&str], rows: &[Vec<Value<'_>>]) {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("dd/mm/yyyy hh:mm");
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).unwrap();

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header).unwrap();
    }

    for (r, row) in rows.iter().enumerate() {
        let r = r as u32 + 1;
        for (col, value) in row.iter().enumerate() {
            let col = col as u16;
            match value {
                Value::Text(text) => {
                    worksheet.write_string(r, col, *text).unwrap();
                }
                Value::Date(dt) => {
                    worksheet
                        .write_datetime_with_format(r, col, dt, &date_format)
                        .unwrap();
                }
                Value::Serial(serial) => {
                    worksheet
                        .write_number_with_format(r, col, *serial, &date_format)
                        .unwrap();
                }
                Value::Blank => {}
            }
        }
    }

    workbook.save(path).unwrap();
}

/// Write a CSV file from raw lines
pub fn write_csv(path: &Path, lines: &[&str]) {
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(path, content).unwrap();
}
