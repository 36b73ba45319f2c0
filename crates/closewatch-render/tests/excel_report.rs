//! Integration tests for the Excel report, read back through calamine

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime};
use closewatch_core::{
    from_excel_serial, CanonicalRecord, ClosingSystemList, ReportData, ReportRenderer,
};
use closewatch_render::{ExcelRenderer, ParticipantGroup, SheetNames};
use pretty_assertions::assert_eq;

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn changes() -> Vec<CanonicalRecord> {
    vec![
        CanonicalRecord::new("CH-1001")
            .summary("SAP kernel patch")
            .status("AUTH")
            .description("Apply SAP note")
            .reporter("Carla Dias")
            .planned_start(at(2024, 4, 30, 22, 0))
            .planned_end(at(2024, 5, 1, 2, 0)),
        CanonicalRecord::new("CH-1003")
            .summary("Wi-Fi survey")
            .status("AUTH")
            .description("Floor 3")
            .reporter("Lia Prado")
            .planned_start(at(2024, 4, 3, 9, 0)),
    ]
}

fn issues() -> Vec<CanonicalRecord> {
    vec![CanonicalRecord::new("FIN-7")
        .summary("Badge printer")
        .status("To Do")
        .reporter("Rui Lima")]
}

type Workbook = Xlsx<std::io::BufReader<std::fs::File>>;

fn save(renderer: &ExcelRenderer, report: &ReportData) -> (tempfile::TempDir, Workbook) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("planilha_final.xlsx");
    renderer.save(report, &path).unwrap();
    let workbook: Workbook = open_workbook(&path).unwrap();
    (dir, workbook)
}

fn text(value: Option<&Data>) -> String {
    match value {
        Some(Data::String(s)) => s.clone(),
        Some(Data::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[test]
fn full_report_has_sheets_in_order() {
    let report = ReportData::new(Some(issues()), changes(), &ClosingSystemList::default());
    let (_dir, workbook) = save(&ExcelRenderer::new(), &report);

    assert_eq!(
        workbook.sheet_names(),
        vec!["Jira", "Maximo", "Participantes", "Verificação"]
    );
}

#[test]
fn missing_issue_tracker_omits_its_sheet() {
    let report = ReportData::new(None, changes(), &ClosingSystemList::default());
    let (_dir, workbook) = save(&ExcelRenderer::new(), &report);

    assert_eq!(
        workbook.sheet_names(),
        vec!["Maximo", "Participantes", "Verificação"]
    );
}

#[test]
fn empty_flagged_group_omits_its_sheet() {
    let quiet = vec![CanonicalRecord::new("CH-1").summary("Cabling").status("AUTH")];
    let report = ReportData::new(None, quiet, &ClosingSystemList::default());
    let (_dir, workbook) = save(&ExcelRenderer::new().no_participants(), &report);

    assert_eq!(workbook.sheet_names(), vec!["Maximo"]);
}

#[test]
fn record_sheet_has_canonical_header_and_rows() {
    let report = ReportData::new(None, changes(), &ClosingSystemList::default());
    let (_dir, mut workbook) = save(&ExcelRenderer::new(), &report);

    let range = workbook.worksheet_range("Maximo").unwrap();
    let header: Vec<String> = (0..7).map(|c| text(range.get_value((0, c)))).collect();
    assert_eq!(
        header,
        vec![
            "Key",
            "Summary",
            "Status",
            "Description",
            "Reporter",
            "Planned start date",
            "Planned end date",
        ]
    );

    assert_eq!(text(range.get_value((1, 0))), "CH-1001");
    assert_eq!(text(range.get_value((2, 3))), "Floor 3");
    assert_eq!(range.height(), 3);

    match range.get_value((1, 5)) {
        Some(Data::DateTime(dt)) => {
            assert_eq!(from_excel_serial(dt.as_f64()), Some(at(2024, 4, 30, 22, 0)));
        }
        other => panic!("expected a date cell, got {other:?}"),
    }
    assert!(matches!(range.get_value((2, 6)), Some(Data::Empty) | None));
}

#[test]
fn flagged_sheet_holds_only_flagged_records() {
    let report = ReportData::new(Some(issues()), changes(), &ClosingSystemList::default());
    let (_dir, mut workbook) = save(&ExcelRenderer::new(), &report);

    let range = workbook.worksheet_range("Verificação").unwrap();
    assert_eq!(range.height(), 2);
    assert_eq!(text(range.get_value((1, 0))), "CH-1001");
}

#[test]
fn participants_sheet_lists_group_labels() {
    let renderer = ExcelRenderer::new().with_participants(vec![
        ParticipantGroup::new("Infraestrutura").member("Carla Dias"),
        ParticipantGroup::new("Contabilidade")
            .member("Ana Souza")
            .member("Rui Lima"),
    ]);
    let report = ReportData::new(None, changes(), &ClosingSystemList::default());
    let (_dir, mut workbook) = save(&renderer, &report);

    let range = workbook.worksheet_range("Participantes").unwrap();
    let labels: Vec<String> = (0..3).map(|r| text(range.get_value((r, 0)))).collect();
    assert_eq!(labels, vec!["Participantes", "Infraestrutura", "Contabilidade"]);
}

#[test]
fn custom_sheet_names_are_used() {
    let names = SheetNames {
        issues: "Issues".into(),
        changes: "Changes".into(),
        participants: "People".into(),
        flagged: "Review".into(),
    };
    let report = ReportData::new(Some(issues()), changes(), &ClosingSystemList::default());
    let (_dir, workbook) = save(&ExcelRenderer::new().sheet_names(names), &report);

    assert_eq!(
        workbook.sheet_names(),
        vec!["Issues", "Changes", "People", "Review"]
    );
}

#[test]
fn render_trait_matches_save() {
    let report = ReportData::new(None, changes(), &ClosingSystemList::default());
    let renderer = ExcelRenderer::new();
    let bytes = renderer.render(&report).unwrap();

    // XLSX is a zip container
    assert_eq!(&bytes[..2], b"PK");
}
