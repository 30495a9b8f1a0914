//! End-to-end: sheet rows to canonical records to dashboard, export and store.

use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use scorecard::{
    ingest_bytes, normalize_rows, quartile_gap, view_to_string, CellValue, Dashboard,
    DashboardQuery, Direction, IngestError, Metric, Quartile, SessionStore, Subject, View,
};

fn text(s: &str) -> CellValue {
    CellValue::from(s)
}

fn num(n: f64) -> CellValue {
    CellValue::from(n)
}

/// 45292 is 2024-01-01 and 45323 is 2024-02-01 as spreadsheet serials.
fn rows() -> Vec<Vec<CellValue>> {
    let row = |school: &str, name: &str, date: CellValue, subject: &str, scaled: f64| {
        vec![
            text(school),
            text(name),
            date,
            text(subject),
            num(scaled),
            text("6"),
        ]
    };
    vec![
        vec![
            text("School"),
            text("Name"),
            text("Date"),
            text("Subject"),
            text("Scaled Score"),
            text("Class"),
        ],
        row("North", "Asha", num(45292.0), "Math", 60.0),
        row("North", "Asha", text("2024-01-15"), "English", 50.0),
        row("North", "Asha", num(45323.0), "Math", 70.0),
        row("North", "Asha", num(45323.0), "English", 44.0),
        row("North", "Asha", num(45323.0), "Science", 80.0),
        vec![],
        row("South", "Bina", num(45323.0), "Math", 90.0),
    ]
}

#[test]
fn test_rows_to_dashboard() {
    let records = normalize_rows(rows()).unwrap();
    assert_eq!(records.len(), 6);
    assert!(records.iter().all(|r| !r.subject.is_empty() && !r.date_key.is_empty()));
    assert_eq!(records[1].date_key, "2024-01");

    let dashboard = Dashboard::build(&records, &DashboardQuery::default());
    assert_eq!(dashboard.schools, ["North", "South"]);

    let header = &dashboard.header;
    assert_eq!(header.latest_date, "2024-02");
    assert_eq!(header.latest_date_display, "February 2024");
    assert_eq!(header.total_students, 2);
    assert_eq!(header.avg_scaled_score, Some(71.0));
    assert_eq!(header.avg_percentile, None);
    assert_eq!(header.total_records, 6);

    let math = &dashboard.subjects[0];
    assert_eq!(math.subject, Subject::Math);
    assert_eq!(math.delta, Some(20.0));
    assert_eq!(math.direction, Some(Direction::Up));
    let english = &dashboard.subjects[1];
    assert_eq!(english.delta, Some(-6.0));
    assert_eq!(english.direction, Some(Direction::Down));
    let science = &dashboard.subjects[2];
    assert_eq!(science.delta, None);
    assert_eq!(science.direction, None);

    assert_eq!(dashboard.trend.len(), 2);
    assert_eq!(dashboard.trend[1].values.math, Some(80.0));

    let comparison = dashboard.comparison.as_ref().unwrap();
    assert_eq!(comparison[0].values.math, Some(65.0));
    assert_eq!(comparison[1].values.math, Some(90.0));

    assert!(dashboard.ranking.top.len() <= 5);
    assert_eq!(dashboard.ranking.top[0].subject, Subject::Science);
    assert_eq!(dashboard.ranking.bottom[0].subject, Subject::English);
}

#[test]
fn test_school_filter_end_to_end() {
    let records = normalize_rows(rows()).unwrap();
    let query = DashboardQuery::new(Metric::ScaledScore, Some("North".to_string()));
    let dashboard = Dashboard::build(&records, &query);

    assert_eq!(dashboard.header.total_records, 5);
    assert_eq!(dashboard.header.total_students, 1);
    assert_eq!(dashboard.subjects[0].delta, Some(10.0));
    assert_eq!(dashboard.subjects[0].direction, Some(Direction::Up));
    // Comparison keeps both schools
    assert_eq!(dashboard.comparison.unwrap().len(), 2);

    let north = scorecard::aggregate::filter_by_school(&records, query.school_filter());
    let top = Quartile::new(4).unwrap();
    let gap = quartile_gap(&north, top, Metric::ScaledScore);
    assert_eq!(gap.points.len(), 2);
    // Feb: top quarter [80] against the mean of 44, 70 and 80
    assert_eq!(gap.points[1].gap, Some(15.3));
    assert_eq!(gap.latest_gap, Some(15.3));
    // Too few values on each date for a bottom quarter
    let bottom = quartile_gap(&north, Quartile::default(), Metric::ScaledScore);
    assert_eq!(bottom.latest_gap, None);
}

#[test]
fn test_export_heatmap() {
    let records = normalize_rows(rows()).unwrap();
    let csv = view_to_string(&records, View::Heatmap, &DashboardQuery::default()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines, ["Class,Math,English,Science", "6,73.3,47,80"]);
}

#[test]
fn test_missing_required_column() {
    let mut rows = rows();
    rows[0][4] = text("Marks");
    let err = normalize_rows(rows).unwrap_err();
    assert!(matches!(err, IngestError::Schema(_)));
    assert!(err.to_string().contains("Scaled Score"));
}

#[test]
fn test_session_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::with_dir(dir.path());
    let records = normalize_rows(rows()).unwrap();

    store.save(&records).unwrap();
    let restored = store.load().unwrap().unwrap();
    assert_eq!(restored, records);

    let before = Dashboard::build(&records, &DashboardQuery::default());
    let after = Dashboard::build(&restored, &DashboardQuery::default());
    assert_eq!(before, after);
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str]) {
    for (col, header) in headers.iter().enumerate() {
        sheet.write(0, col as u16, *header).unwrap();
    }
}

/// Two sheets: notes first, then the raw table with a date-formatted cell,
/// a bare date serial, a percent string and a blank row.
fn workbook_bytes() -> Vec<u8> {
    let mut workbook = Workbook::new();

    let notes = workbook.add_worksheet().set_name("Notes").unwrap();
    notes.write(0, 0, "Term 2 results").unwrap();

    let raw = workbook.add_worksheet().set_name("Raw Table").unwrap();
    write_headers(
        raw,
        &["School", "Name", "Date", "Subject", "Scaled Score", "Percentile", "Class"],
    );

    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let march = ExcelDateTime::from_ymd(2024, 3, 15).unwrap();
    raw.write(1, 0, "North").unwrap();
    raw.write(1, 1, "Asha").unwrap();
    raw.write_datetime_with_format(1, 2, &march, &date_format).unwrap();
    raw.write(1, 3, "Math").unwrap();
    raw.write(1, 4, 60.0).unwrap();
    raw.write(1, 5, "67%").unwrap();
    raw.write(1, 6, 6.0).unwrap();

    // Row 2 left blank
    raw.write(3, 0, "South").unwrap();
    raw.write(3, 1, "Bina").unwrap();
    raw.write(3, 2, 45323.0).unwrap();
    raw.write(3, 3, "English").unwrap();
    raw.write(3, 4, 55.0).unwrap();
    raw.write(3, 5, 40.0).unwrap();
    raw.write(3, 6, 7.0).unwrap();

    workbook.save_to_buffer().unwrap()
}

#[test]
fn test_ingest_real_workbook() {
    let ingested = ingest_bytes(workbook_bytes()).unwrap();
    let records = &ingested.records;
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].school, "North");
    assert_eq!(records[0].date_key, "2024-03");
    assert_eq!(records[0].subject, "Math");
    assert_eq!(records[0].scaled_score, 60.0);
    assert_eq!(records[0].percentile, 67.0);
    assert_eq!(records[0].class_name, "6");

    assert_eq!(records[1].date_key, "2024-02");
    assert_eq!(records[1].percentile, 40.0);
    assert_eq!(records[1].class_name, "7");

    let summary = &ingested.summary;
    assert_eq!(summary.sheet, "Raw Table");
    assert_eq!(summary.data_rows, 3);
    assert_eq!(summary.blank_rows, 1);
    assert_eq!(summary.record_count, 2);
}

#[test]
fn test_workbook_without_raw_table() {
    let mut workbook = Workbook::new();
    let data = workbook.add_worksheet().set_name("Data").unwrap();
    write_headers(data, &["Date", "Subject", "Scaled Score"]);
    let bytes = workbook.save_to_buffer().unwrap();

    let err = ingest_bytes(bytes).unwrap_err();
    assert!(matches!(err, IngestError::Schema(_)));
    assert_eq!(
        err.to_string(),
        "Sheet \"Raw Table\" not found. Sheets in this file: Data"
    );
}
