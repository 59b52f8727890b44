use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx};

use eureka::output::{InputNames, REPORT_SHEETS};
use eureka::{ComparisonOptions, ComparisonRequest, KeySpec};

fn open(bytes: Vec<u8>) -> Xlsx<Cursor<Vec<u8>>> {
    Xlsx::new(Cursor::new(bytes)).expect("valid workbook")
}

fn sheet(workbook: &mut Xlsx<Cursor<Vec<u8>>>, name: &str) -> Range<Data> {
    workbook.worksheet_range(name).expect("sheet exists")
}

fn text(range: &Range<Data>, row: u32, col: u32) -> String {
    match range.get_value((row, col)) {
        Some(Data::String(s)) => s.clone(),
        Some(Data::Float(f)) => f.to_string(),
        Some(Data::Int(i)) => i.to_string(),
        _ => String::new(),
    }
}

fn summary_value(range: &Range<Data>, label: &str) -> String {
    let (rows, _) = range.get_size();
    (0..rows as u32)
        .find(|&r| text(range, r, 0) == label)
        .map(|r| text(range, r, 1))
        .unwrap_or_else(|| panic!("no summary row '{label}'"))
}

const OLD: &str = "\
id,name,price,legacy
1,apple,1.50,a
2,banana,0.25,b
3,cherry,3.00,c
";

const NEW: &str = "\
id,name,price,region
1,apple,1.5,eu
2,Banana,0.25,eu
4,date,7,us
";

#[test]
fn keyed_report_has_every_sheet() {
    let download = ComparisonRequest::new(OLD, NEW)
        .with_names(InputNames::new("left.csv", "right.csv"))
        .with_keys(KeySpec::parse("id"))
        .execute()
        .unwrap();

    let mut workbook = open(download.bytes);
    assert_eq!(workbook.sheet_names(), REPORT_SHEETS.to_vec());

    let summary = sheet(&mut workbook, "Summary");
    assert_eq!(text(&summary, 0, 0), "Metric");
    assert_eq!(summary_value(&summary, "Old file"), "left.csv");
    assert_eq!(summary_value(&summary, "Old rows"), "3");
    assert_eq!(summary_value(&summary, "New rows"), "3");
    assert_eq!(summary_value(&summary, "Rows only in old"), "1");
    assert_eq!(summary_value(&summary, "Rows only in new"), "1");
    assert_eq!(summary_value(&summary, "Rows changed"), "2");
    assert_eq!(summary_value(&summary, "Rows unchanged"), "0");
    assert_eq!(summary_value(&summary, "Matching"), "key columns: id");
    assert_eq!(summary_value(&summary, "Strict decimal"), "no");

    let columns = sheet(&mut workbook, "Columns");
    assert_eq!(text(&columns, 1, 0), "missing in new file");
    assert_eq!(text(&columns, 1, 1), "legacy");
    assert_eq!(text(&columns, 2, 0), "new in new file");
    assert_eq!(text(&columns, 2, 1), "region");

    let removed = sheet(&mut workbook, "OnlyInOld");
    assert_eq!(text(&removed, 0, 2), "id");
    assert_eq!(text(&removed, 1, 0), "3");
    assert_eq!(text(&removed, 1, 1), "4");
    assert_eq!(text(&removed, 1, 4), "3.00");

    let added = sheet(&mut workbook, "OnlyInNew");
    assert_eq!(text(&added, 1, 0), "4");
    assert_eq!(text(&added, 1, 3), "date");

    let diffs = sheet(&mut workbook, "CellDiffs");
    let (rows, _) = diffs.get_size();
    let found: Vec<(String, String, String, String)> = (1..rows as u32)
        .map(|r| (text(&diffs, r, 0), text(&diffs, r, 3), text(&diffs, r, 4), text(&diffs, r, 5)))
        .collect();
    assert!(found.contains(&("2".into(), "name".into(), "banana".into(), "Banana".into())));
    assert!(found.contains(&("1".into(), "legacy".into(), "a".into(), "".into())));
    assert!(found.contains(&("1".into(), "region".into(), "".into(), "eu".into())));
    assert!(!found.iter().any(|(_, column, _, _)| column == "price"));
}

#[test]
fn strict_decimal_reports_trailing_zero_changes() {
    let options = ComparisonOptions::new()
        .with_strict_decimal(true)
        .with_ignore_columns(vec!["legacy".into(), "region".into()]);
    let download = ComparisonRequest::new(OLD, NEW)
        .with_keys(KeySpec::parse("id"))
        .with_options(options)
        .execute()
        .unwrap();

    let mut workbook = open(download.bytes);
    let diffs = sheet(&mut workbook, "CellDiffs");
    assert_eq!(text(&diffs, 1, 0), "1");
    assert_eq!(text(&diffs, 1, 3), "price");
    assert_eq!(text(&diffs, 1, 4), "1.50");
    assert_eq!(text(&diffs, 1, 5), "1.5");

    let summary = sheet(&mut workbook, "Summary");
    assert_eq!(summary_value(&summary, "Strict decimal"), "yes");
    assert_eq!(summary_value(&summary, "Ignored columns"), "legacy, region");
}

#[test]
fn hash_matching_report_pairs_identical_rows() {
    let old = "n,label\n5,x\n5,x\n6,y\n";
    let new = "label,n\nx,5.0\ny,6\nz,7\n";
    let download = ComparisonRequest::new(old, new).execute().unwrap();

    let stats = &download.report.stats;
    assert_eq!(stats.rows_unchanged, 2);
    assert_eq!(stats.rows_removed, 1);
    assert_eq!(stats.rows_added, 1);

    let mut workbook = open(download.bytes);
    let summary = sheet(&mut workbook, "Summary");
    assert_eq!(summary_value(&summary, "Matching"), "full-row hash");

    let removed = sheet(&mut workbook, "OnlyInOld");
    assert_eq!(text(&removed, 1, 1), "3");
    assert!(text(&removed, 1, 0).starts_with('#'));

    let diffs = sheet(&mut workbook, "CellDiffs");
    assert_eq!(diffs.get_size().0, 1);
}
