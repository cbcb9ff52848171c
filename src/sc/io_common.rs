// Primitives shared by the workbook readers.

use std::fs::File;
use std::io::BufReader;

use crate::sc::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

pub fn open_xlsx(path: &str) -> ScResult<Xlsx<BufReader<File>>> {
    if !Path::new(path).exists() {
        return SourceNotFoundSnafu { path }.fail();
    }
    open_workbook(path).context(OpeningExcelSnafu { path })
}

pub fn sheet_range(
    workbook: &mut Xlsx<BufReader<File>>,
    path: &str,
    sheet: &str,
) -> ScResult<Range<DataType>> {
    workbook
        .worksheet_range(sheet)
        .context(MissingSheetSnafu { path, sheet })?
        .context(OpeningExcelSnafu { path })
}

pub fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::Int(i) => CellValue::Number(*i as f64),
        DataType::Float(f) => CellValue::Number(*f),
        DataType::String(s) => CellValue::Text(s.clone()),
        DataType::Empty => CellValue::Blank,
        other => CellValue::Text(format!("{:?}", other)),
    }
}

/// The cell at the given position of the sheet (zero-based). Cells out of the range are blank.
pub fn get_cell(range: &Range<DataType>, row: u32, col: u32) -> CellValue {
    range
        .get_value((row, col))
        .map(cell_value)
        .unwrap_or(CellValue::Blank)
}

/// The last row of the sheet holding some data, if any.
pub fn last_row(range: &Range<DataType>) -> Option<u32> {
    range.end().map(|(row, _)| row)
}

pub fn header_row(range: &Range<DataType>, row: u32) -> Vec<Option<String>> {
    let last_col = match range.end() {
        Some((_, col)) => col,
        None => return vec![],
    };
    (0..=last_col)
        .map(|col| match get_cell(range, row, col) {
            CellValue::Text(s) => Some(s),
            CellValue::Number(f) => Some(f.to_string()),
            CellValue::Blank => None,
        })
        .collect()
}

/// Finds a column by its header, ignoring the case and the surrounding spaces.
pub fn find_column(header: &[Option<String>], name: &str) -> Option<u32> {
    header
        .iter()
        .position(|h| {
            h.as_ref()
                .map(|s| s.trim().eq_ignore_ascii_case(name.trim()))
                .unwrap_or(false)
        })
        .map(|idx| idx as u32)
}

/// Item identifiers are written either as numbers or as text.
pub fn item_id(cell: &CellValue) -> Option<ItemId> {
    match cell {
        CellValue::Number(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
        CellValue::Number(f) => Some(f.to_string()),
        CellValue::Text(s) if s.trim().is_empty() => None,
        CellValue::Text(s) => Some(s.trim().to_string()),
        CellValue::Blank => None,
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::*;

    /// Builds a sheet from rows of cells, starting at the top-left corner.
    pub fn sheet(rows: &[Vec<DataType>]) -> Range<DataType> {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height.max(1) - 1, width.max(1) - 1));
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
        range
    }

    pub fn s(x: &str) -> DataType {
        DataType::String(x.to_string())
    }

    pub fn f(x: f64) -> DataType {
        DataType::Float(x)
    }

    pub fn e() -> DataType {
        DataType::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::test_utils::*;
    use super::*;

    #[test]
    fn item_ids() {
        assert_eq!(item_id(&CellValue::Number(12.0)), Some("12".to_string()));
        assert_eq!(item_id(&CellValue::Number(1.5)), Some("1.5".to_string()));
        assert_eq!(item_id(&CellValue::Text(" 1.2.3 ".to_string())), Some("1.2.3".to_string()));
        assert_eq!(item_id(&CellValue::Text(" ".to_string())), None);
        assert_eq!(item_id(&CellValue::Blank), None);
    }

    #[test]
    fn header_and_columns() {
        let range = sheet(&[
            vec![s("Title")],
            vec![],
            vec![s("ID"), e(), s(" expertise "), f(3.0)],
        ]);
        let header = header_row(&range, 2);
        assert_eq!(
            header,
            vec![
                Some("ID".to_string()),
                None,
                Some(" expertise ".to_string()),
                Some("3".to_string())
            ]
        );
        assert_eq!(find_column(&header, "Expertise"), Some(2));
        assert_eq!(find_column(&header, "Cat+SubCat"), None);
        assert_eq!(get_cell(&range, 10, 10), CellValue::Blank);
        assert_eq!(last_row(&range), Some(2));
    }

    #[test]
    fn file_names() {
        assert_eq!(
            simplify_file_name("/data/Client Scorecard (3).xlsx"),
            "Client Scorecard (3).xlsx"
        );
    }

    #[test]
    fn missing_workbook() {
        let res = open_xlsx("/nonexistent/Client Scorecard (1).xlsx");
        assert!(matches!(res, Err(ScError::SourceNotFound { .. })));
    }
}
