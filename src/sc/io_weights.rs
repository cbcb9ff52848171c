// Reading the weighting workbook.

use crate::sc::{io_common::*, *};

pub const ITEM_WEIGHTS_SHEET: &str = "Item Weightings";
pub const CATEGORY_WEIGHTS_SHEET: &str = "Category Weightings";
/// The data starts on the fourth row of both sheets (zero-based index).
pub const FIRST_DATA_ROW: u32 = 3;
pub const ITEM_ID_COLUMN: u32 = 0;
/// Column H
pub const WEIGHT_COLUMN: u32 = 7;
pub const CATEGORY_COLUMN: u32 = 0;

/// The content of the weighting workbook.
#[derive(PartialEq, Debug, Clone)]
pub struct WeightDocument {
    pub table: WeightTable,
    pub invalid: Vec<InvalidWeight>,
    pub category_order: Vec<String>,
}

/// The weighting workbook may be given with or without its extension.
pub fn weighting_path(name: &str) -> String {
    if name.to_lowercase().ends_with(".xlsx") {
        name.to_string()
    } else {
        format!("{}.xlsx", name)
    }
}

pub fn read_weighting(path: &str) -> ScResult<WeightDocument> {
    let mut workbook = open_xlsx(path)?;
    let items = sheet_range(&mut workbook, path, ITEM_WEIGHTS_SHEET)?;
    let categories = sheet_range(&mut workbook, path, CATEGORY_WEIGHTS_SHEET)?;
    let (table, invalid) = load_weights(&parse_item_weights(&items));
    let category_order = category_order(&parse_category_cells(&categories));
    debug!("read_weighting: category order: {:?}", category_order);
    Ok(WeightDocument {
        table,
        invalid,
        category_order,
    })
}

pub fn parse_item_weights(wrange: &Range<DataType>) -> Vec<WeightRow> {
    let mut rows: Vec<WeightRow> = Vec::new();
    for row in FIRST_DATA_ROW..=last_row(wrange).unwrap_or(0) {
        match item_id(&get_cell(wrange, row, ITEM_ID_COLUMN)) {
            Some(item_id) => rows.push(WeightRow {
                row: row + 1,
                item_id,
                weight: get_cell(wrange, row, WEIGHT_COLUMN),
            }),
            None => debug!("parse_item_weights: skipping row {} without ID", row + 1),
        }
    }
    rows
}

pub fn parse_category_cells(wrange: &Range<DataType>) -> Vec<CellValue> {
    (FIRST_DATA_ROW..=last_row(wrange).unwrap_or(0))
        .map(|row| get_cell(wrange, row, CATEGORY_COLUMN))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sc::io_common::test_utils::*;

    fn weight_row(id: DataType, weight: DataType) -> Vec<DataType> {
        vec![id, s("Cat"), e(), e(), e(), e(), e(), weight]
    }

    #[test]
    fn item_weights() {
        let range = sheet(&[
            vec![s("Item Weightings")],
            vec![],
            weight_row(s("ID"), s("Weight")),
            weight_row(f(1.0), f(0.5)),
            weight_row(s("2"), s("0.25")),
            weight_row(e(), f(9.0)),
            weight_row(f(3.0), s("TBD")),
            weight_row(f(4.0), e()),
        ]);
        let rows = parse_item_weights(&range);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].row, 4);
        assert_eq!(rows[0].item_id, "1");
        assert_eq!(rows[0].weight, CellValue::Number(0.5));

        let (table, invalid) = load_weights(&rows);
        assert_eq!(table.get("1"), Some(0.5));
        assert_eq!(table.get("2"), Some(0.25));
        assert_eq!(table.get("3"), Some(0.0));
        assert_eq!(table.get("4"), Some(0.0));
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].row, 7);
    }

    #[test]
    fn category_cells() {
        let range = sheet(&[
            vec![],
            vec![],
            vec![s("Cat+Subcat")],
            vec![s("Cost - License")],
            vec![s("Support - Hours")],
            vec![f(0.0)],
            vec![s("Notes")],
        ]);
        assert_eq!(
            category_order(&parse_category_cells(&range)),
            vec!["Cost - License", "Support - Hours"]
        );
    }

    #[test]
    fn extension() {
        assert_eq!(weighting_path("Weighting Sheet"), "Weighting Sheet.xlsx");
        assert_eq!(weighting_path("w.XLSX"), "w.XLSX");
    }
}
