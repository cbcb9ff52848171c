// Reading the scorecard workbooks.

use std::collections::BTreeMap;

use crate::sc::{io_common::*, *};

/// The header is on the third row of the scorecard sheet (zero-based index).
pub const HEADER_ROW: u32 = 2;
pub const ID_COLUMN: &str = "ID";
pub const CATEGORY_COLUMN: &str = "Cat+SubCat";
pub const EXPERTISE_COLUMN: &str = "Expertise";

/// The files of all the scorecards, in order.
pub fn scorecard_paths(settings: &Settings) -> ScResult<Vec<String>> {
    match settings.scorecards.as_ref() {
        Some(ScorecardSources::Numbered { base_name, count }) => Ok((1..=*count)
            .map(|idx| format!("{} ({}).xlsx", base_name, idx))
            .collect()),
        Some(ScorecardSources::Files(files)) => Ok(files.clone()),
        None => MissingSettingSnafu {
            name: "scorecard base name",
        }
        .fail(),
    }
}

/// Looks for the vendors in the header of a scorecard.
pub fn read_vendors(path: &str, kind: ScorecardKind) -> ScResult<Vec<VendorId>> {
    let mut workbook = open_xlsx(path)?;
    let wrange = sheet_range(&mut workbook, path, kind.sheet_name())?;
    let header = header_row(&wrange, HEADER_ROW);
    debug!("read_vendors: header: {:?}", header);
    discover_vendors(&header).context(ScoringSnafu {})
}

pub fn read_scorecard(path: &str, kind: ScorecardKind, vendors: &[VendorId]) -> ScResult<Scorecard> {
    let mut workbook = open_xlsx(path)?;
    let wrange = sheet_range(&mut workbook, path, kind.sheet_name())?;
    parse_scorecard(&wrange, path, vendors)
}

/// Reads the lines of a scorecard sheet.
pub fn parse_scorecard(
    wrange: &Range<DataType>,
    path: &str,
    vendors: &[VendorId],
) -> ScResult<Scorecard> {
    let header = header_row(wrange, HEADER_ROW);
    debug!("parse_scorecard: header: {:?}", header);
    let column = |name: &str| -> ScResult<u32> {
        find_column(&header, name).context(MissingColumnSnafu { path, column: name })
    };
    let id_col = column(ID_COLUMN)?;
    let category_col = column(CATEGORY_COLUMN)?;
    let expertise_col = column(EXPERTISE_COLUMN)?;
    let mut vendor_cols: Vec<(VendorToken, u32)> = Vec::new();
    for v in vendors.iter() {
        vendor_cols.push((
            v.token.clone(),
            column(&format!("{}{}", v.display_name, SCORE_SUFFIX))?,
        ));
    }

    let read_count = |row: u32,
                      col: u32,
                      parse: fn(&CellValue) -> Result<u64, ScoringErrors>|
     -> ScResult<u64> {
        let cell = get_cell(wrange, row, col);
        parse(&cell).ok().context(ExcelWrongCellTypeSnafu {
            path,
            row: row + 1,
            column: col + 1,
            content: format!("{:?}", cell),
        })
    };

    let mut lines: Vec<ScorecardLine> = Vec::new();
    for row in (HEADER_ROW + 1)..=last_row(wrange).unwrap_or(0) {
        let item_id = match item_id(&get_cell(wrange, row, id_col)) {
            Some(id) => id,
            None => {
                debug!("parse_scorecard: {}: skipping row {} without ID", path, row + 1);
                continue;
            }
        };
        let category_path = match get_cell(wrange, row, category_col) {
            CellValue::Text(s) => s,
            CellValue::Number(f) => f.to_string(),
            CellValue::Blank => "".to_string(),
        };
        let expertise = read_count(row, expertise_col, parse_expertise)?;
        let mut scores: BTreeMap<VendorToken, u64> = BTreeMap::new();
        for (token, col) in vendor_cols.iter() {
            scores.insert(token.clone(), read_count(row, *col, parse_raw_score)?);
        }
        let line = ScorecardLine {
            item_id,
            category_path,
            expertise,
            scores,
        };
        debug!("parse_scorecard: {}: row {}: {:?}", path, row + 1, line);
        lines.push(line);
    }
    info!("Read {} lines from {}", lines.len(), path);
    Ok(Scorecard {
        name: simplify_file_name(path),
        lines,
    })
}
