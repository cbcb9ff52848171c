mod config;
use log::{debug, info, warn};

use std::collections::{BTreeMap, HashSet};

pub mod builder;
pub mod manual;

pub use crate::config::*;

/// The suffix of the header cells that hold the vendor scores.
pub const SCORE_SUFFIX: &str = " Score";
/// The label of the grand total, in the result tables.
pub const TOTAL_LABEL: &str = "Total";
/// The header of the first column of the result table.
pub const CATEGORY_HEADER: &str = "Cat+Subcat";
/// The largest score or expertise accepted in a cell.
pub const MAX_COUNT: u64 = 1_000_000;

/// Finds the vendors in the header row of a scorecard.
///
/// Every cell of the form `<name> Score` declares a vendor. The order of the
/// vendors is the order of the columns, and it is kept for all the outputs.
pub fn discover_vendors(header: &[Option<String>]) -> Result<Vec<VendorId>, ScoringErrors> {
    let mut vendors: Vec<VendorId> = Vec::new();
    let mut seen: HashSet<VendorToken> = HashSet::new();
    for cell in header.iter().flatten() {
        let name = match cell.trim().strip_suffix(SCORE_SUFFIX) {
            Some(n) if !n.trim().is_empty() => n.trim(),
            _ => continue,
        };
        let token = vendor_token(name);
        if !seen.insert(token.clone()) {
            return Err(ScoringErrors::DuplicateVendor(token.0));
        }
        debug!("discover_vendors: found {:?} -> {}", name, token);
        vendors.push(VendorId {
            display_name: name.to_string(),
            token,
        });
    }
    if vendors.is_empty() {
        return Err(ScoringErrors::NoVendorsFound);
    }
    info!(
        "Found {} vendors: {:?}",
        vendors.len(),
        vendors.iter().map(|v| &v.display_name).collect::<Vec<_>>()
    );
    Ok(vendors)
}

fn vendor_token(display_name: &str) -> VendorToken {
    VendorToken(
        display_name
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect(),
    )
}

/// Hands the discovered vendors to the caller for confirmation.
pub fn confirm_vendors<F>(vendors: Vec<VendorId>, confirm: F) -> Result<Vec<VendorId>, ScoringErrors>
where
    F: FnOnce(&[VendorId]) -> bool,
{
    if confirm(&vendors) {
        Ok(vendors)
    } else {
        Err(ScoringErrors::VendorConfirmationRejected)
    }
}

/// Replaces the en and em dashes by plain hyphens.
///
/// The same category is often typed with different dashes across documents.
pub fn normalize_category(category_path: &str) -> String {
    category_path.replace(['\u{2013}', '\u{2014}'], "-")
}

/// Reads a vendor score. Blank cells count as a zero (no score).
pub fn parse_raw_score(cell: &CellValue) -> Result<u64, ScoringErrors> {
    parse_count(cell)
}

/// Reads the expertise of a scorer. Blank cells count as a zero.
pub fn parse_expertise(cell: &CellValue) -> Result<u64, ScoringErrors> {
    parse_count(cell)
}

fn parse_count(cell: &CellValue) -> Result<u64, ScoringErrors> {
    let count = match cell {
        CellValue::Blank => Some(0),
        CellValue::Text(s) if s.trim().is_empty() => Some(0),
        CellValue::Text(s) => s.trim().parse::<u64>().ok(),
        // Fractional numbers are truncated.
        CellValue::Number(f) if f.is_finite() && *f >= 0.0 && *f <= MAX_COUNT as f64 => {
            Some(f.trunc() as u64)
        }
        CellValue::Number(_) => None,
    };
    match count {
        Some(c) if c <= MAX_COUNT => Ok(c),
        _ => Err(ScoringErrors::InvalidCell {
            content: match cell {
                CellValue::Text(s) => s.clone(),
                CellValue::Number(f) => f.to_string(),
                CellValue::Blank => "".to_string(),
            },
        }),
    }
}

/// Folds the lines of all the scorecards into per-vendor, per-item totals.
///
/// The totals only use additions: the result does not depend on the order of
/// the scorecards or of their lines. The category of an item is the one of the
/// first line seen for this item.
pub fn aggregate(scorecards: &[Scorecard], vendors: &[VendorId]) -> AggregateTable {
    info!(
        "Aggregating {} scorecards for {} vendors",
        scorecards.len(),
        vendors.len()
    );
    let mut res: AggregateTable = vendors
        .iter()
        .map(|v| (v.token.clone(), BTreeMap::new()))
        .collect();
    for scorecard in scorecards.iter() {
        debug!(
            "aggregate: scorecard {:?}: {} lines",
            scorecard.name,
            scorecard.lines.len()
        );
        for line in scorecard.lines.iter() {
            for vendor in vendors.iter() {
                let records = res.entry(vendor.token.clone()).or_default();
                accumulate(records, &line.score_row(&vendor.token), &vendor.token);
            }
        }
    }
    res
}

fn accumulate(
    records: &mut BTreeMap<ItemId, AggregateRecord>,
    row: &ScoreRow,
    vendor: &VendorToken,
) {
    // A scorer who gave no score must not dilute the average.
    let expertise = if row.raw_score == 0 { 0 } else { row.expertise };
    let category_path = normalize_category(&row.category_path);
    let record = records
        .entry(row.item_id.clone())
        .or_insert_with(|| AggregateRecord {
            category_path: category_path.clone(),
            total_expertise: 0,
            total_weighted_score: 0,
        });
    if record.category_path != category_path {
        // TODO: decide with the scorecard owners whether this should be fatal.
        warn!(
            "Item {:?} (vendor {}): category {:?} differs from the first one seen ({:?}), keeping the first one",
            row.item_id, vendor, category_path, record.category_path
        );
    }
    record.total_expertise = record.total_expertise.saturating_add(expertise);
    record.total_weighted_score = record
        .total_weighted_score
        .saturating_add(expertise.saturating_mul(row.raw_score));
}

/// The expertise-weighted average score of each item.
///
/// Items that nobody scored get an average of zero.
pub fn average(aggregate: &AggregateTable) -> AverageTable {
    aggregate
        .iter()
        .map(|(vendor, records)| {
            let averages = records
                .iter()
                .map(|(item_id, rec)| {
                    let average_score = if rec.total_expertise != 0 {
                        rec.total_weighted_score as f64 / rec.total_expertise as f64
                    } else {
                        0.0
                    };
                    let avg = AverageRecord {
                        category_path: rec.category_path.clone(),
                        average_score,
                    };
                    (item_id.clone(), avg)
                })
                .collect();
            (vendor.clone(), averages)
        })
        .collect()
}

/// Builds the weight table.
///
/// Weights that cannot be read as numbers are set to zero and returned for
/// manual review; they do not stop the processing.
pub fn load_weights(rows: &[WeightRow]) -> (WeightTable, Vec<InvalidWeight>) {
    let mut table = WeightTable::default();
    let mut invalid: Vec<InvalidWeight> = Vec::new();
    for row in rows.iter() {
        let weight = match &row.weight {
            CellValue::Blank => Some(0.0),
            CellValue::Number(f) if f.is_finite() => Some(*f),
            CellValue::Number(_) => None,
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        };
        let weight = match weight {
            Some(w) => w,
            None => {
                let content = match &row.weight {
                    CellValue::Text(s) => s.clone(),
                    other => format!("{:?}", other),
                };
                warn!(
                    "Invalid weight in row {} (item {:?}): {:?}. Setting it to 0, check the results",
                    row.row, row.item_id, content
                );
                invalid.push(InvalidWeight {
                    row: row.row,
                    item_id: row.item_id.clone(),
                    content,
                });
                0.0
            }
        };
        if let Some(previous) = table.weights.insert(row.item_id.clone(), weight) {
            debug!(
                "load_weights: item {:?} defined twice, replacing {} by {}",
                row.item_id, previous, weight
            );
        }
    }
    info!(
        "Loaded {} weights ({} invalid)",
        table.weights.len(),
        invalid.len()
    );
    (table, invalid)
}

/// The display order of the categories.
///
/// The list ends at the first blank or zero cell. The dashes are normalized
/// the same way as in the scorecards.
pub fn category_order(cells: &[CellValue]) -> Vec<String> {
    cells
        .iter()
        .map_while(|cell| match cell {
            CellValue::Blank => None,
            CellValue::Text(s) if s.trim().is_empty() => None,
            CellValue::Text(s) => Some(normalize_category(s)),
            CellValue::Number(f) if *f == 0.0 => None,
            CellValue::Number(f) => Some(f.to_string()),
        })
        .collect()
}

/// Multiplies every average score by the weight of its item.
///
/// There is no default weight: an item without a weight would silently
/// corrupt the totals.
pub fn apply_weights(
    average: &AverageTable,
    weights: &WeightTable,
) -> Result<FinalTable, ScoringErrors> {
    let mut res: FinalTable = BTreeMap::new();
    for (vendor, records) in average.iter() {
        let mut finals: BTreeMap<ItemId, FinalRecord> = BTreeMap::new();
        for (item_id, rec) in records.iter() {
            let weight = weights
                .get(item_id)
                .ok_or_else(|| ScoringErrors::MissingWeight {
                    vendor: vendor.0.clone(),
                    item_id: item_id.clone(),
                })?;
            finals.insert(
                item_id.clone(),
                FinalRecord {
                    category_path: rec.category_path.clone(),
                    final_score: rec.average_score * weight,
                },
            );
        }
        res.insert(vendor.clone(), finals);
    }
    Ok(res)
}

/// Accumulates the final scores into category totals and a grand total.
pub fn rollup(final_scores: &FinalTable) -> BTreeMap<VendorToken, ResultTotals> {
    final_scores
        .iter()
        .map(|(vendor, records)| {
            let mut sums: BTreeMap<String, f64> = BTreeMap::new();
            let mut total: f64 = 0.0;
            // Items are visited in item id order, so the float sums are reproducible.
            for rec in records.values() {
                *sums.entry(rec.category_path.clone()).or_insert(0.0) += rec.final_score;
                total += rec.final_score;
            }
            // A zero category does not apply to this vendor.
            let categories: BTreeMap<String, f64> =
                sums.into_iter().filter(|(_, s)| *s != 0.0).collect();
            debug!(
                "rollup: vendor {}: {} categories, total {}",
                vendor,
                categories.len(),
                total
            );
            (vendor.clone(), ResultTotals { categories, total })
        })
        .collect()
}

/// Lays out the totals for display: categories in the given order, then the total.
pub fn result_table(
    vendors: &[VendorId],
    totals: &BTreeMap<VendorToken, ResultTotals>,
    order: &[String],
) -> ResultTable {
    let mut header = vec![CATEGORY_HEADER.to_string()];
    header.extend(vendors.iter().map(|v| v.display_name.clone()));

    let displayed: HashSet<String> = order.iter().map(|c| normalize_category(c)).collect();
    for (vendor, vt) in totals.iter() {
        for category in vt.categories.keys() {
            if !displayed.contains(category) {
                warn!(
                    "Category {:?} (vendor {}) is not in the category list of the weighting sheet and will not be displayed",
                    category, vendor
                );
            }
        }
    }

    let mut rows: Vec<(String, Vec<Option<f64>>)> = order
        .iter()
        .map(|category| {
            let key = normalize_category(category);
            let cells = vendors
                .iter()
                .map(|v| {
                    totals
                        .get(&v.token)
                        .and_then(|vt| vt.categories.get(&key).cloned())
                })
                .collect();
            (category.clone(), cells)
        })
        .collect();
    rows.push((
        TOTAL_LABEL.to_string(),
        vendors
            .iter()
            .map(|v| Some(totals.get(&v.token).map(|vt| vt.total).unwrap_or(0.0)))
            .collect(),
    ));
    ResultTable { header, rows }
}

/// Runs all the computation stages, from the scorecards to the totals.
///
/// Arguments:
/// * `scorecards` the scorecards of all the scorers
/// * `vendors` the confirmed vendors
/// * `weights` the importance of each item. All the scored items must have a weight.
pub fn run_scoring(
    scorecards: &[Scorecard],
    vendors: &[VendorId],
    weights: &WeightTable,
) -> Result<ScoringResult, ScoringErrors> {
    let aggregate = aggregate(scorecards, vendors);
    let average = average(&aggregate);
    let final_scores = apply_weights(&average, weights)?;
    let totals = rollup(&final_scores);
    Ok(ScoringResult {
        aggregate,
        average,
        final_scores,
        totals,
    })
}
