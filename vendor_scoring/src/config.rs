// ********* Input data structures ***********

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::Display;

/// The content of a spreadsheet cell, as seen by the scoring stages.
///
/// The readers convert whatever their workbook library returns into this type,
/// so that the parsing rules (blank scores, invalid weights, ...) stay in one place.
#[derive(PartialEq, Debug, Clone)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Blank,
}

/// The two kinds of scorecards. Each one lives in its own worksheet.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ScorecardKind {
    Individual,
    Consensus,
}

impl ScorecardKind {
    pub fn sheet_name(&self) -> &'static str {
        match self {
            ScorecardKind::Individual => "Ind. Scorecard",
            ScorecardKind::Consensus => "Cons. Scorecard",
        }
    }

    /// Accepts the menu codes ('1', '2') as well as short names.
    pub fn parse(code: &str) -> Option<ScorecardKind> {
        match code.trim().to_lowercase().as_str() {
            "1" | "ind" | "individual" => Some(ScorecardKind::Individual),
            "2" | "cons" | "consensus" => Some(ScorecardKind::Consensus),
            _ => None,
        }
    }
}

/// The machine identifier of a vendor. Used as the key of all the per-vendor maps.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VendorToken(pub String);

impl Display for VendorToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize, Deserialize)]
pub struct VendorId {
    /// The name as written in the scorecard header, used for all the outputs.
    pub display_name: String,
    pub token: VendorToken,
}

pub type ItemId = String;

/// The rating of one scorer for one item and one vendor.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScoreRow {
    pub item_id: ItemId,
    pub category_path: String,
    pub expertise: u64,
    pub raw_score: u64,
}

/// One line of a scorecard: a single item, rated for all the vendors at once.
///
/// A vendor with no entry in `scores` has a blank score.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScorecardLine {
    pub item_id: ItemId,
    pub category_path: String,
    pub expertise: u64,
    pub scores: BTreeMap<VendorToken, u64>,
}

impl ScorecardLine {
    pub fn score_row(&self, vendor: &VendorToken) -> ScoreRow {
        ScoreRow {
            item_id: self.item_id.clone(),
            category_path: self.category_path.clone(),
            expertise: self.expertise,
            raw_score: self.scores.get(vendor).cloned().unwrap_or(0),
        }
    }
}

/// All the ratings of one scorer.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Scorecard {
    pub name: String,
    pub lines: Vec<ScorecardLine>,
}

/// A row of the item weighting table, before parsing the weight.
#[derive(PartialEq, Debug, Clone)]
pub struct WeightRow {
    /// Row number in the source document, for the error reports.
    pub row: u32,
    pub item_id: ItemId,
    pub weight: CellValue,
}

// ******** Stage outputs *********

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AggregateRecord {
    pub category_path: String,
    pub total_expertise: u64,
    pub total_weighted_score: u64,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct AverageRecord {
    pub category_path: String,
    pub average_score: f64,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FinalRecord {
    pub category_path: String,
    pub final_score: f64,
}

pub type AggregateTable = BTreeMap<VendorToken, BTreeMap<ItemId, AggregateRecord>>;
pub type AverageTable = BTreeMap<VendorToken, BTreeMap<ItemId, AverageRecord>>;
pub type FinalTable = BTreeMap<VendorToken, BTreeMap<ItemId, FinalRecord>>;

/// The importance of each item. Loaded once and then only read.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeightTable {
    pub weights: BTreeMap<ItemId, f64>,
}

impl WeightTable {
    pub fn get(&self, item_id: &str) -> Option<f64> {
        self.weights.get(item_id).cloned()
    }
}

/// A weight that could not be read and was replaced by zero.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct InvalidWeight {
    pub row: u32,
    pub item_id: ItemId,
    pub content: String,
}

/// The rolled-up scores of one vendor.
///
/// Categories that ended with a score of exactly zero are not present.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultTotals {
    pub categories: BTreeMap<String, f64>,
    pub total: f64,
}

/// All the intermediate results of a run.
#[derive(PartialEq, Debug, Clone)]
pub struct ScoringResult {
    pub aggregate: AggregateTable,
    pub average: AverageTable,
    pub final_scores: FinalTable,
    pub totals: BTreeMap<VendorToken, ResultTotals>,
}

/// The final comparison, laid out as a table: one row per category, one column per vendor.
#[derive(PartialEq, Debug, Clone)]
pub struct ResultTable {
    pub header: Vec<String>,
    /// The last row is always the total.
    pub rows: Vec<(String, Vec<Option<f64>>)>,
}

/// Errors that prevent the scoring from completing successfully.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ScoringErrors {
    /// No '<vendor> Score' column in the header.
    NoVendorsFound,
    /// Two vendor names map to the same token.
    DuplicateVendor(String),
    VendorConfirmationRejected,
    /// An item was scored but has no entry in the weight table.
    MissingWeight { vendor: String, item_id: ItemId },
    InvalidCell { content: String },
}

impl Error for ScoringErrors {}

impl Display for ScoringErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringErrors::NoVendorsFound => write!(f, "no '<vendor> Score' column found"),
            ScoringErrors::DuplicateVendor(token) => {
                write!(f, "multiple vendors share the identifier {}", token)
            }
            ScoringErrors::VendorConfirmationRejected => write!(f, "vendor list rejected"),
            ScoringErrors::MissingWeight { vendor, item_id } => write!(
                f,
                "item {:?} (vendor {}) has no weight in the weighting sheet",
                item_id, vendor
            ),
            ScoringErrors::InvalidCell { content } => {
                write!(f, "could not read a score from cell {:?}", content)
            }
        }
    }
}
