use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use vendor_scoring::*;

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

pub mod checkpoint;
pub mod config_reader;
pub mod io_common;
pub mod io_results;
pub mod io_scorecard;
pub mod io_weights;
pub mod prompt;

use crate::args::Args;
use crate::sc::checkpoint::*;
use crate::sc::config_reader::*;
use crate::sc::io_results::*;
use crate::sc::io_scorecard::*;
use crate::sc::io_weights::*;
use crate::sc::prompt::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ScError {
    #[snafu(display("File {path} not found"))]
    SourceNotFound { path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Sheet {sheet:?} not found in {path}"))]
    MissingSheet { path: String, sheet: String },
    #[snafu(display("Column {column:?} not found in the header of {path}"))]
    MissingColumn { path: String, column: String },
    #[snafu(display("{path}: cannot read the cell at row {row}, column {column}: {content}"))]
    ExcelWrongCellType {
        path: String,
        row: u32,
        column: u32,
        content: String,
    },
    #[snafu(display("{source}"))]
    Scoring { source: ScoringErrors },
    #[snafu(display("Missing setting: {name}"))]
    MissingSetting { name: String },
    #[snafu(display("Error reading {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing {path}"))]
    WritingCsv { source: csv::Error, path: String },
    #[snafu(display("Checkpoint {path} cannot be used: {details}"))]
    IncompatibleCheckpoint { path: String, details: String },
    #[snafu(display("Difference detected between the computed summary and the reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

impl ScError {
    /// Errors that may be fixed by correcting the names of the documents or the scorecard type.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ScError::SourceNotFound { .. }
                | ScError::MissingSheet { .. }
                | ScError::MissingColumn { .. }
                | ScError::MissingSetting { .. }
                | ScError::Scoring {
                    source: ScoringErrors::NoVendorsFound
                }
        )
    }
}

pub type ScResult<T> = Result<T, ScError>;

/// The outcome of the computation, before writing it.
#[derive(PartialEq, Debug, Clone)]
pub struct Compilation {
    pub vendors: Vec<VendorId>,
    pub totals: std::collections::BTreeMap<VendorToken, ResultTotals>,
    pub table: ResultTable,
}

fn read_all_scorecards(
    settings: &mut Settings,
    prompter: &mut dyn Prompter,
) -> ScResult<(Vec<VendorId>, Vec<Scorecard>)> {
    let vendors = with_retry(settings, prompter, Boundary::Scorecards, |s| {
        let kind = s.scorecard_kind()?;
        let paths = scorecard_paths(s)?;
        let first = paths.first().context(MissingSettingSnafu {
            name: "scorecard files",
        })?;
        info!("Opening {} to look for vendors...", first);
        read_vendors(first, kind)
    })?;

    let vendors = if settings.assume_yes {
        vendors
    } else {
        confirm_vendors(vendors, |vs| confirm_vendor_list(vs, prompter)).context(ScoringSnafu {})?
    };

    let scorecards = with_retry(settings, prompter, Boundary::Scorecards, |s| {
        let kind = s.scorecard_kind()?;
        let mut scorecards: Vec<Scorecard> = Vec::new();
        for path in scorecard_paths(s)? {
            info!("Opening {}...", path);
            scorecards.push(read_scorecard(&path, kind, &vendors)?);
        }
        Ok(scorecards)
    })?;
    Ok((vendors, scorecards))
}

/// Runs the computation stages, starting from the scorecards or from a checkpoint.
pub fn run_pipeline(
    settings: &mut Settings,
    prompter: &mut dyn Prompter,
    weighting: &WeightDocument,
) -> ScResult<Compilation> {
    let checkpoints: Option<CheckpointDir> =
        settings.checkpoint_dir.as_ref().map(|d| CheckpointDir::new(d));
    let resume = settings.resume_from;
    if resume.is_some() && checkpoints.is_none() {
        whatever!("Resuming from a checkpoint requires a checkpoint directory")
    }
    let (vendors, final_scores): (Vec<VendorId>, FinalTable) = match resume {
        Some(ResumePoint::Rollup) => load_checkpoint(&checkpoints, Stage::Final)?,
        _ => {
            let (vendors, average): (Vec<VendorId>, AverageTable) = match resume {
                Some(ResumePoint::Weight) => load_checkpoint(&checkpoints, Stage::Average)?,
                _ => {
                    let (vendors, aggregate): (Vec<VendorId>, AggregateTable) = match resume {
                        Some(ResumePoint::Average) => {
                            load_checkpoint(&checkpoints, Stage::Aggregate)?
                        }
                        _ => {
                            let (vendors, scorecards) = read_all_scorecards(settings, prompter)?;
                            let aggregate = aggregate(&scorecards, &vendors);
                            save_stage(&checkpoints, Stage::Aggregate, &vendors, &aggregate)?;
                            (vendors, aggregate)
                        }
                    };
                    let average = average(&aggregate);
                    save_stage(&checkpoints, Stage::Average, &vendors, &average)?;
                    (vendors, average)
                }
            };
            let final_scores = apply_weights(&average, &weighting.table).context(ScoringSnafu {})?;
            save_stage(&checkpoints, Stage::Final, &vendors, &final_scores)?;
            (vendors, final_scores)
        }
    };

    let totals = rollup(&final_scores);
    save_stage(&checkpoints, Stage::Results, &vendors, &totals)?;
    let table = result_table(&vendors, &totals, &weighting.category_order);
    Ok(Compilation {
        vendors,
        totals,
        table,
    })
}

fn load_checkpoint<T: serde::de::DeserializeOwned>(
    checkpoints: &Option<CheckpointDir>,
    stage: Stage,
) -> ScResult<(Vec<VendorId>, T)> {
    let cp = checkpoints.as_ref().context(MissingSettingSnafu {
        name: "checkpoint directory",
    })?;
    info!("Resuming from checkpoint {}", stage.name());
    cp.load(stage)
}

fn save_stage<T: Serialize>(
    checkpoints: &Option<CheckpointDir>,
    stage: Stage,
    vendors: &[VendorId],
    records: &T,
) -> ScResult<()> {
    if let Some(cp) = checkpoints.as_ref() {
        cp.save(stage, vendors, records)?;
    }
    Ok(())
}

/// Saves the weights as they were read, for review. The weighting workbook is
/// always read again on resume: this checkpoint is never loaded.
fn save_weightings(checkpoints: &Option<CheckpointDir>, weighting: &WeightDocument) -> ScResult<()> {
    save_stage(
        checkpoints,
        Stage::Weightings,
        &[],
        &json!({
            "weights": weighting.table,
            "invalidWeights": weighting.invalid,
            "categoryOrder": weighting.category_order,
        }),
    )
}

/// Reads all the documents, computes the results and writes them.
pub fn run_compilation(mut settings: Settings, prompter: &mut dyn Prompter) -> ScResult<()> {
    let weighting = with_retry(&mut settings, prompter, Boundary::Weighting, |s| {
        let path = s.weighting_path()?;
        info!("Opening {}...", path);
        read_weighting(&path)
    })?;
    let checkpoints: Option<CheckpointDir> =
        settings.checkpoint_dir.as_ref().map(|d| CheckpointDir::new(d));
    save_weightings(&checkpoints, &weighting)?;

    let compilation = run_pipeline(&mut settings, prompter, &weighting)?;

    info!("Saving results to {}...", settings.results_path);
    write_results_csv(&compilation.table, &settings.results_path)?;

    let summary_js = build_summary_js(
        settings.project_name.as_deref(),
        &compilation.vendors,
        &compilation.totals,
        &weighting.invalid,
    );
    let pretty_js_summary =
        serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;
    if let Some(target) = settings.summary.as_ref() {
        write_summary(&pretty_js_summary, target)?;
    }

    // The reference summary, if provided for comparison
    if let Some(reference) = settings.reference.as_ref() {
        check_reference(&pretty_js_summary, reference)?;
    }

    if !weighting.invalid.is_empty() {
        warn!(
            "{} weights could not be read and were set to 0. Check the results",
            weighting.invalid.len()
        );
    }
    info!("Compilation complete. Open {} to view the results.", settings.results_path);
    Ok(())
}

pub fn run_from_args(args: &Args) -> ScResult<()> {
    let config = match args.config.as_ref() {
        Some(path) => Some(read_config(path)?),
        None => None,
    };
    let settings = Settings::resolve(args, config.as_ref())?;
    debug!("settings: {:?}", settings);
    let mut prompter = StdinPrompter {};
    run_compilation(settings, &mut prompter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn temp_dir(name: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!("scorecards-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&p);
        p
    }

    fn vendors() -> Vec<VendorId> {
        discover_vendors(&[Some("Acme Score".to_string()), Some("Big Corp Score".to_string())])
            .unwrap()
    }

    fn aggregate_fixture() -> AggregateTable {
        let mut acme = BTreeMap::new();
        acme.insert(
            "1".to_string(),
            AggregateRecord {
                category_path: "X".to_string(),
                total_expertise: 2,
                total_weighted_score: 8,
            },
        );
        let mut big = BTreeMap::new();
        big.insert(
            "1".to_string(),
            AggregateRecord {
                category_path: "X".to_string(),
                total_expertise: 0,
                total_weighted_score: 0,
            },
        );
        let mut agg: AggregateTable = BTreeMap::new();
        agg.insert(VendorToken("Acme".to_string()), acme);
        agg.insert(VendorToken("Big_Corp".to_string()), big);
        agg
    }

    fn weighting(weight: f64) -> WeightDocument {
        let mut table = WeightTable::default();
        table.weights.insert("1".to_string(), weight);
        WeightDocument {
            table,
            invalid: vec![],
            category_order: vec!["X".to_string()],
        }
    }

    fn settings(dir: &Path, resume: Option<ResumePoint>) -> Settings {
        Settings {
            checkpoint_dir: Some(dir.display().to_string()),
            resume_from: resume,
            ..Settings::default()
        }
    }

    #[test]
    fn resume_from_aggregate_checkpoint() {
        let dir = temp_dir("resume-average");
        CheckpointDir::new(&dir.display().to_string())
            .save(Stage::Aggregate, &vendors(), &aggregate_fixture())
            .unwrap();

        let mut s = settings(&dir, Some(ResumePoint::Average));
        let mut prompter = ScriptedPrompter::new(&[]);
        let res = run_pipeline(&mut s, &mut prompter, &weighting(0.5)).unwrap();
        assert_eq!(res.vendors, vendors());
        assert_eq!(
            res.table.rows,
            vec![
                ("X".to_string(), vec![Some(2.0), None]),
                ("Total".to_string(), vec![Some(2.0), Some(0.0)]),
            ]
        );
        // Later stages are saved again.
        assert!(dir.join(Stage::Average.file_name()).exists());
        assert!(dir.join(Stage::Final.file_name()).exists());
        assert!(dir.join(Stage::Results.file_name()).exists());
        assert!(prompter.questions.is_empty());

        // A corrected weight only needs the averages.
        let mut s = settings(&dir, Some(ResumePoint::Weight));
        let res = run_pipeline(&mut s, &mut prompter, &weighting(1.0)).unwrap();
        assert_eq!(res.totals[&VendorToken("Acme".to_string())].total, 4.0);

        // The rollup only needs the final scores of the previous run.
        let mut s = settings(&dir, Some(ResumePoint::Rollup));
        let res = run_pipeline(&mut s, &mut prompter, &weighting(100.0)).unwrap();
        assert_eq!(res.totals[&VendorToken("Acme".to_string())].total, 4.0);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_weight_aborts_before_final_checkpoint() {
        let dir = temp_dir("missing-weight");
        CheckpointDir::new(&dir.display().to_string())
            .save(Stage::Aggregate, &vendors(), &aggregate_fixture())
            .unwrap();
        let mut s = settings(&dir, Some(ResumePoint::Average));
        let mut prompter = ScriptedPrompter::new(&[]);
        let w = WeightDocument {
            table: WeightTable::default(),
            invalid: vec![],
            category_order: vec![],
        };
        let res = run_pipeline(&mut s, &mut prompter, &w);
        assert!(matches!(
            res,
            Err(ScError::Scoring {
                source: ScoringErrors::MissingWeight { .. }
            })
        ));
        assert!(dir.join(Stage::Average.file_name()).exists());
        assert!(!dir.join(Stage::Final.file_name()).exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn weightings_are_saved_for_review() {
        let dir = temp_dir("weightings");
        let mut w = weighting(0.5);
        w.invalid.push(InvalidWeight {
            row: 9,
            item_id: "2".to_string(),
            content: "TBD".to_string(),
        });
        save_weightings(&None, &w).unwrap();
        assert!(!dir.exists());

        save_weightings(&Some(CheckpointDir::new(&dir.display().to_string())), &w).unwrap();
        let js: JSValue = serde_json::from_str(
            &fs::read_to_string(dir.join(Stage::Weightings.file_name())).unwrap(),
        )
        .unwrap();
        assert_eq!(js["stage"], json!("weightings"));
        assert_eq!(js["records"]["weights"]["weights"]["1"], json!(0.5));
        assert_eq!(js["records"]["invalidWeights"][0]["row"], json!(9));
        assert_eq!(js["records"]["categoryOrder"], json!(["X"]));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn resume_requires_checkpoint_dir() {
        let mut s = Settings {
            resume_from: Some(ResumePoint::Weight),
            ..Settings::default()
        };
        let mut prompter = ScriptedPrompter::new(&[]);
        assert!(run_pipeline(&mut s, &mut prompter, &weighting(1.0)).is_err());
    }

    #[test]
    fn missing_scorecards_are_reported() {
        let dir = temp_dir("missing-scorecards");
        let mut s = Settings {
            scorecards: Some(ScorecardSources::Numbered {
                base_name: dir.join("Client Scorecard").display().to_string(),
                count: 2,
            }),
            kind: Some(ScorecardKind::Individual),
            ..Settings::default()
        };
        let mut prompter = ScriptedPrompter::new(&[]);
        let res = run_pipeline(&mut s, &mut prompter, &weighting(1.0));
        match res {
            Err(e @ ScError::SourceNotFound { .. }) => assert!(e.is_retryable()),
            x => panic!("unexpected result {:?}", x),
        }
    }
}
