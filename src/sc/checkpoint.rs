// Checkpoints: the output of each stage, saved as JSON between the stages.

use serde::de::DeserializeOwned;

use crate::sc::*;

/// Bumped whenever the layout of the records changes.
pub const CHECKPOINT_FORMAT: u32 = 1;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Stage {
    Aggregate,
    Average,
    Weightings,
    Final,
    Results,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Aggregate => "aggregate",
            Stage::Average => "average_scores",
            Stage::Weightings => "weightings",
            Stage::Final => "final_scores",
            Stage::Results => "results",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.name())
    }
}

/// The stage at which a run restarts. The checkpoint of the stage before it is loaded.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ResumePoint {
    Average,
    Weight,
    Rollup,
}

impl ResumePoint {
    pub fn parse(s: &str) -> ScResult<ResumePoint> {
        match s.trim().to_lowercase().as_str() {
            "average" => Ok(ResumePoint::Average),
            "weight" => Ok(ResumePoint::Weight),
            "rollup" => Ok(ResumePoint::Rollup),
            x => whatever!(
                "Unknown resume point {:?}: expected 'average', 'weight' or 'rollup'",
                x
            ),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint<T> {
    pub format: u32,
    pub stage: String,
    pub vendors: Vec<VendorId>,
    pub records: T,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CheckpointDir {
    root: PathBuf,
}

impl CheckpointDir {
    pub fn new(root: &str) -> CheckpointDir {
        CheckpointDir {
            root: PathBuf::from(root),
        }
    }

    fn path(&self, stage: Stage) -> String {
        self.root.join(stage.file_name()).display().to_string()
    }

    pub fn save<T: Serialize>(&self, stage: Stage, vendors: &[VendorId], records: &T) -> ScResult<()> {
        let path = self.path(stage);
        fs::create_dir_all(&self.root).context(WritingFileSnafu {
            path: self.root.display().to_string(),
        })?;
        let cp = Checkpoint {
            format: CHECKPOINT_FORMAT,
            stage: stage.name().to_string(),
            vendors: vendors.to_vec(),
            records,
        };
        let contents = serde_json::to_string_pretty(&cp).context(ParsingJsonSnafu {})?;
        info!("Saving {} results to {}...", stage.name(), path);
        fs::write(&path, contents).context(WritingFileSnafu { path })
    }

    /// Loads a checkpoint, checking that it was written for this stage by a compatible version.
    pub fn load<T: DeserializeOwned>(&self, stage: Stage) -> ScResult<(Vec<VendorId>, T)> {
        let path = self.path(stage);
        let contents = fs::read_to_string(&path).context(OpeningJsonSnafu { path: path.clone() })?;
        let cp: Checkpoint<JSValue> =
            serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
        if cp.format != CHECKPOINT_FORMAT {
            return IncompatibleCheckpointSnafu {
                path,
                details: format!("format {} instead of {}", cp.format, CHECKPOINT_FORMAT),
            }
            .fail();
        }
        if cp.stage != stage.name() {
            return IncompatibleCheckpointSnafu {
                path,
                details: format!("stage {:?} instead of {:?}", cp.stage, stage.name()),
            }
            .fail();
        }
        if cp.vendors.is_empty() {
            return IncompatibleCheckpointSnafu {
                path,
                details: "no vendors",
            }
            .fail();
        }
        debug!("load: {} vendors from {}", cp.vendors.len(), path);
        let records: T = serde_json::from_value(cp.records).context(ParsingJsonSnafu {})?;
        Ok((cp.vendors, records))
    }
}
