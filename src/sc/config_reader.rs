use crate::sc::*;

pub const DEFAULT_RESULTS_FILE: &str = "results.csv";

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "projectName")]
    pub project_name: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
    #[serde(rename = "resultsFile")]
    pub results_file: Option<String>,
    #[serde(rename = "summaryFile")]
    pub summary_file: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScorecardSource {
    #[serde(rename = "baseName")]
    pub base_name: Option<String>,
    pub count: Option<u32>,
    #[serde(rename = "scorecardType")]
    pub scorecard_type: Option<String>,
    #[serde(rename = "filePaths")]
    pub file_paths: Option<Vec<String>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "scorecardSources", default)]
    pub scorecard_sources: ScorecardSource,
    #[serde(rename = "weightingFile")]
    pub weighting_file: Option<String>,
    #[serde(rename = "checkpointDirectory")]
    pub checkpoint_directory: Option<String>,
}

/// The configuration file, with its paths resolved against the directory of the file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ResolvedConfig {
    pub config: ScConfig,
    pub root: PathBuf,
}

impl ResolvedConfig {
    fn path(&self, p: &Option<String>) -> Option<String> {
        p.as_ref()
            .map(|s| self.root.join(s).as_path().display().to_string())
    }
}

pub fn read_config(path: &str) -> ScResult<ResolvedConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: ScConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    info!("config: {:?}", config);
    let root = Path::new(path)
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_default();
    Ok(ResolvedConfig { config, root })
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ScorecardSources {
    /// `<base_name> (1).xlsx` up to `<base_name> (<count>).xlsx`
    Numbered { base_name: String, count: u32 },
    Files(Vec<String>),
}

/// Everything a run needs to know, after merging the command line and the configuration file.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Settings {
    pub project_name: Option<String>,
    pub scorecards: Option<ScorecardSources>,
    pub kind: Option<ScorecardKind>,
    pub weighting: Option<String>,
    pub results_path: String,
    pub summary: Option<String>,
    pub reference: Option<String>,
    pub checkpoint_dir: Option<String>,
    pub resume_from: Option<ResumePoint>,
    pub assume_yes: bool,
    pub interactive: bool,
}

impl Settings {
    /// Merges the command line with the configuration file. The command line wins.
    pub fn resolve(args: &Args, config: Option<&ResolvedConfig>) -> ScResult<Settings> {
        let empty = ResolvedConfig {
            config: ScConfig::default(),
            root: PathBuf::new(),
        };
        let rc = config.unwrap_or(&empty);
        let c = &rc.config;

        let scorecards = match (&args.scorecards, &args.base_name) {
            (Some(files), _) => Some(ScorecardSources::Files(files.clone())),
            (None, Some(base_name)) => Some(ScorecardSources::Numbered {
                base_name: base_name.clone(),
                count: args
                    .count
                    .or(c.scorecard_sources.count)
                    .context(MissingSettingSnafu {
                        name: "number of scorecards",
                    })?,
            }),
            (None, None) => match (
                &c.scorecard_sources.file_paths,
                rc.path(&c.scorecard_sources.base_name),
            ) {
                (Some(files), _) => Some(ScorecardSources::Files(
                    files.iter().filter_map(|f| rc.path(&Some(f.clone()))).collect(),
                )),
                (None, Some(base_name)) => Some(ScorecardSources::Numbered {
                    base_name,
                    count: args.count.or(c.scorecard_sources.count).context(
                        MissingSettingSnafu {
                            name: "number of scorecards",
                        },
                    )?,
                }),
                (None, None) => None,
            },
        };

        let kind = match args
            .scorecard_type
            .clone()
            .or_else(|| c.scorecard_sources.scorecard_type.clone())
        {
            Some(code) => match ScorecardKind::parse(&code) {
                Some(kind) => Some(kind),
                None => whatever!(
                    "Unknown scorecard type {:?}: use '1' (Ind. Scorecard) or '2' (Cons. Scorecard)",
                    code
                ),
            },
            None => None,
        };

        let output_dir = ResolvedConfig {
            config: c.clone(),
            root: match c.output_settings.output_directory.as_ref() {
                Some(dir) => rc.root.join(dir),
                None => rc.root.clone(),
            },
        };
        let results_path = args
            .out
            .clone()
            .or_else(|| output_dir.path(&c.output_settings.results_file))
            .unwrap_or_else(|| output_dir.root.join(DEFAULT_RESULTS_FILE).display().to_string());
        let summary = args.summary.clone().or_else(|| {
            match c.output_settings.summary_file.as_deref() {
                Some("stdout") => Some("stdout".to_string()),
                _ => output_dir.path(&c.output_settings.summary_file),
            }
        });

        let resume_from = match args.resume_from.as_ref() {
            Some(s) => Some(ResumePoint::parse(s)?),
            None => None,
        };

        Ok(Settings {
            project_name: c.output_settings.project_name.clone(),
            scorecards,
            kind,
            weighting: args
                .weights
                .clone()
                .or_else(|| rc.path(&c.weighting_file)),
            results_path,
            summary,
            reference: args.reference.clone(),
            checkpoint_dir: args
                .checkpoint_dir
                .clone()
                .or_else(|| rc.path(&c.checkpoint_directory)),
            resume_from,
            assume_yes: args.yes,
            interactive: args.interactive,
        })
    }

    pub fn scorecard_kind(&self) -> ScResult<ScorecardKind> {
        self.kind.context(MissingSettingSnafu {
            name: "scorecard type",
        })
    }

    pub fn weighting_path(&self) -> ScResult<String> {
        let name = self.weighting.as_ref().context(MissingSettingSnafu {
            name: "weighting sheet",
        })?;
        Ok(weighting_path(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(cmd: &[&str]) -> Args {
        let mut full = vec!["scorecards"];
        full.extend(cmd);
        Args::parse_from(full)
    }

    fn config(js: &str) -> ResolvedConfig {
        ResolvedConfig {
            config: serde_json::from_str(js).unwrap(),
            root: PathBuf::from("/projects/rfp"),
        }
    }

    #[test]
    fn command_line_only() {
        let a = args(&[
            "--base-name",
            "Client Scorecard",
            "-n",
            "3",
            "-t",
            "2",
            "--weights",
            "Weighting",
            "--yes",
        ]);
        let s = Settings::resolve(&a, None).unwrap();
        assert_eq!(
            s.scorecards,
            Some(ScorecardSources::Numbered {
                base_name: "Client Scorecard".to_string(),
                count: 3,
            })
        );
        assert_eq!(s.kind, Some(ScorecardKind::Consensus));
        assert_eq!(s.weighting_path().unwrap(), "Weighting.xlsx");
        assert_eq!(s.results_path, "results.csv");
        assert!(s.assume_yes);
        assert!(!s.interactive);
    }

    #[test]
    fn config_paths_are_relative_to_the_config() {
        let rc = config(
            r#"{
            "outputSettings": {"projectName": "RFP 2024", "outputDirectory": "out", "summaryFile": "stdout"},
            "scorecardSources": {"baseName": "cards/Client Scorecard", "count": 4, "scorecardType": "ind"},
            "weightingFile": "Weighting Sheet.xlsx",
            "checkpointDirectory": "checkpoints"
        }"#,
        );
        let s = Settings::resolve(&args(&[]), Some(&rc)).unwrap();
        assert_eq!(s.project_name, Some("RFP 2024".to_string()));
        assert_eq!(
            s.scorecards,
            Some(ScorecardSources::Numbered {
                base_name: "/projects/rfp/cards/Client Scorecard".to_string(),
                count: 4,
            })
        );
        assert_eq!(s.kind, Some(ScorecardKind::Individual));
        assert_eq!(
            s.weighting_path().unwrap(),
            "/projects/rfp/Weighting Sheet.xlsx"
        );
        assert_eq!(s.results_path, "/projects/rfp/out/results.csv");
        assert_eq!(s.summary, Some("stdout".to_string()));
        assert_eq!(s.checkpoint_dir, Some("/projects/rfp/checkpoints".to_string()));
    }

    #[test]
    fn command_line_overrides_config() {
        let rc = config(
            r#"{
            "scorecardSources": {"filePaths": ["a.xlsx", "b.xlsx"], "scorecardType": "ind"},
            "weightingFile": "w.xlsx"
        }"#,
        );
        let s = Settings::resolve(&args(&["-t", "cons", "-w", "other", "-o", "r.csv"]), Some(&rc))
            .unwrap();
        assert_eq!(
            s.scorecards,
            Some(ScorecardSources::Files(vec![
                "/projects/rfp/a.xlsx".to_string(),
                "/projects/rfp/b.xlsx".to_string()
            ]))
        );
        assert_eq!(s.kind, Some(ScorecardKind::Consensus));
        assert_eq!(s.weighting, Some("other".to_string()));
        assert_eq!(s.results_path, "r.csv");
    }

    #[test]
    fn invalid_settings() {
        assert!(Settings::resolve(&args(&["-t", "3"]), None).is_err());
        assert!(Settings::resolve(&args(&["--base-name", "x"]), None).is_err());
        assert!(Settings::resolve(&args(&["--resume-from", "nowhere"]), None).is_err());
        let s = Settings::resolve(&args(&[]), None).unwrap();
        assert!(matches!(
            s.scorecard_kind(),
            Err(ScError::MissingSetting { .. })
        ));
        assert!(s.weighting_path().is_err());
    }
}
