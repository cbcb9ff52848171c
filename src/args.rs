use clap::Parser;

/// This is a program that compiles vendor-selection scorecards into weighted results.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the scorecards, the weighting sheet and the outputs.
    /// All the other options override the values of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// The base name of the scorecard workbooks, without the ' (1).xlsx' suffix.
    #[clap(short, long, value_parser)]
    pub base_name: Option<String>,

    /// The number of scorecard workbooks. They are numbered from 1 to this count.
    #[clap(short = 'n', long, value_parser)]
    pub count: Option<u32>,

    /// (list of file paths) The scorecard workbooks, when they do not follow the base name convention.
    #[clap(long, value_parser)]
    pub scorecards: Option<Vec<String>>,

    /// ('1' or 'ind', '2' or 'cons') The kind of scorecard to compile.
    #[clap(short = 't', long, value_parser)]
    pub scorecard_type: Option<String>,

    /// (file path) The weighting workbook. The .xlsx extension may be omitted.
    #[clap(short, long, value_parser)]
    pub weights: Option<String>,

    /// (file path, default results.csv) Where to write the results table.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or 'stdout') If specified, a summary of the results will be written in JSON format to the given
    /// location.
    #[clap(short, long, value_parser)]
    pub summary: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, the program will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (directory) If specified, the output of every step is saved in this directory.
    #[clap(long, value_parser)]
    pub checkpoint_dir: Option<String>,

    /// ('average', 'weight' or 'rollup') Restarts from the checkpoint of the previous step
    /// instead of reading the scorecards. Requires --checkpoint-dir.
    #[clap(long, value_parser)]
    pub resume_from: Option<String>,

    /// If passed as an argument, the list of vendors is accepted without confirmation.
    #[clap(short, long, takes_value = false)]
    pub yes: bool,

    /// If passed as an argument, missing files and sheets can be corrected at the prompt.
    #[clap(short, long, takes_value = false)]
    pub interactive: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
