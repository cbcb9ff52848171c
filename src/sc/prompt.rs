// Questions to the operator: vendor confirmation and corrections of the inputs.

use std::io::Write;

use crate::sc::*;

/// How many times the same documents are attempted before giving up.
pub const MAX_ATTEMPTS: usize = 3;

pub trait Prompter {
    /// Asks a question and returns the answer, without the surrounding spaces.
    fn ask(&mut self, question: &str) -> String;
}

pub struct StdinPrompter {}

impl Prompter for StdinPrompter {
    fn ask(&mut self, question: &str) -> String {
        print!("{} ", question);
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        if let Err(e) = std::io::stdin().read_line(&mut line) {
            warn!("Could not read the answer: {}", e);
        }
        line.trim().to_string()
    }
}

/// Answers the questions from a fixed list, then with empty answers.
#[cfg(test)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
    pub questions: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> ScriptedPrompter {
        ScriptedPrompter {
            answers: answers.iter().map(|s| s.to_string()).collect(),
            questions: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str) -> String {
        self.questions.push(question.to_string());
        self.answers.pop_front().unwrap_or_default()
    }
}

/// Shows the vendors found in the first scorecard. Anything but `n` accepts them.
pub fn confirm_vendor_list(vendors: &[VendorId], prompter: &mut dyn Prompter) -> bool {
    let names: Vec<&str> = vendors.iter().map(|v| v.display_name.as_str()).collect();
    let question = format!(
        "Number of vendors: {}\nVendors: {}\nIs this correct (y/n)?",
        vendors.len(),
        names.join(", ")
    );
    let answer = prompter.ask(&question);
    !answer.eq_ignore_ascii_case("n")
}

/// The documents being read when an error happens.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Boundary {
    Scorecards,
    Weighting,
}

fn ask_kind(settings: &mut Settings, prompter: &mut dyn Prompter) -> bool {
    for _ in 0..MAX_ATTEMPTS {
        let answer = prompter.ask("Enter '1' for Ind. Scorecard or '2' for Cons. Scorecard:");
        if let Some(kind) = ScorecardKind::parse(&answer) {
            settings.kind = Some(kind);
            return true;
        }
        warn!("You must enter 1 or 2!");
    }
    false
}

fn ask_base_name(settings: &mut Settings, prompter: &mut dyn Prompter) -> bool {
    let base_name =
        prompter.ask("Enter base name for scorecard workbooks (i.e., name without the numeral at the end):");
    if base_name.is_empty() {
        return false;
    }
    let count = match settings.scorecards.as_ref() {
        Some(ScorecardSources::Numbered { count, .. }) => *count,
        _ => {
            let answer = prompter.ask("Enter the total number of scorecards:");
            match answer.parse::<u32>() {
                Ok(c) if c > 0 => c,
                _ => {
                    warn!("Invalid number of scorecards: {:?}", answer);
                    return false;
                }
            }
        }
    };
    settings.scorecards = Some(ScorecardSources::Numbered { base_name, count });
    true
}

fn ask_weighting(settings: &mut Settings, prompter: &mut dyn Prompter) -> bool {
    let name = prompter.ask("Enter name of weighting sheet workbook (without extension):");
    if name.is_empty() {
        return false;
    }
    settings.weighting = Some(name);
    true
}

/// Updates the settings after an error. Returns false if nothing was corrected.
fn correct(
    settings: &mut Settings,
    prompter: &mut dyn Prompter,
    boundary: Boundary,
    err: &ScError,
) -> bool {
    match (boundary, err) {
        (Boundary::Weighting, _) => ask_weighting(settings, prompter),
        (Boundary::Scorecards, ScError::MissingSetting { name }) if name == "scorecard type" => {
            ask_kind(settings, prompter)
        }
        (Boundary::Scorecards, ScError::SourceNotFound { .. })
        | (Boundary::Scorecards, ScError::MissingSetting { .. }) => {
            ask_base_name(settings, prompter)
        }
        (Boundary::Scorecards, ScError::MissingSheet { sheet, .. }) => {
            warn!("{} NOT FOUND! Wrong scorecard type?", sheet);
            ask_kind(settings, prompter)
        }
        (Boundary::Scorecards, _) => ask_kind(settings, prompter),
    }
}

/// Runs a reading step. In interactive mode, the retryable errors are shown to
/// the operator, who may correct the settings before the next attempt.
pub fn with_retry<T, F>(
    settings: &mut Settings,
    prompter: &mut dyn Prompter,
    boundary: Boundary,
    f: F,
) -> ScResult<T>
where
    F: Fn(&Settings) -> ScResult<T>,
{
    let mut attempt = 1;
    loop {
        match f(settings) {
            Ok(x) => return Ok(x),
            Err(e) if settings.interactive && e.is_retryable() && attempt < MAX_ATTEMPTS => {
                warn!("{}", e);
                if !correct(settings, prompter, boundary, &e) {
                    return Err(e);
                }
                attempt += 1;
                debug!("with_retry: {:?}: attempt {}", boundary, attempt);
            }
            Err(e) => return Err(e),
        }
    }
}
