pub use crate::config::*;

use crate::{discover_vendors, run_scoring, SCORE_SUFFIX};
use std::collections::BTreeMap;

/// A builder for adding scorecards without going through a workbook.
///
/// ```
/// pub use vendor_scoring::builder::Builder;
/// # use vendor_scoring::ScoringErrors;
///
/// let mut builder = Builder::new(&["Acme".to_string(), "Big Corp".to_string()])?
///     .weights(&[("1".to_string(), 0.5)]);
///
/// builder.add_line("Alice", "1", "Cost", 2, &[Some(4), None])?;
/// builder.add_line("Bob", "1", "Cost", 3, &[Some(0), Some(2)])?;
///
/// let result = builder.run()?;
/// assert_eq!(result.totals.len(), 2);
///
/// # Ok::<(), ScoringErrors>(())
/// ```
pub struct Builder {
    pub(crate) _vendors: Vec<VendorId>,
    pub(crate) _weights: WeightTable,
    pub(crate) _scorecards: Vec<Scorecard>,
}

impl Builder {
    pub fn new(vendor_names: &[String]) -> Result<Builder, ScoringErrors> {
        let header: Vec<Option<String>> = vendor_names
            .iter()
            .map(|name| Some(format!("{}{}", name, SCORE_SUFFIX)))
            .collect();
        Ok(Builder {
            _vendors: discover_vendors(&header)?,
            _weights: WeightTable::default(),
            _scorecards: Vec::new(),
        })
    }

    pub fn weights(self, weights: &[(String, f64)]) -> Builder {
        Builder {
            _vendors: self._vendors,
            _weights: WeightTable {
                weights: weights.iter().cloned().collect(),
            },
            _scorecards: self._scorecards,
        }
    }

    pub fn vendors(&self) -> &[VendorId] {
        &self._vendors
    }

    /// Adds the rating of one scorer for one item.
    ///
    /// scores: one entry per vendor, in the order given to `new`. `None` is a blank score.
    pub fn add_line(
        &mut self,
        scorer: &str,
        item_id: &str,
        category_path: &str,
        expertise: u64,
        scores: &[Option<u64>],
    ) -> Result<(), ScoringErrors> {
        if scores.len() != self._vendors.len() {
            return Err(ScoringErrors::InvalidCell {
                content: format!(
                    "{} scores given for {} vendors",
                    scores.len(),
                    self._vendors.len()
                ),
            });
        }
        let scores: BTreeMap<VendorToken, u64> = self
            ._vendors
            .iter()
            .zip(scores.iter())
            .filter_map(|(v, s)| s.map(|s| (v.token.clone(), s)))
            .collect();
        let line = ScorecardLine {
            item_id: item_id.to_string(),
            category_path: category_path.to_string(),
            expertise,
            scores,
        };
        match self._scorecards.iter_mut().find(|sc| sc.name == scorer) {
            Some(sc) => sc.lines.push(line),
            None => self._scorecards.push(Scorecard {
                name: scorer.to_string(),
                lines: vec![line],
            }),
        }
        Ok(())
    }

    pub fn run(&self) -> Result<ScoringResult, ScoringErrors> {
        run_scoring(&self._scorecards, &self._vendors, &self._weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_groups_lines_by_scorer() {
        let mut builder = Builder::new(&["Acme".to_string()])
            .unwrap()
            .weights(&[("1".to_string(), 1.0), ("2".to_string(), 1.0)]);
        builder.add_line("Alice", "1", "X", 1, &[Some(2)]).unwrap();
        builder.add_line("Bob", "1", "X", 1, &[Some(4)]).unwrap();
        builder.add_line("Alice", "2", "Y", 1, &[None]).unwrap();
        assert_eq!(builder._scorecards.len(), 2);
        assert_eq!(builder._scorecards[0].lines.len(), 2);

        let res = builder.run().unwrap();
        let totals = &res.totals[&VendorToken("Acme".to_string())];
        assert_eq!(totals.total, 3.0);
        assert_eq!(totals.categories.keys().collect::<Vec<_>>(), vec!["X"]);
    }

    #[test]
    fn builder_checks_the_number_of_scores() {
        let mut builder = Builder::new(&["Acme".to_string(), "Other".to_string()]).unwrap();
        assert!(builder.add_line("Alice", "1", "X", 1, &[Some(2)]).is_err());
    }
}
