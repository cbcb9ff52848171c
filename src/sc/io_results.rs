// Writing the results table and the JSON summary.

use std::collections::BTreeMap;

use crate::sc::*;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct SummaryConfig {
    #[serde(rename = "projectName")]
    project_name: Option<String>,
    vendors: Vec<String>,
}

fn format_score(x: Option<f64>) -> String {
    x.map(|f| f.to_string()).unwrap_or_default()
}

/// Writes the table as CSV. Categories without a score for a vendor are left empty.
pub fn write_results_csv(table: &ResultTable, path: &str) -> ScResult<()> {
    let mut writer = csv::Writer::from_path(path).context(WritingCsvSnafu { path })?;
    writer
        .write_record(&table.header)
        .context(WritingCsvSnafu { path })?;
    for (category, cells) in table.rows.iter() {
        let mut record: Vec<String> = vec![category.clone()];
        record.extend(cells.iter().map(|c| format_score(*c)));
        writer
            .write_record(&record)
            .context(WritingCsvSnafu { path })?;
    }
    writer.flush().context(WritingFileSnafu { path })?;
    debug!("write_results_csv: {} rows written to {}", table.rows.len(), path);
    Ok(())
}

fn totals_to_json(totals: &ResultTotals) -> JSValue {
    let mut m: JSMap<String, JSValue> = totals
        .categories
        .iter()
        .map(|(category, score)| (category.clone(), json!(score)))
        .collect();
    m.insert(TOTAL_LABEL.to_string(), json!(totals.total));
    JSValue::Object(m)
}

pub fn build_summary_js(
    project_name: Option<&str>,
    vendors: &[VendorId],
    totals: &BTreeMap<VendorToken, ResultTotals>,
    invalid: &[InvalidWeight],
) -> JSValue {
    let c = SummaryConfig {
        project_name: project_name.map(|s| s.to_string()),
        vendors: vendors.iter().map(|v| v.display_name.clone()).collect(),
    };
    let results: Vec<JSValue> = vendors
        .iter()
        .map(|v| {
            let vt = totals.get(&v.token).cloned().unwrap_or_default();
            json!({
                "vendor": v.display_name,
                "scores": totals_to_json(&vt),
            })
        })
        .collect();
    json!({
        "config": c,
        "results": results,
        "invalidWeights": invalid,
    })
}

/// Writes the summary to a file, or to the standard output when the target is `stdout`.
pub fn write_summary(pretty_js_summary: &str, target: &str) -> ScResult<()> {
    if target == "stdout" {
        println!("{}", pretty_js_summary);
        return Ok(());
    }
    info!("Saving summary to {}...", target);
    fs::write(target, pretty_js_summary).context(WritingFileSnafu { path: target })
}

pub fn read_summary(path: &str) -> ScResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}

/// Compares the summary with a reference summary, printing the differences.
pub fn check_reference(pretty_js_summary: &str, reference_path: &str) -> ScResult<()> {
    let summary_ref = read_summary(reference_path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_summary {
        warn!("Found differences with the reference summary {}", reference_path);
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_summary, "\n");
        return ReferenceMismatchSnafu {}.fail();
    }
    info!("The summary matches the reference {}", reference_path);
    Ok(())
}
