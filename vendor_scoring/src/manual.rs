/*!

This is the long-form manual for `vendor_scoring` and the `scorecards` command.

## Input documents

### Scorecards

Each scorer fills one Excel workbook (.xlsx). The ratings are in a worksheet named
either `Ind. Scorecard` (individual scorecards) or `Cons. Scorecard` (consensus scorecards).
The third row of that sheet is the header. It must contain:
* an `ID` column with the identifier of the item
* a `Cat+SubCat` column with the category of the item
* an `Expertise` column with the competence of the scorer for this item
* one `<vendor> Score` column per vendor, for example `Acme Score`

The items start on the row after the header. Scores and expertise are whole numbers
between 0 and 1,000,000. Blank scores are allowed: a scorer who did
not score an item for a vendor does not count in the average of this item, whatever their
expertise.

The workbooks are found by their common base name followed by a number, starting at 1:
`Client Scorecard (1).xlsx`, `Client Scorecard (2).xlsx`, etc.

### Weighting sheet

The weighting workbook has two worksheets:
* `Item Weightings`: the item identifier in column A and its weight in column H,
  starting on the fourth row. A weight that is not a number is replaced by 0
  and reported in the logs and in the summary.
* `Category Weightings`: the categories in column A, starting on the fourth row,
  in the order in which they are displayed. The list ends at the first empty (or 0) cell.

Every scored item must have a weight: a missing one stops the compilation.

## Computation

For every vendor and every item:
1. the scores of all the scorers are combined into an average weighted by their expertise;
2. this average is multiplied by the weight of the item;
3. the weighted scores are summed by category, and into a grand total.

Categories whose sum is exactly zero for a vendor are left empty in the results.

## Output

The results are written as a CSV file (`results.csv` by default), not as an Excel workbook.
It has one row per category (in the order of the weighting sheet), one column
per vendor, and a final `Total` row. A JSON summary can also be written with `--summary`.

## Checkpoints

With `--checkpoint-dir`, the output of every step is saved as JSON. After fixing a weight
in the weighting sheet, the compilation can restart from the saved averages with
`--resume-from weight` instead of reading all the scorecards again.

The checkpoint files are `aggregate.json`, `average_scores.json`, `final_scores.json` and
`results.json`. `weightings.json` holds the weights as they were read, for review only: it
is never loaded, and the weighting workbook is read again on every run.

```bash
scorecards --base-name "Client Scorecard" --count 12 --scorecard-type ind \
  --weights "Weighting Sheet" --checkpoint-dir checkpoints

scorecards --weights "Weighting Sheet" --checkpoint-dir checkpoints --resume-from weight
```

*/
