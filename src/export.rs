use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::view::ChartSpec;

/// Write the data behind a chart as CSV.
///
/// * histogram → `bin_start,bin_end,count`
/// * scatter   → `row,group,<x column>,<y column>`
pub fn export_csv<W: Write>(chart: &ChartSpec, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    match chart {
        ChartSpec::Histogram(h) => {
            writer.write_record(["bin_start", "bin_end", "count"])?;
            for bin in &h.bins {
                writer.write_record([
                    bin.start.to_string(),
                    bin.end.to_string(),
                    bin.count.to_string(),
                ])?;
            }
        }
        ChartSpec::Scatter(s) => {
            writer.write_record(["row", "group", s.x.as_str(), s.y.as_str()])?;
            for (group, p) in s.points() {
                writer.write_record([
                    p.row.to_string(),
                    group.label.clone(),
                    p.x.to_string(),
                    p.y.to_string(),
                ])?;
            }
        }
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

/// Write the chart specification as pretty-printed JSON.
pub fn export_json<W: Write>(chart: &ChartSpec, out: W) -> Result<()> {
    serde_json::to_writer_pretty(out, chart).context("serializing chart")?;
    Ok(())
}

/// Export to `path`, JSON for a `.json` extension and CSV otherwise.
pub fn export_to_file(chart: &ChartSpec, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        export_json(chart, file)
    } else {
        export_csv(chart, file)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::data::model::{Column, Dataset};
    use crate::view::histogram::histogram;
    use crate::view::scatter::scatter;

    fn listings() -> Dataset {
        Dataset::new(
            "test",
            vec![
                Column::from_text("price", &["100", "200", ""]),
                Column::from_text("speed", &["10", "20", "30"]),
                Column::from_text("make", &["ford", "bmw", "ford"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn histogram_csv_has_one_line_per_bin() {
        let ds = listings();
        let chart = ChartSpec::Histogram(histogram(ds.column("price").unwrap(), 2));

        let mut out = Vec::new();
        export_csv(&chart, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "bin_start,bin_end,count\n100,150,1\n150,200,1\n");
    }

    #[test]
    fn scatter_csv_names_axis_columns() {
        let ds = listings();
        let chart = ChartSpec::Scatter(scatter(&ds, "price", "speed", Some("make")).unwrap());

        let mut out = Vec::new();
        export_csv(&chart, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "row,group,price,speed\n0,ford,100,10\n1,bmw,200,20\n");
    }

    #[test]
    fn json_is_tagged_by_chart_kind() {
        let ds = listings();
        let chart = ChartSpec::Histogram(histogram(ds.column("speed").unwrap(), 5));

        let mut out = Vec::new();
        export_json(&chart, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["kind"], "histogram");
        assert_eq!(value["column"], "speed");
        assert_eq!(value["bins"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn file_extension_picks_format() {
        let ds = listings();
        let chart = ChartSpec::Histogram(histogram(ds.column("speed").unwrap(), 5));
        let dir = tempdir().unwrap();

        let json = dir.path().join("speed.json");
        export_to_file(&chart, &json).unwrap();
        assert!(std::fs::read_to_string(&json).unwrap().starts_with('{'));

        let csv = dir.path().join("speed.csv");
        export_to_file(&chart, &csv).unwrap();
        assert!(std::fs::read_to_string(&csv).unwrap().starts_with("bin_start"));
    }
}
