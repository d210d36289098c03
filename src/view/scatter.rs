use serde::Serialize;

use crate::data::model::{CellValue, Dataset};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    /// Row of the source table, for hover metadata.
    pub row: usize,
}

/// Points sharing one value of the color column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterGroup {
    pub label: String,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterSpec {
    pub title: String,
    pub x: String,
    pub y: String,
    pub color: Option<String>,
    /// A single unlabeled group when no color column is chosen.
    pub groups: Vec<ScatterGroup>,
    /// Columns shown when inspecting a point: every column of the table.
    pub hover_columns: Vec<String>,
    /// Rows skipped for a missing value on either axis.
    pub dropped: usize,
}

impl ScatterSpec {
    pub fn point_count(&self) -> usize {
        self.groups.iter().map(|g| g.points.len()).sum()
    }

    pub fn points(&self) -> impl Iterator<Item = (&ScatterGroup, &ScatterPoint)> {
        self.groups
            .iter()
            .flat_map(|g| g.points.iter().map(move |p| (g, p)))
    }

    /// `column: value` lines for one point's source row.
    pub fn hover_text(&self, dataset: &Dataset, row: usize) -> String {
        let mut lines = vec![format!("row {row}")];
        for (name, value) in dataset.row(row) {
            if self.hover_columns.iter().any(|c| c == name) {
                lines.push(format!("{name}: {value}"));
            }
        }
        lines.join("\n")
    }
}

/// One point per row with finite values in both axis columns, grouped by
/// `color` when given. Returns `None` if an axis column does not exist.
pub fn scatter(dataset: &Dataset, x: &str, y: &str, color: Option<&str>) -> Option<ScatterSpec> {
    let x_col = dataset.column(x)?;
    let y_col = dataset.column(y)?;
    let color_col = color.and_then(|c| dataset.column(c));

    let mut groups: Vec<ScatterGroup> = Vec::new();
    let mut dropped = 0;

    for row in 0..dataset.len() {
        let (Some(px), Some(py)) = (x_col.number(row), y_col.number(row)) else {
            dropped += 1;
            continue;
        };
        let label = match color_col {
            Some(col) => col.values.get(row).unwrap_or(&CellValue::Null).to_string(),
            None => String::new(),
        };

        let point = ScatterPoint { x: px, y: py, row };
        match groups.iter_mut().find(|g| g.label == label) {
            Some(group) => group.points.push(point),
            None => groups.push(ScatterGroup {
                label,
                points: vec![point],
            }),
        }
    }

    Some(ScatterSpec {
        title: format!("{y} vs {x}"),
        x: x.to_string(),
        y: y.to_string(),
        color: color_col.map(|c| c.name.clone()),
        groups,
        hover_columns: dataset.column_names().map(str::to_string).collect(),
        dropped,
    })
}
