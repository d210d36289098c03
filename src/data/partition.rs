use super::model::Dataset;

/// Column names split by value type, each list in source column order.
/// Every column lands in exactly one of the two lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPartition {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl ColumnPartition {
    pub fn of(dataset: &Dataset) -> Self {
        let (numeric, categorical): (Vec<_>, Vec<_>) =
            dataset.columns.iter().partition(|c| c.is_numeric());

        ColumnPartition {
            numeric: numeric.into_iter().map(|c| c.name.clone()).collect(),
            categorical: categorical.into_iter().map(|c| c.name.clone()).collect(),
        }
    }

    pub fn is_numeric(&self, column: &str) -> bool {
        self.numeric.iter().any(|c| c == column)
    }

    pub fn is_categorical(&self, column: &str) -> bool {
        self.categorical.iter().any(|c| c == column)
    }
}
