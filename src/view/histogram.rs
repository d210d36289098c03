use serde::Serialize;

use crate::data::model::Column;

/// One bucket: `[start, end)`, the last bucket is closed on the right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSpec {
    pub title: String,
    pub column: String,
    pub bins: Vec<Bin>,
    /// Values that landed in a bucket.
    pub counted: usize,
    /// Rows skipped for a missing or non-finite value.
    pub dropped: usize,
}

/// Bucket the finite values of `column` into `bins` equal-width buckets
/// spanning `[min, max]`.
pub fn histogram(column: &Column, bins: usize) -> HistogramSpec {
    let bins = bins.max(1);
    let values: Vec<f64> = (0..column.values.len())
        .filter_map(|row| column.number(row))
        .collect();
    let dropped = column.values.len() - values.len();

    let buckets = match min_max(&values) {
        None => Vec::new(),
        Some((min, max)) => {
            let (lo, hi) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
            let n = bins as f64;
            // `hi - lo` may overflow for finite inputs; work with halves and
            // interpolate edges instead.
            let half_span = hi / 2.0 - lo / 2.0;
            let edge = |i: usize| {
                let t = i as f64 / n;
                lo * (1.0 - t) + hi * t
            };

            let mut buckets: Vec<Bin> = (0..bins)
                .map(|i| Bin {
                    start: edge(i),
                    end: if i + 1 == bins { hi } else { edge(i + 1) },
                    count: 0,
                })
                .collect();

            for v in &values {
                let offset = (v / 2.0 - lo / 2.0) / half_span;
                let idx = ((offset * n).floor() as usize).min(bins - 1);
                buckets[idx].count += 1;
            }
            buckets
        }
    };

    HistogramSpec {
        title: column.name.clone(),
        column: column.name.clone(),
        bins: buckets,
        counted: values.len(),
        dropped,
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_missing_value_is_dropped() {
        let mut raw: Vec<String> = (0..50).map(|i| (i * 3).to_string()).collect();
        raw[17] = String::new();
        let col = Column::from_text("price", &raw);

        let h = histogram(&col, 30);
        assert_eq!(h.bins.len(), 30);
        assert_eq!(h.counted, 49);
        assert_eq!(h.dropped, 1);
        assert_eq!(h.bins.iter().map(|b| b.count).sum::<usize>(), 49);
        assert_eq!(h.title, "price");
    }

    #[test]
    fn max_lands_in_last_bucket() {
        let col = Column::from_text("x", &["0", "5", "10"]);
        let h = histogram(&col, 2);
        assert_eq!(h.bins[0].start, 0.0);
        assert_eq!(h.bins[0].end, 5.0);
        assert_eq!(h.bins[1].end, 10.0);
        assert_eq!(h.bins[0].count, 1);
        assert_eq!(h.bins[1].count, 2);
    }

    #[test]
    fn constant_column_gets_unit_span() {
        let col = Column::from_text("x", &["7", "7", "7"]);
        let h = histogram(&col, 5);
        assert_eq!(h.bins.first().unwrap().start, 6.5);
        assert_eq!(h.bins.last().unwrap().end, 7.5);
        assert_eq!(h.bins.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[test]
    fn extreme_range_keeps_finite_edges() {
        let col = Column::from_text("x", &["-1e308", "0", "1e308"]);
        let h = histogram(&col, 5);
        assert!(h.bins.iter().all(|b| b.start.is_finite() && b.end.is_finite()));
        assert_eq!(h.bins.first().unwrap().start, -1e308);
        assert_eq!(h.bins.last().unwrap().end, 1e308);
        assert_eq!(
            h.bins.iter().map(|b| b.count).collect::<Vec<_>>(),
            [1, 0, 1, 0, 1]
        );
    }

    #[test]
    fn empty_column_has_no_buckets() {
        let col = Column::from_text("x", &["", "NaN"]);
        let h = histogram(&col, 30);
        assert!(h.bins.is_empty());
        assert_eq!(h.counted, 0);
        assert_eq!(h.dropped, 2);
    }
}
