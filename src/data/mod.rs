/// Data layer: core types, format readers, source resolution and caching.
///
/// Architecture:
/// ```text
///  DATA_CSV_URL ──► RemoteSource ─┐
///  candidate paths ► LocalFile ───┤  source::resolve  (first success wins)
///                                 ▼
///                          ┌──────────┐
///                          │  loader   │  csv / json / parquet → Dataset
///                          └──────────┘
///                                 │
///                                 ▼
///                          ┌──────────┐
///                          │  cache    │  Arc<Dataset>, filled once
///                          └──────────┘
///                                 │
///                                 ▼
///                          ┌───────────┐
///                          │ partition  │  numeric / categorical columns
///                          └───────────┘
/// ```

pub mod cache;
pub mod error;
pub mod loader;
pub mod model;
pub mod partition;
pub mod source;
