/// Data layer: core types, boundary classification, normalization, loading.
///
/// Architecture:
/// ```text
///  .json / .csv / .parquet          in-memory JSON value
///        │                                │
///        ▼                                ▼
///   ┌──────────┐                    ┌──────────┐
///   │  loader   │  parse file  ───► │ classify  │  shape → RawInput (once)
///   └──────────┘                    └──────────┘
///                                         │
///                                         ▼
///                                   ┌───────────┐
///                                   │ normalize  │  RawInput → SeriesGroup
///                                   └───────────┘     (merge, gaps, names)
/// ```
pub mod formatter;
pub mod loader;
pub mod model;
