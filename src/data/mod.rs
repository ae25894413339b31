/// Data layer: sources, loading, caching, filtering and aggregation.
///
/// Architecture:
/// ```text
///  local path / URL
///        │
///        ▼
///   ┌──────────┐
///   │  source   │  resolve + fetch bytes once
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  xlsx → five typed sheets → Dataset   (cached by `cache`)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   view    │  filter customers, aggregate the rest, KPIs → ViewModel
///   └──────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod filter;
pub mod kpi;
pub mod loader;
pub mod model;
pub mod source;
pub mod view;

#[cfg(test)]
pub mod fixtures;
