/*!
# Call Tracking Dashboard

Aggregation engine and basic-auth server for a call-tracking analytics dashboard.

## Overview

An upstream job exports a precomputed snapshot (`dashboard_data.json`) of call
counts grouped by month, agency and channel. This crate turns those flat rows
into the rate summaries the dashboard displays: spam rates, answer
("décroché") rates, and per-agency/per-channel breakdowns.

## Architecture

### Aggregation Layer
- **record**: `CallRecord`, `RateSummary` and dimension filters
- **aggregator**: grouping by period, by dimension, by compound keys, rolling windows
- **labels**: channel-suffix stripping for entity names

### Data Layer
- **snapshot**: serde model of the dashboard snapshot and its record feeds
- **export**: CSV (and XLSX with the `web` feature) rendering of summaries

### Presentation Data
- **dashboard**: headline stats, filter options, filtered answer-rate series,
  pivots, weekday/hour grid, spam breakdown, company ranking and search

### Access & Configuration
- **access**: basic-auth credential check
- **config**: server settings from flags and environment
- **error**: `DashboardError` shared by every layer

### Web Layer (`web` feature)
- **server**: axum routes for the protected page, the API and static files

## Rates

Every percentage goes through [`aggregator::rate_of`], which returns `None`
when the denominator is zero. Nothing in this crate divides by a total
directly.

## REST API Endpoints

- `/`, `/index.html` and `/api/protected` - `index.html` behind basic auth
- `/api/filters` - agencies and channels offered by the filters
- `/api/answer-rate?agence=&canal=` - monthly answer rate for a filter
- `/api/spam-rate` - monthly spam rate and per-channel pivot
- `/api/spam-pj` - Pages Jaunes spam breakdown
- `/api/weekday-hour` - answer rate per weekday and hour
- `/api/stats` - headline figures
- `/api/ranking?q=` - company ranking, optionally searched
- `/api/export.csv`, `/api/export.xlsx` - the filtered series as a file
- anything else - static files under the root; `index.html` stays behind auth
  however the path is spelled
*/

pub mod access;
pub mod aggregator;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod labels;
pub mod record;
#[cfg(feature = "web")]
pub mod server;
pub mod snapshot;

/// Re-export the core types to make them easier to use
pub use aggregator::*;
pub use error::{DashboardError, Result};
pub use labels::normalize_dimension_label;
pub use record::*;
pub use snapshot::{DashboardSnapshot, load_snapshot};
