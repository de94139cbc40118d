//! Version resolution and source precedence
//!
//! The decision core of jarwatch: given one manifest entry and the installed
//! artifact's version, decide which upstream source is authoritative and
//! which URL to download.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   Sources    │────▶│    Engine    │────▶│  Precedence  │
//! │   (fetch)    │     │ (aggregate)  │     │   (select)   │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!        │                    │
//!        ▼                    ▼
//! ┌──────────────┐     ┌──────────────┐
//! │    Filter    │     │   Compare    │
//! │ (pick asset) │     │ (version cmp)│
//! └──────────────┘     └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`compare`]: digit-tuple version comparison
//! - [`filter`]: regex-driven archive candidate selection
//! - [`info`]: source identifiers, fragments and the aggregated result
//! - [`sources`]: per-source metadata fetchers
//! - [`engine`]: fragment aggregation and the eligibility list
//! - [`precedence`]: effective order and download selection

pub mod compare;
pub mod engine;
pub mod filter;
pub mod info;
pub mod precedence;
pub mod sources;
