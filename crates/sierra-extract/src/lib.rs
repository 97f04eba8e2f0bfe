//! Extraction pipeline: raw PDP HTML in, normalized product record out.
//!
//! The page embeds its product data in several inconsistent places: a
//! `window.__STATE__` hydration blob, repeated `dataLayer.push({...})`
//! analytics events, and plain `<meta>` tags. Each source gets its own
//! extractor; [`reduce::reduce_product`] merges them under a strict
//! priority order.

pub mod error;
pub mod events;
pub mod flags;
pub mod host;
pub mod inventory;
pub mod meta;
pub mod reduce;
pub mod scan;
pub mod state;

pub use error::ExtractError;
pub use events::extract_data_layer;
pub use flags::scan_flags;
pub use host::host_allowed;
pub use inventory::{summarize_inventory, InventoryItem, InventoryResponse};
pub use meta::{extract_meta_fallback, MetaFallback};
pub use reduce::{reduce_product, FieldOrigin, ReduceTrace, StateProbe};
pub use state::extract_state;
