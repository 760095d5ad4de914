//! Excess Power - Burst Search Core
//!
//! Template-free detection of short bursts of excess power in a noisy time
//! series. Data are conditioned, a median PSD is estimated, and each
//! analysis window is whitened, split into frequency channels and scored
//! over a multi-resolution tiling of the time-frequency plane.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod error;
pub mod series;
pub mod stats;
pub mod filters;
pub mod spectrum;
pub mod tfplane;
pub mod search;
pub mod conditioning;

#[cfg(feature = "python")]
pub mod python_bindings;

pub use error::{Result, SearchError};
pub use series::{FrequencySeries, TimeSeries};
pub use filters::{Window, WindowType};
pub use conditioning::{condition_data, ConditioningParams};
pub use search::{ep_search, BurstEvent, Diagnostics, EventList, SearchDriver, SearchParams};
