//! Excess-power search: configuration, driver, events and diagnostics

pub mod params;
pub mod event;
pub mod diagnostics;
pub mod driver;

pub use params::SearchParams;
pub use event::{BurstEvent, EventList};
pub use diagnostics::{Diagnostics, DiagnosticsError, RecordingDiagnostics};
pub use driver::{ep_search, SearchDriver};
