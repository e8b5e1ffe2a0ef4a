//! Layer-independent engines shared by the interception layer: the object
//! handle table, the deferred-operation ledger, call-site records, diagnostic
//! reports and layer settings.

pub mod config;
pub mod deferred;
pub mod error;
pub mod handle_map;
pub mod location;
pub mod report;

pub use config::LayerSettings;
pub use deferred::{DeferredEntry, DeferredLedger};
pub use error::CoreError;
pub use handle_map::{HandleCategory, HandleTable};
pub use location::{Location, RecordObject};
pub use report::{LogSink, Report, ReportSink};
