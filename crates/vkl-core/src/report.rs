use ash::vk;

use crate::location::Location;

/// A detected validation problem, with enough location information to find
/// both offending call sites.
#[derive(Debug, Clone)]
pub struct Report {
    pub vuid: &'static str,
    pub object_type: vk::ObjectType,
    pub handle: u64,
    pub location: Location,
    /// The other side of a conflicting access, when there is one.
    pub conflict: Option<Location>,
    pub message: String,
}

/// Destination for reports. Rendering to a debug messenger is the sink's job.
pub trait ReportSink: Send + Sync {
    fn report(&self, report: Report);
}

/// Default sink: every report becomes an `error!` event.
#[derive(Debug, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn report(&self, report: Report) {
        tracing::error!(
            vuid = report.vuid,
            object_type = ?report.object_type,
            handle = format_args!("{:#x}", report.handle),
            function = report.location.function,
            conflicting_function = report.conflict.map(|c| c.function),
            "{}",
            report.message
        );
    }
}
