use crate::*;

/// Receiver of finished-session records.
///
/// Submission is fire-and-forget: the engine does not wait for, or learn
/// about, the outcome. Implementations own storage, aggregation and any
/// retry or failure reporting.
pub trait StatsSink {
    fn submit(&mut self, upload: StatsUpload);
}

/// Sink that drops every record.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NullSink;

impl StatsSink for NullSink {
    fn submit(&mut self, upload: StatsUpload) {
        log::trace!("dropping stats for {}", upload.player);
    }
}

impl<S: StatsSink + ?Sized> StatsSink for Box<S> {
    fn submit(&mut self, upload: StatsUpload) {
        (**self).submit(upload)
    }
}
