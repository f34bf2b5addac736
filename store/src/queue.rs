use futures_channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures_util::{FutureExt, StreamExt};
use merge1024_core::StatsSink;
use merge1024_protocol::StatsUpload;

/// Creates a connected sender/receiver pair for handing stats off to a
/// background uploader.
pub fn upload_channel() -> (ChannelSink, UploadQueue) {
    let (sender, receiver) = mpsc::unbounded();
    (ChannelSink { sender }, UploadQueue { receiver })
}

/// Engine-side half: queues records without ever blocking.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    sender: UnboundedSender<StatsUpload>,
}

impl StatsSink for ChannelSink {
    fn submit(&mut self, upload: StatsUpload) {
        if let Err(err) = self.sender.unbounded_send(upload) {
            log::warn!(
                "Stats uploader is gone, dropping record for {}",
                err.into_inner().player
            );
        }
    }
}

/// Uploader-side half: forwards queued records to the real sink.
#[derive(Debug)]
pub struct UploadQueue {
    receiver: UnboundedReceiver<StatsUpload>,
}

impl UploadQueue {
    /// Forwards everything queued so far without waiting for more.
    ///
    /// Returns the number of records forwarded.
    pub fn drain_into<K: StatsSink>(&mut self, sink: &mut K) -> usize {
        let mut forwarded = 0;
        while let Some(Some(upload)) = self.receiver.next().now_or_never() {
            sink.submit(upload);
            forwarded += 1;
        }
        forwarded
    }

    /// Forwards records until every [`ChannelSink`] has been dropped.
    pub async fn run<K: StatsSink>(mut self, sink: &mut K) {
        while let Some(upload) = self.receiver.next().await {
            sink.submit(upload);
        }
        log::debug!("stats upload queue closed");
    }
}
