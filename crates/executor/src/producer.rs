use tokio::sync::mpsc::Sender;
use tracing::info;

use super::{
    error::Error,
    types::{SnapshotStreamer, TaggedSnapshot},
};

pub struct Producer<S: SnapshotStreamer> {
    streamer: S,
}

impl<S> Producer<S>
where
    S: SnapshotStreamer,
{
    pub fn new(streamer: S) -> Self {
        Producer { streamer }
    }

    pub fn spawn(self, sender: Sender<TaggedSnapshot>) -> tokio::task::JoinHandle<Result<(), Error>> {
        info!("Producer ready.");
        tokio::spawn(async move { self.streamer.run_stream(sender).await })
    }
}
