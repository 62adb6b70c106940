use async_trait::async_trait;
use color_eyre::Result;
use common_types::SongRequest;
use tracing::info;

/// Delivers accepted song requests to the band.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, request: &SongRequest) -> Result<()>;
}

/// Writes song requests to the log instead of an external channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send(&self, request: &SongRequest) -> Result<()> {
        info!(
            session = %request.session,
            "Song request from {:?}: {} by {} ({:?})",
            request.name, request.song, request.artist, request.message
        );
        Ok(())
    }
}
