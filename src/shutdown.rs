use tokio_util::sync::CancellationToken;
use tracing::info;

/// Process-wide stop signal shared by the transports.
#[derive(Clone, Debug, Default)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a graceful stop. Calling it again has no further effect.
    pub fn shutdown(&self) {
        if !self.token.is_cancelled() {
            info!("shutdown requested");
            self.token.cancel();
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub async fn wait(&self) {
        self.token.cancelled().await;
    }
}
