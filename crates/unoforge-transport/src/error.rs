/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Sending a frame failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Reading a frame failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding the listener or completing a handshake failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),
}

#[cfg(feature = "websocket")]
impl TransportError {
    pub(crate) fn send(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::SendFailed(std::io::Error::new(std::io::ErrorKind::BrokenPipe, e))
    }

    pub(crate) fn receive(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::ReceiveFailed(std::io::Error::new(std::io::ErrorKind::ConnectionReset, e))
    }
}
