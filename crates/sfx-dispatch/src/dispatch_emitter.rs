//! Data-URI encoding and delivery to the viewer transport.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use thiserror::Error;

use crate::dispatch_payload::Payload;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("viewer transport write failed: {0}")]
    Write(String),
}

#[async_trait]
/// Accepts one complete text message per call, or fails as a whole.
pub trait PayloadTransport: Send {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;
}

/// Renders `data:<media_type>;base64,<standard padded base64>`.
pub fn encode_data_uri(media_type: &str, bytes: &[u8]) -> String {
    let encoded = BASE64_STANDARD.encode(bytes);
    let mut uri = String::with_capacity(media_type.len() + encoded.len() + 13);
    uri.push_str("data:");
    uri.push_str(media_type);
    uri.push_str(";base64,");
    uri.push_str(&encoded);
    uri
}

/// Encodes and writes a payload; returns the length of the message sent.
pub async fn emit_payload<T>(
    transport: &mut T,
    payload: &Payload,
) -> Result<usize, TransportError>
where
    T: PayloadTransport + ?Sized,
{
    let message = encode_data_uri(&payload.media_type, &payload.bytes);
    let length = message.len();
    transport.send_text(message).await?;
    Ok(length)
}
