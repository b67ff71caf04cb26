use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::error::{Result, RpcError};
use crate::protocol::{Request, Response};
use crate::transport::codec::JsonCodec;

/// Maximum frame size (100 MB)
pub const MAX_MESSAGE_SIZE: usize = 100 * 1024 * 1024;

/// Writes one frame: `[4-byte length as u32 big-endian] + [data]`.
///
/// # Errors
///
/// Returns `MalformedMessage` if `data` exceeds [`MAX_MESSAGE_SIZE`] and
/// `Io` if writing to the stream fails.
pub async fn write_frame<W>(writer: &mut W, data: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(RpcError::MalformedMessage(format!(
            "Message too large: {} bytes (max {} bytes)",
            data.len(),
            MAX_MESSAGE_SIZE
        )));
    }

    let len = data.len() as u32;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;

    Ok(())
}

/// Reads one frame.
///
/// Returns `Ok(None)` when the peer closed the stream cleanly before
/// sending a length prefix.
///
/// # Errors
///
/// - `MalformedMessage` if the prefix or body is truncated, or the announced
///   length exceeds [`MAX_MESSAGE_SIZE`]
/// - `Io` for any other read failure
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    let mut filled = 0;
    while filled < len_buf.len() {
        let n = reader.read(&mut len_buf[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(RpcError::MalformedMessage(format!(
                "Truncated length prefix: got {} of 4 bytes",
                filled
            )));
        }
        filled += n;
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(RpcError::MalformedMessage(format!(
            "Message too large: {} bytes (max {} bytes)",
            len, MAX_MESSAGE_SIZE
        )));
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => {
            RpcError::MalformedMessage(format!("Truncated frame: expected {} bytes", len))
        }
        _ => RpcError::Io(e),
    })?;

    Ok(Some(buf))
}

/// Encodes and writes a request envelope.
pub async fn write_request<W>(writer: &mut W, request: &Request) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let encoded = JsonCodec::encode_request(request)?;
    write_frame(writer, &encoded).await
}

/// Encodes and writes a response envelope.
pub async fn write_response<W>(writer: &mut W, response: &Response) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let encoded = JsonCodec::encode_response(response)?;
    write_frame(writer, &encoded).await
}

/// Reads and decodes a response envelope.
///
/// A stream that closes before any byte of the response arrives is reported
/// as `ConnectionClosed`.
pub async fn read_response<R>(reader: &mut R) -> Result<Response>
where
    R: AsyncRead + Unpin,
{
    match read_frame(reader).await? {
        Some(data) => JsonCodec::decode_response(&data),
        None => Err(RpcError::ConnectionClosed),
    }
}
