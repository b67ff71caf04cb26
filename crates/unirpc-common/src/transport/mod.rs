//! unirpc Transport Layer
//!
//! This module provides the codec and the framing shared by the server and
//! the client.
//!
//! # Architecture
//!
//! - **Codec**: JSON serialization for envelopes and records
//! - **Wire Format**: `[4-byte length prefix as u32 big-endian] + [JSON data]`
//!
//! # Components
//!
//! - **[`JsonCodec`]**: Encode/decode envelopes and records as JSON
//! - **[`frame`]**: Length-prefixed frame reader and writer over any tokio
//!   `AsyncRead`/`AsyncWrite`
//!
//! # Message Size Limits
//!
//! Frames are capped at 100 MB. The cap protects the reader's allocation;
//! it is not a limit on any record field.

pub mod codec;
pub mod frame;

pub use codec::JsonCodec;
pub use frame::{read_frame, read_response, write_frame, write_request, write_response, MAX_MESSAGE_SIZE};
