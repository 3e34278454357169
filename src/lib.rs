//! Zero-copy views and builders for HTTP/2 frames (RFC 7540).
//!
//! A view interprets a borrowed byte region as one frame type, validating it once when it gets
//! wrapped. A builder lays down a well-formed frame into a caller provided region and keeps the
//! length field up to date after every mutation, so the bytes can be handed to the transport at
//! any time.
//!
//! ```ignore
//! let mut buf = [0u8; 64];
//! let ping = PingFrameBuilder::wrap(&mut buf, 0, 64)?
//!     .ack()
//!     .opaque_data(42)
//!     .build()?;
//! assert_eq!(ping.limit(), 17);
//! ```
//!
//! Everything above the wire format (the connection state, flow control and the HPACK
//! dynamic tables) is left to the caller. The header block of HEADERS, PUSH_PROMISE and
//! CONTINUATION frames gets decoded with the caller's [`hpack::Decoder`].



/// Contains the errors and the RFC 7540 error codes.
pub mod error;
pub use error::{H2Error, H2Result, ErrorCode, Malformed};

/// Contains the contract shared by all views and builders.
pub mod flyweight;
pub use flyweight::{Flyweight, FlyweightBuilder};

/// Contains the views and builders of every frame type.
pub mod frame;
pub use frame::*;

/// Contains the view of HPACK encoded header blocks.
pub mod header_block;
pub use header_block::{HeaderBlock, HeaderBlockBuilder, HeaderField};

/// Contains the connection parameters exchanged with SETTINGS frames.
pub mod settings;
pub use settings::{Settings, SettingsIdent};
