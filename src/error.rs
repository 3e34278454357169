use std::fmt;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::frame::FrameType;



pub type H2Result<T> = Result<T, H2Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum H2Error {
    /// The frame would end behind the bound the caller declared as accessible.
    /// Supplying a bigger region is the only remedy.
    BufferOverrun {
        limit: usize,
        max_limit: usize,
    },
    /// The bytes are not a structurally valid frame of the expected type.
    MalformedFrame {
        frame_type: FrameType,
        reason: Malformed,
    },
    /// A builder was handed a value outside of the legal domain of the field.
    InvalidArgument(&'static str),
    /// The HPACK codec rejected a header block representation.
    Compression,
}

/// The structural constraint a frame violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
    /// The type byte does not match the frame type the view was asked for.
    UnexpectedType(u8),
    /// A connection level frame carried a stream identifier.
    StreamIdMustBeZero(u32),
    /// A stream level frame was sent on stream 0.
    StreamIdMustBeNonZero,
    /// The payload length is not legal for the frame type.
    InvalidLength(u32),
    /// The pad length leaves no room for the rest of the payload.
    InvalidPadding(u8),
    /// A SETTINGS acknowledgement carried parameters.
    AckWithPayload,
    /// A known SETTINGS parameter carried an illegal value.
    InvalidSetting {
        ident: u16,
        value: u32,
    },
}

impl H2Error {
    pub(crate) fn malformed(frame_type: FrameType, reason: Malformed) -> Self {
        log::debug!("Rejecting {:?} frame: {:?}", frame_type, reason);

        Self::MalformedFrame {
            frame_type,
            reason,
        }
    }

    pub(crate) fn overrun(limit: usize, max_limit: usize) -> Self {
        log::debug!("Frame limit {} exceeds the accessible bound {}", limit, max_limit);

        Self::BufferOverrun {
            limit,
            max_limit,
        }
    }

    /// The error code a connection should report to its peer for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::BufferOverrun { .. } => ErrorCode::InternalError,
            Self::MalformedFrame { reason, .. } => match reason {
                Malformed::InvalidLength(_) | Malformed::AckWithPayload => ErrorCode::FrameSizeError,
                Malformed::InvalidSetting { ident, .. } if *ident==crate::settings::SettingsIdent::InitialWindowSize as u16 => {
                    ErrorCode::FlowControlError
                }
                _ => ErrorCode::ProtocolError,
            },
            Self::InvalidArgument(_) => ErrorCode::InternalError,
            Self::Compression => ErrorCode::CompressionError,
        }
    }
}

impl fmt::Display for H2Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferOverrun { limit, max_limit } => {
                write!(f, "buffer overrun (limit: {}, max limit: {})", limit, max_limit)
            }
            Self::MalformedFrame { frame_type, reason } => {
                write!(f, "malformed {:?} frame: {:?}", frame_type, reason)
            }
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Self::Compression => write!(f, "HPACK compression error"),
        }
    }
}

impl std::error::Error for H2Error {}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(FromPrimitive)]
pub enum ErrorCode {
    /// The associated condition is not a result of an error. For example, a GOAWAY might include
    /// this code to indicate graceful shutdown of a connection.
    NoError = 0,
    /// The endpoint detected an unspecific protocol error.
    ProtocolError = 1,
    /// The endpoint encountered an unexpected internal error.
    InternalError = 2,
    /// The endpoint detected that its peer violated the flow-control protocol.
    FlowControlError = 3,
    /// The endpoint sent a SETTINGS frame but did not receive a response in a timely manner.
    SettingsTimeout = 4,
    /// The endpoint received a frame after a stream was half-closed.
    StreamClosed = 5,
    /// The endpoint received a frame with an invalid size.
    FrameSizeError = 6,
    /// The endpoint refused the stream prior to performing any application processing.
    RefusedStream = 7,
    /// Used by the endpoint to indicate that the stream is no longer needed.
    Cancel = 8,
    /// The endpoint is unable to maintain the header compression context for the connection.
    CompressionError = 9,
    /// The connection established in response to a CONNECT request was reset or abnormally closed.
    ConnectError = 10,
    /// The endpoint detected that its peer is exhibiting a behavior that might be generating excessive load.
    EnhanceYourCalm = 11,
    /// The underlying transport has properties that do not meet minimum security requirements.
    InadequateSecurity = 12,
    /// The endpoint requires that HTTP/1.1 be used instead of HTTP/2.
    Http11Required = 13,
}

impl ErrorCode {
    /// Unknown codes are legal on the wire and carry no special meaning, so they yield `None`.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::from_u32(code)
    }

    pub fn code(self) -> u32 {
        self as u32
    }
}
