//! HTTP/2 frame views and builders (RFC 7540 Section 4 and 6).
//!
//! Every frame starts with the same 9 byte header:
//! ```text
//! +-----------------------------------------------+
//! |                 Length (24)                   |
//! +---------------+---------------+---------------+
//! |   Type (8)    |   Flags (8)   |
//! +-+-------------+---------------+-------------------------------+
//! |R|                 Stream Identifier (31)                      |
//! +=+=============================================================+
//! |                   Frame Payload (0...)                      ...
//! +---------------------------------------------------------------+
//! ```
//!
//! The free functions in this module read single header fields at an arbitrary offset, they
//! are what the concrete views use to validate a frame before interpreting its payload.

use std::fmt;

use bitflags::bitflags;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::error::*;
use crate::flyweight::*;
use crate::header_block::*;



/// The common header accessors of a concrete view holding its header in `frame`.
macro_rules! header_accessors {
    ($l:lifetime) => {
        /// The view of the common header only.
        pub fn raw(&self) -> RawFrame<$l> {
            self.frame
        }

        pub fn payload_length(&self) -> u32 {
            self.frame.payload_length()
        }

        pub fn r#type(&self) -> FrameType {
            self.frame.r#type()
        }

        pub fn flags(&self) -> u8 {
            self.frame.flags()
        }

        pub fn stream_id(&self) -> u32 {
            self.frame.stream_id()
        }
    };
}

macro_rules! view_bounds {
    ($l:lifetime) => {
        fn buffer(&self) -> &$l [u8] {
            self.frame.buffer()
        }

        fn offset(&self) -> usize {
            self.frame.offset()
        }

        fn limit(&self) -> usize {
            self.frame.limit()
        }
    };
}

macro_rules! builder_bounds {
    () => {
        fn offset(&self) -> usize {
            self.region.offset()
        }

        fn limit(&self) -> usize {
            self.region.limit()
        }

        fn max_limit(&self) -> usize {
            self.region.max_limit()
        }

        fn as_bytes(&self) -> &[u8] {
            self.region.as_bytes()
        }
    };
}

/// Appends one header field to the block of a frame builder holding a `region`, back-patching
/// the frame length afterwards.
macro_rules! block_appenders {
    () => {
        /// Encodes one header field and appends it to the header block.
        pub fn header(mut self, encoder: &mut ::hpack::Encoder<'_>, name: &[u8], value: &[u8]) -> H2Result<Self> {
            let limit = {
                let (buffer, at, max_limit) = self.region.content_window();
                HeaderBlockBuilder::wrap(buffer, at, max_limit)?.header(encoder, name, value)?.limit()
            };
            self.region.advance_to(limit)?;

            Ok(self)
        }

        /// Appends every header of `headers`, back-patching the length after each of them.
        pub fn headers(mut self, encoder: &mut ::hpack::Encoder<'_>, headers: &http::HeaderMap) -> H2Result<Self> {
            for (name, value) in headers.iter() {
                self = self.header(encoder, name.as_str().as_bytes(), value.as_bytes())?;
            }

            Ok(self)
        }

        /// Appends already encoded header block bytes.
        pub fn fragment(mut self, bytes: &[u8]) -> H2Result<Self> {
            self.region.append(bytes)?;

            Ok(self)
        }
    };
}



mod data;
pub use data::*;

mod headers;
pub use headers::*;

mod priority;
pub use priority::*;

mod rst_stream;
pub use rst_stream::*;

mod settings;
pub use settings::*;

mod push_promise;
pub use push_promise::*;

mod ping;
pub use ping::*;

mod goaway;
pub use goaway::*;

mod window_update;
pub use window_update::*;

mod continuation;
pub use continuation::*;



#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(FromPrimitive)]
pub enum FrameType {
    Data = 0,
    Headers = 1,
    Priority = 2,
    RstStream = 3,
    Settings = 4,
    PushPromise = 5,
    Ping = 6,
    GoAway = 7,
    WindowUpdate = 8,
    Continuation = 9,
    /// Any type this crate does not know. Such frames must be ignored, not rejected.
    Unrecognized = 0xff,
}

impl FrameType {
    pub fn from_code(code: u8) -> Self {
        Self::from_u8(code).unwrap_or(Self::Unrecognized)
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// The flag bits which carry a meaning for this type. All other bits must be ignored.
    pub fn defined_flags(self) -> Flags {
        match self {
            Self::Data => Flags::END_STREAM | Flags::PADDED,
            Self::Headers => Flags::END_STREAM | Flags::END_HEADERS | Flags::PADDED | Flags::PRIORITY,
            Self::Settings | Self::Ping => Flags::ACK,
            Self::PushPromise => Flags::END_HEADERS | Flags::PADDED,
            Self::Continuation => Flags::END_HEADERS,
            _ => Flags::empty(),
        }
    }

    /// Frames of these types apply to the whole connection and must use stream 0.
    pub fn is_connection_scoped(self) -> bool {
        matches!(self, Self::Settings | Self::Ping | Self::GoAway)
    }

    /// Frames of these types belong to a stream and must not use stream 0.
    pub fn is_stream_scoped(self) -> bool {
        matches!(self,
            Self::Data | Self::Headers | Self::Priority | Self::RstStream | Self::PushPromise | Self::Continuation
        )
    }
}

bitflags! {
    /// The same bit means different things depending on the frame type, which is why
    /// `END_STREAM` and `ACK` share a value.
    pub struct Flags: u8 {
        const END_STREAM = 1;
        const ACK = 1;
        const END_HEADERS = 1<<2;
        const PADDED = 1<<3;
        const PRIORITY = 1<<5;
    }
}



/// Reads the 24 bit payload length of the frame at `offset`.
///
/// None of the header accessors check bounds, the caller must know that the 9 header bytes
/// are addressable.
pub fn payload_length(buffer: &[u8], offset: usize) -> u32 {
    get_u24(buffer, offset+LENGTH_OFFSET)
}

pub fn type_code(buffer: &[u8], offset: usize) -> u8 {
    buffer[offset+TYPE_OFFSET]
}

pub fn frame_type(buffer: &[u8], offset: usize) -> FrameType {
    FrameType::from_code(type_code(buffer, offset))
}

pub fn flags(buffer: &[u8], offset: usize) -> u8 {
    buffer[offset+FLAGS_OFFSET]
}

/// Reads the stream identifier, ignoring the reserved bit.
pub fn stream_id(buffer: &[u8], offset: usize) -> u32 {
    get_u32(buffer, offset+STREAM_ID_OFFSET) & STREAM_ID_MASK
}



/// A view of any frame which only knows about the common header.
///
/// This is the view for frames of unrecognized types and the base of every concrete view.
#[derive(Clone, Copy)]
pub struct RawFrame<'a> {
    buffer: &'a [u8],
    offset: usize,
    limit: usize,
}

impl<'a> RawFrame<'a> {
    /// Reads the header without checking that the payload is within bounds.
    fn peek(buffer: &'a [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        check_region(buffer.len(), offset, max_limit, FRAME_HEADER_LEN)?;

        let limit = offset+PAYLOAD_OFFSET+payload_length(buffer, offset) as usize;

        Ok(Self {
            buffer,
            offset,
            limit,
        })
    }

    /// Reads the header of a frame which must be of type `expected`.
    pub(crate) fn peek_as(
        buffer: &'a [u8],
        offset: usize,
        max_limit: usize,
        expected: FrameType,
    ) -> H2Result<Self> {
        let frame = Self::peek(buffer, offset, max_limit)?;

        if frame.r#type()!=expected {
            return Err(H2Error::malformed(expected, Malformed::UnexpectedType(frame.type_code())));
        }

        if expected.is_connection_scoped() && frame.stream_id()!=0 {
            return Err(H2Error::malformed(expected, Malformed::StreamIdMustBeZero(frame.stream_id())));
        }

        if expected.is_stream_scoped() && frame.stream_id()==0 {
            return Err(H2Error::malformed(expected, Malformed::StreamIdMustBeNonZero));
        }

        Ok(frame)
    }

    pub(crate) fn check_limit(&self, max_limit: usize) -> H2Result<()> {
        check_limit(self.limit, max_limit)
    }

    pub(crate) fn malformed(&self, reason: Malformed) -> H2Error {
        H2Error::malformed(self.r#type(), reason)
    }

    pub(crate) fn expect_length(&self, length: u32) -> H2Result<()> {
        if self.payload_length()!=length {
            return Err(self.malformed(Malformed::InvalidLength(self.payload_length())));
        }

        Ok(())
    }

    /// Strips the pad length field and the padding of a frame which may carry the `PADDED`
    /// flag. Returns the bounds of what is between them, which must hold at least `fixed` bytes.
    pub(crate) fn unpadded(&self, fixed: usize) -> H2Result<(usize, usize)> {
        let length = self.payload_length() as usize;
        let mut begin = self.payload_offset();
        let mut end = self.limit;

        if self.has(Flags::PADDED) {
            if length==0 {
                return Err(self.malformed(Malformed::InvalidLength(0)));
            }

            let padding = self.buffer[begin];
            if 1+fixed+padding as usize>length {
                return Err(self.malformed(Malformed::InvalidPadding(padding)));
            }

            begin = begin+1;
            end = end-padding as usize;
        }

        if begin+fixed>end {
            return Err(self.malformed(Malformed::InvalidLength(length as u32)));
        }

        Ok((begin, end))
    }

    pub fn payload_length(&self) -> u32 {
        payload_length(self.buffer, self.offset)
    }

    pub fn r#type(&self) -> FrameType {
        frame_type(self.buffer, self.offset)
    }

    /// The raw type byte, which is what identifies unrecognized frames.
    pub fn type_code(&self) -> u8 {
        type_code(self.buffer, self.offset)
    }

    pub fn flags(&self) -> u8 {
        flags(self.buffer, self.offset)
    }

    pub fn has(&self, flag: Flags) -> bool {
        self.flags()&flag.bits()!=0
    }

    pub fn stream_id(&self) -> u32 {
        stream_id(self.buffer, self.offset)
    }

    pub fn payload_offset(&self) -> usize {
        self.offset+PAYLOAD_OFFSET
    }

    pub fn payload(&self) -> &'a [u8] {
        &self.buffer[self.payload_offset()..self.limit]
    }
}

impl<'a> Flyweight<'a> for RawFrame<'a> {
    fn wrap(buffer: &'a [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let frame = Self::peek(buffer, offset, max_limit)?;
        frame.check_limit(max_limit)?;

        Ok(frame)
    }

    fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    fn offset(&self) -> usize {
        self.offset
    }

    fn limit(&self) -> usize {
        self.limit
    }
}

impl fmt::Debug for RawFrame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawFrame")
         .field("offset", &self.offset)
         .field("limit", &self.limit)
         .field("type", &self.r#type())
         .field("flags", &self.flags())
         .field("stream_id", &self.stream_id())
         .finish()
    }
}

impl fmt::Display for RawFrame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} frame <length={}, type={:#04x}, flags={:#04x}, id={}>",
            self.r#type(), self.payload_length(), self.type_code(), self.flags(), self.stream_id())
    }
}



#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Priority {
    pub stream_dependency: u32,
    pub exclusive: bool,
    /// The weight as sent on the wire, the effective weight is one more.
    pub weight: u8,
}

impl Priority {
    pub const LEN: usize = 5;

    pub(crate) fn from_slice(slice: &[u8]) -> Self {
        let stream_dependency = get_u32(slice, 0);
        let exclusive = stream_dependency&RESERVED_BIT!=0;
        let weight = slice[4];

        Self {
            stream_dependency: stream_dependency&STREAM_ID_MASK,
            exclusive,
            weight,
        }
    }

    pub(crate) fn to_bytes(self) -> H2Result<[u8; Self::LEN]> {
        let stream_dependency = check_stream_id(self.stream_dependency)?;
        let stream_dependency = if self.exclusive {
            stream_dependency | RESERVED_BIT
        } else {
            stream_dependency
        };

        let mut bytes = [0u8; Self::LEN];
        put_u32(&mut bytes, 0, stream_dependency);
        bytes[4] = self.weight;

        Ok(bytes)
    }
}



/// Any frame, wrapped by the view matching its type.
#[derive(Debug, Clone, Copy)]
pub enum Frame<'a> {
    Data(DataFrame<'a>),
    Headers(HeadersFrame<'a>),
    Priority(PriorityFrame<'a>),
    RstStream(RstStreamFrame<'a>),
    Settings(SettingsFrame<'a>),
    PushPromise(PushPromiseFrame<'a>),
    Ping(PingFrame<'a>),
    GoAway(GoAwayFrame<'a>),
    WindowUpdate(WindowUpdateFrame<'a>),
    Continuation(ContinuationFrame<'a>),
    Unrecognized(RawFrame<'a>),
}

impl<'a> Frame<'a> {
    /// The common header of the wrapped frame.
    pub fn raw(&self) -> RawFrame<'a> {
        match self {
            Self::Data(frame) => frame.raw(),
            Self::Headers(frame) => frame.raw(),
            Self::Priority(frame) => frame.raw(),
            Self::RstStream(frame) => frame.raw(),
            Self::Settings(frame) => frame.raw(),
            Self::PushPromise(frame) => frame.raw(),
            Self::Ping(frame) => frame.raw(),
            Self::GoAway(frame) => frame.raw(),
            Self::WindowUpdate(frame) => frame.raw(),
            Self::Continuation(frame) => frame.raw(),
            Self::Unrecognized(frame) => *frame,
        }
    }

    pub fn r#type(&self) -> FrameType {
        self.raw().r#type()
    }

    pub fn stream_id(&self) -> u32 {
        self.raw().stream_id()
    }
}

impl<'a> Flyweight<'a> for Frame<'a> {
    fn wrap(buffer: &'a [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let frame = RawFrame::peek(buffer, offset, max_limit)?;

        let frame = match frame.r#type() {
            FrameType::Data => Self::Data(DataFrame::wrap(buffer, offset, max_limit)?),
            FrameType::Headers => Self::Headers(HeadersFrame::wrap(buffer, offset, max_limit)?),
            FrameType::Priority => Self::Priority(PriorityFrame::wrap(buffer, offset, max_limit)?),
            FrameType::RstStream => Self::RstStream(RstStreamFrame::wrap(buffer, offset, max_limit)?),
            FrameType::Settings => Self::Settings(SettingsFrame::wrap(buffer, offset, max_limit)?),
            FrameType::PushPromise => Self::PushPromise(PushPromiseFrame::wrap(buffer, offset, max_limit)?),
            FrameType::Ping => Self::Ping(PingFrame::wrap(buffer, offset, max_limit)?),
            FrameType::GoAway => Self::GoAway(GoAwayFrame::wrap(buffer, offset, max_limit)?),
            FrameType::WindowUpdate => Self::WindowUpdate(WindowUpdateFrame::wrap(buffer, offset, max_limit)?),
            FrameType::Continuation => Self::Continuation(ContinuationFrame::wrap(buffer, offset, max_limit)?),
            FrameType::Unrecognized => {
                log::debug!("Passing through a frame of unrecognized type {:#04x}", frame.type_code());
                frame.check_limit(max_limit)?;
                Self::Unrecognized(frame)
            }
        };

        Ok(frame)
    }

    fn buffer(&self) -> &'a [u8] {
        self.raw().buffer
    }

    fn offset(&self) -> usize {
        self.raw().offset
    }

    fn limit(&self) -> usize {
        self.raw().limit
    }
}

impl fmt::Display for Frame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw(), f)
    }
}



/// Walks over frames laid out back to back.
///
/// An error ends the sequence. A frame cut off at the end of the buffer shows up as a
/// `BufferOverrun`, in which case `offset()` tells where the incomplete frame starts.
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    buffer: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> Frames<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            offset: 0,
            done: false,
        }
    }

    /// The offset of the next frame, which is also the amount of bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = H2Result<Frame<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset>=self.buffer.len() {
            return None;
        }

        match Frame::wrap(self.buffer, self.offset, self.buffer.len()) {
            Ok(frame) => {
                self.offset = frame.limit();
                Some(Ok(frame))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for Frames<'_> {}
