//! The base contract shared by every frame view and builder.
//!
//! A view is a non-owning window `[offset, limit)` over caller provided storage. A builder
//! borrows the storage mutably, keeps the frame it lays down self-describing after every
//! mutation and hands the storage back as a view once it is built.

use crate::error::*;
use crate::frame::{Flags, FrameType};



/// The size of the common frame header.
pub const FRAME_HEADER_LEN: usize = 9;

/// The biggest payload length the 24 bit length field can describe.
pub const MAX_PAYLOAD_LENGTH: usize = (1<<24)-1;

/// Masks off the reserved most significant bit of a stream identifier.
pub const STREAM_ID_MASK: u32 = 0x7fff_ffff;

pub(crate) const RESERVED_BIT: u32 = 1<<31;

pub(crate) const LENGTH_OFFSET: usize = 0;
pub(crate) const TYPE_OFFSET: usize = 3;
pub(crate) const FLAGS_OFFSET: usize = 4;
pub(crate) const STREAM_ID_OFFSET: usize = 5;
pub(crate) const PAYLOAD_OFFSET: usize = 9;



pub(crate) fn get_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([buf[at], buf[at+1]])
}

/// There is no native 24 bit integer, so the length field gets widened to an u32.
pub(crate) fn get_u24(buf: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([0, buf[at], buf[at+1], buf[at+2]])
}

pub(crate) fn get_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([buf[at], buf[at+1], buf[at+2], buf[at+3]])
}

pub(crate) fn put_u16(buf: &mut [u8], at: usize, value: u16) {
    buf[at..at+2].copy_from_slice(&value.to_be_bytes());
}

pub(crate) fn put_u24(buf: &mut [u8], at: usize, value: u32) {
    debug_assert!(value as usize<=MAX_PAYLOAD_LENGTH);
    buf[at..at+3].copy_from_slice(&value.to_be_bytes()[1..4]);
}

pub(crate) fn put_u32(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at+4].copy_from_slice(&value.to_be_bytes());
}

/// Makes sure a region ending at `limit` stays within the accessible bound.
pub(crate) fn check_limit(limit: usize, max_limit: usize) -> H2Result<()> {
    if limit>max_limit {
        return Err(H2Error::overrun(limit, max_limit));
    }

    Ok(())
}

/// Makes sure `min_len` bytes starting at `offset` are addressable below `max_limit`, and that
/// `max_limit` itself does not point behind the storage.
pub(crate) fn check_region(len: usize, offset: usize, max_limit: usize, min_len: usize) -> H2Result<()> {
    check_limit(max_limit, len)?;
    let limit = offset.checked_add(min_len).ok_or(H2Error::InvalidArgument("offset overflows"))?;
    check_limit(limit, max_limit)
}

/// Rejects stream identifiers with the reserved bit set, which must never be sent.
pub(crate) fn check_stream_id(id: u32) -> H2Result<u32> {
    if id&RESERVED_BIT!=0 {
        return Err(H2Error::InvalidArgument("the reserved stream identifier bit must not be set"));
    }

    Ok(id)
}



/// A read-only view interpreting a borrowed region as one specific structure.
pub trait Flyweight<'a>: Sized {
    /// Interprets the bytes starting at `offset` and validates them. The resulting region must
    /// end at or before `max_limit`.
    fn wrap(buffer: &'a [u8], offset: usize, max_limit: usize) -> H2Result<Self>;

    fn buffer(&self) -> &'a [u8];

    fn offset(&self) -> usize;

    /// The exclusive upper bound of the wrapped region.
    fn limit(&self) -> usize;

    fn size_of(&self) -> usize {
        self.limit()-self.offset()
    }

    fn as_bytes(&self) -> &'a [u8] {
        &self.buffer()[self.offset()..self.limit()]
    }
}

/// A writer laying down one structure into a borrowed region.
pub trait FlyweightBuilder<'a>: Sized {
    type View: Flyweight<'a>;

    /// Retargets the builder to `buffer`, immediately writing a valid empty structure.
    fn wrap(buffer: &'a mut [u8], offset: usize, max_limit: usize) -> H2Result<Self>;

    fn offset(&self) -> usize;

    fn limit(&self) -> usize;

    fn max_limit(&self) -> usize;

    /// The bytes written so far.
    fn as_bytes(&self) -> &[u8];

    /// Freezes the region and returns a view over exactly `[offset, limit)`.
    fn build(self) -> H2Result<Self::View>;
}



/// The mutable region shared by all frame builders.
///
/// Besides the header it tracks the padding which trails the payload of padded frames. The
/// padding always stays at the end of the payload, content gets inserted in front of it.
pub(crate) struct FrameRegion<'a> {
    buffer: &'a mut [u8],
    offset: usize,
    limit: usize,
    max_limit: usize,
    padding: usize,
}

impl<'a> FrameRegion<'a> {
    /// Writes an empty header of the given type followed by `fixed` zero bytes of payload.
    pub fn wrap(
        buffer: &'a mut [u8],
        offset: usize,
        max_limit: usize,
        r#type: FrameType,
        fixed: usize,
    ) -> H2Result<Self> {
        check_region(buffer.len(), offset, max_limit, PAYLOAD_OFFSET+fixed)?;

        put_u24(buffer, offset+LENGTH_OFFSET, fixed as u32);
        buffer[offset+TYPE_OFFSET] = r#type.code();
        buffer[offset+FLAGS_OFFSET] = 0;
        put_u32(buffer, offset+STREAM_ID_OFFSET, 0);

        let limit = offset+PAYLOAD_OFFSET+fixed;
        buffer[offset+PAYLOAD_OFFSET..limit].fill(0);

        Ok(Self {
            buffer,
            offset,
            limit,
            max_limit,
            padding: 0,
        })
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn max_limit(&self) -> usize {
        self.max_limit
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[self.offset..self.limit]
    }

    pub fn payload_length(&self) -> usize {
        self.limit-self.offset-PAYLOAD_OFFSET
    }

    pub fn flags(&self) -> Flags {
        Flags::from_bits_truncate(self.buffer[self.offset+FLAGS_OFFSET])
    }

    pub fn set_flags(&mut self, flags: Flags) {
        self.buffer[self.offset+FLAGS_OFFSET] |= flags.bits();
    }

    pub fn set_stream_id(&mut self, id: u32) -> H2Result<()> {
        let id = check_stream_id(id)?;
        put_u32(self.buffer, self.offset+STREAM_ID_OFFSET, id);

        Ok(())
    }

    /// Where the type specific fields begin, behind the pad length if there is one.
    pub fn fields_offset(&self) -> usize {
        let begin = self.offset+PAYLOAD_OFFSET;
        if self.flags().contains(Flags::PADDED) {
            begin+1
        } else {
            begin
        }
    }

    /// The end of the content written so far, in front of any padding.
    pub fn content_limit(&self) -> usize {
        self.limit-self.padding
    }

    pub fn put_u32(&mut self, at: usize, value: u32) {
        put_u32(self.buffer, at, value);
    }

    pub fn put_bytes(&mut self, at: usize, bytes: &[u8]) {
        self.buffer[at..at+bytes.len()].copy_from_slice(bytes);
    }

    /// Appends `bytes` to the content and back-patches the length.
    pub fn append(&mut self, bytes: &[u8]) -> H2Result<()> {
        let at = self.content_limit();
        let content_limit = at+bytes.len();
        check_limit(content_limit+self.padding, self.max_limit)?;

        self.buffer[at..content_limit].copy_from_slice(bytes);

        self.advance_to(content_limit)
    }

    /// Inserts `bytes` at `at`, moving the content behind it towards the end.
    pub fn insert(&mut self, at: usize, bytes: &[u8]) -> H2Result<()> {
        let content_limit = self.content_limit();
        debug_assert!(at<=content_limit);
        check_limit(content_limit+bytes.len()+self.padding, self.max_limit)?;

        self.buffer.copy_within(at..content_limit, at+bytes.len());
        self.buffer[at..at+bytes.len()].copy_from_slice(bytes);

        self.advance_to(content_limit+bytes.len())
    }

    /// The storage available for content written by a nested builder: the buffer, the
    /// position to continue at and the bound that still leaves room for the padding.
    pub fn content_window(&mut self) -> (&mut [u8], usize, usize) {
        let at = self.content_limit();
        let max_limit = self.max_limit-self.padding;

        (&mut *self.buffer, at, max_limit)
    }

    /// Moves the end of the content to `content_limit`, rewrites the padding behind it and
    /// back-patches the length.
    pub fn advance_to(&mut self, content_limit: usize) -> H2Result<()> {
        let limit = content_limit+self.padding;
        check_limit(limit, self.max_limit)?;

        let length = limit-self.offset-PAYLOAD_OFFSET;
        if length>MAX_PAYLOAD_LENGTH {
            return Err(H2Error::InvalidArgument("the payload exceeds the 24 bit length field"));
        }

        self.buffer[content_limit..limit].fill(0);
        self.limit = limit;
        put_u24(self.buffer, self.offset+LENGTH_OFFSET, length as u32);
        log::trace!("Back-patched frame length to {} (limit: {})", length, limit);

        Ok(())
    }

    /// Pads the payload with `padding` zero bytes. The pad length field gets inserted in front
    /// of everything written so far, calling this again only changes the amount of padding.
    pub fn set_padding(&mut self, padding: u8) -> H2Result<()> {
        let content_limit = self.content_limit();
        let pad_length_at = self.offset+PAYLOAD_OFFSET;

        if !self.flags().contains(Flags::PADDED) {
            self.padding = 0;
            self.insert(pad_length_at, &[0])?;
            self.set_flags(Flags::PADDED);
            return self.set_padding(padding);
        }

        let limit = content_limit+padding as usize;
        check_limit(limit, self.max_limit)?;

        self.buffer[pad_length_at] = padding;
        self.padding = padding as usize;

        self.advance_to(content_limit)
    }

    /// Gives up the unique borrow, returning the storage together with the frame bounds.
    pub fn into_parts(self) -> (&'a [u8], usize, usize) {
        let buffer: &'a [u8] = self.buffer;

        (buffer, self.offset, self.limit)
    }
}



#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u24_is_big_endian() {
        let mut buf = [0u8; 5];
        put_u24(&mut buf, 1, 0x0a0b0c);
        assert_eq!(buf, [0, 0x0a, 0x0b, 0x0c, 0]);
        assert_eq!(get_u24(&buf, 1), 0x0a0b0c);
    }

    #[test]
    fn u24_covers_the_whole_range() {
        let mut buf = [0u8; 3];
        put_u24(&mut buf, 0, MAX_PAYLOAD_LENGTH as u32);
        assert_eq!(buf, [0xff, 0xff, 0xff]);
        assert_eq!(get_u24(&buf, 0), MAX_PAYLOAD_LENGTH as u32);
    }

    #[test]
    fn check_region_rejects_max_limit_behind_storage() {
        assert!(matches!(check_region(10, 0, 11, 9), Err(H2Error::BufferOverrun { .. })));
        assert!(check_region(10, 1, 10, 9).is_ok());
        assert!(matches!(check_region(10, 2, 10, 9), Err(H2Error::BufferOverrun { limit: 11, max_limit: 10 })));
    }

    #[test]
    fn check_stream_id_rejects_reserved_bit() {
        assert_eq!(check_stream_id(0x7fff_ffff), Ok(0x7fff_ffff));
        assert!(matches!(check_stream_id(0x8000_0001), Err(H2Error::InvalidArgument(_))));
    }

    #[test]
    fn region_keeps_padding_behind_content() {
        let mut buf = [0xeeu8; 32];
        let mut region = FrameRegion::wrap(&mut buf, 1, 32, FrameType::Data, 0).unwrap();

        region.append(b"ab").unwrap();
        region.set_padding(3).unwrap();
        assert_eq!(region.payload_length(), 1+2+3);
        region.append(b"cd").unwrap();

        assert_eq!(region.limit(), 1+9+1+4+3);
        assert_eq!(&region.as_bytes()[..3], &[0, 0, 8]);
        assert_eq!(&region.as_bytes()[9..], &[3, b'a', b'b', b'c', b'd', 0, 0, 0]);

        region.set_padding(1).unwrap();
        assert_eq!(&region.as_bytes()[9..], &[1, b'a', b'b', b'c', b'd', 0]);
        assert_eq!(get_u24(region.as_bytes(), 0), 6);
    }

    #[test]
    fn region_append_respects_max_limit() {
        let mut buf = [0u8; 32];
        let mut region = FrameRegion::wrap(&mut buf, 0, 12, FrameType::Data, 0).unwrap();

        region.append(b"abc").unwrap();
        assert!(matches!(region.append(b"d"), Err(H2Error::BufferOverrun { limit: 13, max_limit: 12 })));
        assert_eq!(region.limit(), 12);
    }
}
