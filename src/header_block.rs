//! The header block carried by HEADERS, PUSH_PROMISE and CONTINUATION frames.
//!
//! The frame codec owns the bounds of the block. Splitting it into field representations is
//! done here (RFC 7541 Section 5 and 6), turning a representation into a header field is left
//! to the `hpack` codec and its dynamic table.

use std::iter::once;

use hpack::{Decoder, Encoder};

use crate::error::*;
use crate::flyweight::*;



/// The kind of a single field representation, as told by its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepresentationKind {
    Indexed,
    LiteralWithIndexing,
    LiteralWithoutIndexing,
    LiteralNeverIndexed,
    /// A dynamic table size update, which does not produce a header field.
    SizeUpdate,
}

/// The still encoded bytes of one field representation inside a header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Representation<'a> {
    pub kind: RepresentationKind,
    pub bytes: &'a [u8],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    name: Vec<u8>,
    value: Vec<u8>,
}

impl HeaderField {
    pub fn new<N: Into<Vec<u8>>, V: Into<Vec<u8>>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn is_pseudo(&self) -> bool {
        self.name.starts_with(b":")
    }

    pub fn into_inner(self) -> (Vec<u8>, Vec<u8>) {
        (self.name, self.value)
    }
}

impl From<(Vec<u8>, Vec<u8>)> for HeaderField {
    fn from((name, value): (Vec<u8>, Vec<u8>)) -> Self {
        Self {
            name,
            value,
        }
    }
}



/// Decodes an integer with an N bit prefix starting at `at`. Returns the value and the
/// position behind it.
fn decode_integer(buf: &[u8], at: usize, prefix_bits: u32) -> H2Result<(usize, usize)> {
    let mask = ((1u16<<prefix_bits)-1) as u8;

    let first = *buf.get(at).ok_or(H2Error::Compression)?;
    let mut value = (first&mask) as usize;
    let mut at = at+1;
    if value<mask as usize {
        return Ok((value, at));
    }

    let mut shift = 0u32;
    loop {
        let byte = *buf.get(at).ok_or(H2Error::Compression)?;
        at = at+1;

        // At most 4 continuation octets, the decoder gives up on anything longer.
        if shift>21 {
            log::warn!("HPACK integer at {} is too long", at);
            return Err(H2Error::Compression);
        }

        value = value+(((byte&0x7f) as usize)<<shift);
        shift = shift+7;

        if byte&0x80==0 {
            return Ok((value, at));
        }
    }
}

/// Returns the position behind the string literal starting at `at`.
fn skip_string(buf: &[u8], at: usize) -> H2Result<usize> {
    let (length, at) = decode_integer(buf, at, 7)?;
    let end = at.checked_add(length).ok_or(H2Error::Compression)?;

    if end>buf.len() {
        log::warn!("HPACK string literal of length {} exceeds the header block", length);
        return Err(H2Error::Compression);
    }

    Ok(end)
}

fn skip_literal(buf: &[u8], at: usize, prefix_bits: u32) -> H2Result<usize> {
    let (index, mut at) = decode_integer(buf, at, prefix_bits)?;

    // A zero index means the name follows as a literal.
    if index==0 {
        at = skip_string(buf, at)?;
    }

    skip_string(buf, at)
}

/// Finds the end of the representation starting at `at`.
fn scan_representation(buf: &[u8], at: usize) -> H2Result<(RepresentationKind, usize)> {
    let first = buf[at];

    if first&0x80!=0 {
        let (_, end) = decode_integer(buf, at, 7)?;
        Ok((RepresentationKind::Indexed, end))
    } else if first&0xc0==0x40 {
        Ok((RepresentationKind::LiteralWithIndexing, skip_literal(buf, at, 6)?))
    } else if first&0xe0==0x20 {
        let (_, end) = decode_integer(buf, at, 5)?;
        Ok((RepresentationKind::SizeUpdate, end))
    } else if first&0xf0==0x10 {
        Ok((RepresentationKind::LiteralNeverIndexed, skip_literal(buf, at, 4)?))
    } else {
        Ok((RepresentationKind::LiteralWithoutIndexing, skip_literal(buf, at, 4)?))
    }
}



/// A view of a run of HPACK encoded field representations.
#[derive(Clone, Copy)]
pub struct HeaderBlock<'a> {
    buffer: &'a [u8],
    offset: usize,
    limit: usize,
}

impl<'a> HeaderBlock<'a> {
    /// Walks over the encoded representations without decoding them.
    pub fn representations(&self) -> Representations<'a> {
        Representations {
            block: self.as_bytes(),
            at: 0,
            done: false,
        }
    }

    /// Decodes the fields one at a time as the sequence gets advanced. The decoder must be
    /// the one holding the dynamic table of the connection the block was received on.
    pub fn fields<'d, 'h>(&self, decoder: &'d mut Decoder<'h>) -> HeaderFields<'a, 'd, 'h> {
        HeaderFields {
            representations: self.representations(),
            decoder,
        }
    }

    /// Hands every field to `consumer` in wire order.
    pub fn for_each<F>(&self, decoder: &mut Decoder<'_>, mut consumer: F) -> H2Result<()>
    where
        F: FnMut(HeaderField),
    {
        for field in self.fields(decoder) {
            consumer(field?);
        }

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.offset==self.limit
    }
}

impl<'a> Flyweight<'a> for HeaderBlock<'a> {
    /// The block covers everything up to `max_limit`.
    fn wrap(buffer: &'a [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        check_region(buffer.len(), offset, max_limit, 0)?;

        Ok(Self {
            buffer,
            offset,
            limit: max_limit,
        })
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

impl std::fmt::Debug for HeaderBlock<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeaderBlock")
         .field("offset", &self.offset)
         .field("limit", &self.limit)
         .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Representations<'a> {
    block: &'a [u8],
    at: usize,
    done: bool,
}

impl<'a> Iterator for Representations<'a> {
    type Item = H2Result<Representation<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.at>=self.block.len() {
            return None;
        }

        match scan_representation(self.block, self.at) {
            Ok((kind, end)) => {
                let bytes = &self.block[self.at..end];
                self.at = end;

                Some(Ok(Representation {
                    kind,
                    bytes,
                }))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// The lazily decoded fields of a header block.
///
/// The sequence is forward only. Dropping it before the end leaves the decoder in the middle
/// of the block, which is only fine if the connection gets torn down anyway.
pub struct HeaderFields<'a, 'd, 'h> {
    representations: Representations<'a>,
    decoder: &'d mut Decoder<'h>,
}

impl Iterator for HeaderFields<'_, '_, '_> {
    type Item = H2Result<HeaderField>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let representation = match self.representations.next()? {
                Ok(representation) => representation,
                Err(err) => return Some(Err(err)),
            };

            match self.decoder.decode(representation.bytes) {
                Ok(mut fields) => {
                    if let Some(field) = fields.pop() {
                        return Some(Ok(field.into()));
                    }
                    // A size update, which only changes the decoder state.
                }
                Err(err) => {
                    log::warn!("Could not decode header block. err: {:?}", err);
                    self.representations.done = true;
                    return Some(Err(H2Error::Compression));
                }
            }
        }
    }
}



/// Appends HPACK encoded fields to a header block.
pub struct HeaderBlockBuilder<'a> {
    buffer: &'a mut [u8],
    offset: usize,
    limit: usize,
    max_limit: usize,
}

impl<'a> HeaderBlockBuilder<'a> {
    /// Encodes a single field with the encoder of the connection and appends it.
    ///
    /// The encoder may have added the field to its dynamic table even if appending fails, in
    /// which case the encoder no longer matches the peer.
    pub fn header(self, encoder: &mut Encoder<'_>, name: &[u8], value: &[u8]) -> H2Result<Self> {
        let encoded = encoder.encode(once((name, value)));

        self.fragment(&encoded)
    }

    pub fn headers(mut self, encoder: &mut Encoder<'_>, headers: &http::HeaderMap) -> H2Result<Self> {
        for (name, value) in headers.iter() {
            self = self.header(encoder, name.as_str().as_bytes(), value.as_bytes())?;
        }

        Ok(self)
    }

    /// Appends already encoded representations, e.g. the remainder of a block which did not
    /// fit into the previous frame.
    pub fn fragment(mut self, bytes: &[u8]) -> H2Result<Self> {
        let limit = self.limit+bytes.len();
        check_limit(limit, self.max_limit)?;

        self.buffer[self.limit..limit].copy_from_slice(bytes);
        self.limit = limit;

        Ok(self)
    }
}

impl<'a> FlyweightBuilder<'a> for HeaderBlockBuilder<'a> {
    type View = HeaderBlock<'a>;

    fn wrap(buffer: &'a mut [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        check_region(buffer.len(), offset, max_limit, 0)?;

        Ok(Self {
            buffer,
            offset,
            limit: offset,
            max_limit,
        })
    }

    fn offset(&self) -> usize {
        self.offset
    }

    fn limit(&self) -> usize {
        self.limit
    }

    fn max_limit(&self) -> usize {
        self.max_limit
    }

    fn as_bytes(&self) -> &[u8] {
        &self.buffer[self.offset..self.limit]
    }

    fn build(self) -> H2Result<Self::View> {
        let buffer: &'a [u8] = self.buffer;

        HeaderBlock::wrap(buffer, self.offset, self.limit)
    }
}
