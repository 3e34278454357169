use super::*;

/*
    +-----------------------------------------------+
    |                 Length (24)                   |
    +---------------+---------------+---------------+
    |   Type (8)    |   Flags (8)   |
    +-+-------------+---------------+-------------------------------+
    |R|                 Stream Identifier (31)                      |
    +=+=============+===============================================+
    |                   Header Block Fragment (*)                 ...
    +---------------------------------------------------------------+
*/



/// A CONTINUATION frame, carrying nothing but the next fragment of a header block.
#[derive(Debug, Clone, Copy)]
pub struct ContinuationFrame<'a> {
    frame: RawFrame<'a>,
    block: HeaderBlock<'a>,
}

impl<'a> ContinuationFrame<'a> {
    header_accessors!('a);

    pub fn end_headers(&self) -> bool {
        self.frame.has(Flags::END_HEADERS)
    }

    pub fn header_block(&self) -> HeaderBlock<'a> {
        self.block
    }

    /// Decodes the fields of the fragment lazily, in wire order.
    pub fn fields<'d, 'h>(&self, decoder: &'d mut ::hpack::Decoder<'h>) -> HeaderFields<'a, 'd, 'h> {
        self.block.fields(decoder)
    }

    pub fn for_each<F>(&self, decoder: &mut ::hpack::Decoder<'_>, consumer: F) -> H2Result<()>
    where
        F: FnMut(HeaderField),
    {
        self.block.for_each(decoder, consumer)
    }
}

impl<'a> Flyweight<'a> for ContinuationFrame<'a> {
    fn wrap(buffer: &'a [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let frame = RawFrame::peek_as(buffer, offset, max_limit, FrameType::Continuation)?;
        frame.check_limit(max_limit)?;

        let block = HeaderBlock::wrap(buffer, frame.payload_offset(), frame.limit())?;

        Ok(Self {
            frame,
            block,
        })
    }

    view_bounds!('a);
}



pub struct ContinuationFrameBuilder<'a> {
    region: FrameRegion<'a>,
}

impl<'a> ContinuationFrameBuilder<'a> {
    pub fn stream_id(mut self, stream_id: u32) -> H2Result<Self> {
        self.region.set_stream_id(stream_id)?;

        Ok(self)
    }

    pub fn end_headers(mut self) -> Self {
        self.region.set_flags(Flags::END_HEADERS);

        self
    }

    block_appenders!();
}

impl<'a> FlyweightBuilder<'a> for ContinuationFrameBuilder<'a> {
    type View = ContinuationFrame<'a>;

    fn wrap(buffer: &'a mut [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let region = FrameRegion::wrap(buffer, offset, max_limit, FrameType::Continuation, 0)?;

        Ok(Self {
            region,
        })
    }

    builder_bounds!();

    fn build(self) -> H2Result<Self::View> {
        let (buffer, offset, limit) = self.region.into_parts();

        ContinuationFrame::wrap(buffer, offset, limit)
    }
}
