use super::*;

/*
    +-----------------------------------------------+
    |                 Length (24)                   |
    +---------------+---------------+---------------+
    |   Type (8)    |   Flags (8)   |
    +-+-------------+---------------+-------------------------------+
    |R|                 Stream Identifier (31)                      |
    +=+=============+===============================================+
    |Pad Length? (8)|
    +-+-------------+-----------------------------------------------+
    |E|                 Stream Dependency? (31)                     |
    +-+-------------+-----------------------------------------------+
    |  Weight? (8)  |
    +-+-------------+-----------------------------------------------+
    |                   Header Block Fragment (*)                 ...
    +---------------------------------------------------------------+
    |                           Padding (*)                       ...
    +---------------------------------------------------------------+
*/



#[derive(Debug, Clone, Copy)]
pub struct HeadersFrame<'a> {
    frame: RawFrame<'a>,
    priority: Option<Priority>,
    block: HeaderBlock<'a>,
}

impl<'a> HeadersFrame<'a> {
    header_accessors!('a);

    pub fn end_stream(&self) -> bool {
        self.frame.has(Flags::END_STREAM)
    }

    pub fn end_headers(&self) -> bool {
        self.frame.has(Flags::END_HEADERS)
    }

    pub fn padded(&self) -> bool {
        self.frame.has(Flags::PADDED)
    }

    pub fn pad_length(&self) -> u8 {
        if self.padded() {
            self.frame.payload()[0]
        } else {
            0
        }
    }

    /// The priority fields, present if the `PRIORITY` flag is set.
    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    pub fn header_block(&self) -> HeaderBlock<'a> {
        self.block
    }

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

impl<'a> Flyweight<'a> for HeadersFrame<'a> {
    fn wrap(buffer: &'a [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let frame = RawFrame::peek_as(buffer, offset, max_limit, FrameType::Headers)?;
        frame.check_limit(max_limit)?;

        let fixed = if frame.has(Flags::PRIORITY) {
            Priority::LEN
        } else {
            0
        };
        let (begin, end) = frame.unpadded(fixed)?;

        let priority = if fixed>0 {
            Some(Priority::from_slice(&buffer[begin..begin+fixed]))
        } else {
            None
        };

        let block = HeaderBlock::wrap(buffer, begin+fixed, end)?;

        Ok(Self {
            frame,
            priority,
            block,
        })
    }

    view_bounds!('a);
}



pub struct HeadersFrameBuilder<'a> {
    region: FrameRegion<'a>,
}

impl<'a> HeadersFrameBuilder<'a> {
    pub fn stream_id(mut self, stream_id: u32) -> H2Result<Self> {
        self.region.set_stream_id(stream_id)?;

        Ok(self)
    }

    pub fn end_stream(mut self) -> Self {
        self.region.set_flags(Flags::END_STREAM);

        self
    }

    pub fn end_headers(mut self) -> Self {
        self.region.set_flags(Flags::END_HEADERS);

        self
    }

    /// Pads the frame with `padding` zero bytes.
    pub fn padding(mut self, padding: u8) -> H2Result<Self> {
        self.region.set_padding(padding)?;

        Ok(self)
    }

    /// Sets the priority fields. They always precede the header block, no matter whether
    /// headers have been added already.
    pub fn priority(mut self, priority: Priority) -> H2Result<Self> {
        let bytes = priority.to_bytes()?;
        let at = self.region.fields_offset();

        if self.region.flags().contains(Flags::PRIORITY) {
            self.region.put_bytes(at, &bytes);
        } else {
            self.region.insert(at, &bytes)?;
            self.region.set_flags(Flags::PRIORITY);
        }

        Ok(self)
    }

    block_appenders!();
}

impl<'a> FlyweightBuilder<'a> for HeadersFrameBuilder<'a> {
    type View = HeadersFrame<'a>;

    fn wrap(buffer: &'a mut [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let region = FrameRegion::wrap(buffer, offset, max_limit, FrameType::Headers, 0)?;

        Ok(Self {
            region,
        })
    }

    builder_bounds!();

    fn build(self) -> H2Result<Self::View> {
        let (buffer, offset, limit) = self.region.into_parts();

        HeadersFrame::wrap(buffer, offset, limit)
    }
}
