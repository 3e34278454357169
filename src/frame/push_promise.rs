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
    |R|                  Promised Stream ID (31)                    |
    +-+-----------------------------+-------------------------------+
    |                   Header Block Fragment (*)                 ...
    +---------------------------------------------------------------+
    |                           Padding (*)                       ...
    +---------------------------------------------------------------+
*/

const PROMISED_STREAM_ID_LEN: usize = 4;



#[derive(Debug, Clone, Copy)]
pub struct PushPromiseFrame<'a> {
    frame: RawFrame<'a>,
    promised_stream_id: u32,
    block: HeaderBlock<'a>,
}

impl<'a> PushPromiseFrame<'a> {
    header_accessors!('a);

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

    /// The stream the sender reserves, with the reserved bit masked off.
    pub fn promised_stream_id(&self) -> u32 {
        self.promised_stream_id
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

impl<'a> Flyweight<'a> for PushPromiseFrame<'a> {
    fn wrap(buffer: &'a [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let frame = RawFrame::peek_as(buffer, offset, max_limit, FrameType::PushPromise)?;
        frame.check_limit(max_limit)?;

        let (begin, end) = frame.unpadded(PROMISED_STREAM_ID_LEN)?;
        let promised_stream_id = get_u32(buffer, begin) & STREAM_ID_MASK;
        let block = HeaderBlock::wrap(buffer, begin+PROMISED_STREAM_ID_LEN, end)?;

        Ok(Self {
            frame,
            promised_stream_id,
            block,
        })
    }

    view_bounds!('a);
}



pub struct PushPromiseFrameBuilder<'a> {
    region: FrameRegion<'a>,
}

impl<'a> PushPromiseFrameBuilder<'a> {
    pub fn stream_id(mut self, stream_id: u32) -> H2Result<Self> {
        self.region.set_stream_id(stream_id)?;

        Ok(self)
    }

    pub fn promised_stream_id(mut self, promised_stream_id: u32) -> H2Result<Self> {
        let promised_stream_id = check_stream_id(promised_stream_id)?;
        let at = self.region.fields_offset();
        self.region.put_u32(at, promised_stream_id);

        Ok(self)
    }

    pub fn end_headers(mut self) -> Self {
        self.region.set_flags(Flags::END_HEADERS);

        self
    }

    pub fn padding(mut self, padding: u8) -> H2Result<Self> {
        self.region.set_padding(padding)?;

        Ok(self)
    }

    block_appenders!();
}

impl<'a> FlyweightBuilder<'a> for PushPromiseFrameBuilder<'a> {
    type View = PushPromiseFrame<'a>;

    fn wrap(buffer: &'a mut [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let region = FrameRegion::wrap(buffer, offset, max_limit, FrameType::PushPromise, PROMISED_STREAM_ID_LEN)?;

        Ok(Self {
            region,
        })
    }

    builder_bounds!();

    fn build(self) -> H2Result<Self::View> {
        let (buffer, offset, limit) = self.region.into_parts();

        PushPromiseFrame::wrap(buffer, offset, limit)
    }
}
