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
    +---------------+-----------------------------------------------+
    |                            Data (*)                         ...
    +---------------------------------------------------------------+
    |                           Padding (*)                       ...
    +---------------------------------------------------------------+
*/



#[derive(Debug, Clone, Copy)]
pub struct DataFrame<'a> {
    frame: RawFrame<'a>,
    data_offset: usize,
    data_limit: usize,
}

impl<'a> DataFrame<'a> {
    header_accessors!('a);

    pub fn end_stream(&self) -> bool {
        self.frame.has(Flags::END_STREAM)
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

    /// The application data, without the pad length and the padding.
    pub fn data(&self) -> &'a [u8] {
        &self.frame.buffer()[self.data_offset..self.data_limit]
    }
}

impl<'a> Flyweight<'a> for DataFrame<'a> {
    fn wrap(buffer: &'a [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let frame = RawFrame::peek_as(buffer, offset, max_limit, FrameType::Data)?;
        frame.check_limit(max_limit)?;

        let (data_offset, data_limit) = frame.unpadded(0)?;

        Ok(Self {
            frame,
            data_offset,
            data_limit,
        })
    }

    view_bounds!('a);
}



pub struct DataFrameBuilder<'a> {
    region: FrameRegion<'a>,
}

impl<'a> DataFrameBuilder<'a> {
    pub fn stream_id(mut self, stream_id: u32) -> H2Result<Self> {
        self.region.set_stream_id(stream_id)?;

        Ok(self)
    }

    pub fn end_stream(mut self) -> Self {
        self.region.set_flags(Flags::END_STREAM);

        self
    }

    /// Pads the frame with `padding` zero bytes, which may be done before or after adding data.
    pub fn padding(mut self, padding: u8) -> H2Result<Self> {
        self.region.set_padding(padding)?;

        Ok(self)
    }

    /// Appends `data` to what has been written so far.
    pub fn data(mut self, data: &[u8]) -> H2Result<Self> {
        self.region.append(data)?;

        Ok(self)
    }
}

impl<'a> FlyweightBuilder<'a> for DataFrameBuilder<'a> {
    type View = DataFrame<'a>;

    fn wrap(buffer: &'a mut [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let region = FrameRegion::wrap(buffer, offset, max_limit, FrameType::Data, 0)?;

        Ok(Self {
            region,
        })
    }

    builder_bounds!();

    fn build(self) -> H2Result<Self::View> {
        let (buffer, offset, limit) = self.region.into_parts();

        DataFrame::wrap(buffer, offset, limit)
    }
}
