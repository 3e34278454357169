use super::*;

/*
    +-----------------------------------------------+
    |                 Length (24)                   |
    +---------------+---------------+---------------+
    |   Type (8)    |   Flags (8)   |
    +-+-------------+---------------+-------------------------------+
    |R|                 Stream Identifier (31)                      |
    +=+=============================================================+
    |R|              Window Size Increment (31)                     |
    +-+-------------------------------------------------------------+
*/

const PAYLOAD_LENGTH: usize = 4;



/// A WINDOW_UPDATE frame, either for the whole connection (stream 0) or for a single stream.
///
/// An increment of 0 is structurally fine, rejecting it is up to the flow control.
#[derive(Debug, Clone, Copy)]
pub struct WindowUpdateFrame<'a> {
    frame: RawFrame<'a>,
}

impl<'a> WindowUpdateFrame<'a> {
    header_accessors!('a);

    pub fn window_size_increment(&self) -> u32 {
        get_u32(self.frame.buffer(), self.frame.payload_offset()) & STREAM_ID_MASK
    }
}

impl<'a> Flyweight<'a> for WindowUpdateFrame<'a> {
    fn wrap(buffer: &'a [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let frame = RawFrame::peek_as(buffer, offset, max_limit, FrameType::WindowUpdate)?;
        frame.expect_length(PAYLOAD_LENGTH as u32)?;
        frame.check_limit(max_limit)?;

        Ok(Self {
            frame,
        })
    }

    view_bounds!('a);
}



pub struct WindowUpdateFrameBuilder<'a> {
    region: FrameRegion<'a>,
}

impl<'a> WindowUpdateFrameBuilder<'a> {
    pub fn stream_id(mut self, stream_id: u32) -> H2Result<Self> {
        self.region.set_stream_id(stream_id)?;

        Ok(self)
    }

    /// Sets the increment, which must be within 1 and 2^31-1.
    pub fn window_size_increment(mut self, increment: u32) -> H2Result<Self> {
        if increment==0 || increment&RESERVED_BIT!=0 {
            log::debug!("Invalid window size increment {}", increment);
            return Err(H2Error::InvalidArgument("the window size increment must be within 1 and 2^31-1"));
        }

        let at = self.region.fields_offset();
        self.region.put_u32(at, increment);

        Ok(self)
    }
}

impl<'a> FlyweightBuilder<'a> for WindowUpdateFrameBuilder<'a> {
    type View = WindowUpdateFrame<'a>;

    fn wrap(buffer: &'a mut [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let region = FrameRegion::wrap(buffer, offset, max_limit, FrameType::WindowUpdate, PAYLOAD_LENGTH)?;

        Ok(Self {
            region,
        })
    }

    builder_bounds!();

    fn build(self) -> H2Result<Self::View> {
        let (buffer, offset, limit) = self.region.into_parts();

        WindowUpdateFrame::wrap(buffer, offset, limit)
    }
}
