use super::*;

/*
    +-----------------------------------------------+
    |                 Length (24)                   |
    +---------------+---------------+---------------+
    |   Type (8)    |   Flags (8)   |
    +-+-------------+---------------+-------------------------------+
    |R|                 Stream Identifier (31)                      |
    +=+=============================================================+
    |                        Error Code (32)                        |
    +---------------------------------------------------------------+
*/

const PAYLOAD_LENGTH: usize = 4;



#[derive(Debug, Clone, Copy)]
pub struct RstStreamFrame<'a> {
    frame: RawFrame<'a>,
}

impl<'a> RstStreamFrame<'a> {
    header_accessors!('a);

    /// The error code, or `None` if the peer sent one this crate does not know.
    pub fn error_code(&self) -> Option<ErrorCode> {
        ErrorCode::from_code(self.raw_error_code())
    }

    pub fn raw_error_code(&self) -> u32 {
        get_u32(self.frame.buffer(), self.frame.payload_offset())
    }
}

impl<'a> Flyweight<'a> for RstStreamFrame<'a> {
    fn wrap(buffer: &'a [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let frame = RawFrame::peek_as(buffer, offset, max_limit, FrameType::RstStream)?;
        frame.expect_length(PAYLOAD_LENGTH as u32)?;
        frame.check_limit(max_limit)?;

        Ok(Self {
            frame,
        })
    }

    view_bounds!('a);
}



pub struct RstStreamFrameBuilder<'a> {
    region: FrameRegion<'a>,
}

impl<'a> RstStreamFrameBuilder<'a> {
    pub fn stream_id(mut self, stream_id: u32) -> H2Result<Self> {
        self.region.set_stream_id(stream_id)?;

        Ok(self)
    }

    pub fn error_code(mut self, error_code: ErrorCode) -> Self {
        let at = self.region.fields_offset();
        self.region.put_u32(at, error_code.code());

        self
    }
}

impl<'a> FlyweightBuilder<'a> for RstStreamFrameBuilder<'a> {
    type View = RstStreamFrame<'a>;

    fn wrap(buffer: &'a mut [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let region = FrameRegion::wrap(buffer, offset, max_limit, FrameType::RstStream, PAYLOAD_LENGTH)?;

        Ok(Self {
            region,
        })
    }

    builder_bounds!();

    fn build(self) -> H2Result<Self::View> {
        let (buffer, offset, limit) = self.region.into_parts();

        RstStreamFrame::wrap(buffer, offset, limit)
    }
}



#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rst_stream_decode() {
        let buf = [0x00, 0x00, 0x04, 0x03, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x08];

        let frame = RstStreamFrame::wrap(&buf, 0, buf.len()).unwrap();
        assert_eq!(frame.stream_id(), 1);
        assert_eq!(frame.error_code(), Some(ErrorCode::Cancel));
        assert_eq!(frame.raw_error_code(), 8);
    }

    #[test]
    fn rst_stream_decode_boundary() {
        let buf = [0x00, 0x00, 0x04, 0x03, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x08];

        assert!(RstStreamFrame::wrap(&buf, 0, 13).is_ok());
        assert_eq!(RstStreamFrame::wrap(&buf, 0, 12).unwrap_err(), H2Error::BufferOverrun {
            limit: 13,
            max_limit: 12,
        });
    }

    #[test]
    fn rst_stream_decode_keeps_unknown_codes() {
        let buf = [0x00, 0x00, 0x04, 0x03, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x01, 0x00];

        let frame = RstStreamFrame::wrap(&buf, 0, buf.len()).unwrap();
        assert_eq!(frame.error_code(), None);
        assert_eq!(frame.raw_error_code(), 0x100);
    }

    #[test]
    fn rst_stream_decode_rejects_wrong_length() {
        let buf = [0x00, 0x00, 0x05, 0x03, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x08, 0x00];

        assert_eq!(RstStreamFrame::wrap(&buf, 0, buf.len()).unwrap_err(), H2Error::MalformedFrame {
            frame_type: FrameType::RstStream,
            reason: Malformed::InvalidLength(5),
        });
    }

    #[test]
    fn rst_stream_encode() {
        let mut buf = [0u8; 32];

        let frame = RstStreamFrameBuilder::wrap(&mut buf, 4, 32).unwrap()
            .stream_id(13).unwrap()
            .error_code(ErrorCode::RefusedStream)
            .build().unwrap();
        assert_eq!(frame.offset(), 4);
        assert_eq!(frame.limit(), 4+13);
        assert_eq!(frame.stream_id(), 13);
        assert_eq!(frame.error_code(), Some(ErrorCode::RefusedStream));
    }

    #[test]
    fn rst_stream_encode_requires_stream_id() {
        let mut buf = [0u8; 13];

        let builder = RstStreamFrameBuilder::wrap(&mut buf, 0, 13).unwrap()
            .error_code(ErrorCode::Cancel);
        assert!(matches!(builder.build(), Err(H2Error::MalformedFrame { reason: Malformed::StreamIdMustBeNonZero, .. })));
    }
}
