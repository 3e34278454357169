use super::*;

/*
    +-----------------------------------------------+
    |                 Length (24)                   |
    +---------------+---------------+---------------+
    |   Type (8)    |   Flags (8)   |
    +-+-------------+---------------+-------------------------------+
    |R|                 Stream Identifier (31)                      |
    +=+=============================================================+
    |R|                  Last-Stream-ID (31)                        |
    +-+-------------------------------------------------------------+
    |                      Error Code (32)                          |
    +---------------------------------------------------------------+
    |                  Additional Debug Data (*)                    |
    +---------------------------------------------------------------+
*/

const FIXED_LENGTH: usize = 8;

const LAST_STREAM_ID_OFFSET: usize = 0;
const ERROR_CODE_OFFSET: usize = 4;



/// A GOAWAY frame, announcing the shutdown of the connection.
#[derive(Debug, Clone, Copy)]
pub struct GoAwayFrame<'a> {
    frame: RawFrame<'a>,
}

impl<'a> GoAwayFrame<'a> {
    header_accessors!('a);

    /// The highest stream the sender might have processed, with the reserved bit masked off.
    pub fn last_stream_id(&self) -> u32 {
        get_u32(self.frame.buffer(), self.frame.payload_offset()+LAST_STREAM_ID_OFFSET) & STREAM_ID_MASK
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        ErrorCode::from_code(self.raw_error_code())
    }

    pub fn raw_error_code(&self) -> u32 {
        get_u32(self.frame.buffer(), self.frame.payload_offset()+ERROR_CODE_OFFSET)
    }

    /// Opaque diagnostic data, possibly empty.
    pub fn debug_data(&self) -> &'a [u8] {
        &self.frame.payload()[FIXED_LENGTH..]
    }
}

impl<'a> Flyweight<'a> for GoAwayFrame<'a> {
    fn wrap(buffer: &'a [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let frame = RawFrame::peek_as(buffer, offset, max_limit, FrameType::GoAway)?;

        if (frame.payload_length() as usize)<FIXED_LENGTH {
            return Err(frame.malformed(Malformed::InvalidLength(frame.payload_length())));
        }

        frame.check_limit(max_limit)?;

        Ok(Self {
            frame,
        })
    }

    view_bounds!('a);
}



pub struct GoAwayFrameBuilder<'a> {
    region: FrameRegion<'a>,
}

impl<'a> GoAwayFrameBuilder<'a> {
    pub fn last_stream_id(mut self, last_stream_id: u32) -> H2Result<Self> {
        let last_stream_id = check_stream_id(last_stream_id)?;
        let at = self.region.fields_offset()+LAST_STREAM_ID_OFFSET;
        self.region.put_u32(at, last_stream_id);

        Ok(self)
    }

    pub fn error_code(mut self, error_code: ErrorCode) -> Self {
        let at = self.region.fields_offset()+ERROR_CODE_OFFSET;
        self.region.put_u32(at, error_code.code());

        self
    }

    /// Appends `data` to the debug data written so far.
    pub fn debug_data(mut self, data: &[u8]) -> H2Result<Self> {
        self.region.append(data)?;

        Ok(self)
    }
}

impl<'a> FlyweightBuilder<'a> for GoAwayFrameBuilder<'a> {
    type View = GoAwayFrame<'a>;

    fn wrap(buffer: &'a mut [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let region = FrameRegion::wrap(buffer, offset, max_limit, FrameType::GoAway, FIXED_LENGTH)?;

        Ok(Self {
            region,
        })
    }

    builder_bounds!();

    fn build(self) -> H2Result<Self::View> {
        let (buffer, offset, limit) = self.region.into_parts();

        GoAwayFrame::wrap(buffer, offset, limit)
    }
}



#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goaway_decode() {
        let buf = [
            0x00, 0x00, 0x0b, 0x07, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x80, 0x00, 0x00, 0x05,
            0x00, 0x00, 0x00, 0x0b,
            b'b', b'y', b'e',
        ];

        let frame = GoAwayFrame::wrap(&buf, 0, buf.len()).unwrap();
        assert_eq!(frame.limit(), 20);
        assert_eq!(frame.last_stream_id(), 5);
        assert_eq!(frame.error_code(), Some(ErrorCode::EnhanceYourCalm));
        assert_eq!(frame.raw_error_code(), 11);
        assert_eq!(frame.debug_data(), b"bye");
    }

    #[test]
    fn goaway_decode_boundary() {
        let buf = [
            0x00, 0x00, 0x0a, 0x07, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x05,
            0x00, 0x00, 0x00, 0x00,
            b'o', b'k',
        ];

        assert!(GoAwayFrame::wrap(&buf, 0, 19).is_ok());
        assert_eq!(GoAwayFrame::wrap(&buf, 0, 18).unwrap_err(), H2Error::BufferOverrun {
            limit: 19,
            max_limit: 18,
        });
    }

    #[test]
    fn goaway_decode_rejects_short_payload() {
        let buf = [0x00, 0x00, 0x07, 0x07, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00];

        assert_eq!(GoAwayFrame::wrap(&buf, 0, buf.len()).unwrap_err(), H2Error::MalformedFrame {
            frame_type: FrameType::GoAway,
            reason: Malformed::InvalidLength(7),
        });
    }

    #[test]
    fn goaway_decode_rejects_non_zero_stream_id() {
        let buf = [0x00, 0x00, 0x08, 0x07, 0x00, 0x00, 0x00, 0x00, 0x03, 0, 0, 0, 0, 0, 0, 0, 0];

        assert_eq!(GoAwayFrame::wrap(&buf, 0, buf.len()).unwrap_err(), H2Error::MalformedFrame {
            frame_type: FrameType::GoAway,
            reason: Malformed::StreamIdMustBeZero(3),
        });
    }

    #[test]
    fn goaway_encode() {
        let mut buf = vec![0xffu8; 64];

        let builder = GoAwayFrameBuilder::wrap(&mut buf, 3, 64).unwrap();
        assert_eq!(builder.limit(), 3+9+8);
        assert_eq!(get_u24(builder.as_bytes(), 0), 8);

        let builder = builder
            .last_stream_id(41).unwrap()
            .error_code(ErrorCode::ProtocolError)
            .debug_data(b"too many ").unwrap()
            .debug_data(b"resets").unwrap();
        assert_eq!(get_u24(builder.as_bytes(), 0), 8+15);

        let frame = builder.build().unwrap();
        assert_eq!(frame.offset(), 3);
        assert_eq!(frame.stream_id(), 0);
        assert_eq!(frame.last_stream_id(), 41);
        assert_eq!(frame.error_code(), Some(ErrorCode::ProtocolError));
        assert_eq!(frame.debug_data(), b"too many resets");
    }

    #[test]
    fn goaway_encode_debug_data_respects_max_limit() {
        let mut buf = vec![0u8; 20];

        let builder = GoAwayFrameBuilder::wrap(&mut buf, 0, 20).unwrap()
            .debug_data(b"!").unwrap();
        assert_eq!(builder.limit(), 18);
        assert!(matches!(builder.debug_data(b"???"), Err(H2Error::BufferOverrun { limit: 21, max_limit: 20 })));
    }
}
