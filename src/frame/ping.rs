use super::*;

/*
    +-----------------------------------------------+
    |                 Length (24)                   |
    +---------------+---------------+---------------+
    |   Type (8)    |   Flags (8)   |
    +-+-------------+---------------+-------------------------------+
    |R|                 Stream Identifier (31)                      |
    +=+=============+===============================================+
    |                                                               |
    |                      Opaque Data (64)                         |
    |                                                               |
    +---------------------------------------------------------------+
*/

const PAYLOAD_LENGTH: usize = 8;



/// A PING frame, which always carries 8 bytes of opaque data on stream 0.
#[derive(Debug, Clone, Copy)]
pub struct PingFrame<'a> {
    frame: RawFrame<'a>,
}

impl<'a> PingFrame<'a> {
    header_accessors!('a);

    pub fn ack(&self) -> bool {
        self.frame.has(Flags::ACK)
    }

    pub fn payload(&self) -> &'a [u8] {
        self.frame.payload()
    }

    /// The payload read as a big endian integer.
    pub fn opaque_data(&self) -> u64 {
        let mut data = [0u8; PAYLOAD_LENGTH];
        data.copy_from_slice(self.payload());

        u64::from_be_bytes(data)
    }
}

impl<'a> Flyweight<'a> for PingFrame<'a> {
    fn wrap(buffer: &'a [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let frame = RawFrame::peek_as(buffer, offset, max_limit, FrameType::Ping)?;
        frame.expect_length(PAYLOAD_LENGTH as u32)?;
        frame.check_limit(max_limit)?;

        Ok(Self {
            frame,
        })
    }

    view_bounds!('a);
}



pub struct PingFrameBuilder<'a> {
    region: FrameRegion<'a>,
}

impl<'a> PingFrameBuilder<'a> {
    pub fn ack(mut self) -> Self {
        self.region.set_flags(Flags::ACK);

        self
    }

    /// Sets the opaque data, which must be exactly 8 bytes long.
    pub fn payload(mut self, payload: &[u8]) -> H2Result<Self> {
        if payload.len()!=PAYLOAD_LENGTH {
            log::debug!("Invalid PING payload length {} (must be 8)", payload.len());
            return Err(H2Error::InvalidArgument("a PING payload must be 8 bytes long"));
        }

        let at = self.region.fields_offset();
        self.region.put_bytes(at, payload);

        Ok(self)
    }

    pub fn opaque_data(mut self, data: u64) -> Self {
        let at = self.region.fields_offset();
        self.region.put_bytes(at, &data.to_be_bytes());

        self
    }
}

impl<'a> FlyweightBuilder<'a> for PingFrameBuilder<'a> {
    type View = PingFrame<'a>;

    fn wrap(buffer: &'a mut [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let region = FrameRegion::wrap(buffer, offset, max_limit, FrameType::Ping, PAYLOAD_LENGTH)?;

        Ok(Self {
            region,
        })
    }

    builder_bounds!();

    fn build(self) -> H2Result<Self::View> {
        let (buffer, offset, limit) = self.region.into_parts();

        PingFrame::wrap(buffer, offset, limit)
    }
}



#[cfg(test)]
mod tests {
    use super::*;

    fn ping_bytes(stream_id: u8, length: u8) -> Vec<u8> {
        let mut buf = vec![0x00, 0x00, length, 0x06, 0x01, 0x00, 0x00, 0x00, stream_id];
        buf.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]);

        buf
    }

    #[test]
    fn ping_decode() {
        let buf = ping_bytes(0, 8);

        let ping = PingFrame::wrap(&buf, 0, buf.len()).unwrap();
        assert_eq!(ping.limit(), 17);
        assert_eq!(ping.payload_length(), 8);
        assert_eq!(ping.r#type(), FrameType::Ping);
        assert_eq!(ping.stream_id(), 0);
        assert!(ping.ack());
        assert_eq!(ping.payload(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(ping.opaque_data(), 0x0102030405060708);
    }

    #[test]
    fn ping_decode_fails_on_wrong_length() {
        let buf = ping_bytes(0, 7);

        assert_eq!(PingFrame::wrap(&buf, 0, buf.len()).unwrap_err(), H2Error::MalformedFrame {
            frame_type: FrameType::Ping,
            reason: Malformed::InvalidLength(7),
        });
    }

    #[test]
    fn ping_decode_fails_on_non_zero_stream_id() {
        let buf = ping_bytes(1, 8);

        assert_eq!(PingFrame::wrap(&buf, 0, buf.len()).unwrap_err(), H2Error::MalformedFrame {
            frame_type: FrameType::Ping,
            reason: Malformed::StreamIdMustBeZero(1),
        });
    }

    #[test]
    fn ping_decode_fails_on_other_type() {
        let mut buf = ping_bytes(0, 8);
        buf[3] = FrameType::Settings.code();

        assert_eq!(PingFrame::wrap(&buf, 0, buf.len()).unwrap_err(), H2Error::MalformedFrame {
            frame_type: FrameType::Ping,
            reason: Malformed::UnexpectedType(0x04),
        });
    }

    #[test]
    fn ping_decode_boundary() {
        let buf = ping_bytes(0, 8);

        assert!(PingFrame::wrap(&buf, 0, 17).is_ok());
        assert_eq!(PingFrame::wrap(&buf, 0, 16).unwrap_err(), H2Error::BufferOverrun {
            limit: 17,
            max_limit: 16,
        });
    }

    #[test]
    fn ping_encode() {
        let mut buf = [0xffu8; 32];

        let ping = PingFrameBuilder::wrap(&mut buf, 3, 20).unwrap()
            .ack()
            .payload(b"abcdefgh").unwrap()
            .build().unwrap();

        assert_eq!(ping.offset(), 3);
        assert_eq!(ping.limit(), 20);
        assert_eq!(ping.payload_length(), 8);
        assert_eq!(ping.flags(), 0x01);
        assert_eq!(ping.stream_id(), 0);
        assert!(ping.ack());
        assert_eq!(ping.payload(), b"abcdefgh");
    }

    #[test]
    fn ping_encode_without_payload_is_zeroed() {
        let mut buf = [0xffu8; 17];

        let builder = PingFrameBuilder::wrap(&mut buf, 0, 17).unwrap();
        assert_eq!(builder.limit(), 17);
        assert_eq!(builder.as_bytes(), &[0, 0, 8, 6, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

        let ping = builder.build().unwrap();
        assert!(!ping.ack());
        assert_eq!(ping.opaque_data(), 0);
    }

    #[test]
    fn ping_encode_rejects_wrong_payload_length() {
        let mut buf = [0u8; 17];

        let builder = PingFrameBuilder::wrap(&mut buf, 0, 17).unwrap();
        assert!(matches!(builder.payload(b"1234567"), Err(H2Error::InvalidArgument(_))));

        let builder = PingFrameBuilder::wrap(&mut buf, 0, 17).unwrap();
        assert!(matches!(builder.payload(b"123456789"), Err(H2Error::InvalidArgument(_))));
    }

    #[test]
    fn ping_encode_needs_room_for_payload() {
        let mut buf = [0u8; 17];

        assert!(matches!(PingFrameBuilder::wrap(&mut buf, 1, 17), Err(H2Error::BufferOverrun { limit: 18, max_limit: 17 })));
    }

    #[test]
    fn ping_opaque_data_round_trip() {
        let mut buf = [0u8; 17];

        let ping = PingFrameBuilder::wrap(&mut buf, 0, 17).unwrap()
            .opaque_data(0xdead_beef_cafe_f00d)
            .build().unwrap();
        assert_eq!(ping.opaque_data(), 0xdead_beef_cafe_f00d);
    }
}
