use super::*;

/*
    +-----------------------------------------------+
    |                 Length (24)                   |
    +---------------+---------------+---------------+
    |   Type (8)    |   Flags (8)   |
    +-+-------------+---------------+-------------------------------+
    |R|                 Stream Identifier (31)                      |
    +=+=============================================================+
    |E|                  Stream Dependency (31)                     |
    +-+-------------+-----------------------------------------------+
    |   Weight (8)  |
    +-+-------------+
*/



#[derive(Debug, Clone, Copy)]
pub struct PriorityFrame<'a> {
    frame: RawFrame<'a>,
    priority: Priority,
}

impl<'a> PriorityFrame<'a> {
    header_accessors!('a);

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn stream_dependency(&self) -> u32 {
        self.priority.stream_dependency
    }

    pub fn exclusive(&self) -> bool {
        self.priority.exclusive
    }

    pub fn weight(&self) -> u8 {
        self.priority.weight
    }
}

impl<'a> Flyweight<'a> for PriorityFrame<'a> {
    fn wrap(buffer: &'a [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let frame = RawFrame::peek_as(buffer, offset, max_limit, FrameType::Priority)?;
        frame.expect_length(Priority::LEN as u32)?;
        frame.check_limit(max_limit)?;

        let priority = Priority::from_slice(frame.payload());

        Ok(Self {
            frame,
            priority,
        })
    }

    view_bounds!('a);
}



pub struct PriorityFrameBuilder<'a> {
    region: FrameRegion<'a>,
}

impl<'a> PriorityFrameBuilder<'a> {
    pub fn stream_id(mut self, stream_id: u32) -> H2Result<Self> {
        self.region.set_stream_id(stream_id)?;

        Ok(self)
    }

    pub fn priority(mut self, priority: Priority) -> H2Result<Self> {
        let bytes = priority.to_bytes()?;
        let at = self.region.fields_offset();
        self.region.put_bytes(at, &bytes);

        Ok(self)
    }
}

impl<'a> FlyweightBuilder<'a> for PriorityFrameBuilder<'a> {
    type View = PriorityFrame<'a>;

    fn wrap(buffer: &'a mut [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let region = FrameRegion::wrap(buffer, offset, max_limit, FrameType::Priority, Priority::LEN)?;

        Ok(Self {
            region,
        })
    }

    builder_bounds!();

    fn build(self) -> H2Result<Self::View> {
        let (buffer, offset, limit) = self.region.into_parts();

        PriorityFrame::wrap(buffer, offset, limit)
    }
}



#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_decode() {
        let buf = [0x00, 0x00, 0x05, 0x02, 0x00, 0x00, 0x00, 0x00, 0x03, 0x80, 0x00, 0x00, 0x01, 0x0f];

        let frame = PriorityFrame::wrap(&buf, 0, buf.len()).unwrap();
        assert_eq!(frame.limit(), 14);
        assert_eq!(frame.stream_id(), 3);
        assert_eq!(frame.stream_dependency(), 1);
        assert!(frame.exclusive());
        assert_eq!(frame.weight(), 15);
    }

    #[test]
    fn priority_decode_rejects_wrong_length() {
        let buf = [0x00, 0x00, 0x04, 0x02, 0x00, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01];

        assert_eq!(PriorityFrame::wrap(&buf, 0, buf.len()).unwrap_err(), H2Error::MalformedFrame {
            frame_type: FrameType::Priority,
            reason: Malformed::InvalidLength(4),
        });
    }

    #[test]
    fn priority_decode_rejects_stream_zero() {
        let buf = [0x00, 0x00, 0x05, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x0f];

        assert!(matches!(PriorityFrame::wrap(&buf, 0, buf.len()), Err(H2Error::MalformedFrame {
            reason: Malformed::StreamIdMustBeNonZero,
            ..
        })));
    }

    #[test]
    fn priority_encode() {
        let mut buf = [0xffu8; 20];
        let priority = Priority {
            stream_dependency: 0x1234,
            exclusive: false,
            weight: 255,
        };

        let frame = PriorityFrameBuilder::wrap(&mut buf, 6, 20).unwrap()
            .stream_id(7).unwrap()
            .priority(priority).unwrap()
            .build().unwrap();
        assert_eq!(frame.offset(), 6);
        assert_eq!(frame.limit(), 20);
        assert_eq!(frame.payload_length(), 5);
        assert_eq!(frame.stream_id(), 7);
        assert_eq!(frame.priority(), priority);
        assert_eq!(&frame.as_bytes()[9..], &[0x00, 0x00, 0x12, 0x34, 0xff]);
    }

    #[test]
    fn priority_encode_needs_room_for_fields() {
        let mut buf = [0u8; 14];

        assert!(PriorityFrameBuilder::wrap(&mut buf, 0, 14).is_ok());
        assert!(matches!(PriorityFrameBuilder::wrap(&mut buf, 0, 13), Err(H2Error::BufferOverrun { limit: 14, max_limit: 13 })));
    }
}
