use super::*;

use crate::settings::{Settings, SettingsIdent};

/*
    +-----------------------------------------------+
    |                 Length (24)                   |
    +---------------+---------------+---------------+
    |   Type (8)    |   Flags (8)   |
    +-+-------------+---------------+-------------------------------+
    |R|                 Stream Identifier (31)                      |
    +=+=============================+===============================+
    |       Identifier (16)         |
    +-------------------------------+-------------------------------+
    |                        Value (32)                             |
    +---------------------------------------------------------------+
    |                              ...                              |
*/

const SETTING_LEN: usize = 6;



/// A SETTINGS frame, carrying a sequence of parameters or an acknowledgement.
///
/// Known parameters have been checked for legal values when the frame got wrapped, unknown
/// ones are passed through so that the receiver can ignore them.
#[derive(Debug, Clone, Copy)]
pub struct SettingsFrame<'a> {
    frame: RawFrame<'a>,
}

impl<'a> SettingsFrame<'a> {
    header_accessors!('a);

    pub fn ack(&self) -> bool {
        self.frame.has(Flags::ACK)
    }

    /// The raw `(identifier, value)` pairs in wire order.
    pub fn settings(&self) -> SettingsIter<'a> {
        SettingsIter {
            payload: self.frame.payload(),
        }
    }

    /// The value of a parameter. If it occurs multiple times, the last occurrence wins.
    pub fn get(&self, ident: SettingsIdent) -> Option<u32> {
        self.settings()
            .filter(|(code, _)| *code==ident.code())
            .last()
            .map(|(_, value)| value)
    }

    pub fn header_table_size(&self) -> Option<u32> {
        self.get(SettingsIdent::HeaderTableSize)
    }

    pub fn enable_push(&self) -> Option<u32> {
        self.get(SettingsIdent::EnablePush)
    }

    pub fn max_concurrent_streams(&self) -> Option<u32> {
        self.get(SettingsIdent::MaxConcurrentStreams)
    }

    pub fn initial_window_size(&self) -> Option<u32> {
        self.get(SettingsIdent::InitialWindowSize)
    }

    pub fn max_frame_size(&self) -> Option<u32> {
        self.get(SettingsIdent::MaxFrameSize)
    }

    pub fn max_header_list_size(&self) -> Option<u32> {
        self.get(SettingsIdent::MaxHeaderListSize)
    }
}

impl<'a> Flyweight<'a> for SettingsFrame<'a> {
    fn wrap(buffer: &'a [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let frame = RawFrame::peek_as(buffer, offset, max_limit, FrameType::Settings)?;
        let length = frame.payload_length();

        if frame.has(Flags::ACK) && length!=0 {
            return Err(frame.malformed(Malformed::AckWithPayload));
        }

        if length as usize%SETTING_LEN!=0 {
            return Err(frame.malformed(Malformed::InvalidLength(length)));
        }

        frame.check_limit(max_limit)?;

        let frame = Self {
            frame,
        };

        for (ident, value) in frame.settings() {
            let legal = SettingsIdent::from_code(ident)
                .map(|ident| ident.accepts(value))
                .unwrap_or(true);

            if !legal {
                return Err(frame.frame.malformed(Malformed::InvalidSetting {
                    ident,
                    value,
                }));
            }
        }

        Ok(frame)
    }

    view_bounds!('a);
}



/// Iterates over the parameters of a SETTINGS frame.
#[derive(Debug, Clone)]
pub struct SettingsIter<'a> {
    payload: &'a [u8],
}

impl<'a> Iterator for SettingsIter<'a> {
    type Item = (u16, u32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.payload.len()<SETTING_LEN {
            return None;
        }

        let ident = get_u16(self.payload, 0);
        let value = get_u32(self.payload, 2);
        self.payload = &self.payload[SETTING_LEN..];

        Some((ident, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.payload.len()/SETTING_LEN;

        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SettingsIter<'_> {}



pub struct SettingsFrameBuilder<'a> {
    region: FrameRegion<'a>,
}

impl<'a> SettingsFrameBuilder<'a> {
    /// Marks the frame as an acknowledgement, which must not carry any parameter.
    pub fn ack(mut self) -> H2Result<Self> {
        if self.region.payload_length()!=0 {
            return Err(H2Error::InvalidArgument("a SETTINGS acknowledgement must be empty"));
        }

        self.region.set_flags(Flags::ACK);

        Ok(self)
    }

    /// Appends one parameter, which must carry a legal value.
    pub fn setting(mut self, ident: SettingsIdent, value: u32) -> H2Result<Self> {
        if self.region.flags().contains(Flags::ACK) {
            return Err(H2Error::InvalidArgument("a SETTINGS acknowledgement must be empty"));
        }

        if !ident.accepts(value) {
            log::debug!("Invalid value {} for setting {:?}", value, ident);
            return Err(H2Error::InvalidArgument("the value is out of range for the setting"));
        }

        let mut bytes = [0u8; SETTING_LEN];
        put_u16(&mut bytes, 0, ident.code());
        put_u32(&mut bytes, 2, value);
        self.region.append(&bytes)?;

        Ok(self)
    }

    pub fn header_table_size(self, value: u32) -> H2Result<Self> {
        self.setting(SettingsIdent::HeaderTableSize, value)
    }

    pub fn enable_push(self, enable: bool) -> H2Result<Self> {
        self.setting(SettingsIdent::EnablePush, enable as u32)
    }

    pub fn max_concurrent_streams(self, value: u32) -> H2Result<Self> {
        self.setting(SettingsIdent::MaxConcurrentStreams, value)
    }

    pub fn initial_window_size(self, value: u32) -> H2Result<Self> {
        self.setting(SettingsIdent::InitialWindowSize, value)
    }

    pub fn max_frame_size(self, value: u32) -> H2Result<Self> {
        self.setting(SettingsIdent::MaxFrameSize, value)
    }

    pub fn max_header_list_size(self, value: u32) -> H2Result<Self> {
        self.setting(SettingsIdent::MaxHeaderListSize, value)
    }

    /// Advertises every parameter of `settings`. Unlimited values are left out.
    pub fn settings(self, settings: &Settings) -> H2Result<Self> {
        let mut builder = self
            .header_table_size(settings.get_header_table_size())?
            .enable_push(settings.get_enable_push())?;

        if let Some(value) = settings.get_max_concurrent_streams() {
            builder = builder.max_concurrent_streams(value)?;
        }

        builder = builder
            .initial_window_size(settings.get_initial_window_size())?
            .max_frame_size(settings.get_max_frame_size())?;

        if let Some(value) = settings.get_max_header_list_size() {
            builder = builder.max_header_list_size(value)?;
        }

        Ok(builder)
    }
}

impl<'a> FlyweightBuilder<'a> for SettingsFrameBuilder<'a> {
    type View = SettingsFrame<'a>;

    fn wrap(buffer: &'a mut [u8], offset: usize, max_limit: usize) -> H2Result<Self> {
        let region = FrameRegion::wrap(buffer, offset, max_limit, FrameType::Settings, 0)?;

        Ok(Self {
            region,
        })
    }

    builder_bounds!();

    fn build(self) -> H2Result<Self::View> {
        let (buffer, offset, limit) = self.region.into_parts();

        SettingsFrame::wrap(buffer, offset, limit)
    }
}



#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_decode() {
        let buf = [
            0x7f, 0x7f,
            0x00, 0x00, 0x06, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0xff, 0xff,
            0x7f, 0x7f,
        ];

        let frame = SettingsFrame::wrap(&buf, 2, buf.len()).unwrap();
        assert_eq!(frame.offset(), 2);
        assert_eq!(frame.limit(), 17);
        assert_eq!(frame.payload_length(), 6);
        assert_eq!(frame.stream_id(), 0);
        assert!(!frame.ack());
        assert_eq!(frame.initial_window_size(), Some(65_535));
        assert_eq!(frame.max_frame_size(), None);
        assert_eq!(frame.settings().collect::<Vec<_>>(), vec![(4, 65_535)]);
    }

    #[test]
    fn settings_decode_boundary() {
        let buf = [
            0x7f, 0x7f,
            0x00, 0x00, 0x06, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0xff, 0xff,
            0x7f, 0x7f,
        ];

        assert!(SettingsFrame::wrap(&buf, 2, 17).is_ok());
        assert_eq!(SettingsFrame::wrap(&buf, 2, 16).unwrap_err(), H2Error::BufferOverrun {
            limit: 17,
            max_limit: 16,
        });
    }

    #[test]
    fn settings_decode_last_occurrence_wins() {
        let buf = [
            0x00, 0x00, 0x12, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x01, 0x00, 0x00, 0x10, 0x00,
            0x00, 0x03, 0x00, 0x00, 0x00, 0x64,
            0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
        ];

        let frame = SettingsFrame::wrap(&buf, 0, buf.len()).unwrap();
        assert_eq!(frame.settings().len(), 3);
        assert_eq!(frame.header_table_size(), Some(0));
        assert_eq!(frame.max_concurrent_streams(), Some(100));
    }

    #[test]
    fn settings_decode_ack() {
        let buf = [0x00, 0x00, 0x00, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00];

        let frame = SettingsFrame::wrap(&buf, 0, buf.len()).unwrap();
        assert!(frame.ack());
        assert_eq!(frame.settings().count(), 0);
    }

    #[test]
    fn settings_decode_rejects_ack_with_payload() {
        let buf = [0x00, 0x00, 0x06, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00];

        let err = SettingsFrame::wrap(&buf, 0, buf.len()).unwrap_err();
        assert_eq!(err, H2Error::MalformedFrame {
            frame_type: FrameType::Settings,
            reason: Malformed::AckWithPayload,
        });
        assert_eq!(err.error_code(), ErrorCode::FrameSizeError);
    }

    #[test]
    fn settings_decode_rejects_partial_setting() {
        let buf = [0x00, 0x00, 0x05, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00];

        assert_eq!(SettingsFrame::wrap(&buf, 0, buf.len()).unwrap_err(), H2Error::MalformedFrame {
            frame_type: FrameType::Settings,
            reason: Malformed::InvalidLength(5),
        });
    }

    #[test]
    fn settings_decode_rejects_illegal_values() {
        let push = [0x00, 0x00, 0x06, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x02];
        assert_eq!(SettingsFrame::wrap(&push, 0, push.len()).unwrap_err(), H2Error::MalformedFrame {
            frame_type: FrameType::Settings,
            reason: Malformed::InvalidSetting { ident: 2, value: 2 },
        });

        let window = [0x00, 0x00, 0x06, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04, 0x80, 0x00, 0x00, 0x00];
        let err = SettingsFrame::wrap(&window, 0, window.len()).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::FlowControlError);

        let frame_size = [0x00, 0x00, 0x06, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x3f, 0xff];
        assert_eq!(SettingsFrame::wrap(&frame_size, 0, frame_size.len()).unwrap_err(), H2Error::MalformedFrame {
            frame_type: FrameType::Settings,
            reason: Malformed::InvalidSetting { ident: 5, value: 0x3fff },
        });
    }

    #[test]
    fn settings_decode_rejects_non_zero_stream_id() {
        let buf = [0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x01];

        assert_eq!(SettingsFrame::wrap(&buf, 0, buf.len()).unwrap_err(), H2Error::MalformedFrame {
            frame_type: FrameType::Settings,
            reason: Malformed::StreamIdMustBeZero(1),
        });
    }

    #[test]
    fn settings_encode() {
        let mut buf = [0u8; 64];

        let builder = SettingsFrameBuilder::wrap(&mut buf, 1, 64).unwrap()
            .initial_window_size(65_535).unwrap();
        assert_eq!(get_u24(builder.as_bytes(), 0), 6);

        let frame = builder
            .max_header_list_size(4096).unwrap()
            .build().unwrap();
        assert_eq!(frame.offset(), 1);
        assert_eq!(frame.limit(), 22);
        assert_eq!(frame.payload_length(), 12);
        assert_eq!(frame.flags(), 0);
        assert_eq!(frame.stream_id(), 0);
        assert_eq!(frame.initial_window_size(), Some(65_535));
        assert_eq!(frame.max_header_list_size(), Some(4096));
        assert_eq!(&buf[10..22], &[0x00, 0x04, 0x00, 0x00, 0xff, 0xff, 0x00, 0x06, 0x00, 0x00, 0x10, 0x00]);
    }

    #[test]
    fn settings_encode_ack() {
        let mut buf = [0u8; 9];

        let frame = SettingsFrameBuilder::wrap(&mut buf, 0, 9).unwrap()
            .ack().unwrap()
            .build().unwrap();
        assert!(frame.ack());
        assert_eq!(frame.limit(), 9);

        let builder = SettingsFrameBuilder::wrap(&mut buf, 0, 9).unwrap()
            .ack().unwrap();
        assert!(matches!(builder.enable_push(true), Err(H2Error::InvalidArgument(_))));
    }

    #[test]
    fn settings_encode_rejects_ack_after_parameters() {
        let mut buf = [0u8; 15];

        let builder = SettingsFrameBuilder::wrap(&mut buf, 0, 15).unwrap()
            .max_concurrent_streams(1).unwrap();
        assert!(matches!(builder.ack(), Err(H2Error::InvalidArgument(_))));
    }

    #[test]
    fn settings_encode_rejects_illegal_values() {
        let mut buf = [0u8; 32];

        let builder = SettingsFrameBuilder::wrap(&mut buf, 0, 32).unwrap();
        assert!(matches!(builder.max_frame_size(1024), Err(H2Error::InvalidArgument(_))));

        let builder = SettingsFrameBuilder::wrap(&mut buf, 0, 32).unwrap();
        assert!(matches!(builder.setting(SettingsIdent::EnablePush, 7), Err(H2Error::InvalidArgument(_))));
    }

    #[test]
    fn settings_encode_advertises_settings() {
        let mut buf = [0u8; 64];
        let mut settings = Settings::default();
        settings.set_max_concurrent_streams(250).unwrap();
        settings.set_enable_push(false).unwrap();

        let frame = SettingsFrameBuilder::wrap(&mut buf, 0, 64).unwrap()
            .settings(&settings).unwrap()
            .build().unwrap();
        assert_eq!(frame.settings().len(), 5);
        assert_eq!(frame.header_table_size(), Some(4096));
        assert_eq!(frame.enable_push(), Some(0));
        assert_eq!(frame.max_concurrent_streams(), Some(250));
        assert_eq!(frame.initial_window_size(), Some(65_535));
        assert_eq!(frame.max_frame_size(), Some(16_384));
        assert_eq!(frame.max_header_list_size(), None);

        let mut peer = Settings::default();
        assert_eq!(peer.apply(&frame).unwrap(), 0);
        assert_eq!(peer, settings);
    }
}
