use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::error::*;
use crate::frame::SettingsFrame;



pub const MAX_FRAME_SIZE_MIN: u32 = 16_384;
pub const MAX_FRAME_SIZE_MAX: u32 = 16_777_215;

pub const WINDOW_SIZE_MAX: u32 = (1<<31)-1;



#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(FromPrimitive)]
pub enum SettingsIdent {
    HeaderTableSize = 1,
    EnablePush = 2,
    MaxConcurrentStreams = 3,
    InitialWindowSize = 4,
    MaxFrameSize = 5,
    MaxHeaderListSize = 6,
}

impl SettingsIdent {
    /// Unknown identifiers must be ignored by the receiver, so they yield `None`.
    pub fn from_code(code: u16) -> Option<Self> {
        Self::from_u16(code)
    }

    pub fn code(self) -> u16 {
        self as u16
    }

    /// Checks whether `value` lies within the legal range of the parameter.
    pub fn accepts(self, value: u32) -> bool {
        match self {
            Self::EnablePush => value<=1,
            Self::InitialWindowSize => value<=WINDOW_SIZE_MAX,
            Self::MaxFrameSize => (MAX_FRAME_SIZE_MIN..=MAX_FRAME_SIZE_MAX).contains(&value),
            _ => true,
        }
    }
}

/// The parameters one side of a connection operates with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// The maximum size of the HPACK dynamic table.
    ///
    /// __Default__: 4096
    pub header_table_size: u32,
    /// Whether server push is allowed.
    ///
    /// __Default__: true
    pub enable_push: bool,
    /// The maximum number of concurrent streams the sender will allow.
    ///
    /// __Default__: unlimited
    pub max_concurrent_streams: Option<u32>,
    /// The initial flow control window of every stream.
    ///
    /// __Default__: 65535
    pub initial_window_size: u32,
    /// The biggest frame payload the sender is willing to receive.
    ///
    /// __Default__: 16384
    pub max_frame_size: u32,
    /// The maximum size of the uncompressed header list the sender is prepared to accept.
    ///
    /// __Default__: unlimited
    pub max_header_list_size: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            header_table_size: 4096,
            enable_push: true,
            max_concurrent_streams: None,
            initial_window_size: 65_535,
            max_frame_size: 16_384,
            max_header_list_size: None,
        }
    }
}

impl Settings {
    /// Applies a settings frame and returns the difference in the initial window size.
    ///
    /// The frame has been validated when it got wrapped, so every parameter it carries is
    /// within its legal range.
    pub fn apply(&mut self, frame: &SettingsFrame<'_>) -> H2Result<i32> {
        let old = self.initial_window_size as i32;

        for (ident, value) in frame.settings() {
            match SettingsIdent::from_code(ident) {
                Some(SettingsIdent::HeaderTableSize) => self.set_header_table_size(value)?,
                Some(SettingsIdent::EnablePush) => self.set_enable_push(value==1)?,
                Some(SettingsIdent::MaxConcurrentStreams) => self.set_max_concurrent_streams(value)?,
                Some(SettingsIdent::InitialWindowSize) => self.set_initial_window_size(value)?,
                Some(SettingsIdent::MaxFrameSize) => self.set_max_frame_size(value)?,
                Some(SettingsIdent::MaxHeaderListSize) => self.set_max_header_list_size(value)?,
                None => log::debug!("Ignoring unknown setting {:#06x}", ident),
            }
        }

        let new = self.initial_window_size as i32;

        Ok(new-old)
    }

    pub fn get_header_table_size(&self) -> u32 {
        self.header_table_size
    }

    pub fn set_header_table_size(&mut self, value: u32) -> H2Result<()> {
        self.header_table_size = value;

        Ok(())
    }

    pub fn get_enable_push(&self) -> bool {
        self.enable_push
    }

    pub fn set_enable_push(&mut self, value: bool) -> H2Result<()> {
        self.enable_push = value;

        Ok(())
    }

    pub fn get_max_concurrent_streams(&self) -> Option<u32> {
        self.max_concurrent_streams
    }

    pub fn set_max_concurrent_streams(&mut self, value: u32) -> H2Result<()> {
        self.max_concurrent_streams = Some(value);

        Ok(())
    }

    pub fn get_initial_window_size(&self) -> u32 {
        self.initial_window_size
    }

    pub fn set_initial_window_size(&mut self, value: u32) -> H2Result<()> {
        if !SettingsIdent::InitialWindowSize.accepts(value) {
            return Err(H2Error::InvalidArgument("the initial window size exceeds 2^31-1"));
        }

        self.initial_window_size = value;

        Ok(())
    }

    pub fn get_max_frame_size(&self) -> u32 {
        self.max_frame_size
    }

    pub fn set_max_frame_size(&mut self, value: u32) -> H2Result<()> {
        if !SettingsIdent::MaxFrameSize.accepts(value) {
            return Err(H2Error::InvalidArgument("the max frame size must be within 2^14 and 2^24-1"));
        }

        self.max_frame_size = value;

        Ok(())
    }

    pub fn get_max_header_list_size(&self) -> Option<u32> {
        self.max_header_list_size
    }

    pub fn set_max_header_list_size(&mut self, value: u32) -> H2Result<()> {
        self.max_header_list_size = Some(value);

        Ok(())
    }
}
