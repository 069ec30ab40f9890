#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub match_media: bool,
    pub history_replace_state: bool,
    pub touch: bool,
    // Number inputs drop trailing zeros from typed values on this engine.
    pub strips_trailing_zeros: bool,
}

impl Capabilities {
    pub fn modern_desktop() -> Self {
        Self {
            match_media: true,
            history_replace_state: true,
            touch: false,
            strips_trailing_zeros: false,
        }
    }

    pub fn touch_device() -> Self {
        Self {
            touch: true,
            ..Self::modern_desktop()
        }
    }

    pub fn legacy() -> Self {
        Self {
            match_media: false,
            history_replace_state: false,
            touch: false,
            strips_trailing_zeros: false,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::modern_desktop()
    }
}
