//! View models for the four screens. Each is a pure projection of
//! controller state; drawing happens in `render`.

pub mod landing;
pub mod loading;
pub mod report;
pub mod upload;

/// Display color class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Red,
    Orange,
    Yellow,
    Green,
    Purple,
    Violet,
    Blue,
    Gray,
}

impl Tone {
    pub fn hex(&self) -> &'static str {
        match self {
            Tone::Red => "#dc2626",
            Tone::Orange => "#f59e0b",
            Tone::Yellow => "#ca8a04",
            Tone::Green => "#10b981",
            Tone::Purple => "#7c3aed",
            Tone::Violet => "#8b5cf6",
            Tone::Blue => "#3b82f6",
            Tone::Gray => "#6b7280",
        }
    }

    /// 256-color ANSI foreground index.
    pub fn ansi(&self) -> u8 {
        match self {
            Tone::Red => 160,
            Tone::Orange => 214,
            Tone::Yellow => 178,
            Tone::Green => 35,
            Tone::Purple => 93,
            Tone::Violet => 141,
            Tone::Blue => 33,
            Tone::Gray => 244,
        }
    }
}
