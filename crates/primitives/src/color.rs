use std::fmt;

/// A color packed as `0xAABBGGRR`, the layout hex-editor highlight colors use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct Color(pub u32);

impl Color {
	pub const TRANSPARENT: Color = Color(0);

	/// Builds a color from individual channels.
	pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
		Self((a as u32) << 24 | (b as u32) << 16 | (g as u32) << 8 | r as u32)
	}

	pub const fn red(self) -> u8 {
		self.0 as u8
	}

	pub const fn green(self) -> u8 {
		(self.0 >> 8) as u8
	}

	pub const fn blue(self) -> u8 {
		(self.0 >> 16) as u8
	}

	pub const fn alpha(self) -> u8 {
		(self.0 >> 24) as u8
	}

	/// Returns the same color with its alpha channel replaced.
	pub const fn with_alpha(self, alpha: u8) -> Self {
		Self(self.0 & 0x00FF_FFFF | (alpha as u32) << 24)
	}
}

impl fmt::Display for Color {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.red(), self.green(), self.blue(), self.alpha())
	}
}
