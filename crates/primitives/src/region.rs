use std::fmt;

use crate::ProviderId;

/// A half-open byte range `[address, address + size)` inside a provider.
///
/// An empty region (`size == 0`) contains no addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct Region {
	/// First address covered by the region.
	pub address: u64,
	/// Number of bytes covered.
	pub size: u64,
}

impl Region {
	pub const fn new(address: u64, size: u64) -> Self {
		Self { address, size }
	}

	/// Returns the last address covered, or `None` for an empty region.
	///
	/// Saturates at `u64::MAX` for regions that would run past the address space.
	pub fn end_address(&self) -> Option<u64> {
		if self.size == 0 {
			return None;
		}
		Some(self.address.saturating_add(self.size - 1))
	}

	pub const fn is_empty(&self) -> bool {
		self.size == 0
	}

	/// Returns true if `address` lies inside the region.
	pub fn contains(&self, address: u64) -> bool {
		self.end_address()
			.is_some_and(|end| address >= self.address && address <= end)
	}

	/// Returns true if the two regions share at least one address.
	pub fn overlaps(&self, other: &Region) -> bool {
		match (self.end_address(), other.end_address()) {
			(Some(a_end), Some(b_end)) => self.address <= b_end && other.address <= a_end,
			_ => false,
		}
	}
}

impl fmt::Display for Region {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.end_address() {
			Some(end) => write!(f, "0x{:08X}..=0x{:08X}", self.address, end),
			None => write!(f, "0x{:08X} (empty)", self.address),
		}
	}
}

/// A region bound to the provider it addresses.
///
/// Used to describe the hex-editor selection; has no lifecycle of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ProviderRegion {
	pub region: Region,
	pub provider: ProviderId,
}

impl ProviderRegion {
	pub const fn new(region: Region, provider: ProviderId) -> Self {
		Self { region, provider }
	}

	pub const fn address(&self) -> u64 {
		self.region.address
	}

	pub const fn size(&self) -> u64 {
		self.region.size
	}
}
