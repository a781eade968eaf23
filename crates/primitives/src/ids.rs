use std::fmt;

/// Stable handle for a provider owned by the registry.
///
/// Issued once when the registry accepts a provider and never reused, so it
/// stays valid as an identity key even when the provider sequence shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct ProviderId(pub u64);

impl ProviderId {
	/// Returns the raw handle value.
	pub const fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for ProviderId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "provider#{}", self.0)
	}
}
