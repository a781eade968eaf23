use std::collections::BTreeMap;

use hexbench_config::IdOverflow;

/// Map from monotonically issued `u32` ids to values.
///
/// Ids start at 1. Once the counter reaches `u32::MAX` the [`IdOverflow`]
/// policy decides: `Wrap` restarts at 1 and skips ids still in use,
/// `Saturate` refuses further inserts.
pub(crate) struct KeyedStore<T> {
	entries: BTreeMap<u32, T>,
	last_id: u32,
	overflow: IdOverflow,
}

impl<T> KeyedStore<T> {
	pub(crate) fn new(overflow: IdOverflow) -> Self {
		Self {
			entries: BTreeMap::new(),
			last_id: 0,
			overflow,
		}
	}

	#[cfg(test)]
	pub(crate) fn with_last_id(overflow: IdOverflow, last_id: u32) -> Self {
		Self {
			entries: BTreeMap::new(),
			last_id,
			overflow,
		}
	}

	#[cfg(test)]
	pub(crate) fn seed(&mut self, id: u32, value: T) {
		self.entries.insert(id, value);
	}

	fn next_id(&mut self) -> Option<u32> {
		// Every id in 1..=u32::MAX is taken.
		if self.entries.len() >= u32::MAX as usize {
			return None;
		}

		loop {
			let candidate = match (self.last_id.checked_add(1), self.overflow) {
				(Some(id), _) => id,
				(None, IdOverflow::Wrap) => 1,
				(None, IdOverflow::Saturate) => return None,
			};
			self.last_id = candidate;
			if !self.entries.contains_key(&candidate) {
				return Some(candidate);
			}
		}
	}

	pub(crate) fn insert(&mut self, value: T) -> Option<u32> {
		let id = self.next_id()?;
		self.entries.insert(id, value);
		Some(id)
	}

	pub(crate) fn remove(&mut self, id: u32) -> Option<T> {
		self.entries.remove(&id)
	}

	pub(crate) fn get(&self, id: u32) -> Option<&T> {
		self.entries.get(&id)
	}

	pub(crate) fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
		self.entries.iter().map(|(id, v)| (*id, v))
	}

	pub(crate) fn values(&self) -> impl Iterator<Item = &T> {
		self.entries.values()
	}

	pub(crate) fn len(&self) -> usize {
		self.entries.len()
	}

	pub(crate) fn clear(&mut self) {
		self.entries.clear();
	}
}
