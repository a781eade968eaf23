//! Choosing the next current provider when one is removed.
//!
//! Runs while the removed provider is still in the sequence, so every index
//! here is a position in that still-containing sequence. Providers already in
//! the closing set are never chosen.

use hexbench_primitives::ProviderId;

/// Which removal shape applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RemovalCase {
	/// The current provider sits at position 0 and is the one going away.
	Leading,
	/// The current provider is going away from a later position.
	Current,
	/// Some other provider is going away.
	Other,
}

impl RemovalCase {
	pub(crate) fn classify(current: Option<usize>, removed: usize) -> Self {
		match current {
			Some(c) if c == removed && removed == 0 => RemovalCase::Leading,
			Some(c) if c == removed => RemovalCase::Current,
			_ => RemovalCase::Other,
		}
	}
}

/// Returns the position that should be current once `removed` is gone, or
/// `None` when no live provider is left to select.
///
/// - [`RemovalCase::Leading`]: the next live provider after it.
/// - [`RemovalCase::Current`]: the closest live provider before it, then after it.
/// - [`RemovalCase::Other`]: the current provider stays; if there is no live
///   current provider, the first live one.
pub(crate) fn target_after_removal(
	order: &[ProviderId],
	closing: &[ProviderId],
	current: Option<usize>,
	removed: usize,
) -> Option<usize> {
	let live = |i: &usize| *i != removed && !closing.contains(&order[*i]);

	match RemovalCase::classify(current, removed) {
		RemovalCase::Leading => (removed + 1..order.len()).find(live),
		RemovalCase::Current => (0..removed)
			.rev()
			.find(live)
			.or_else(|| (removed + 1..order.len()).find(live)),
		RemovalCase::Other => current
			.filter(|c| *c < order.len())
			.filter(live)
			.or_else(|| (0..order.len()).find(live)),
	}
}
