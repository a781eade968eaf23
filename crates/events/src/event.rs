use hexbench_primitives::{ProviderId, ProviderRegion};

/// Outcome a subscriber returns from event delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verdict {
	#[default]
	Proceed,
	Veto,
}

impl Verdict {
	/// Folds two verdicts; a veto from either side wins.
	#[must_use]
	pub fn and(self, other: Verdict) -> Verdict {
		if self == Verdict::Veto || other == Verdict::Veto {
			Verdict::Veto
		} else {
			Verdict::Proceed
		}
	}

	pub fn is_veto(self) -> bool {
		self == Verdict::Veto
	}
}

impl From<()> for Verdict {
	fn from(_: ()) -> Self {
		Verdict::Proceed
	}
}

/// Events produced by the workbench core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
	/// A provider was accepted; posted before it joins the provider list.
	ProviderCreated { provider: ProviderId },
	/// The current provider changed. `None` means "no provider".
	ProviderChanged {
		old: Option<ProviderId>,
		new: Option<ProviderId>,
	},
	/// A provider is about to close. Subscribers may veto.
	ProviderClosing { provider: ProviderId },
	/// A provider released its resources.
	ProviderClosed { provider: ProviderId },
	/// A closed provider left the registry for good.
	ProviderDeleted { provider: ProviderId },
	/// A highlight or highlighting function was added or removed.
	HighlightingChanged,
	/// The window title should be recomputed.
	RequestUpdateWindowTitle,
	/// Ask the hex editor view to move its selection.
	RequestSelectionChange { region: Option<ProviderRegion> },
}

impl Event {
	pub fn kind(&self) -> EventKind {
		match self {
			Event::ProviderCreated { .. } => EventKind::ProviderCreated,
			Event::ProviderChanged { .. } => EventKind::ProviderChanged,
			Event::ProviderClosing { .. } => EventKind::ProviderClosing,
			Event::ProviderClosed { .. } => EventKind::ProviderClosed,
			Event::ProviderDeleted { .. } => EventKind::ProviderDeleted,
			Event::HighlightingChanged => EventKind::HighlightingChanged,
			Event::RequestUpdateWindowTitle => EventKind::RequestUpdateWindowTitle,
			Event::RequestSelectionChange { .. } => EventKind::RequestSelectionChange,
		}
	}
}

/// Payload-free discriminant of [`Event`], used to filter subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
	ProviderCreated,
	ProviderChanged,
	ProviderClosing,
	ProviderClosed,
	ProviderDeleted,
	HighlightingChanged,
	RequestUpdateWindowTitle,
	RequestSelectionChange,
}

impl EventKind {
	/// Returns true for events whose aggregated verdict is honored by the poster.
	pub const fn is_vetoable(self) -> bool {
		matches!(self, EventKind::ProviderClosing)
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::ProviderCreated => "provider_created",
			Self::ProviderChanged => "provider_changed",
			Self::ProviderClosing => "provider_closing",
			Self::ProviderClosed => "provider_closed",
			Self::ProviderDeleted => "provider_deleted",
			Self::HighlightingChanged => "highlighting_changed",
			Self::RequestUpdateWindowTitle => "request_update_window_title",
			Self::RequestSelectionChange => "request_selection_change",
		}
	}
}
