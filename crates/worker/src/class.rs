/// What kind of work a task is.
///
/// The tracker keeps a running count per class so that a refused mutation
/// can report what it is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Started by the user, who is waiting on it (a search, a save).
	Interactive,
	/// Started on the user's behalf (analysis, indexing).
	Background,
	/// Blocking I/O on the blocking pool.
	IoBlocking,
	/// CPU-heavy work on the blocking pool.
	CpuBlocking,
}

impl TaskClass {
	pub const ALL: [TaskClass; 4] = [Self::Interactive, Self::Background, Self::IoBlocking, Self::CpuBlocking];

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Interactive => "interactive",
			Self::Background => "background",
			Self::IoBlocking => "io_blocking",
			Self::CpuBlocking => "cpu_blocking",
		}
	}

	/// Returns true for classes that run on the blocking pool.
	pub const fn is_blocking(self) -> bool {
		matches!(self, Self::IoBlocking | Self::CpuBlocking)
	}

	pub(crate) const fn slot(self) -> usize {
		self as usize
	}
}
