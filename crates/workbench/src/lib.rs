//! Core of the hexbench workbench.
//!
//! [`ProviderRegistry`] owns the open data providers and runs their
//! lifecycle; [`Workbench`] wires it to the event bus, the task runtime and
//! the highlight, selection and messaging stores.
//!
//! ```no_run
//! use hexbench_config::Config;
//! use hexbench_workbench::Workbench;
//!
//! let mut workbench = Workbench::init(Config::load_default()?)?;
//! if let Some(id) = workbench.create("hex.builtin.provider.file", false) {
//!     workbench.close(id);
//! }
//! workbench.tick();
//! # Ok::<(), hexbench_workbench::WorkbenchError>(())
//! ```

pub mod error;
mod gate;
pub mod highlight;
pub mod logging;
pub mod messaging;
mod provider;
pub mod registry;
pub mod selection;
mod workbench;

pub use error::{Result, WorkbenchError};
pub use gate::TaskGate;
pub use highlight::{HighlightStore, Layer};
pub use messaging::{MessagingError, MessagingHandlers};
pub use provider::{CreateProvider, Provider};
pub use registry::{DeferredWork, ProviderRegistry};
pub use selection::SelectionState;
pub use workbench::Workbench;
