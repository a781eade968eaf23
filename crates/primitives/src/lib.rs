//! Core value types for the workbench: provider handles, address regions and colors.

/// Packed RGBA colors for highlights and tooltips.
pub mod color;
/// Identifier types for workbench entities.
pub mod ids;
/// Address ranges and provider-scoped regions.
pub mod region;

pub use color::Color;
pub use ids::ProviderId;
pub use region::{ProviderRegion, Region};
