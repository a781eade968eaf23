//! Keyed stores for hex-editor highlights and tooltips.
//!
//! Background and foreground layers each hold static highlights (a region and
//! a color) and highlighting functions (computed per address). Mutating any
//! highlight map posts [`Event::HighlightingChanged`]; tooltip maps are silent.

mod store;

use hexbench_config::IdOverflow;
use hexbench_events::{Event, EventBus};
use hexbench_primitives::{Color, Region};

use self::store::KeyedStore;

/// A static highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
	pub region: Region,
	pub color: Color,
}

/// A static tooltip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
	pub region: Region,
	pub value: String,
	pub color: Color,
}

/// Computes a highlight color for `address`, given the bytes starting there.
pub type HighlightingFn = Box<dyn Fn(u64, &[u8]) -> Option<Color> + Send + Sync>;

/// Computes tooltip text for `address`, given the bytes starting there.
pub type TooltipFn = Box<dyn Fn(u64, &[u8]) -> Option<String> + Send + Sync>;

/// Highlight layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
	Background,
	Foreground,
}

struct LayerStore {
	highlights: KeyedStore<Highlight>,
	functions: KeyedStore<HighlightingFn>,
}

impl LayerStore {
	fn new(overflow: IdOverflow) -> Self {
		Self {
			highlights: KeyedStore::new(overflow),
			functions: KeyedStore::new(overflow),
		}
	}
}

/// Highlight and tooltip registry.
pub struct HighlightStore {
	bus: EventBus,
	background: LayerStore,
	foreground: LayerStore,
	tooltips: KeyedStore<Tooltip>,
	tooltip_functions: KeyedStore<TooltipFn>,
}

impl std::fmt::Debug for HighlightStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HighlightStore")
			.field("background", &self.background.highlights.len())
			.field("foreground", &self.foreground.highlights.len())
			.field("tooltips", &self.tooltips.len())
			.finish_non_exhaustive()
	}
}

impl HighlightStore {
	pub fn new(bus: EventBus, overflow: IdOverflow) -> Self {
		Self {
			bus,
			background: LayerStore::new(overflow),
			foreground: LayerStore::new(overflow),
			tooltips: KeyedStore::new(overflow),
			tooltip_functions: KeyedStore::new(overflow),
		}
	}

	fn layer(&self, layer: Layer) -> &LayerStore {
		match layer {
			Layer::Background => &self.background,
			Layer::Foreground => &self.foreground,
		}
	}

	fn layer_mut(&mut self, layer: Layer) -> &mut LayerStore {
		match layer {
			Layer::Background => &mut self.background,
			Layer::Foreground => &mut self.foreground,
		}
	}

	fn changed(&self) {
		self.bus.post(Event::HighlightingChanged);
	}

	/// Adds a static highlight. Returns `None` when the id space is exhausted.
	pub fn add_highlight(&mut self, layer: Layer, region: Region, color: Color) -> Option<u32> {
		let id = self.layer_mut(layer).highlights.insert(Highlight { region, color });
		match id {
			Some(id) => {
				tracing::trace!(?layer, id, %region, "highlight.add");
				self.changed();
			}
			None => tracing::warn!(?layer, "highlight.ids_exhausted"),
		}
		id
	}

	pub fn remove_highlight(&mut self, layer: Layer, id: u32) -> Option<Highlight> {
		let removed = self.layer_mut(layer).highlights.remove(id);
		if removed.is_some() {
			self.changed();
		}
		removed
	}

	/// Adds a highlighting function. Returns `None` when the id space is exhausted.
	pub fn add_highlighting_function<F>(&mut self, layer: Layer, function: F) -> Option<u32>
	where
		F: Fn(u64, &[u8]) -> Option<Color> + Send + Sync + 'static,
	{
		let id = self.layer_mut(layer).functions.insert(Box::new(function));
		match id {
			Some(_) => self.changed(),
			None => tracing::warn!(?layer, "highlight.function_ids_exhausted"),
		}
		id
	}

	pub fn remove_highlighting_function(&mut self, layer: Layer, id: u32) -> bool {
		let removed = self.layer_mut(layer).functions.remove(id).is_some();
		if removed {
			self.changed();
		}
		removed
	}

	pub fn highlight(&self, layer: Layer, id: u32) -> Option<&Highlight> {
		self.layer(layer).highlights.get(id)
	}

	/// Static highlights of a layer in id order.
	pub fn highlights(&self, layer: Layer) -> impl Iterator<Item = (u32, &Highlight)> {
		self.layer(layer).highlights.iter()
	}

	pub fn highlighting_function_count(&self, layer: Layer) -> usize {
		self.layer(layer).functions.len()
	}

	/// Resolves the color for `address` in a layer.
	///
	/// Highlighting functions win over static highlights; among each kind
	/// the lowest id wins.
	pub fn color_at(&self, layer: Layer, address: u64, data: &[u8]) -> Option<Color> {
		let store = self.layer(layer);
		store
			.functions
			.values()
			.find_map(|f| f(address, data))
			.or_else(|| {
				store
					.highlights
					.values()
					.find(|h| h.region.contains(address))
					.map(|h| h.color)
			})
	}

	pub fn add_tooltip(&mut self, region: Region, value: impl Into<String>, color: Color) -> Option<u32> {
		self.tooltips.insert(Tooltip {
			region,
			value: value.into(),
			color,
		})
	}

	pub fn remove_tooltip(&mut self, id: u32) -> Option<Tooltip> {
		self.tooltips.remove(id)
	}

	pub fn tooltips(&self) -> impl Iterator<Item = (u32, &Tooltip)> {
		self.tooltips.iter()
	}

	pub fn add_tooltip_function<F>(&mut self, function: F) -> Option<u32>
	where
		F: Fn(u64, &[u8]) -> Option<String> + Send + Sync + 'static,
	{
		self.tooltip_functions.insert(Box::new(function))
	}

	pub fn remove_tooltip_function(&mut self, id: u32) -> bool {
		self.tooltip_functions.remove(id).is_some()
	}

	/// Collects tooltip text for `address` from static tooltips and functions.
	pub fn tooltips_at(&self, address: u64, data: &[u8]) -> Vec<String> {
		self.tooltips
			.values()
			.filter(|t| t.region.contains(address))
			.map(|t| t.value.clone())
			.chain(self.tooltip_functions.values().filter_map(|f| f(address, data)))
			.collect()
	}

	/// Drops every entry. Posts one change notification if highlights existed.
	pub fn clear(&mut self) {
		let had_highlights = [&self.background, &self.foreground]
			.iter()
			.any(|l| l.highlights.len() + l.functions.len() > 0);
		for layer in [&mut self.background, &mut self.foreground] {
			layer.highlights.clear();
			layer.functions.clear();
		}
		self.tooltips.clear();
		self.tooltip_functions.clear();
		if had_highlights {
			self.changed();
		}
	}
}
