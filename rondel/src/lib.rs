//! An infinitely-looping, virtualized horizontal paging carousel engine.
//!
//! `rondel` owns the logical half of a paging carousel: a fixed viewport
//! sliding over a circularly repeated item run, represented as a bounded
//! range of virtual sections that is silently re-centered so offset math
//! stays in stable floating-point range forever. On top of that sit the
//! snap/recenter state machine, autoplay scheduling, and the per-slot
//! opacity/scale/rotation math. Rendering, gesture recognition, and
//! momentum physics stay in the host surface behind the traits in
//! [`host`].
//!
//! # Usage
//!
//! ```
//! use std::time::Instant;
//!
//! use glam::Vec2;
//! use rondel::{
//!     LayoutConfig, PagerArgs, PagerDataSource, PagerEngine, PagerEventSink, PagerSurface,
//! };
//!
//! struct Banners;
//!
//! impl PagerDataSource for Banners {
//!     fn item_count(&self) -> usize {
//!         5
//!     }
//!
//!     fn layout_config(&self) -> LayoutConfig {
//!         LayoutConfig::default().item_size(Vec2::new(240.0, 120.0))
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Surface {
//!     offset: f32,
//! }
//!
//! impl PagerSurface for Surface {
//!     fn content_offset(&self) -> f32 {
//!         self.offset
//!     }
//!
//!     fn content_width(&self) -> f32 {
//!         240.0 * 5.0 * 200.0
//!     }
//!
//!     fn set_content_offset(&mut self, offset_x: f32, _animated: bool) {
//!         self.offset = offset_x;
//!     }
//! }
//!
//! struct Events;
//!
//! impl PagerEventSink for Events {}
//!
//! let data = Banners;
//! let mut surface = Surface::default();
//! let mut events = Events;
//!
//! let mut pager = PagerEngine::new(PagerArgs::default());
//! pager.reload(Instant::now(), &data, &mut surface, &mut events);
//! pager.on_layout_pass(Vec2::new(360.0, 120.0), Instant::now(), &data, &mut surface, &mut events);
//!
//! assert_eq!(pager.current_index(), Some(0));
//! ```
#![deny(missing_docs, clippy::unwrap_used)]

pub mod autoplay;
pub mod config;
pub mod engine;
pub mod host;
pub mod position;
pub mod transform;

pub use autoplay::Autoplay;
pub use config::{EdgeInsets, LayoutConfig, LayoutConfigError, LayoutMode};
pub use engine::{
    DEFAULT_DRAG_VELOCITY_THRESHOLD, DEFAULT_MAX_SECTIONS, DEFAULT_MIN_SECTIONS, PagerArgs,
    PagerEngine,
};
pub use host::{PagerDataSource, PagerEventSink, PagerSurface};
pub use position::{PagePosition, ScrollDirection};
pub use transform::{CENTER_EPSILON, SlotPlacement, SlotStyle, SlotTransform};
