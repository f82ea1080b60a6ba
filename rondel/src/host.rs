//! Contract between the engine and its rendering surface.
//!
//! ## Usage
//!
//! Implement [`PagerDataSource`] over your item collection and
//! [`PagerSurface`] / [`PagerEventSink`] over the physical scrollable
//! surface, then borrow them into engine calls. The engine never stores
//! these references; every capability is lent per call.

use crate::config::LayoutConfig;

/// Item data the engine pulls on reload and layout passes.
pub trait PagerDataSource {
    /// Number of real items.
    fn item_count(&self) -> usize;

    /// Layout record for the next layout cycle.
    fn layout_config(&self) -> LayoutConfig;
}

/// Queries and commands on the physical scrollable surface.
///
/// Cell content stays on the host side; the engine maps flattened slots
/// to item indices through [`PagerEngine::item_at_slot`] when the surface
/// populates its reuse pool.
///
/// [`PagerEngine::item_at_slot`]: crate::engine::PagerEngine::item_at_slot
pub trait PagerSurface {
    /// Current horizontal content offset.
    fn content_offset(&self) -> f32;

    /// Total scrollable content width.
    fn content_width(&self) -> f32;

    /// Moves the surface to `offset_x`, optionally animated.
    ///
    /// Non-animated moves must apply synchronously; animated moves are
    /// fire-and-forget and complete through
    /// [`PagerEngine::on_scroll_animation_end`].
    ///
    /// [`PagerEngine::on_scroll_animation_end`]: crate::engine::PagerEngine::on_scroll_animation_end
    fn set_content_offset(&mut self, offset_x: f32, animated: bool);

    /// Invalidates the surface's cached layout after a config change.
    fn invalidate_layout(&mut self) {}
}

/// Engine-to-host notifications.
///
/// Every method defaults to a no-op, so hosts implement only what they
/// observe.
pub trait PagerEventSink {
    /// The derived position changed item index or section.
    fn position_changed(&mut self, _from_index: usize, _to_index: usize) {}

    /// An item cell was selected at the given flattened slot.
    fn item_selected(&mut self, _index: usize, _flat_slot: usize) {}

    /// The content offset moved.
    fn did_scroll(&mut self) {}

    /// The user put a finger down and started dragging.
    fn will_begin_dragging(&mut self) {}

    /// The user lifted their finger.
    fn did_end_dragging(&mut self, _will_decelerate: bool) {}

    /// Momentum scrolling is starting.
    fn will_begin_decelerating(&mut self) {}

    /// Momentum scrolling came to rest.
    fn did_end_decelerating(&mut self) {}

    /// A programmatic animated scroll is starting.
    fn will_begin_scroll_animation(&mut self) {}

    /// A programmatic animated scroll came to rest.
    fn did_end_scroll_animation(&mut self) {}
}
