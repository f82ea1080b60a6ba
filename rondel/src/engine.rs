//! Paging state machine over the virtualized infinite item run.
//!
//! ## Usage
//!
//! Create a [`PagerEngine`] from [`PagerArgs`], forward the surface's
//! lifecycle callbacks into it, and drive [`PagerEngine::tick`] from the
//! host's frame loop when autoplay is configured. The engine owns the
//! current [`PagePosition`] and the active [`LayoutConfig`]; everything
//! else is lent per call through the traits in [`crate::host`].

use std::time::{Duration, Instant};

use derive_setters::Setters;
use glam::Vec2;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::{
    autoplay::Autoplay,
    config::LayoutConfig,
    host::{PagerDataSource, PagerEventSink, PagerSurface},
    position::{PagePosition, ScrollDirection},
    transform::{self, SlotStyle},
};

/// Default fling-velocity magnitude below which a drag snaps back.
pub const DEFAULT_DRAG_VELOCITY_THRESHOLD: f32 = 0.35;
/// Default number of repeated virtual sections simulating the infinite
/// run.
pub const DEFAULT_MAX_SECTIONS: usize = 200;
/// Default distance from the section bounds that triggers recentering.
pub const DEFAULT_MIN_SECTIONS: usize = 18;

/// Construction-time engine configuration.
#[derive(Debug, Clone, PartialEq, Setters)]
pub struct PagerArgs {
    /// Whether the item run repeats circularly.
    pub infinite_loop: bool,
    /// Autoplay period; zero disables autoplay entirely.
    pub autoplay_interval: Duration,
    /// Whether a reload resets the carousel back to item 0.
    pub reload_resets_index: bool,
    /// Fling-velocity magnitude below which a drag snaps back to the
    /// current item. Defaults to 0.35.
    pub drag_velocity_threshold: f32,
    /// Virtual section count simulating the infinite run. Defaults
    /// to 200.
    pub max_sections: usize,
    /// Distance from the section bounds that triggers recentering.
    /// Defaults to 18.
    pub min_sections: usize,
}

impl Default for PagerArgs {
    fn default() -> Self {
        Self {
            infinite_loop: true,
            autoplay_interval: Duration::ZERO,
            reload_resets_index: false,
            drag_velocity_threshold: DEFAULT_DRAG_VELOCITY_THRESHOLD,
            max_sections: DEFAULT_MAX_SECTIONS,
            min_sections: DEFAULT_MIN_SECTIONS,
        }
    }
}

/// The paging state machine.
///
/// Owns the current position over the repeated item run, the cached
/// layout config, and the autoplay schedule. Every navigation request is
/// best-effort: invalid targets are absorbed as no-ops.
#[derive(Debug, Clone)]
pub struct PagerEngine {
    args: PagerArgs,
    layout: Option<LayoutConfig>,
    item_count: usize,
    current: Option<PagePosition>,
    drag_begin: Option<PagePosition>,
    first_scroll_index: Option<usize>,
    viewport: Vec2,
    did_layout: bool,
    did_reload: bool,
    need_reset_index: bool,
    need_clear_layout: bool,
    tracking: bool,
    autoplay: Autoplay,
}

impl PagerEngine {
    /// Creates an engine with no position and no data yet.
    pub fn new(args: PagerArgs) -> Self {
        let autoplay = Autoplay::with_interval(args.autoplay_interval);
        Self {
            args,
            layout: None,
            item_count: 0,
            current: None,
            drag_begin: None,
            first_scroll_index: None,
            viewport: Vec2::ZERO,
            did_layout: false,
            did_reload: false,
            need_reset_index: false,
            need_clear_layout: false,
            tracking: false,
            autoplay,
        }
    }

    /// Returns the construction arguments.
    pub fn args(&self) -> &PagerArgs {
        &self.args
    }

    /// Current item index, if a position has been derived yet.
    pub fn current_index(&self) -> Option<usize> {
        self.current.map(|position| position.index)
    }

    /// Current position, if one has been derived yet.
    pub fn current_position(&self) -> Option<PagePosition> {
        self.current
    }

    /// Whether the user's finger is currently down on the surface.
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Item count cached from the host at the last reload.
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Number of repeated sections the surface should lay out.
    pub fn section_count(&self) -> usize {
        if self.args.infinite_loop {
            self.args.max_sections
        } else {
            1
        }
    }

    /// The active layout config, if a valid one has been resolved.
    pub fn layout_config(&self) -> Option<&LayoutConfig> {
        self.layout.as_ref()
    }

    /// Maps a flattened slot to the logical item that populates it.
    pub fn item_at_slot(&self, flat_slot: usize) -> Option<usize> {
        if self.item_count == 0 || flat_slot >= self.item_count * self.section_count() {
            return None;
        }
        Some(flat_slot % self.item_count)
    }

    /// Whether a position addresses the current data within the section
    /// range.
    pub fn is_valid_position(&self, position: PagePosition) -> bool {
        position.index < self.item_count && position.section < self.args.max_sections
    }

    /// Replaces the autoplay interval, cancelling any pending fire and
    /// re-arming only when positive and attached.
    pub fn set_autoplay_interval(&mut self, interval: Duration, now: Instant) {
        self.args.autoplay_interval = interval;
        let attached = self.is_attached();
        self.autoplay.set_interval(interval, now, attached);
    }

    /// Detaches the engine from its surface, cancelling autoplay.
    pub fn detach(&mut self) {
        self.viewport = Vec2::ZERO;
        self.autoplay.cancel();
    }

    /// Reloads data from the host: re-resolves the layout config,
    /// recomputes the item count, and re-derives the position.
    ///
    /// With [`PagerArgs::reload_resets_index`] set the carousel jumps
    /// back to item 0 at the centered section; otherwise the current item
    /// index is preserved.
    pub fn reload(
        &mut self,
        now: Instant,
        data: &dyn PagerDataSource,
        surface: &mut dyn PagerSurface,
        events: &mut dyn PagerEventSink,
    ) {
        self.did_reload = true;
        self.need_reset_index = true;
        self.set_need_clear_layout();
        self.clear_layout_if_needed();
        self.update_data(now, data, surface, events);
    }

    /// Marks the cached layout config for invalidation on the next
    /// resolve.
    pub fn set_need_clear_layout(&mut self) {
        self.need_clear_layout = true;
    }

    /// Re-resolves the layout config after a host-side config change,
    /// invalidates the surface layout and re-derives the position.
    pub fn set_need_update_layout(
        &mut self,
        data: &dyn PagerDataSource,
        surface: &mut dyn PagerSurface,
        events: &mut dyn PagerEventSink,
    ) {
        if self.resolve_layout(data).is_none() {
            return;
        }
        self.clear_layout_if_needed();
        self.resolve_layout(data);
        surface.invalidate_layout();
        let index = self.current.map_or(0, |position| position.index);
        self.reset_to_index(Some(index), surface, events);
    }

    /// Reports a layout pass of the surface with its measured viewport.
    ///
    /// The first nonzero measurement marks the engine laid-out and
    /// applies any pending first-scroll index; later size changes
    /// re-resolve the layout.
    pub fn on_layout_pass(
        &mut self,
        viewport: Vec2,
        now: Instant,
        data: &dyn PagerDataSource,
        surface: &mut dyn PagerSurface,
        events: &mut dyn PagerEventSink,
    ) {
        let viewport_changed = viewport != self.viewport;
        let was_attached = self.is_attached();
        self.viewport = viewport;
        if !was_attached && self.is_attached() {
            self.autoplay.arm(now);
        }
        if (self.current.is_none() || viewport_changed)
            && (self.item_count > 0 || self.did_reload)
        {
            self.did_layout = true;
            self.set_need_update_layout(data, surface, events);
        }
    }

    /// Steps one position in the given direction.
    pub fn scroll_to_nearby(
        &mut self,
        direction: ScrollDirection,
        animated: bool,
        surface: &mut dyn PagerSurface,
        events: &mut dyn PagerEventSink,
    ) {
        let Some(current) = self.current else {
            return;
        };
        let target = self.nearby_position(current, direction);
        self.scroll_to_position(target, animated, surface, events);
    }

    /// Scrolls to a logical item index.
    ///
    /// In infinite mode the current section is preserved unless the
    /// target lies behind the current index, in which case the next
    /// section is used so the scroll always reads forward. Before the
    /// first layout the index is recorded and honored once layout
    /// completes.
    pub fn scroll_to_index(
        &mut self,
        index: usize,
        animated: bool,
        surface: &mut dyn PagerSurface,
        events: &mut dyn PagerEventSink,
    ) {
        if !self.did_layout && self.did_reload {
            self.first_scroll_index = Some(index);
        } else {
            self.first_scroll_index = None;
        }

        if !self.args.infinite_loop {
            self.scroll_to_position(PagePosition::new(index, 0), animated, surface, events);
            return;
        }

        let Some(current) = self.current else {
            return;
        };
        let section = if index >= current.index {
            current.section
        } else {
            current.section + 1
        };
        self.scroll_to_position(PagePosition::new(index, section), animated, surface, events);
    }

    /// Scrolls to an exact position; invalid targets are ignored.
    pub fn scroll_to_position(
        &mut self,
        position: PagePosition,
        animated: bool,
        surface: &mut dyn PagerSurface,
        events: &mut dyn PagerEventSink,
    ) {
        if self.item_count == 0 || !self.is_valid_position(position) {
            return;
        }
        if animated {
            events.will_begin_scroll_animation();
        }
        let offset = self.offset_for_position(position);
        surface.set_content_offset(offset, animated);
        if !animated {
            // A non-animated move applies synchronously, so the position
            // can be re-derived from the surface before returning.
            self.on_scroll_position_changed(surface.content_offset(), events);
        }
    }

    /// The adjacent position in the given scroll direction.
    ///
    /// Finite mode wraps at the ends only while autoplay is active;
    /// infinite mode rolls the section at item-count boundaries,
    /// saturating at the section range bounds.
    pub fn nearby_position(
        &self,
        position: PagePosition,
        direction: ScrollDirection,
    ) -> PagePosition {
        if position.index >= self.item_count {
            return position;
        }

        let autoplay_active = !self.autoplay.interval().is_zero();
        if !self.args.infinite_loop {
            return match direction {
                ScrollDirection::Right if position.index == self.item_count - 1 => {
                    if autoplay_active {
                        PagePosition::new(0, 0)
                    } else {
                        position
                    }
                }
                ScrollDirection::Right => PagePosition::new(position.index + 1, 0),
                ScrollDirection::Left if position.index == 0 => {
                    if autoplay_active {
                        PagePosition::new(self.item_count - 1, 0)
                    } else {
                        position
                    }
                }
                ScrollDirection::Left => PagePosition::new(position.index - 1, 0),
            };
        }

        match direction {
            ScrollDirection::Right => {
                if position.index < self.item_count - 1 {
                    PagePosition::new(position.index + 1, position.section)
                } else if position.section >= self.args.max_sections - 1 {
                    PagePosition::new(position.index, self.args.max_sections - 1)
                } else {
                    PagePosition::new(0, position.section + 1)
                }
            }
            ScrollDirection::Left => {
                if position.index > 0 {
                    PagePosition::new(position.index - 1, position.section)
                } else if position.section == 0 {
                    PagePosition::new(position.index, 0)
                } else {
                    PagePosition::new(self.item_count - 1, position.section - 1)
                }
            }
        }
    }

    /// Derives the position whose slot sits under the viewport center at
    /// the given content offset.
    ///
    /// Returns `None` without a usable layout; offsets before the leading
    /// inset map to the first position.
    pub fn position_at_offset(&self, offset_x: f32) -> Option<PagePosition> {
        if self.item_count == 0 {
            return Some(PagePosition::new(0, 0));
        }
        let layout = self.layout.as_ref()?;
        let pitch = layout.item_pitch();
        if pitch <= 0.0 {
            return None;
        }

        let leading = layout.leading_inset(self.viewport);
        let middle = offset_x + self.viewport.x / 2.0;
        if middle - leading < 0.0 {
            return Some(PagePosition::new(0, 0));
        }

        let max_slot = (self.item_count * self.args.max_sections - 1) as i64;
        let slot = (((middle - leading + layout.item_spacing / 2.0) / pitch).floor() as i64)
            .clamp(0, max_slot) as usize;
        PagePosition::from_flat(slot, self.item_count)
    }

    /// Content offset that rests the given position under the viewport
    /// center.
    ///
    /// Finite mode right-aligns the last item unless horizontal centering
    /// is configured. The result is floored at zero.
    pub fn offset_for_position(&self, position: PagePosition) -> f32 {
        if self.item_count == 0 {
            return 0.0;
        }
        let Some(layout) = self.layout.as_ref() else {
            return 0.0;
        };

        let pitch = layout.item_pitch();
        let edge = if self.args.infinite_loop {
            layout.section_inset
        } else {
            layout.only_one_section_inset(self.viewport)
        };
        let flat = position.flat(self.item_count) as f32;
        let width = self.viewport.x;

        let offset = if !self.args.infinite_loop
            && !layout.item_horizontal_center
            && position.index == self.item_count - 1
        {
            edge.left + pitch * flat - (width - pitch) - layout.item_spacing + edge.right
        } else {
            edge.left + pitch * flat - layout.item_spacing / 2.0 - (width - pitch) / 2.0
        };
        offset.max(0.0)
    }

    /// Re-centers the virtual section counter when it drifts near either
    /// bound, without changing the displayed item.
    pub fn recenter_if_needed(
        &mut self,
        surface: &mut dyn PagerSurface,
        events: &mut dyn PagerEventSink,
    ) {
        if !self.args.infinite_loop {
            return;
        }
        let Some(current) = self.current else {
            return;
        };
        if current.section > self.args.max_sections - self.args.min_sections
            || current.section < self.args.min_sections
        {
            debug!(
                index = current.index,
                section = current.section,
                "recentering virtual sections"
            );
            self.reset_to_index(Some(current.index), surface, events);
        }
    }

    /// Reports a new content offset from the surface.
    ///
    /// No-op until the first layout completed, so framework-driven offset
    /// assignments before any content exists never produce events.
    pub fn on_scroll_position_changed(&mut self, offset_x: f32, events: &mut dyn PagerEventSink) {
        if !self.did_layout {
            return;
        }
        let Some(new_position) = self.position_at_offset(offset_x) else {
            return;
        };
        if self.item_count == 0 || !self.is_valid_position(new_position) {
            return;
        }

        let previous = self.current;
        self.current = Some(new_position);
        events.did_scroll();
        if previous != Some(new_position) {
            let from = previous.map_or(0, |position| position.index);
            events.position_changed(from, new_position.index);
        }
    }

    /// Reports that the user started dragging at the given offset.
    pub fn on_drag_begin(&mut self, offset_x: f32, events: &mut dyn PagerEventSink) {
        if !self.autoplay.interval().is_zero() {
            self.autoplay.cancel();
        }
        self.drag_begin = self.position_at_offset(offset_x);
        self.tracking = true;
        events.will_begin_dragging();
    }

    /// Adjusts the host's proposed momentum target so the surface always
    /// comes to rest on an item boundary.
    ///
    /// Below the velocity threshold, or once the drag already crossed a
    /// position boundary, the target is the current position's exact
    /// offset; otherwise the fling advances to the nearest neighbor in
    /// its direction.
    pub fn on_drag_will_end(
        &mut self,
        offset_x: f32,
        velocity_x: f32,
        proposed_x: f32,
        surface: &dyn PagerSurface,
    ) -> f32 {
        let Some(current) = self.current else {
            return proposed_x;
        };

        if velocity_x.abs() < self.args.drag_velocity_threshold
            || self.drag_begin != Some(current)
        {
            return self.offset_for_position(current);
        }

        let mut direction = ScrollDirection::Right;
        if (offset_x < 0.0 && proposed_x <= 0.0)
            || (proposed_x < offset_x && offset_x < surface.content_width() - self.viewport.x)
        {
            direction = ScrollDirection::Left;
        }
        let target = self.nearby_position(current, direction);
        self.offset_for_position(target)
    }

    /// Reports that the user lifted their finger.
    pub fn on_drag_end(
        &mut self,
        will_decelerate: bool,
        now: Instant,
        events: &mut dyn PagerEventSink,
    ) {
        if !self.autoplay.interval().is_zero() {
            self.autoplay.arm(now);
        }
        self.tracking = false;
        events.did_end_dragging(will_decelerate);
    }

    /// Reports that momentum scrolling started.
    pub fn on_deceleration_begin(&mut self, events: &mut dyn PagerEventSink) {
        events.will_begin_decelerating();
    }

    /// Reports that momentum scrolling came to rest.
    pub fn on_deceleration_end(
        &mut self,
        surface: &mut dyn PagerSurface,
        events: &mut dyn PagerEventSink,
    ) {
        self.recenter_if_needed(surface, events);
        events.did_end_decelerating();
    }

    /// Reports that a programmatic animated scroll came to rest.
    pub fn on_scroll_animation_end(
        &mut self,
        surface: &mut dyn PagerSurface,
        events: &mut dyn PagerEventSink,
    ) {
        self.recenter_if_needed(surface, events);
        events.did_end_scroll_animation();
    }

    /// Reports a tap on the cell at the given flattened slot.
    pub fn select_item(&mut self, flat_slot: usize, events: &mut dyn PagerEventSink) {
        let Some(index) = self.item_at_slot(flat_slot) else {
            return;
        };
        events.item_selected(index, flat_slot);
    }

    /// Drives the autoplay schedule.
    ///
    /// A due fire is consumed even when blocked; advancing only happens
    /// while attached, with items, and with no finger down.
    pub fn tick(
        &mut self,
        now: Instant,
        surface: &mut dyn PagerSurface,
        events: &mut dyn PagerEventSink,
    ) {
        if !self.autoplay.fire_if_due(now) {
            return;
        }
        if !self.is_attached() || self.item_count == 0 || self.tracking {
            return;
        }
        self.scroll_to_nearby(ScrollDirection::Right, true, surface, events);
    }

    /// Styles every slot whose frame intersects the viewport at the given
    /// offset.
    ///
    /// Empty when styling is disabled for the active config or no layout
    /// exists.
    pub fn visible_styles(&self, offset_x: f32) -> SmallVec<[(usize, SlotStyle); 8]> {
        let mut styles = SmallVec::new();
        let Some(layout) = self.layout.as_ref() else {
            return styles;
        };
        if !transform::styling_enabled(layout) || self.item_count == 0 {
            return styles;
        }
        let pitch = layout.item_pitch();
        if pitch <= 0.0 || self.viewport.x <= 0.0 {
            return styles;
        }

        let leading = layout.leading_inset(self.viewport);
        let slot_count = (self.item_count * self.section_count()) as i64;
        let first = (((offset_x - leading - layout.item_size.x) / pitch).floor() as i64 + 1).max(0);
        let last =
            (((offset_x + self.viewport.x - leading) / pitch).ceil() as i64 - 1).min(slot_count - 1);

        let mut slot = first;
        while slot <= last {
            let center_x = leading + pitch * slot as f32 + layout.item_size.x / 2.0;
            styles.push((
                slot as usize,
                transform::slot_style(center_x, offset_x, self.viewport, layout),
            ));
            slot += 1;
        }
        styles
    }

    /// Attachment-time style for a single slot, used when a queued cell
    /// first becomes visible.
    pub fn initial_style_for_slot(&self, flat_slot: usize, offset_x: f32) -> SlotStyle {
        let Some(layout) = self.layout.as_ref() else {
            return SlotStyle::IDENTITY;
        };
        if !transform::styling_enabled(layout) {
            return SlotStyle::IDENTITY;
        }
        let center_x =
            layout.leading_inset(self.viewport) + layout.item_pitch() * flat_slot as f32
                + layout.item_size.x / 2.0;
        transform::initial_slot_style(center_x, offset_x, self.viewport, layout)
    }

    fn is_attached(&self) -> bool {
        self.viewport.x > 0.0 && self.viewport.y > 0.0
    }

    fn update_data(
        &mut self,
        now: Instant,
        data: &dyn PagerDataSource,
        surface: &mut dyn PagerSurface,
        events: &mut dyn PagerEventSink,
    ) {
        self.resolve_layout(data);
        self.item_count = data.item_count();
        debug!(item_count = self.item_count, "carousel data reloaded");

        if !self.did_layout && self.is_attached() && self.current.is_none() {
            self.did_layout = true;
        }

        let reset = self.need_reset_index && self.args.reload_resets_index;
        self.need_reset_index = false;
        if reset {
            self.autoplay.cancel();
        }

        let target = if (self.current.is_none() && self.is_attached()) || reset {
            Some(0)
        } else {
            self.current.map(|position| position.index)
        };
        self.reset_to_index(target, surface, events);

        if reset {
            self.autoplay.arm(now);
        }
    }

    fn resolve_layout(&mut self, data: &dyn PagerDataSource) -> Option<&LayoutConfig> {
        if self.layout.is_none() {
            let mut config = data.layout_config();
            config.infinite_loop = self.args.infinite_loop;
            match config.validate() {
                Ok(()) => self.layout = Some(config),
                Err(err) => warn!("rejected layout config: {err}"),
            }
        }
        self.layout.as_ref()
    }

    fn clear_layout_if_needed(&mut self) {
        if self.need_clear_layout {
            self.layout = None;
            self.need_clear_layout = false;
        }
    }

    fn reset_to_index(
        &mut self,
        index: Option<usize>,
        surface: &mut dyn PagerSurface,
        events: &mut dyn PagerEventSink,
    ) {
        let index = match (self.did_layout, self.first_scroll_index) {
            (true, Some(first)) => {
                self.first_scroll_index = None;
                first
            }
            _ => match index {
                Some(index) => index,
                None => return,
            },
        };
        let index = if index >= self.item_count { 0 } else { index };
        let section = if self.args.infinite_loop {
            self.args.max_sections / 3
        } else {
            0
        };
        debug!(index, section, "resetting carousel position");
        self.scroll_to_position(PagePosition::new(index, section), false, surface, events);
    }
}
