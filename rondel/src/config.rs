//! Layout configuration handed to the engine by the host's data source.
//!
//! ## Usage
//!
//! Build a [`LayoutConfig`] in your [`PagerDataSource`] implementation;
//! the engine validates it, stamps its own infinite-loop flag onto it and
//! caches it until the next reload or explicit layout invalidation.
//!
//! [`PagerDataSource`]: crate::host::PagerDataSource

use derive_setters::Setters;
use glam::Vec2;
use thiserror::Error;

/// Visual layout mode selecting the per-slot transform family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Opacity-only styling, no geometric transform.
    #[default]
    Normal,
    /// Distance-based scaling with optional spacing compensation.
    Linear,
    /// Perspective rotation around the vertical axis.
    Coverflow,
}

/// Edge insets around the laid-out item run, in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeInsets {
    /// Inset above the item run.
    pub top: f32,
    /// Inset before the first item.
    pub left: f32,
    /// Inset below the item run.
    pub bottom: f32,
    /// Inset after the last item.
    pub right: f32,
}

impl EdgeInsets {
    /// Insets of zero on every edge.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates insets from the four edges.
    pub const fn new(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }
}

/// Rejection reasons for a host-provided layout config.
#[derive(Debug, Error)]
pub enum LayoutConfigError {
    /// The item size must be positive in both dimensions; a degenerate
    /// size invalidates the whole layout.
    #[error("item size must be positive in both dimensions, got {width}x{height}")]
    NonPositiveItemSize {
        /// Offending item width.
        width: f32,
        /// Offending item height.
        height: f32,
    },
}

/// Immutable-per-reload layout record: slot geometry plus the scalar
/// parameters governing each transform mode.
///
/// The engine owns the active config exclusively; hosts produce a fresh
/// one per reload through their data source.
#[derive(Debug, Clone, PartialEq, Setters)]
pub struct LayoutConfig {
    /// Size of one item slot. Both dimensions must be positive.
    pub item_size: Vec2,
    /// Spacing between adjacent items.
    pub item_spacing: f32,
    /// Insets around the whole item run.
    pub section_inset: EdgeInsets,
    /// Transform family applied to visible slots.
    pub mode: LayoutMode,
    /// Enables the opacity pass in [`LayoutMode::Normal`]; when unset the
    /// styling pass is skipped entirely for normal mode.
    pub normal_opacity_enabled: bool,
    /// Scale floor for [`LayoutMode::Linear`]. Defaults to 0.8.
    pub minimum_scale: f32,
    /// Opacity floor for every mode. Defaults to 1.0 (no fade).
    pub minimum_alpha: f32,
    /// Rotation ceiling for [`LayoutMode::Coverflow`], as a fraction of
    /// half a turn. Defaults to 0.2.
    pub maximum_angle: f32,
    /// Rate of change of the distance-based interpolation. Defaults
    /// to 0.4.
    pub rate_of_change: f32,
    /// Whether the item run repeats circularly. Stamped by the engine
    /// from its own args on every fetch; host-set values are overwritten.
    pub infinite_loop: bool,
    /// Vertically centers items in the viewport.
    pub item_vertical_center: bool,
    /// Horizontally centers the item run in finite mode.
    pub item_horizontal_center: bool,
    /// Adjusts horizontal spacing of non-centered slots while scrolling.
    pub adjust_spacing_while_scrolling: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            item_size: Vec2::ZERO,
            item_spacing: 0.0,
            section_inset: EdgeInsets::ZERO,
            mode: LayoutMode::Normal,
            normal_opacity_enabled: false,
            minimum_scale: 0.8,
            minimum_alpha: 1.0,
            maximum_angle: 0.2,
            rate_of_change: 0.4,
            infinite_loop: false,
            item_vertical_center: true,
            item_horizontal_center: false,
            adjust_spacing_while_scrolling: true,
        }
    }
}

impl LayoutConfig {
    /// Checks that the config can produce a usable layout.
    pub fn validate(&self) -> Result<(), LayoutConfigError> {
        if self.item_size.x <= 0.0 || self.item_size.y <= 0.0 {
            return Err(LayoutConfigError::NonPositiveItemSize {
                width: self.item_size.x,
                height: self.item_size.y,
            });
        }
        Ok(())
    }

    /// Stride between adjacent item centers: item width plus spacing.
    pub fn item_pitch(&self) -> f32 {
        self.item_size.x + self.item_spacing
    }

    /// Resolved insets for the single section of a finite carousel.
    ///
    /// Horizontally centers the run when [`item_horizontal_center`] is
    /// set, vertically centers items when [`item_vertical_center`] is.
    ///
    /// [`item_horizontal_center`]: Self::item_horizontal_center
    /// [`item_vertical_center`]: Self::item_vertical_center
    pub fn only_one_section_inset(&self, viewport: Vec2) -> EdgeInsets {
        let centered = !self.infinite_loop && self.item_horizontal_center;
        let left = if centered {
            (viewport.x - self.item_size.x) / 2.0
        } else {
            self.section_inset.left
        };
        let right = if centered {
            (viewport.x - self.item_size.x) / 2.0
        } else {
            self.section_inset.right
        };
        if self.item_vertical_center {
            self.vertically_centered(viewport, left, right)
        } else {
            EdgeInsets::new(self.section_inset.top, left, self.section_inset.bottom, right)
        }
    }

    /// Resolved insets for the first repeated section of an infinite
    /// carousel.
    pub fn first_section_inset(&self, viewport: Vec2) -> EdgeInsets {
        if self.item_vertical_center {
            self.vertically_centered(viewport, self.section_inset.left, self.item_spacing)
        } else {
            EdgeInsets::new(
                self.section_inset.top,
                self.section_inset.left,
                self.section_inset.bottom,
                self.item_spacing,
            )
        }
    }

    /// Resolved insets for the interior repeated sections of an infinite
    /// carousel.
    pub fn middle_section_inset(&self, viewport: Vec2) -> EdgeInsets {
        if self.item_vertical_center {
            self.vertically_centered(viewport, 0.0, self.item_spacing)
        } else {
            self.section_inset
        }
    }

    /// Resolved insets for the last repeated section of an infinite
    /// carousel.
    pub fn last_section_inset(&self, viewport: Vec2) -> EdgeInsets {
        if self.item_vertical_center {
            self.vertically_centered(viewport, 0.0, self.section_inset.right)
        } else {
            EdgeInsets::new(
                self.section_inset.top,
                0.0,
                self.section_inset.bottom,
                self.section_inset.right,
            )
        }
    }

    /// Leading inset in front of flattened slot zero.
    pub fn leading_inset(&self, viewport: Vec2) -> f32 {
        if self.infinite_loop {
            self.section_inset.left
        } else {
            self.only_one_section_inset(viewport).left
        }
    }

    fn vertically_centered(&self, viewport: Vec2, left: f32, right: f32) -> EdgeInsets {
        let vertical = (viewport.y - self.item_size.y) / 2.0;
        EdgeInsets::new(vertical, left, vertical, right)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::{EdgeInsets, LayoutConfig, LayoutConfigError};

    fn config() -> LayoutConfig {
        LayoutConfig::default().item_size(Vec2::new(100.0, 80.0))
    }

    #[test]
    fn validate_rejects_non_positive_item_sizes() {
        let degenerate = config().item_size(Vec2::new(0.0, 80.0));
        assert!(matches!(
            degenerate.validate(),
            Err(LayoutConfigError::NonPositiveItemSize { .. })
        ));
        let negative = config().item_size(Vec2::new(100.0, -1.0));
        assert!(negative.validate().is_err());
        assert!(config().validate().is_ok());
    }

    #[test]
    fn pitch_adds_spacing_to_item_width() {
        assert_eq!(config().item_spacing(12.0).item_pitch(), 112.0);
    }

    #[test]
    fn only_one_section_inset_centers_horizontally_on_request() {
        let viewport = Vec2::new(300.0, 100.0);
        let centered = config().item_horizontal_center(true);
        let insets = centered.only_one_section_inset(viewport);
        assert_eq!(insets.left, 100.0);
        assert_eq!(insets.right, 100.0);
        assert_eq!(insets.top, 10.0);
        assert_eq!(insets.bottom, 10.0);

        let plain = config()
            .item_vertical_center(false)
            .section_inset(EdgeInsets::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(
            plain.only_one_section_inset(viewport),
            EdgeInsets::new(1.0, 2.0, 3.0, 4.0)
        );
    }

    #[test]
    fn infinite_loop_disables_horizontal_centering() {
        let viewport = Vec2::new(300.0, 100.0);
        let insets = config()
            .item_horizontal_center(true)
            .infinite_loop(true)
            .only_one_section_inset(viewport);
        assert_eq!(insets.left, 0.0);
    }

    #[test]
    fn section_insets_thread_spacing_between_sections() {
        let viewport = Vec2::new(300.0, 100.0);
        let config = config()
            .item_spacing(8.0)
            .section_inset(EdgeInsets::new(0.0, 16.0, 0.0, 24.0));
        assert_eq!(config.first_section_inset(viewport).left, 16.0);
        assert_eq!(config.first_section_inset(viewport).right, 8.0);
        assert_eq!(config.middle_section_inset(viewport).left, 0.0);
        assert_eq!(config.middle_section_inset(viewport).right, 8.0);
        assert_eq!(config.last_section_inset(viewport).left, 0.0);
        assert_eq!(config.last_section_inset(viewport).right, 24.0);
    }

    #[test]
    fn leading_inset_follows_loop_mode() {
        let viewport = Vec2::new(300.0, 100.0);
        let config = config()
            .item_horizontal_center(true)
            .section_inset(EdgeInsets::new(0.0, 16.0, 0.0, 0.0));
        assert_eq!(config.leading_inset(viewport), 100.0);
        assert_eq!(config.infinite_loop(true).leading_inset(viewport), 16.0);
    }
}
