//! Per-slot opacity and transform math.
//!
//! ## Usage
//!
//! Pure functions of a slot's center, the live content offset, the
//! viewport and the active [`LayoutConfig`]. The engine invokes
//! [`slot_style`] for every visible slot on every scroll tick and
//! [`initial_slot_style`] once when a slot is first attached, so queued
//! off-screen slots appear already styled instead of flashing.

use std::f32::consts::PI;

use glam::{Affine2, Mat4, Vec2, Vec3};

use crate::config::{LayoutConfig, LayoutMode};

/// Distance from the viewport center below which a slot counts as
/// centered.
pub const CENTER_EPSILON: f32 = 0.5;

const LINEAR_TRANSLATE_FACTOR: f32 = 1.15;
const COVERFLOW_PERSPECTIVE: f32 = -0.002;
const COVERFLOW_TRANSLATE_WAVE: f32 = 1.2;

/// Classification of a slot relative to the viewport center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPlacement {
    /// The slot center lies left of the viewport center.
    Left,
    /// The slot center lies within [`CENTER_EPSILON`] of the viewport
    /// center.
    Center,
    /// The slot center lies right of the viewport center.
    Right,
}

/// Geometric transform applied to a slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlotTransform {
    /// No transform.
    Identity,
    /// 2D affine transform, produced by [`LayoutMode::Linear`].
    Affine(Affine2),
    /// Perspective 3D transform, produced by [`LayoutMode::Coverflow`].
    Projective(Mat4),
}

/// Visual styling for one slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotStyle {
    /// Opacity of a host-side dimming mask over the slot: `1 - alpha`.
    pub mask_opacity: f32,
    /// Slot content alpha.
    pub alpha: f32,
    /// Geometric transform for the slot.
    pub transform: SlotTransform,
}

impl SlotStyle {
    /// Fully visible, untransformed style.
    pub const IDENTITY: Self = Self {
        mask_opacity: 0.0,
        alpha: 1.0,
        transform: SlotTransform::Identity,
    };
}

/// Classifies a slot center against the viewport center at the given
/// content offset.
pub fn classify(center_x: f32, offset_x: f32, viewport_width: f32) -> SlotPlacement {
    let content_center = offset_x + viewport_width / 2.0;
    if (center_x - content_center).abs() < CENTER_EPSILON {
        SlotPlacement::Center
    } else if center_x < content_center {
        SlotPlacement::Left
    } else {
        SlotPlacement::Right
    }
}

/// Whether the config produces any per-slot styling at all.
///
/// [`LayoutMode::Normal`] only styles slots when its opacity pass is
/// explicitly enabled; the other modes always do.
pub fn styling_enabled(config: &LayoutConfig) -> bool {
    config.mode != LayoutMode::Normal || config.normal_opacity_enabled
}

/// Continuous per-tick style for one slot, from its live distance to the
/// viewport center.
///
/// The centered slot always receives [`SlotStyle::IDENTITY`] exactly,
/// regardless of the configured floors.
pub fn slot_style(center_x: f32, offset_x: f32, viewport: Vec2, config: &LayoutConfig) -> SlotStyle {
    if viewport.x <= 0.0 {
        return SlotStyle::IDENTITY;
    }
    let placement = classify(center_x, offset_x, viewport.x);
    if placement == SlotPlacement::Center {
        return SlotStyle::IDENTITY;
    }

    let delta = (center_x - (offset_x + viewport.x / 2.0)).abs();
    let alpha = (1.0 - delta / viewport.x).max(config.minimum_alpha);
    match config.mode {
        LayoutMode::Normal => normal_style(alpha),
        LayoutMode::Linear => {
            let scale = (1.0 - delta / viewport.x * config.rate_of_change).max(config.minimum_scale);
            linear_style(placement, scale, alpha, config)
        }
        LayoutMode::Coverflow => {
            let angle =
                (delta / viewport.x * (1.0 - config.rate_of_change)).min(config.maximum_angle);
            coverflow_style(placement, angle, alpha, config)
        }
    }
}

/// Attachment-time style for one slot, computed from the configured
/// floors instead of the live distance.
///
/// Off-center slots get the fully faded style; the centered slot gets
/// [`SlotStyle::IDENTITY`] exactly.
pub fn initial_slot_style(
    center_x: f32,
    offset_x: f32,
    viewport: Vec2,
    config: &LayoutConfig,
) -> SlotStyle {
    let placement = classify(center_x, offset_x, viewport.x);
    if placement == SlotPlacement::Center {
        return SlotStyle::IDENTITY;
    }
    match config.mode {
        LayoutMode::Normal => normal_style(config.minimum_alpha),
        LayoutMode::Linear => {
            linear_style(placement, config.minimum_scale, config.minimum_alpha, config)
        }
        LayoutMode::Coverflow => {
            coverflow_style(placement, config.maximum_angle, config.minimum_alpha, config)
        }
    }
}

fn normal_style(alpha: f32) -> SlotStyle {
    SlotStyle {
        mask_opacity: 1.0 - alpha,
        alpha: 1.0,
        transform: SlotTransform::Identity,
    }
}

fn linear_style(placement: SlotPlacement, scale: f32, alpha: f32, config: &LayoutConfig) -> SlotStyle {
    let translate = match placement {
        SlotPlacement::Center => return SlotStyle::IDENTITY,
        SlotPlacement::Left => LINEAR_TRANSLATE_FACTOR * config.item_size.x * (1.0 - scale) / 2.0,
        SlotPlacement::Right => -LINEAR_TRANSLATE_FACTOR * config.item_size.x * (1.0 - scale) / 2.0,
    };

    let mut transform = Affine2::from_scale(Vec2::splat(scale));
    if config.adjust_spacing_while_scrolling {
        // Translation composes in the scaled local space.
        transform = transform * Affine2::from_translation(Vec2::new(translate, 0.0));
    }
    SlotStyle {
        mask_opacity: 1.0 - alpha,
        alpha,
        transform: SlotTransform::Affine(transform),
    }
}

fn coverflow_style(
    placement: SlotPlacement,
    angle: f32,
    alpha: f32,
    config: &LayoutConfig,
) -> SlotStyle {
    let (angle, translate) = match placement {
        SlotPlacement::Center => return SlotStyle::IDENTITY,
        SlotPlacement::Left => (
            angle,
            (1.0 - (angle * COVERFLOW_TRANSLATE_WAVE * PI).cos()) * config.item_size.x,
        ),
        SlotPlacement::Right => (
            -angle,
            -(1.0 - (angle * COVERFLOW_TRANSLATE_WAVE * PI).cos()) * config.item_size.x,
        ),
    };

    let mut transform = perspective() * Mat4::from_rotation_y(PI * angle);
    if config.adjust_spacing_while_scrolling {
        transform = transform * Mat4::from_translation(Vec3::new(translate, 0.0, 0.0));
    }
    SlotStyle {
        mask_opacity: 1.0 - alpha,
        alpha,
        transform: SlotTransform::Projective(transform),
    }
}

fn perspective() -> Mat4 {
    let mut matrix = Mat4::IDENTITY;
    matrix.z_axis.w = COVERFLOW_PERSPECTIVE;
    matrix
}

#[cfg(test)]
mod tests {
    use glam::{Affine2, Mat4, Vec2, Vec3};

    use super::{
        CENTER_EPSILON, SlotPlacement, SlotStyle, SlotTransform, classify, initial_slot_style,
        slot_style, styling_enabled,
    };
    use crate::config::{LayoutConfig, LayoutMode};

    const VIEWPORT: Vec2 = Vec2::new(300.0, 100.0);

    fn config(mode: LayoutMode) -> LayoutConfig {
        LayoutConfig::default()
            .item_size(Vec2::new(100.0, 80.0))
            .mode(mode)
            .normal_opacity_enabled(true)
            .minimum_alpha(0.5)
    }

    fn approx(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-5, "{a} !~ {b}");
    }

    #[test]
    fn classification_uses_half_pixel_rule() {
        // Viewport center sits at offset + 150.
        assert_eq!(classify(150.4, 0.0, VIEWPORT.x), SlotPlacement::Center);
        assert_eq!(classify(149.6, 0.0, VIEWPORT.x), SlotPlacement::Center);
        assert_eq!(classify(150.0 - CENTER_EPSILON, 0.0, VIEWPORT.x), SlotPlacement::Left);
        assert_eq!(classify(150.0 + CENTER_EPSILON, 0.0, VIEWPORT.x), SlotPlacement::Right);
    }

    #[test]
    fn centered_slot_is_exactly_identity_in_every_mode() {
        for mode in [LayoutMode::Normal, LayoutMode::Linear, LayoutMode::Coverflow] {
            let config = config(mode).minimum_scale(0.3).minimum_alpha(0.2);
            let style = slot_style(150.3, 0.0, VIEWPORT, &config);
            assert_eq!(style, SlotStyle::IDENTITY, "continuous, {mode:?}");
            let style = initial_slot_style(149.7, 0.0, VIEWPORT, &config);
            assert_eq!(style, SlotStyle::IDENTITY, "initial, {mode:?}");
        }
    }

    #[test]
    fn normal_mode_fades_with_distance_and_clamps() {
        let config = config(LayoutMode::Normal);
        let style = slot_style(250.0, 0.0, VIEWPORT, &config);
        // delta 100 over a 300 viewport: alpha 1 - 1/3.
        approx(style.mask_opacity, 1.0 / 3.0);
        assert_eq!(style.alpha, 1.0);
        assert_eq!(style.transform, SlotTransform::Identity);

        let far = slot_style(150.0 + 280.0, 0.0, VIEWPORT, &config);
        // Clamped at the configured floor.
        approx(far.mask_opacity, 0.5);
    }

    #[test]
    fn normal_mode_without_opacity_pass_reports_styling_disabled() {
        let config = LayoutConfig::default().item_size(Vec2::new(100.0, 80.0));
        assert!(!styling_enabled(&config));
        assert!(styling_enabled(&config.clone().normal_opacity_enabled(true)));
        assert!(styling_enabled(&config.mode(LayoutMode::Linear)));
    }

    #[test]
    fn linear_mode_scales_and_translates_off_center_slots() {
        let config = config(LayoutMode::Linear);
        // delta 60: scale 1 - 60/300 * 0.4 = 0.92, right of center.
        let style = slot_style(210.0, 0.0, VIEWPORT, &config);
        let scale = 1.0 - 60.0 / 300.0 * 0.4;
        let translate = -1.15 * 100.0 * (1.0 - scale) / 2.0;
        let expected =
            Affine2::from_scale(Vec2::splat(scale)) * Affine2::from_translation(Vec2::new(translate, 0.0));
        assert_eq!(style.transform, SlotTransform::Affine(expected));
        approx(style.alpha, 1.0 - 60.0 / 300.0);
        approx(style.mask_opacity, 60.0 / 300.0);

        // Mirror slot on the left translates the other way.
        let left = slot_style(90.0, 0.0, VIEWPORT, &config);
        let mirrored =
            Affine2::from_scale(Vec2::splat(scale)) * Affine2::from_translation(Vec2::new(-translate, 0.0));
        assert_eq!(left.transform, SlotTransform::Affine(mirrored));
    }

    #[test]
    fn linear_mode_clamps_scale_at_the_floor() {
        let config = config(LayoutMode::Linear).minimum_scale(0.95);
        let style = slot_style(300.0, 0.0, VIEWPORT, &config);
        match style.transform {
            SlotTransform::Affine(affine) => approx(affine.matrix2.x_axis.x, 0.95),
            other => panic!("expected affine transform, got {other:?}"),
        }
    }

    #[test]
    fn linear_mode_skips_translation_without_spacing_adjustment() {
        let config = config(LayoutMode::Linear).adjust_spacing_while_scrolling(false);
        let style = slot_style(210.0, 0.0, VIEWPORT, &config);
        let scale = 1.0 - 60.0 / 300.0 * 0.4;
        assert_eq!(
            style.transform,
            SlotTransform::Affine(Affine2::from_scale(Vec2::splat(scale)))
        );
    }

    #[test]
    fn coverflow_rotation_grows_with_distance_and_clamps() {
        let config = config(LayoutMode::Coverflow).maximum_angle(0.1);
        // delta 150 over 300 at rate 0.4: raw angle 0.3, clamped to 0.1.
        let style = slot_style(300.0, 0.0, VIEWPORT, &config);
        let angle = 0.1_f32;
        let translate = -(1.0 - (angle * 1.2 * std::f32::consts::PI).cos()) * 100.0;
        let mut expected = Mat4::IDENTITY;
        expected.z_axis.w = -0.002;
        expected = expected * Mat4::from_rotation_y(std::f32::consts::PI * -angle);
        expected = expected * Mat4::from_translation(Vec3::new(translate, 0.0, 0.0));
        assert_eq!(style.transform, SlotTransform::Projective(expected));
    }

    #[test]
    fn coverflow_rotation_sign_follows_slot_side() {
        let config = config(LayoutMode::Coverflow);
        let right = slot_style(250.0, 0.0, VIEWPORT, &config);
        let left = slot_style(50.0, 0.0, VIEWPORT, &config);
        let (SlotTransform::Projective(right), SlotTransform::Projective(left)) =
            (right.transform, left.transform)
        else {
            panic!("expected projective transforms");
        };
        // Rotations around Y with opposite signs disagree in the x-axis z
        // component.
        approx(right.x_axis.z, -left.x_axis.z);
    }

    #[test]
    fn initial_style_uses_configured_floors() {
        let config = config(LayoutMode::Linear).minimum_scale(0.8);
        let style = initial_slot_style(500.0, 0.0, VIEWPORT, &config);
        approx(style.alpha, 0.5);
        approx(style.mask_opacity, 0.5);
        match style.transform {
            SlotTransform::Affine(affine) => approx(affine.matrix2.x_axis.x, 0.8),
            other => panic!("expected affine transform, got {other:?}"),
        }

        let normal = initial_slot_style(500.0, 0.0, VIEWPORT, &config.mode(LayoutMode::Normal));
        approx(normal.mask_opacity, 0.5);
        assert_eq!(normal.transform, SlotTransform::Identity);
    }

    #[test]
    fn degenerate_viewport_styles_nothing() {
        let config = config(LayoutMode::Linear);
        assert_eq!(
            slot_style(210.0, 0.0, Vec2::ZERO, &config),
            SlotStyle::IDENTITY
        );
    }
}
