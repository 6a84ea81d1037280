use eframe::egui::{Pos2, Vec2, vec2};

use crate::util::{ease_cubic_in_out, transition_progress};

use super::TRANSITION_SECS;

pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 3.0;
/// Distance of the root from the top edge after a reset.
pub const ROOT_TOP_MARGIN: f32 = 80.0;

/// Pan/zoom applied to the whole tree. Screen = origin + translate + world * scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportTransform {
    pub translate: Vec2,
    pub scale: f32,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl ViewportTransform {
    /// Unscaled view with the root centred horizontally near the top.
    pub fn centered_on_root(canvas_width: f32) -> Self {
        Self {
            translate: vec2(canvas_width / 2.0, ROOT_TOP_MARGIN),
            scale: 1.0,
        }
    }

    pub fn world_to_screen(&self, origin: Pos2, world: Vec2) -> Pos2 {
        origin + self.translate + world * self.scale
    }

    pub fn screen_to_world(&self, origin: Pos2, screen: Pos2) -> Vec2 {
        (screen - origin - self.translate) / self.scale
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.translate += delta;
    }

    /// Scales by `factor` around `pointer`, keeping the world point under it fixed.
    pub fn zoom_at(&mut self, origin: Pos2, pointer: Pos2, factor: f32) {
        let anchor = self.screen_to_world(origin, pointer);
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.translate = pointer - origin - anchor * self.scale;
    }

    fn lerp(from: Self, to: Self, t: f32) -> Self {
        Self {
            translate: from.translate + (to.translate - from.translate) * t,
            scale: from.scale + (to.scale - from.scale) * t,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ViewportAnimation {
    from: ViewportTransform,
    to: ViewportTransform,
    started_at: f64,
}

/// The live transform plus an optional in-flight reset animation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    current: ViewportTransform,
    animation: Option<ViewportAnimation>,
}

impl Viewport {
    pub fn new(transform: ViewportTransform) -> Self {
        Self {
            current: transform,
            animation: None,
        }
    }

    pub fn transform(&self) -> ViewportTransform {
        self.current
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn animate_to(&mut self, target: ViewportTransform, now: f64) {
        self.animation = Some(ViewportAnimation {
            from: self.current,
            to: target,
            started_at: now,
        });
    }

    /// Advances the reset animation to `now`.
    pub fn tick(&mut self, now: f64) {
        let Some(animation) = self.animation else {
            return;
        };

        let t = transition_progress(animation.started_at, now, TRANSITION_SECS);
        self.current = ViewportTransform::lerp(animation.from, animation.to, ease_cubic_in_out(t));
        if t >= 1.0 {
            self.current = animation.to;
            self.animation = None;
        }
    }

    /// User gestures take over from any running animation.
    pub fn pan(&mut self, delta: Vec2) {
        self.animation = None;
        self.current.pan(delta);
    }

    pub fn zoom_at(&mut self, origin: Pos2, pointer: Pos2, factor: f32) {
        self.animation = None;
        self.current.zoom_at(origin, pointer, factor);
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    #[test]
    fn zoom_keeps_pointer_anchor_and_clamps() {
        let origin = pos2(10.0, 20.0);
        let mut transform = ViewportTransform::centered_on_root(800.0);
        let pointer = pos2(300.0, 250.0);
        let anchor = transform.screen_to_world(origin, pointer);

        transform.zoom_at(origin, pointer, 1.5);
        assert!((transform.scale - 1.5).abs() < 1e-6);
        let moved = transform.world_to_screen(origin, anchor);
        assert!((moved - pointer).length() < 1e-3);

        for _ in 0..20 {
            transform.zoom_at(origin, pointer, 2.0);
        }
        assert_eq!(transform.scale, MAX_SCALE);
        for _ in 0..40 {
            transform.zoom_at(origin, pointer, 0.5);
        }
        assert_eq!(transform.scale, MIN_SCALE);
    }

    #[test]
    fn reset_animation_reaches_target() {
        let mut viewport = Viewport::new(ViewportTransform {
            translate: vec2(-300.0, 40.0),
            scale: 2.5,
        });
        let target = ViewportTransform::centered_on_root(1000.0);

        viewport.animate_to(target, 10.0);
        viewport.tick(10.0 + TRANSITION_SECS / 2.0);
        assert!(viewport.is_animating());
        assert!(viewport.transform().scale < 2.5 && viewport.transform().scale > 1.0);

        viewport.tick(10.0 + TRANSITION_SECS);
        assert!(!viewport.is_animating());
        assert_eq!(viewport.transform(), target);
        assert_eq!(target.translate, vec2(500.0, ROOT_TOP_MARGIN));
    }

    #[test]
    fn gestures_cancel_animation() {
        let mut viewport = Viewport::default();
        viewport.animate_to(ViewportTransform::centered_on_root(600.0), 0.0);
        viewport.pan(vec2(5.0, 5.0));

        assert!(!viewport.is_animating());
        assert_eq!(viewport.transform().translate, vec2(5.0, 5.0));
    }
}
