use eframe::egui::{Rect, Vec2, vec2};

use super::transform::ZoomTransform;

/// Transform that centers `bounds` in `viewport` and scales it to fill
/// `fill` of the tighter axis. `None` for an empty viewport or degenerate
/// bounds.
pub fn fit_transform(bounds: Rect, viewport: Vec2, fill: f32) -> Option<ZoomTransform> {
    if !bounds.is_finite() || viewport.x <= 0.0 || viewport.y <= 0.0 {
        return None;
    }

    let size = bounds.size();
    let extent = (size.x / viewport.x).max(size.y / viewport.y);
    if extent <= f32::EPSILON {
        return None;
    }

    let scale = fill / extent;
    let center = bounds.center();
    let translate = vec2(
        viewport.x * 0.5 - scale * center.x,
        viewport.y * 0.5 - scale * center.y,
    );
    Some(ZoomTransform::new(translate, scale))
}

pub fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// Eased transition between two transforms, sampled by wall-clock time.
#[derive(Clone, Copy, Debug)]
pub struct FitAnimation {
    from: ZoomTransform,
    to: ZoomTransform,
    started_at: f64,
    duration_secs: f32,
}

impl FitAnimation {
    pub fn new(
        from: ZoomTransform,
        to: ZoomTransform,
        started_at: f64,
        duration_secs: f32,
    ) -> Self {
        Self {
            from,
            to,
            started_at,
            duration_secs,
        }
    }

    pub fn target(&self) -> ZoomTransform {
        self.to
    }

    /// Transform at `now`, and whether the animation has finished.
    pub fn sample(&self, now: f64) -> (ZoomTransform, bool) {
        if self.duration_secs <= 0.0 {
            return (self.to, true);
        }

        let progress = ((now - self.started_at) / f64::from(self.duration_secs)) as f32;
        if progress >= 1.0 {
            return (self.to, true);
        }
        (self.from.lerp(&self.to, ease_cubic_in_out(progress)), false)
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    #[test]
    fn wide_bounds_are_limited_by_width() {
        let bounds = Rect::from_min_max(pos2(0.0, 0.0), pos2(2000.0, 100.0));
        let transform = fit_transform(bounds, vec2(1000.0, 800.0), 0.9).expect("fits");

        assert!((transform.scale - 0.45).abs() < 1.0e-6);
        let center = transform.apply(bounds.center());
        assert!((center - pos2(500.0, 400.0)).length() < 1.0e-3);
    }

    #[test]
    fn fit_may_exceed_gesture_zoom_bounds() {
        let bounds = Rect::from_min_max(pos2(0.0, 0.0), pos2(20.0, 10.0));
        let transform = fit_transform(bounds, vec2(1000.0, 800.0), 0.9).expect("fits");
        assert!(transform.scale > 5.0);
    }

    #[test]
    fn degenerate_inputs_do_not_fit() {
        let point = Rect::from_min_max(pos2(5.0, 5.0), pos2(5.0, 5.0));
        assert!(fit_transform(point, vec2(1000.0, 800.0), 0.9).is_none());

        let bounds = Rect::from_min_max(pos2(0.0, 0.0), pos2(10.0, 10.0));
        assert!(fit_transform(bounds, vec2(0.0, 800.0), 0.9).is_none());
    }

    #[test]
    fn easing_is_symmetric_and_pinned_at_the_ends() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert!((ease_cubic_in_out(0.5) - 0.5).abs() < 1.0e-6);
        assert!((ease_cubic_in_out(0.25) + ease_cubic_in_out(0.75) - 1.0).abs() < 1.0e-6);
    }

    #[test]
    fn animation_reaches_its_target() {
        let to = ZoomTransform::new(vec2(100.0, 50.0), 2.0);
        let animation = FitAnimation::new(ZoomTransform::IDENTITY, to, 10.0, 0.75);

        let (start, done) = animation.sample(10.0);
        assert_eq!(start, ZoomTransform::IDENTITY);
        assert!(!done);

        let (middle, done) = animation.sample(10.375);
        assert!(!done);
        assert!((middle.scale - 1.5).abs() < 1.0e-4);

        assert_eq!(animation.sample(11.0), (to, true));
    }
}
