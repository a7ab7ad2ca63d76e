//! Aspect-fit placement geometry.
//!
//! Computes where an image of arbitrary aspect ratio lands inside a fixed
//! placeholder region: scaled uniformly to fit entirely within the region
//! (no cropping), centered on both axes.

use crate::pptx::shape::Rect;

/// Fit an image of `img_w` x `img_h` pixels inside `target`, centered.
///
/// If the image is relatively wider than the target, the destination spans
/// the target's full width and is centered vertically; otherwise it spans
/// the full height and is centered horizontally.
pub fn fit_within(target: Rect, img_w: u32, img_h: u32) -> Rect {
    debug_assert!(img_w > 0 && img_h > 0);

    let target_ratio = target.cx as f64 / target.cy as f64;
    let img_ratio = img_w as f64 / img_h as f64;

    if img_ratio > target_ratio {
        let cx = target.cx;
        let cy = (target.cx as f64 / img_ratio) as i64;
        Rect {
            x: target.x,
            y: target.y + (target.cy - cy) / 2,
            cx,
            cy,
        }
    } else {
        let cy = target.cy;
        let cx = (target.cy as f64 * img_ratio) as i64;
        Rect {
            x: target.x + (target.cx - cx) / 2,
            y: target.y,
            cx,
            cy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TARGET: Rect = Rect {
        x: 914_400,
        y: 457_200,
        cx: 1_828_800,
        cy: 914_400,
    };

    #[test]
    fn wide_image_pins_width() {
        // 4:1 image into a 2:1 target: full width, half height, centered.
        let dest = fit_within(TARGET, 400, 100);
        assert_eq!(dest.cx, TARGET.cx);
        assert_eq!(dest.cy, TARGET.cy / 2);
        assert_eq!(dest.x, TARGET.x);
        assert_eq!(dest.y, TARGET.y + TARGET.cy / 4);
    }

    #[test]
    fn tall_image_pins_height() {
        // 1:2 image into a 2:1 target: full height, quarter width, centered.
        let dest = fit_within(TARGET, 100, 200);
        assert_eq!(dest.cy, TARGET.cy);
        assert_eq!(dest.cx, TARGET.cx / 4);
        assert_eq!(dest.y, TARGET.y);
        assert_eq!(dest.x, TARGET.x + (TARGET.cx - TARGET.cx / 4) / 2);
    }

    #[test]
    fn matching_ratio_fills_target() {
        let dest = fit_within(TARGET, 200, 100);
        assert_eq!(dest, TARGET);
    }

    proptest! {
        #[test]
        fn destination_contained_and_centered(
            img_w in 1u32..8000,
            img_h in 1u32..8000,
        ) {
            let dest = fit_within(TARGET, img_w, img_h);

            // Fully contained within the target.
            prop_assert!(dest.x >= TARGET.x);
            prop_assert!(dest.y >= TARGET.y);
            prop_assert!(dest.x + dest.cx <= TARGET.x + TARGET.cx);
            prop_assert!(dest.y + dest.cy <= TARGET.y + TARGET.cy);

            // Touches both edges of one axis, centered on the other
            // (within the rounding of the integer midpoint split).
            if dest.cx == TARGET.cx {
                let slack = TARGET.cy - dest.cy;
                prop_assert!((dest.y - TARGET.y - slack / 2).abs() <= 1);
            } else {
                prop_assert_eq!(dest.cy, TARGET.cy);
                let slack = TARGET.cx - dest.cx;
                prop_assert!((dest.x - TARGET.x - slack / 2).abs() <= 1);
            }

            // Aspect ratio preserved within rounding tolerance.
            let got = dest.cx as f64 / dest.cy as f64;
            let want = img_w as f64 / img_h as f64;
            prop_assert!((got - want).abs() / want < 0.01);
        }
    }
}
