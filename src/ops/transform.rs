// ============================================================================
// TRANSFORM OPERATIONS: fixed-canvas rotation
// ============================================================================

use rayon::prelude::*;

use crate::canvas::{CHANNELS, PixelBuffer};

/// Fill for destination pixels whose source lies outside the frame.
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Rotate the current bytes by `angle_degrees` about the image centre.
///
/// Positive angles turn the content clockwise on screen. The canvas keeps its
/// size: content that leaves the frame is cropped and uncovered corners become
/// transparent black. Sampling is nearest-neighbour via inverse mapping of
/// each destination pixel centre, so multiples of 90° move pixels exactly
/// (for square images).
pub fn rotate(buffer: &mut PixelBuffer, angle_degrees: f32) {
    if angle_degrees == 0.0 || !angle_degrees.is_finite() {
        return;
    }
    let w = buffer.width() as usize;
    let h = buffer.height() as usize;
    if w == 0 || h == 0 {
        return;
    }
    let stride = buffer.stride();
    let src = buffer.current().to_vec();

    let (sin, cos) = sin_cos_degrees(angle_degrees as f64);
    let cx = w as f64 * 0.5;
    let cy = h as f64 * 0.5;

    buffer
        .current_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(dy, row)| {
            let v = dy as f64 + 0.5 - cy;
            for dx in 0..w {
                let u = dx as f64 + 0.5 - cx;
                let sx = (u * cos + v * sin + cx).floor();
                let sy = (-u * sin + v * cos + cy).floor();

                let out = dx * CHANNELS;
                if sx < 0.0 || sy < 0.0 || sx >= w as f64 || sy >= h as f64 {
                    row[out..out + CHANNELS].copy_from_slice(&TRANSPARENT);
                } else {
                    let idx = sy as usize * stride + sx as usize * CHANNELS;
                    row[out..out + CHANNELS].copy_from_slice(&src[idx..idx + CHANNELS]);
                }
            }
        });
}

/// `(sin, cos)` of an angle in degrees, exact at quarter turns.
fn sin_cos_degrees(angle: f64) -> (f64, f64) {
    let quarters = angle / 90.0;
    if quarters.fract() == 0.0 {
        return match (quarters as i64).rem_euclid(4) {
            0 => (0.0, 1.0),
            1 => (1.0, 0.0),
            2 => (0.0, -1.0),
            _ => (-1.0, 0.0),
        };
    }
    angle.to_radians().sin_cos()
}
