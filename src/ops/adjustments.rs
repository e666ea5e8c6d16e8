// ============================================================================
// ADJUSTMENT OPERATIONS: pointwise colour stages (invert, grayscale, RGB scale)
// ============================================================================
//
// Every stage rewrites R, G and B in place and leaves alpha alone.
// Rows are processed in parallel via rayon; each pixel depends only on itself,
// so the result is identical to a sequential pass.
// ============================================================================

use rayon::prelude::*;

use crate::canvas::{CHANNELS, PixelBuffer};

// ============================================================================
// HELPER: per-pixel transform
// ============================================================================

/// Apply `transform` to every pixel's (r, g, b). Alpha is never passed in or
/// written back.
fn apply_pixel_transform<F>(buffer: &mut PixelBuffer, transform: F)
where
    F: Fn(u8, u8, u8) -> (u8, u8, u8) + Sync,
{
    let stride = buffer.stride();
    if stride == 0 {
        return;
    }
    buffer
        .current_mut()
        .par_chunks_mut(stride)
        .for_each(|row| {
            for px in row.chunks_exact_mut(CHANNELS) {
                let (r, g, b) = transform(px[0], px[1], px[2]);
                px[0] = r;
                px[1] = g;
                px[2] = b;
            }
        });
}

// ============================================================================
// STAGES
// ============================================================================

/// Invert R, G, B: `c := 255 - c`.
pub fn invert_colors(buffer: &mut PixelBuffer) {
    apply_pixel_transform(buffer, |r, g, b| (255 - r, 255 - g, 255 - b));
}

/// Unweighted average desaturation: `avg := floor((r + g + b) / 3)`.
pub fn grayscale(buffer: &mut PixelBuffer) {
    apply_pixel_transform(buffer, |r, g, b| {
        let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
        (avg, avg, avg)
    });
}

/// Multiply each colour channel by its factor and truncate.
/// Factors are expected in `[0, 1]`; a factor of exactly 1.0 leaves the
/// channel untouched.
pub fn scale_channels(buffer: &mut PixelBuffer, red: f32, green: f32, blue: f32) {
    if red == 1.0 && green == 1.0 && blue == 1.0 {
        return;
    }
    let scale = |v: u8, s: f32| (v as f32 * s).clamp(0.0, 255.0) as u8;
    apply_pixel_transform(buffer, |r, g, b| {
        (scale(r, red), scale(g, green), scale(b, blue))
    });
}
