// ============================================================================
// IMAGE FILTERS: 3×3 convolution engine, box blur, sharpen
// ============================================================================

use rayon::prelude::*;

use crate::canvas::{CHANNELS, PixelBuffer};

/// Every kernel sum is divided by this before clamping.
pub const KERNEL_NORMALIZER: f32 = 9.0;

/// A 3×3 grid of convolution weights, indexed `[ky][kx]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Kernel {
    pub weights: [[f32; 3]; 3],
}

impl Kernel {
    /// Box blur: all ones, so the normalised sum is the neighbourhood mean.
    pub const BOX_BLUR: Kernel = Kernel {
        weights: [[1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 1.0]],
    };

    /// Sharpen: a heavy centre with light positive neighbours. The weights
    /// sum to 9, so flat regions come through unchanged.
    pub const SHARPEN: Kernel = Kernel {
        weights: [[0.25, 0.25, 0.25], [0.25, 7.0, 0.25], [0.25, 0.25, 0.25]],
    };

    pub const fn new(weights: [[f32; 3]; 3]) -> Self {
        Self { weights }
    }
}

/// Convolve the RGB channels of `buffer` with `kernel`.
///
/// Reads come from a snapshot taken before the pass, so writes never feed
/// back into later pixels. The outermost one-pixel frame is left as it was,
/// alpha is never touched, and buffers under 3×3 are returned unchanged.
/// Each channel is `clamp(sum(in * w) / 9, 0, 255)` truncated to `u8`.
pub fn apply_kernel(buffer: &mut PixelBuffer, kernel: &Kernel) {
    let w = buffer.width() as usize;
    let h = buffer.height() as usize;
    if w < 3 || h < 3 {
        return;
    }
    let stride = buffer.stride();
    let src = buffer.current().to_vec();
    let weights = kernel.weights;

    buffer
        .current_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            if y == 0 || y == h - 1 {
                return;
            }
            for x in 1..w - 1 {
                let mut sum = [0.0f32; 3];
                for (ky, kernel_row) in weights.iter().enumerate() {
                    let row_off = (y + ky - 1) * stride;
                    for (kx, &kv) in kernel_row.iter().enumerate() {
                        let idx = row_off + (x + kx - 1) * CHANNELS;
                        sum[0] += src[idx] as f32 * kv;
                        sum[1] += src[idx + 1] as f32 * kv;
                        sum[2] += src[idx + 2] as f32 * kv;
                    }
                }
                let out = x * CHANNELS;
                for c in 0..3 {
                    row_out[out + c] = (sum[c] / KERNEL_NORMALIZER).clamp(0.0, 255.0) as u8;
                }
            }
        });
}

/// 3×3 box blur.
pub fn blur(buffer: &mut PixelBuffer) {
    apply_kernel(buffer, &Kernel::BOX_BLUR);
}

/// 3×3 sharpen.
pub fn sharpen(buffer: &mut PixelBuffer) {
    apply_kernel(buffer, &Kernel::SHARPEN);
}
