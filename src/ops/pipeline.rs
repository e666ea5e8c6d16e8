// ============================================================================
// EDIT PIPELINE: non-destructive recompute from the original pixels
// ============================================================================
//
// Stage order is fixed: reset, invert, grayscale, blur, sharpen, channel
// scale, rotate. The order a user toggled things in is never stored, so the
// same EditState always yields the same bytes.
// ============================================================================

use std::time::Instant;

use crate::canvas::PixelBuffer;
use crate::display::{DisplayError, TextureSink};
use crate::ops::{adjustments, filters, transform};

pub const MIN_ROTATION: f32 = -180.0;
pub const MAX_ROTATION: f32 = 180.0;

/// Every toggle and slider the control panel exposes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EditState {
    pub invert: bool,
    pub grayscale: bool,
    pub blur: bool,
    pub sharpen: bool,
    /// Channel multipliers in `[0, 1]`.
    pub red_scale: f32,
    pub green_scale: f32,
    pub blue_scale: f32,
    /// Degrees in `[-180, 180]`, clockwise-positive.
    pub rotation_degrees: f32,
}

impl Default for EditState {
    fn default() -> Self {
        Self {
            invert: false,
            grayscale: false,
            blur: false,
            sharpen: false,
            red_scale: 1.0,
            green_scale: 1.0,
            blue_scale: 1.0,
            rotation_degrees: 0.0,
        }
    }
}

impl EditState {
    /// Pull every continuous parameter into its valid range.
    /// Non-finite values fall back to the neutral default.
    pub fn clamped(self) -> Self {
        let scale = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 1.0 };
        let angle = if self.rotation_degrees.is_finite() {
            self.rotation_degrees.clamp(MIN_ROTATION, MAX_ROTATION)
        } else {
            0.0
        };
        Self {
            red_scale: scale(self.red_scale),
            green_scale: scale(self.green_scale),
            blue_scale: scale(self.blue_scale),
            rotation_degrees: angle,
            ..self
        }
    }

    /// True when recompute would reproduce the original bytes.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Short human-readable list of active edits, for logs and the CLI.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if self.invert {
            parts.push("invert".to_string());
        }
        if self.grayscale {
            parts.push("grayscale".to_string());
        }
        if self.blur {
            parts.push("blur".to_string());
        }
        if self.sharpen {
            parts.push("sharpen".to_string());
        }
        if (self.red_scale, self.green_scale, self.blue_scale) != (1.0, 1.0, 1.0) {
            parts.push(format!(
                "rgb({:.2}, {:.2}, {:.2})",
                self.red_scale, self.green_scale, self.blue_scale
            ));
        }
        if self.rotation_degrees != 0.0 {
            parts.push(format!("rotate({:.1}°)", self.rotation_degrees));
        }
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Rebuild `buffer`'s current bytes from its original bytes and `state`.
///
/// Idempotent: two calls with the same state produce identical bytes.
pub fn recompute(buffer: &mut PixelBuffer, state: &EditState) {
    buffer.assert_consistent();
    let start = Instant::now();

    buffer.reset();
    if state.invert {
        adjustments::invert_colors(buffer);
    }
    if state.grayscale {
        adjustments::grayscale(buffer);
    }
    if state.blur {
        filters::blur(buffer);
    }
    if state.sharpen {
        filters::sharpen(buffer);
    }
    adjustments::scale_channels(
        buffer,
        state.red_scale,
        state.green_scale,
        state.blue_scale,
    );
    transform::rotate(buffer, state.rotation_degrees);

    buffer.assert_consistent();
    buffer.mark_dirty();
    log_info!(
        "recompute {}x{} [{}] in {:.1}ms",
        buffer.width(),
        buffer.height(),
        state.summary(),
        start.elapsed().as_secs_f64() * 1000.0
    );
}

/// [`recompute`], then push the new bytes to the display exactly once.
pub fn recompute_and_present<S: TextureSink>(
    buffer: &mut PixelBuffer,
    state: &EditState,
    sink: &mut S,
    handle: &mut S::Handle,
) -> Result<(), DisplayError> {
    recompute(buffer, state);
    sink.update_texture(handle, buffer.width(), buffer.height(), buffer.current())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PixelBuffer {
        let mut bytes = Vec::new();
        for y in 0..5u32 {
            for x in 0..6u32 {
                bytes.extend_from_slice(&[
                    (x * 40) as u8,
                    (y * 50) as u8,
                    ((x + y) * 20) as u8,
                    200 + x as u8,
                ]);
            }
        }
        PixelBuffer::from_rgba(bytes, 6, 5).unwrap()
    }

    #[test]
    fn default_state_reproduces_original() {
        let mut buf = sample();
        recompute(&mut buf, &EditState::default());
        assert_eq!(buf.current(), buf.original());
    }

    #[test]
    fn invert_runs_before_grayscale() {
        // invert then average: (255-30 + 255-60 + 255-91) / 3 = 194
        let mut buf = PixelBuffer::from_rgba(vec![30, 60, 91, 255], 1, 1).unwrap();
        let state = EditState { invert: true, grayscale: true, ..Default::default() };
        recompute(&mut buf, &state);
        assert_eq!(buf.current(), &[194, 194, 194, 255]);
    }

    #[test]
    fn scale_runs_after_filters() {
        let mut buf = PixelBuffer::from_rgba(vec![255, 255, 255, 255], 1, 1).unwrap();
        let state = EditState { invert: true, red_scale: 0.5, ..Default::default() };
        recompute(&mut buf, &state);
        assert_eq!(buf.current(), &[0, 0, 0, 255]);

        let state = EditState { red_scale: 0.5, ..Default::default() };
        recompute(&mut buf, &state);
        assert_eq!(buf.current(), &[127, 255, 255, 255]);
    }

    #[test]
    fn clamped_pulls_parameters_into_range() {
        let state = EditState {
            red_scale: 1.5,
            green_scale: -0.2,
            blue_scale: f32::NAN,
            rotation_degrees: 270.0,
            ..Default::default()
        }
        .clamped();
        assert_eq!(state.red_scale, 1.0);
        assert_eq!(state.green_scale, 0.0);
        assert_eq!(state.blue_scale, 1.0);
        assert_eq!(state.rotation_degrees, 180.0);
    }

    #[test]
    fn summary_lists_active_edits() {
        assert_eq!(EditState::default().summary(), "none");
        let state = EditState { blur: true, rotation_degrees: -15.0, ..Default::default() };
        assert_eq!(state.summary(), "blur, rotate(-15.0°)");
        assert!(!state.is_identity());
    }

    #[test]
    fn recompute_bumps_generation() {
        let mut buf = sample();
        let before = buf.generation();
        recompute(&mut buf, &EditState::default());
        assert!(buf.generation() > before);
    }
}
