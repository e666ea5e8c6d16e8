mod common;

use common::synthetic_image::{buffer, pixel_at, rgba_from_fn, test_card};
use pngeditor::display::{DisplayError, TextureSink};
use pngeditor::ops::adjustments;
use pngeditor::ops::filters::{self, Kernel};
use pngeditor::ops::pipeline::{recompute, recompute_and_present, EditState};

const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

fn every_flag() -> EditState {
    EditState {
        invert: true,
        grayscale: true,
        blur: true,
        sharpen: true,
        red_scale: 0.8,
        green_scale: 0.6,
        blue_scale: 0.4,
        rotation_degrees: 33.0,
    }
}

#[test]
fn recompute_is_idempotent() {
    let mut buf = buffer(17, 11, test_card(17, 11));
    let state = every_flag();
    recompute(&mut buf, &state);
    let first = buf.current().to_vec();
    recompute(&mut buf, &state);
    assert_eq!(buf.current(), first.as_slice());
}

#[test]
fn toggle_order_does_not_matter() {
    let bytes = test_card(9, 7);

    let mut a = buffer(9, 7, bytes.clone());
    let mut state_a = EditState::default();
    state_a.invert = true;
    recompute(&mut a, &state_a);
    state_a.grayscale = true;
    recompute(&mut a, &state_a);

    let mut b = buffer(9, 7, bytes);
    let mut state_b = EditState::default();
    state_b.grayscale = true;
    recompute(&mut b, &state_b);
    state_b.invert = true;
    recompute(&mut b, &state_b);

    assert_eq!(state_a, state_b);
    assert_eq!(a.current(), b.current());
}

#[test]
fn neutral_state_restores_original_after_edits() {
    let mut buf = buffer(12, 12, test_card(12, 12));
    recompute(&mut buf, &every_flag());
    assert_ne!(buf.current(), buf.original());

    buf.reset();
    recompute(&mut buf, &EditState::default());
    assert_eq!(buf.current(), buf.original());
}

#[test]
fn invert_toggled_on_then_off_returns_to_original() {
    let mut buf = buffer(6, 4, test_card(6, 4));
    let inverted = EditState { invert: true, ..Default::default() };
    recompute(&mut buf, &inverted);
    for (out, orig) in buf.current().chunks(4).zip(buf.original().chunks(4)) {
        assert_eq!(out[0], 255 - orig[0]);
        assert_eq!(out[3], orig[3]);
    }
    recompute(&mut buf, &EditState::default());
    assert_eq!(buf.current(), buf.original());
}

#[test]
fn invert_twice_is_identity() {
    let mut buf = buffer(5, 5, test_card(5, 5));
    adjustments::invert_colors(&mut buf);
    adjustments::invert_colors(&mut buf);
    assert_eq!(buf.current(), buf.original());
}

#[test]
fn grayscale_is_a_fixpoint() {
    let mut buf = buffer(8, 8, test_card(8, 8));
    recompute(&mut buf, &EditState { grayscale: true, ..Default::default() });
    for px in buf.current().chunks(4) {
        assert!(px[0] == px[1] && px[1] == px[2]);
    }
    let once = buf.current().to_vec();
    adjustments::grayscale(&mut buf);
    assert_eq!(buf.current(), once.as_slice());
}

#[test]
fn convolution_leaves_the_outer_ring_alone() {
    let bytes = test_card(7, 5);
    for kernel in [Kernel::BOX_BLUR, Kernel::SHARPEN, Kernel::new([[-3.0; 3]; 3])] {
        let mut buf = buffer(7, 5, bytes.clone());
        filters::apply_kernel(&mut buf, &kernel);
        for y in 0..5 {
            for x in 0..7 {
                if x == 0 || y == 0 || x == 6 || y == 4 {
                    let i = (y * 7 + x) * 4;
                    assert_eq!(&buf.current()[i..i + 4], &bytes[i..i + 4]);
                }
            }
        }
    }
}

#[test]
fn sharpen_saturates_at_the_channel_limits() {
    let mut white = buffer(3, 3, rgba_from_fn(3, 3, |_, _| WHITE));
    filters::sharpen(&mut white);
    assert_eq!(pixel_at(&white, 1, 1), WHITE);

    let mut black = buffer(3, 3, rgba_from_fn(3, 3, |_, _| BLACK));
    filters::sharpen(&mut black);
    assert_eq!(pixel_at(&black, 1, 1), BLACK);
}

#[test]
fn out_of_range_sums_clamp_exactly() {
    let mut buf = buffer(3, 3, rgba_from_fn(3, 3, |x, y| if (x, y) == (1, 1) { WHITE } else { BLACK }));
    filters::apply_kernel(&mut buf, &Kernel::new([[0.0, 0.0, 0.0], [0.0, 20.0, 0.0], [0.0, 0.0, 0.0]]));
    assert_eq!(pixel_at(&buf, 1, 1), WHITE);

    let mut buf = buffer(3, 3, rgba_from_fn(3, 3, |_, _| WHITE));
    filters::apply_kernel(&mut buf, &Kernel::new([[-1.0; 3]; 3]));
    assert_eq!(pixel_at(&buf, 1, 1), BLACK);
}

#[test]
fn white_box_blur_scenario() {
    let mut buf = buffer(3, 3, rgba_from_fn(3, 3, |_, _| WHITE));
    recompute(&mut buf, &EditState { blur: true, ..Default::default() });
    assert_eq!(buf.current(), buf.original());
}

#[test]
fn black_centre_sharpen_scenario() {
    let mut buf = buffer(3, 3, rgba_from_fn(3, 3, |x, y| if (x, y) == (1, 1) { BLACK } else { WHITE }));
    recompute(&mut buf, &EditState { sharpen: true, ..Default::default() });
    // (8 * 255 * 0.25 + 0 * 7) / 9 = 56.67, truncated
    assert_eq!(pixel_at(&buf, 1, 1), [56, 56, 56, 255]);
    assert_eq!(pixel_at(&buf, 0, 0), WHITE);
}

#[test]
fn rotation_keeps_the_canvas_size() {
    let mut buf = buffer(10, 4, test_card(10, 4));
    recompute(&mut buf, &EditState { rotation_degrees: -30.0, ..Default::default() });
    assert_eq!((buf.width(), buf.height()), (10, 4));
    assert_eq!(buf.current().len(), buf.original().len());
    assert_eq!(pixel_at(&buf, 0, 0), [0, 0, 0, 0]);
}

// ============================================================================
// Display seam
// ============================================================================

/// Records every call instead of talking to a GPU.
#[derive(Default)]
struct RecordingSink {
    uploads: usize,
    updates: Vec<Vec<u8>>,
}

impl TextureSink for RecordingSink {
    type Handle = u32;

    fn upload_texture(&mut self, _w: u32, _h: u32, _rgba: &[u8]) -> Result<u32, DisplayError> {
        self.uploads += 1;
        Ok(7)
    }

    fn update_texture(
        &mut self,
        handle: &mut u32,
        _w: u32,
        _h: u32,
        rgba: &[u8],
    ) -> Result<(), DisplayError> {
        assert_eq!(*handle, 7);
        self.updates.push(rgba.to_vec());
        Ok(())
    }
}

#[test]
fn present_updates_the_texture_once_with_final_bytes() {
    let mut buf = buffer(6, 6, test_card(6, 6));
    let mut sink = RecordingSink::default();
    let mut handle = sink.upload_texture(6, 6, buf.current()).unwrap();

    recompute_and_present(&mut buf, &every_flag(), &mut sink, &mut handle).unwrap();

    assert_eq!(sink.uploads, 1);
    assert_eq!(sink.updates.len(), 1);
    assert_eq!(sink.updates[0].as_slice(), buf.current());
}
