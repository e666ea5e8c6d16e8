use pngeditor::canvas::PixelBuffer;

/// Fill a `width`×`height` RGBA image pixel by pixel.
pub fn rgba_from_fn(width: u32, height: u32, pixel: impl Fn(u32, u32) -> [u8; 4]) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let mut bytes = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            bytes.extend_from_slice(&pixel(x, y));
        }
    }
    bytes
}

/// A colourful test card: every channel varies, alpha included.
pub fn test_card(width: u32, height: u32) -> Vec<u8> {
    rgba_from_fn(width, height, |x, y| {
        [
            (x * 37 % 256) as u8,
            (y * 53 % 256) as u8,
            ((x + y) * 29 % 256) as u8,
            (128 + (x * y) % 128) as u8,
        ]
    })
}

pub fn buffer(width: u32, height: u32, bytes: Vec<u8>) -> PixelBuffer {
    PixelBuffer::from_rgba(bytes, width, height).expect("synthetic image has valid dimensions")
}

pub fn pixel_at(buf: &PixelBuffer, x: u32, y: u32) -> [u8; 4] {
    let i = (y as usize * buf.width() as usize + x as usize) * 4;
    let p = &buf.current()[i..i + 4];
    [p[0], p[1], p[2], p[3]]
}
