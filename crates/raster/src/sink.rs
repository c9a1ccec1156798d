//! Output sinks (§4.7's "Optional sinks: PPM and PNG serialization"). PPM needs no
//! extra dependency and always compiles; PNG is gated behind the `png` feature so a
//! caller that only wants raw `pixels` bytes doesn't pull in `image`.

use crate::buffer::PixelBuffer;

/// Encode as a binary (P6) PPM: a 24-bit RGB image, dropping alpha. Widely readable
/// without any decoder dependency, which is why the original engine kept it as the
/// always-available fallback sink alongside PNG.
pub fn to_ppm(buffer: &PixelBuffer) -> Vec<u8> {
    let header = format!("P6\n{} {}\n255\n", buffer.width, buffer.height);
    let mut out = Vec::with_capacity(header.len() + buffer.pixels.len() / 4 * 3);
    out.extend_from_slice(header.as_bytes());
    for pixel in buffer.pixels.chunks_exact(4) {
        out.push(pixel[0]);
        out.push(pixel[1]);
        out.push(pixel[2]);
    }
    out
}

#[cfg(feature = "png")]
pub fn to_png(buffer: &PixelBuffer) -> anyhow::Result<Vec<u8>> {
    use std::io::Cursor;

    let image = image::RgbaImage::from_raw(buffer.width, buffer.height, buffer.pixels.clone())
        .ok_or_else(|| anyhow::anyhow!("pixel buffer length does not match its declared width/height"))?;
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(image).write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use browser_core::Color;

    #[test]
    fn ppm_header_reports_the_buffer_dimensions() {
        let buffer = PixelBuffer::new(3, 2);
        let ppm = to_ppm(&buffer);
        assert!(ppm.starts_with(b"P6\n3 2\n255\n"));
    }

    #[test]
    fn ppm_body_drops_the_alpha_channel() {
        let mut buffer = PixelBuffer::new(1, 1);
        buffer.set(0, 0, Color::rgb(10, 20, 30));
        let ppm = to_ppm(&buffer);
        assert_eq!(&ppm[ppm.len() - 3..], &[10, 20, 30]);
    }

    #[cfg(feature = "png")]
    #[test]
    fn png_round_trips_buffer_dimensions() {
        let buffer = PixelBuffer::new(4, 4);
        let bytes = to_png(&buffer).expect("encoding should succeed");
        let decoded = image::load_from_memory(&bytes).expect("should decode the PNG we just wrote");
        assert_eq!(decoded.width(), 4);
        assert_eq!(decoded.height(), 4);
    }
}
