use crate::error::ConvertError;
use color_quant::NeuQuant;
use image::{ImageFormat, Rgba, RgbaImage, imageops};
use std::borrow::Cow;

/// NeuQuant sampling factor: 1 is slowest and best, 30 fastest
const QUANT_SAMPLE: i32 = 10;
const PALETTE_SIZE: usize = 256;

/// Assemble PNG frames into a looping animated GIF.
///
/// Frames of differing sizes are placed top-left on a white canvas as
/// large as the largest frame. All frames share one palette learned from
/// every frame together, so a color maps to the same entry in each frame.
pub fn encode_animation(frames: &[Vec<u8>], delay_ms: u32) -> Result<Vec<u8>, ConvertError> {
    if frames.is_empty() {
        return Err(ConvertError::NoFrames);
    }

    let images = frames
        .iter()
        .map(|png| image::load_from_memory_with_format(png, ImageFormat::Png).map(|i| i.to_rgba8()))
        .collect::<Result<Vec<_>, _>>()?;

    let width = images.iter().map(|i| i.width()).max().unwrap_or(1);
    let height = images.iter().map(|i| i.height()).max().unwrap_or(1);
    let (Ok(gif_w), Ok(gif_h)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(ConvertError::FrameTooLarge { width, height });
    };

    let padded: Vec<RgbaImage> = images
        .into_iter()
        .map(|img| {
            if img.dimensions() == (width, height) {
                img
            } else {
                let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
                imageops::overlay(&mut canvas, &img, 0, 0);
                canvas
            }
        })
        .collect();

    // Train on all frames stacked into one pixel buffer
    let stacked: Vec<u8> = padded.iter().flat_map(|img| img.as_raw().iter().copied()).collect();
    let quant = NeuQuant::new(QUANT_SAMPLE, PALETTE_SIZE, &stacked);
    let palette = quant.color_map_rgb();

    // GIF delays are in hundredths of a second
    let delay = u16::try_from(delay_ms / 10).unwrap_or(u16::MAX);

    let mut out = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut out, gif_w, gif_h, &palette)?;
        encoder.set_repeat(gif::Repeat::Infinite)?;
        for img in &padded {
            let indices: Vec<u8> = img
                .as_raw()
                .chunks_exact(4)
                .map(|px| quant.index_of(px) as u8)
                .collect();
            let frame = gif::Frame {
                width: gif_w,
                height: gif_h,
                delay,
                buffer: Cow::Owned(indices),
                ..gif::Frame::default()
            };
            encoder.write_frame(&frame)?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::AnimationDecoder;
    use image::codecs::gif::GifDecoder;
    use std::io::Cursor;

    fn encode_png(img: &RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        encode_png(&RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    fn decode(gif: Vec<u8>) -> Vec<image::Frame> {
        GifDecoder::new(Cursor::new(gif))
            .unwrap()
            .into_frames()
            .collect_frames()
            .unwrap()
    }

    fn close(actual: [u8; 4], expected: [u8; 4]) -> bool {
        actual
            .iter()
            .zip(expected.iter())
            .all(|(a, e)| a.abs_diff(*e) <= 8)
    }

    #[test]
    fn test_no_frames() {
        assert!(matches!(
            encode_animation(&[], 250),
            Err(ConvertError::NoFrames)
        ));
    }

    #[test]
    fn test_frames_padded_to_largest() {
        let frames = vec![png(4, 2, [0, 0, 0, 255]), png(2, 6, [255, 0, 0, 255])];
        let decoded = decode(encode_animation(&frames, 250).unwrap());
        assert_eq!(decoded.len(), 2);

        let first = decoded[0].buffer();
        assert_eq!(first.dimensions(), (4, 6));
        // Padding below the first frame is white
        assert!(close(first.get_pixel(0, 5).0, [255, 255, 255, 255]));
        assert!(close(first.get_pixel(0, 0).0, [0, 0, 0, 255]));
        let (numer, denom) = decoded[1].delay().numer_denom_ms();
        assert_eq!(numer / denom, 250);
    }

    #[test]
    fn test_color_stable_across_frames() {
        let tint = Rgba([255, 178, 153, 255]);

        // A busy frame and a plain one sharing the same tinted block
        let mut busy = RgbaImage::from_fn(64, 64, |x, y| {
            Rgba([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8, 255])
        });
        let mut plain = RgbaImage::from_pixel(64, 64, Rgba([255, 255, 255, 255]));
        for y in 0..8 {
            for x in 0..8 {
                busy.put_pixel(x, y, tint);
                plain.put_pixel(x, y, tint);
            }
        }

        let gif = encode_animation(&[encode_png(&busy), encode_png(&plain)], 100).unwrap();
        let decoded = decode(gif);
        let a = decoded[0].buffer().get_pixel(2, 2).0;
        let b = decoded[1].buffer().get_pixel(2, 2).0;
        assert_eq!(a, b);
    }

    #[test]
    fn test_loops_forever() {
        let gif = encode_animation(&[png(1, 1, [0, 0, 0, 255])], 100).unwrap();
        assert!(gif.starts_with(b"GIF89a"));
        // NETSCAPE2.0 application extension marks a looping animation
        assert!(gif.windows(11).any(|w| w == b"NETSCAPE2.0"));
    }

    #[test]
    fn test_rejects_non_png() {
        assert!(encode_animation(&[b"nope".to_vec()], 100).is_err());
    }
}
