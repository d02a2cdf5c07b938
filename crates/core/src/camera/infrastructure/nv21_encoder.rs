use ndarray::{ArrayView3, ShapeError};

/// Converts packed RGB (`height x width x 3`) to NV21 using BT.601
/// studio-swing coefficients.
///
/// Chroma is taken from the top-left pixel of each 2x2 block. Odd widths
/// and heights round the chroma plane up.
pub fn encode_nv21(rgb: ArrayView3<'_, u8>) -> Vec<u8> {
    let (height, width, _) = rgb.dim();
    let chroma_w = width.div_ceil(2);
    let chroma_h = height.div_ceil(2);

    let mut out = Vec::with_capacity(width * height + 2 * chroma_w * chroma_h);

    for row in 0..height {
        for col in 0..width {
            let (r, g, b) = pixel(&rgb, row, col);
            out.push(clamp(((66 * r + 129 * g + 25 * b + 128) >> 8) + 16));
        }
    }

    for row in (0..height).step_by(2) {
        for col in (0..width).step_by(2) {
            let (r, g, b) = pixel(&rgb, row, col);
            let v = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;
            let u = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
            out.push(clamp(v));
            out.push(clamp(u));
        }
    }

    out
}

/// Packed RGB bytes from an `image` buffer, viewed as `height x width x 3`.
pub fn encode_rgb_image(image: &image::RgbImage) -> Result<Vec<u8>, ShapeError> {
    let (width, height) = image.dimensions();
    let view = ArrayView3::from_shape((height as usize, width as usize, 3), image.as_raw())?;
    Ok(encode_nv21(view))
}

fn pixel(rgb: &ArrayView3<'_, u8>, row: usize, col: usize) -> (i32, i32, i32) {
    (
        rgb[[row, col, 0]] as i32,
        rgb[[row, col, 1]] as i32,
        rgb[[row, col, 2]] as i32,
    )
}

fn clamp(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame::ImageFormat;
    use ndarray::Array3;
    use rstest::rstest;

    fn solid(width: usize, height: usize, rgb: [u8; 3]) -> Array3<u8> {
        Array3::from_shape_fn((height, width, 3), |(_, _, c)| rgb[c])
    }

    #[rstest]
    #[case(2, 2)]
    #[case(4, 2)]
    #[case(3, 3)]
    #[case(5, 1)]
    fn test_output_length_matches_format(#[case] width: usize, #[case] height: usize) {
        let rgb = solid(width, height, [0, 0, 0]);
        let out = encode_nv21(rgb.view());
        assert_eq!(
            Some(out.len()),
            ImageFormat::Nv21.expected_len(width as u32, height as u32)
        );
    }

    #[test]
    fn test_white_maps_to_studio_white() {
        let out = encode_nv21(solid(2, 2, [255, 255, 255]).view());
        assert_eq!(out, vec![235, 235, 235, 235, 128, 128]);
    }

    #[test]
    fn test_black_maps_to_studio_black() {
        let out = encode_nv21(solid(2, 2, [0, 0, 0]).view());
        assert_eq!(out, vec![16, 16, 16, 16, 128, 128]);
    }

    #[test]
    fn test_blue_puts_v_before_u() {
        // Pure blue: V below neutral, U well above.
        let out = encode_nv21(solid(2, 2, [0, 0, 255]).view());
        let (v, u) = (out[4], out[5]);
        assert!(v < 128, "v = {v}");
        assert!(u > 200, "u = {u}");
    }

    #[test]
    fn test_encode_rgb_image_uses_row_major_layout() {
        let mut image = image::RgbImage::new(2, 2);
        image.put_pixel(1, 0, image::Rgb([255, 255, 255]));

        let out = encode_rgb_image(&image).unwrap();

        assert_eq!(&out[..4], &[16, 235, 16, 16]);
    }
}
