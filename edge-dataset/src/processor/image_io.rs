//! Image decoding and resizing on `HxWxC` byte arrays.

use crate::common::*;
use image::{imageops::FilterType, GrayImage, ImageBuffer, ImageError, RgbImage};

/// The color mode used to decode an image file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// Decode into 3 channels in BGR order.
    Color,
    /// Decode into a single luminance channel.
    Grayscale,
}

/// Decode an image file into an `HxWxC` array.
///
/// Color images are stored in BGR channel order, so per-channel means are
/// given in BGR order as well.
pub fn read_image(path: impl AsRef<Path>, mode: ColorMode) -> Result<Array3<u8>> {
    let path = path.as_ref();
    let decode_err = |source| Error::Decode {
        path: path.to_owned(),
        source,
    };

    let image = image::io::Reader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|err| decode_err(ImageError::IoError(err)))?
        .decode()
        .map_err(decode_err)?;

    let array = match mode {
        ColorMode::Color => {
            let rgb = image.to_rgb8();
            let (width, height) = rgb.dimensions();
            let bgr: Vec<u8> = rgb
                .into_raw()
                .chunks_exact(3)
                .flat_map(|pixel| [pixel[2], pixel[1], pixel[0]])
                .collect();
            Array3::from_shape_vec((height as usize, width as usize, 3), bgr)?
        }
        ColorMode::Grayscale => {
            let gray = image.to_luma8();
            let (width, height) = gray.dimensions();
            Array3::from_shape_vec((height as usize, width as usize, 1), gray.into_raw())?
        }
    };

    Ok(array)
}

/// Resize an `HxWxC` array to exactly `height`x`width` with bilinear
/// interpolation. Aspect ratio is not preserved.
pub fn resize_exact(array: ArrayView3<u8>, height: usize, width: usize) -> Result<Array3<u8>> {
    let (orig_h, orig_w, channels) = array.dim();

    if height == 0 || width == 0 {
        return Err(Error::Precondition(format!(
            "cannot resize to an empty size {}x{}",
            height, width
        )));
    }
    if (orig_h, orig_w) == (height, width) {
        return Ok(array.to_owned());
    }

    let raw = array.as_standard_layout().into_owned().into_raw_vec();
    let buffer_err = || {
        Error::Precondition(format!(
            "array of shape {:?} is not a valid image buffer",
            (orig_h, orig_w, channels)
        ))
    };

    let resized = match channels {
        1 => {
            let buffer: GrayImage = ImageBuffer::from_raw(orig_w as u32, orig_h as u32, raw)
                .ok_or_else(buffer_err)?;
            image::imageops::resize(&buffer, width as u32, height as u32, FilterType::Triangle)
                .into_raw()
        }
        3 => {
            let buffer: RgbImage = ImageBuffer::from_raw(orig_w as u32, orig_h as u32, raw)
                .ok_or_else(buffer_err)?;
            image::imageops::resize(&buffer, width as u32, height as u32, FilterType::Triangle)
                .into_raw()
        }
        _ => {
            return Err(Error::Precondition(format!(
                "only 1 or 3 channels can be resized, but get {}",
                channels
            )))
        }
    };

    Ok(Array3::from_shape_vec((height, width, channels), resized)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn decode_color_as_bgr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        RgbImage::from_pixel(5, 3, Rgb([200, 10, 0])).save(&path).unwrap();

        let array = read_image(&path, ColorMode::Color).unwrap();
        assert_eq!(array.dim(), (3, 5, 3));
        assert_eq!(array[[1, 2, 0]], 0);
        assert_eq!(array[[1, 2, 1]], 10);
        assert_eq!(array[[1, 2, 2]], 200);
    }

    #[test]
    fn decode_grayscale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edge.png");
        GrayImage::from_pixel(4, 6, Luma([255])).save(&path).unwrap();

        let array = read_image(&path, ColorMode::Grayscale).unwrap();
        assert_eq!(array.dim(), (6, 4, 1));
        assert!(array.iter().all(|&v| v == 255));
    }

    #[test]
    fn decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"not an image").unwrap();
        assert!(matches!(
            read_image(&path, ColorMode::Color),
            Err(Error::Decode { .. })
        ));
        assert!(matches!(
            read_image(dir.path().join("missing.png"), ColorMode::Color),
            Err(Error::Decode { .. })
        ));
    }

    #[test]
    fn resize_keeps_constant_values() {
        let array = Array3::from_elem((10, 7, 3), 42u8);
        let resized = resize_exact(array.view(), 16, 32).unwrap();
        assert_eq!(resized.dim(), (16, 32, 3));
        assert!(resized.iter().all(|&v| (41..=42).contains(&v)));

        let gray = Array3::from_elem((10, 7, 1), 255u8);
        let resized = resize_exact(gray.view(), 3, 3).unwrap();
        assert_eq!(resized.dim(), (3, 3, 1));
        assert!(resized.iter().all(|&v| v >= 254));
    }

    #[test]
    fn resize_rejects_unsupported_channels() {
        let array = Array3::<u8>::zeros((4, 4, 2));
        assert!(matches!(
            resize_exact(array.view(), 8, 8),
            Err(Error::Precondition(_))
        ));
    }
}
