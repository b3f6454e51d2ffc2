//! Conversion of decoded samples into normalized arrays.

use crate::common::*;
use ndarray::ArrayView1;

/// The per-channel mean of ImageNet in BGR order.
pub const DEFAULT_MEAN_BGR: [f32; 3] = [103.939, 116.779, 123.68];

/// Normalizes decoded images and labels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleTransform {
    mean_bgr: [f32; 3],
}

impl Default for SampleTransform {
    fn default() -> Self {
        Self::new(DEFAULT_MEAN_BGR)
    }
}

impl SampleTransform {
    pub fn new(mean_bgr: [f32; 3]) -> Self {
        Self { mean_bgr }
    }

    /// Build from 3 BGR means, or 4 means where the trailing NIR mean is ignored.
    pub fn from_mean_pixel_values(values: &[f32]) -> Result<Self> {
        match *values {
            [b, g, r] | [b, g, r, _] => Ok(Self::new([b, g, r])),
            _ => Err(Error::Config(format!(
                "expect 3 or 4 mean pixel values, but get {}",
                values.len()
            ))),
        }
    }

    pub fn mean_bgr(&self) -> [f32; 3] {
        self.mean_bgr
    }

    /// Subtract the channel means from an `HxWx3` image and return a `3xHxW` array.
    ///
    /// Pixel values are not rescaled.
    pub fn image(&self, image: ArrayView3<u8>) -> Result<Array3<f32>> {
        let (_, _, channels) = image.dim();
        if channels != 3 {
            return Err(Error::Precondition(format!(
                "image must have 3 channels, but get {}",
                channels
            )));
        }

        let mut image = image.mapv(f32::from);
        image -= &ArrayView1::from(&self.mean_bgr[..]);

        Ok(image
            .permuted_axes([2, 0, 1])
            .as_standard_layout()
            .into_owned())
    }

    /// Scale an `HxWxC` label into a `1xHxW` array in range [0, 1].
    ///
    /// Only the first channel of a 3-channel label is kept.
    pub fn label(&self, label: ArrayView3<u8>) -> Result<Array3<f32>> {
        let (_, _, channels) = label.dim();
        if channels != 1 && channels != 3 {
            return Err(Error::Precondition(format!(
                "label must have 1 or 3 channels, but get {}",
                channels
            )));
        }

        let label = label
            .index_axis(Axis(2), 0)
            .mapv(|value| f32::from(value) / 255.0)
            .insert_axis(Axis(0));
        Ok(label)
    }

    /// An all-zero `1xHxW` label for samples without ground truth.
    pub fn placeholder_label(height: usize, width: usize) -> Array3<f32> {
        Array3::zeros((1, height, width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn image_is_centered_and_channel_first() {
        let transform = SampleTransform::new([10.0, 20.0, 30.0]);
        let image = Array3::from_shape_fn((2, 3, 3), |(row, col, ch)| {
            (row * 100 + col * 10 + ch) as u8
        });

        let output = transform.image(image.view()).unwrap();
        assert_eq!(output.dim(), (3, 2, 3));
        assert!(output.is_standard_layout());

        for ((ch, row, col), &value) in output.indexed_iter() {
            let expect = (row * 100 + col * 10 + ch) as f32 - [10.0, 20.0, 30.0][ch];
            assert_abs_diff_eq!(value, expect);
        }
    }

    #[test]
    fn image_values_are_not_rescaled() {
        let transform = SampleTransform::new([0.0; 3]);
        let image = Array3::from_elem((1, 1, 3), 255u8);
        let output = transform.image(image.view()).unwrap();
        assert!(output.iter().all(|&value| value == 255.0));
    }

    #[test]
    fn reject_non_color_image() {
        let image = Array3::<u8>::zeros((4, 4, 1));
        assert!(matches!(
            SampleTransform::default().image(image.view()),
            Err(Error::Precondition(_))
        ));
    }

    #[test]
    fn label_extremes() {
        let transform = SampleTransform::default();

        let ones = transform
            .label(Array3::from_elem((4, 5, 1), 255u8).view())
            .unwrap();
        assert_eq!(ones.dim(), (1, 4, 5));
        assert!(ones.iter().all(|&value| value == 1.0));

        let zeros = transform
            .label(Array3::from_elem((4, 5, 1), 0u8).view())
            .unwrap();
        assert!(zeros.iter().all(|&value| value == 0.0));
    }

    #[test]
    fn label_keeps_first_channel_in_unit_range() {
        let label = Array3::from_shape_fn((16, 16, 3), |(row, col, ch)| {
            if ch == 0 {
                (row * 16 + col) as u8
            } else {
                255
            }
        });
        let output = SampleTransform::default().label(label.view()).unwrap();

        assert_eq!(output.dim(), (1, 16, 16));
        assert!(output.iter().all(|&value| (0.0..=1.0).contains(&value)));
        assert_abs_diff_eq!(output[[0, 0, 0]], 0.0);
        assert_abs_diff_eq!(output[[0, 15, 15]], 1.0);
        assert_abs_diff_eq!(output[[0, 1, 0]], 16.0 / 255.0);
    }

    #[test]
    fn placeholder_is_zero() {
        let label = SampleTransform::placeholder_label(304, 464);
        assert_eq!(label.dim(), (1, 304, 464));
        assert!(label.iter().all(|&value| value == 0.0));
    }

    #[test]
    fn mean_pixel_values() {
        let transform = SampleTransform::from_mean_pixel_values(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(transform.mean_bgr(), [1.0, 2.0, 3.0]);
        assert!(SampleTransform::from_mean_pixel_values(&[1.0, 2.0]).is_err());
    }
}
