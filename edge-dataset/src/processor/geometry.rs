//! Resizing and cropping rules that keep spatial sizes compatible with the
//! downsampling stride of the network.

use super::image_io::resize_exact;
use crate::common::*;

/// The downsampling stride of the network. Spatial sizes of evaluation inputs
/// are multiples of it.
pub const STRIDE: usize = 16;
/// Evaluation images smaller than this on either axis are resized to
/// `MIN_SIZE`x`MIN_SIZE`.
pub const MIN_SIZE: usize = 512;
/// The crop size used when the configured image is not square.
pub const FALLBACK_CROP_SIZE: usize = 400;

/// Round `len` up to the next multiple of [STRIDE]. Multiples are unchanged.
pub fn round_up_to_stride(len: usize) -> usize {
    if len % STRIDE == 0 {
        len
    } else {
        (len / STRIDE + 1) * STRIDE
    }
}

/// The rule that decides the output geometry of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryPolicy {
    /// Round both axes up to the stride. Used for unlabeled inference images.
    RoundUp,
    /// Enforce the `MIN_SIZE` floor first, then round up to the stride.
    FloorThenRoundUp,
    /// Take a square crop at a uniformly random location.
    RandomCrop { size: usize },
    /// Resize to a fixed size, ignoring aspect ratio.
    Resize { height: usize, width: usize },
}

impl GeometryPolicy {
    /// The policy of the augmented training loader.
    pub fn training(img_height: usize, img_width: usize, crop_img: bool) -> Self {
        if crop_img {
            let size = if img_height == img_width {
                img_height
            } else {
                FALLBACK_CROP_SIZE
            };
            Self::RandomCrop { size }
        } else {
            Self::Resize {
                height: img_height,
                width: img_width,
            }
        }
    }

    /// Decide the operation for an input of `height`x`width`.
    pub fn plan<R>(&self, height: usize, width: usize, rng: &mut R) -> Result<GeometryOp>
    where
        R: Rng + ?Sized,
    {
        let op = match *self {
            Self::RoundUp => {
                GeometryOp::resize_or_keep([height, width], [
                    round_up_to_stride(height),
                    round_up_to_stride(width),
                ])
            }
            Self::FloorThenRoundUp => {
                if height < MIN_SIZE || width < MIN_SIZE {
                    GeometryOp::Resize {
                        height: MIN_SIZE,
                        width: MIN_SIZE,
                    }
                } else {
                    GeometryOp::resize_or_keep([height, width], [
                        round_up_to_stride(height),
                        round_up_to_stride(width),
                    ])
                }
            }
            Self::RandomCrop { size } => {
                if size == 0 || height < size || width < size {
                    return Err(Error::Precondition(format!(
                        "crop size {} does not fit in image of size {}x{}",
                        size, height, width
                    )));
                }
                GeometryOp::Crop {
                    top: rng.gen_range(0..=(height - size)),
                    left: rng.gen_range(0..=(width - size)),
                    size,
                }
            }
            Self::Resize {
                height: new_h,
                width: new_w,
            } => GeometryOp::resize_or_keep([height, width], [new_h, new_w]),
        };

        Ok(op)
    }
}

/// A planned geometry operation, applied identically to an image and its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryOp {
    Keep,
    Resize { height: usize, width: usize },
    Crop { top: usize, left: usize, size: usize },
}

impl GeometryOp {
    fn resize_or_keep([height, width]: [usize; 2], [new_h, new_w]: [usize; 2]) -> Self {
        if (height, width) == (new_h, new_w) {
            Self::Keep
        } else {
            Self::Resize {
                height: new_h,
                width: new_w,
            }
        }
    }

    /// The `[height, width]` after applying the operation on an input of the given size.
    pub fn output_size(&self, height: usize, width: usize) -> [usize; 2] {
        match *self {
            Self::Keep => [height, width],
            Self::Resize { height, width } => [height, width],
            Self::Crop { size, .. } => [size, size],
        }
    }

    /// Apply the operation on an image and its optional label.
    ///
    /// Crops take the same window from both arrays, which must then have the
    /// same spatial size. Otherwise the label is resized to the output size of
    /// the image.
    pub fn apply_pair(
        &self,
        image: ArrayView3<u8>,
        label: Option<ArrayView3<u8>>,
    ) -> Result<(Array3<u8>, Option<Array3<u8>>)> {
        let (image_h, image_w, _) = image.dim();
        let output = self.apply(image)?;
        let (out_h, out_w, _) = output.dim();

        let label = label
            .map(|label| match self {
                Self::Crop { .. } => {
                    let (label_h, label_w, _) = label.dim();
                    if (label_h, label_w) != (image_h, image_w) {
                        return Err(Error::Precondition(format!(
                            "label size {}x{} differs from image size {}x{}",
                            label_h, label_w, image_h, image_w
                        )));
                    }
                    self.apply(label)
                }
                _ => resize_exact(label, out_h, out_w),
            })
            .transpose()?;

        Ok((output, label))
    }

    /// Apply the operation on an `HxWxC` array.
    pub fn apply(&self, array: ArrayView3<u8>) -> Result<Array3<u8>> {
        match *self {
            Self::Keep => Ok(array.to_owned()),
            Self::Resize { height, width } => resize_exact(array, height, width),
            Self::Crop { top, left, size } => {
                let (height, width, _) = array.dim();
                if top + size > height || left + size > width {
                    return Err(Error::Precondition(format!(
                        "crop window ({}, {}, {}) exceeds image of size {}x{}",
                        top, left, size, height, width
                    )));
                }
                Ok(array
                    .slice(s![top..(top + size), left..(left + size), ..])
                    .to_owned())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(policy: GeometryPolicy, height: usize, width: usize) -> Result<GeometryOp> {
        policy.plan(height, width, &mut StdRng::seed_from_u64(0))
    }

    #[test]
    fn round_up() {
        assert_eq!(round_up_to_stride(300), 304);
        assert_eq!(round_up_to_stride(450), 464);
        assert_eq!(round_up_to_stride(512), 512);
        assert_eq!(round_up_to_stride(513), 528);
        assert_eq!(round_up_to_stride(1), 16);
    }

    #[test]
    fn inference_rounds_up_per_axis() {
        let op = plan(GeometryPolicy::RoundUp, 300, 450).unwrap();
        assert_eq!(
            op,
            GeometryOp::Resize {
                height: 304,
                width: 464
            }
        );
        assert_eq!(op.output_size(300, 450), [304, 464]);

        // no minimum floor for unlabeled inference
        assert_eq!(plan(GeometryPolicy::RoundUp, 32, 64).unwrap(), GeometryOp::Keep);
    }

    #[test]
    fn small_inputs_are_resized_to_floor() {
        for (height, width) in [(100, 100), (511, 2000), (2000, 511), (321, 481), (496, 512)] {
            let op = plan(GeometryPolicy::FloorThenRoundUp, height, width).unwrap();
            assert_eq!(op.output_size(height, width), [MIN_SIZE, MIN_SIZE]);
        }
    }

    #[test]
    fn large_inputs_round_up_to_stride() {
        for height in (512..600).step_by(7) {
            for width in (512..1300).step_by(97) {
                let op = plan(GeometryPolicy::FloorThenRoundUp, height, width).unwrap();
                let [out_h, out_w] = op.output_size(height, width);

                assert_eq!(out_h % STRIDE, 0);
                assert_eq!(out_w % STRIDE, 0);
                assert!(out_h >= height && out_h < height + STRIDE);
                assert!(out_w >= width && out_w < width + STRIDE);

                if height % STRIDE == 0 && width % STRIDE == 0 {
                    assert_eq!(op, GeometryOp::Keep);
                }
            }
        }
    }

    #[test]
    fn training_crop_size() {
        assert_eq!(
            GeometryPolicy::training(352, 352, true),
            GeometryPolicy::RandomCrop { size: 352 }
        );
        assert_eq!(
            GeometryPolicy::training(720, 1280, true),
            GeometryPolicy::RandomCrop {
                size: FALLBACK_CROP_SIZE
            }
        );
        assert_eq!(
            GeometryPolicy::training(720, 1280, false),
            GeometryPolicy::Resize {
                height: 720,
                width: 1280
            }
        );
    }

    #[test]
    fn crop_larger_than_image() {
        let policy = GeometryPolicy::RandomCrop { size: 400 };
        assert!(matches!(
            plan(policy, 380, 500),
            Err(Error::Precondition(_))
        ));
        assert!(matches!(
            plan(policy, 500, 399),
            Err(Error::Precondition(_))
        ));
        assert_eq!(
            plan(policy, 400, 400).unwrap(),
            GeometryOp::Crop {
                top: 0,
                left: 0,
                size: 400
            }
        );
    }

    #[test]
    fn crop_stays_inside_image() {
        let policy = GeometryPolicy::RandomCrop { size: 8 };
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            match policy.plan(10, 20, &mut rng).unwrap() {
                GeometryOp::Crop { top, left, size } => {
                    assert!(top + size <= 10);
                    assert!(left + size <= 20);
                }
                op => panic!("unexpected op {:?}", op),
            }
        }
    }

    #[test]
    fn apply_crop_copies_window() {
        let array = Array3::from_shape_fn((6, 6, 1), |(row, col, _)| (row * 6 + col) as u8);
        let op = GeometryOp::Crop {
            top: 2,
            left: 1,
            size: 3,
        };
        let cropped = op.apply(array.view()).unwrap();
        assert_eq!(cropped.dim(), (3, 3, 1));
        assert_eq!(cropped[[0, 0, 0]], 13);
        assert_eq!(cropped[[2, 2, 0]], 27);
    }

    #[test]
    fn apply_pair_matches_label_to_image() {
        let image = Array3::from_elem((300, 450, 3), 7u8);
        let label = Array3::from_elem((150, 225, 1), 255u8);
        let op = plan(GeometryPolicy::FloorThenRoundUp, 300, 450).unwrap();

        let (image, label) = op.apply_pair(image.view(), Some(label.view())).unwrap();
        let label = label.unwrap();
        assert_eq!(image.dim(), (512, 512, 3));
        assert_eq!(label.dim(), (512, 512, 1));
    }

    #[test]
    fn apply_pair_crop_requires_equal_sizes() {
        let image = Array3::<u8>::zeros((20, 20, 3));
        let label = Array3::<u8>::zeros((10, 20, 1));
        let op = GeometryOp::Crop {
            top: 0,
            left: 0,
            size: 8,
        };
        assert!(matches!(
            op.apply_pair(image.view(), Some(label.view())),
            Err(Error::Precondition(_))
        ));

        let (image, label) = op.apply_pair(image.view(), None).unwrap();
        assert_eq!(image.dim(), (8, 8, 3));
        assert!(label.is_none());
    }
}
