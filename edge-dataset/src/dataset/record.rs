use crate::{common::*, processor::SampleTransform};

/// A normalized image, with or without ground truth.
///
/// Images are `3xHxW` and labels are `1xHxW`.
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    Labeled {
        image: Array3<f32>,
        label: Array3<f32>,
    },
    Unlabeled {
        image: Array3<f32>,
    },
}

impl Sample {
    pub fn image(&self) -> &Array3<f32> {
        match self {
            Self::Labeled { image, .. } | Self::Unlabeled { image } => image,
        }
    }

    pub fn has_label(&self) -> bool {
        matches!(self, Self::Labeled { .. })
    }

    /// The label, or an all-zero placeholder of the image size if the sample is unlabeled.
    pub fn label(&self) -> Cow<'_, Array3<f32>> {
        match self {
            Self::Labeled { label, .. } => Cow::Borrowed(label),
            Self::Unlabeled { image } => {
                let (_, height, width) = image.dim();
                Cow::Owned(SampleTransform::placeholder_label(height, width))
            }
        }
    }

    pub fn into_pair(self) -> (Array3<f32>, Array3<f32>) {
        match self {
            Self::Labeled { image, label } => (image, label),
            Self::Unlabeled { image } => {
                let (_, height, width) = image.dim();
                (image, SampleTransform::placeholder_label(height, width))
            }
        }
    }
}

/// The record produced by the evaluation dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct TestRecord {
    pub sample: Sample,
    /// The output file name, that is the image base name with `.png` extension.
    pub file_name: String,
    /// The `[height, width]` of the image before normalization.
    pub image_shape: [usize; 2],
}

/// The record produced by the training dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainRecord {
    pub image: Array3<f32>,
    pub label: Array3<f32>,
}

#[cfg(feature = "with-tch")]
mod with_tch {
    use super::*;

    /// Copy a `CxHxW` array into a float tensor on `device`.
    pub fn array_to_tensor(array: &Array3<f32>, device: Device) -> Result<Tensor> {
        let array = array.as_standard_layout();
        let shape: Vec<i64> = array.shape().iter().map(|&dim| dim as i64).collect();
        let values = array
            .as_slice()
            .ok_or_else(|| Error::Precondition("array is not contiguous".into()))?;
        let tensor = tch::no_grad(|| -> Result<_> {
            let tensor = Tensor::of_slice(values)
                .f_reshape(&shape)?
                .to_kind(Kind::Float)
                .to_device(device)
                .set_requires_grad(false);
            Ok(tensor)
        })?;
        Ok(tensor)
    }

    impl Sample {
        /// Convert into an `(image, label)` tensor pair.
        pub fn to_tensors(&self, device: Device) -> Result<(Tensor, Tensor)> {
            let image = array_to_tensor(self.image(), device)?;
            let label = array_to_tensor(&self.label(), device)?;
            Ok((image, label))
        }
    }

    impl TrainRecord {
        /// Convert into an `(image, label)` tensor pair.
        pub fn to_tensors(&self, device: Device) -> Result<(Tensor, Tensor)> {
            let image = array_to_tensor(&self.image, device)?;
            let label = array_to_tensor(&self.label, device)?;
            Ok((image, label))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn unlabeled_sample_to_tensors() {
            let sample = Sample::Unlabeled {
                image: Array3::from_elem((3, 32, 48), -1.5),
            };
            let (image, label) = sample.to_tensors(Device::Cpu).unwrap();
            assert_eq!(image.size(), vec![3, 32, 48]);
            assert_eq!(label.size(), vec![1, 32, 48]);
            assert_eq!(image.kind(), Kind::Float);
            assert_eq!(f64::from(label.abs().sum(Kind::Float)), 0.0);
        }
    }
}

#[cfg(feature = "with-tch")]
pub use with_tch::*;
