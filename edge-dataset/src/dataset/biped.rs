use super::*;
use crate::{
    common::*,
    processor::{read_image, ColorMode, GeometryPolicy, SampleTransform},
};

/// Options to build a [BipedDataset].
#[derive(Debug, Clone, PartialEq)]
pub struct BipedDatasetInit {
    pub data_root: PathBuf,
    pub img_height: usize,
    pub img_width: usize,
    pub mean_bgr: [f32; 3],
    pub train_mode: TrainMode,
    pub dataset_type: DatasetType,
    /// Take random square crops instead of resizing to `img_height`x`img_width`.
    pub crop_img: bool,
    /// Sort directory entries by path to get a reproducible sample order.
    pub sort_entries: bool,
}

impl BipedDatasetInit {
    pub fn new(data_root: impl Into<PathBuf>, img_height: usize, img_width: usize) -> Self {
        Self {
            data_root: data_root.into(),
            img_height,
            img_width,
            mean_bgr: crate::processor::DEFAULT_MEAN_BGR,
            train_mode: TrainMode::Train,
            dataset_type: DatasetType::Rgbr,
            crop_img: false,
            sort_entries: false,
        }
    }

    pub fn build(self) -> Result<BipedDataset> {
        let Self {
            data_root,
            img_height,
            img_width,
            mean_bgr,
            train_mode,
            dataset_type,
            crop_img,
            sort_entries,
        } = self;

        if img_height == 0 || img_width == 0 {
            return Err(Error::Config(format!(
                "image size must be positive, but get {}x{}",
                img_height, img_width
            )));
        }

        let pairs = scan_augmented_tree(&data_root, train_mode, dataset_type, sort_entries)?;
        info!(
            "indexed {} augmented {} samples in '{}'",
            pairs.len(),
            train_mode,
            data_root.display()
        );

        Ok(BipedDataset {
            pairs,
            policy: GeometryPolicy::training(img_height, img_width, crop_img),
            transform: SampleTransform::new(mean_bgr),
        })
    }
}

/// The augmented BIPED training dataset.
#[derive(Debug, Clone)]
pub struct BipedDataset {
    pairs: Vec<SamplePair>,
    policy: GeometryPolicy,
    transform: SampleTransform,
}

impl BipedDataset {
    pub fn pairs(&self) -> &[SamplePair] {
        &self.pairs
    }

    pub fn policy(&self) -> GeometryPolicy {
        self.policy
    }

    /// Load the sample at `index`, drawing crop locations from `rng`.
    pub fn get_with_rng<R>(&self, index: usize, rng: &mut R) -> Result<TrainRecord>
    where
        R: Rng + ?Sized,
    {
        check_index(index, self.size())?;
        let SamplePair {
            image: image_path,
            label: label_path,
        } = &self.pairs[index];

        let image = read_image(image_path, ColorMode::Color)?;
        let label = read_image(label_path, ColorMode::Grayscale)?;
        let (height, width, _) = image.dim();

        let op = self.policy.plan(height, width, rng)?;
        let (image, label) = op.apply_pair(image.view(), Some(label.view()))?;
        let label = label.ok_or_else(|| {
            Error::Precondition(format!("label of '{}' is lost", image_path.display()))
        })?;

        debug!(
            "loaded '{}' of size {}x{} with {:?}",
            image_path.display(),
            height,
            width,
            op
        );

        Ok(TrainRecord {
            image: self.transform.image(image.view())?,
            label: self.transform.label(label.view())?,
        })
    }
}

impl RandomAccessDataset for BipedDataset {
    type Record = TrainRecord;

    fn size(&self) -> usize {
        self.pairs.len()
    }

    fn get(&self, index: usize) -> Result<TrainRecord> {
        self.get_with_rng(index, &mut rand::thread_rng())
    }
}
