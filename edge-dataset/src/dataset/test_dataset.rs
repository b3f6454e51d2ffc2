use super::*;
use crate::{
    common::*,
    config::{DatasetConfig, DatasetName},
    processor::{read_image, ColorMode, GeometryPolicy, SampleTransform},
};

/// Options to build a [TestDataset].
#[derive(Debug, Clone, PartialEq)]
pub struct TestDatasetInit {
    pub data_root: PathBuf,
    /// The dataset name, for example `BIPED` or `CLASSIC`.
    pub name: String,
    pub mean_bgr: [f32; 3],
    /// The list file relative to `data_root`. Required by all labeled datasets.
    pub test_list: Option<PathBuf>,
    /// Sort directory entries of unlabeled datasets by path.
    pub sort_entries: bool,
}

impl TestDatasetInit {
    pub fn from_config(config: &DatasetConfig, mean_bgr: [f32; 3]) -> Self {
        Self {
            data_root: config.data_dir.clone(),
            name: config.name.to_string(),
            mean_bgr,
            test_list: config.test_list.clone(),
            sort_entries: false,
        }
    }

    pub fn build(self) -> Result<TestDataset> {
        let Self {
            data_root,
            name,
            mean_bgr,
            test_list,
            sort_entries,
        } = self;
        let name = DatasetName::parse(&name)?;

        let (image_dir, label_dir) = match name {
            DatasetName::Biped => (
                data_root.join("imgs").join("test"),
                data_root.join("edge_maps").join("test"),
            ),
            _ => (data_root.clone(), data_root.clone()),
        };

        let index = if name.is_unlabeled() {
            SampleIndex::Unlabeled(scan_image_dir(&data_root, sort_entries)?)
        } else {
            let test_list = test_list.ok_or_else(|| {
                Error::Config(format!("test list not provided for dataset {}", name))
            })?;
            SampleIndex::Labeled(load_list_file(data_root.join(test_list))?)
        };

        info!(
            "indexed {} samples of dataset {} in '{}'",
            index.len(),
            name,
            data_root.display()
        );

        Ok(TestDataset {
            name,
            image_dir,
            label_dir,
            index,
            transform: SampleTransform::new(mean_bgr),
        })
    }
}

/// The evaluation dataset.
///
/// Labeled datasets are indexed by a list file. The unlabeled `CLASSIC`
/// dataset indexes every file in the data root.
#[derive(Debug, Clone)]
pub struct TestDataset {
    name: DatasetName,
    image_dir: PathBuf,
    label_dir: PathBuf,
    index: SampleIndex,
    transform: SampleTransform,
}

impl TestDataset {
    pub fn name(&self) -> DatasetName {
        self.name
    }

    pub fn index(&self) -> &SampleIndex {
        &self.index
    }

    pub fn mean_bgr(&self) -> [f32; 3] {
        self.transform.mean_bgr()
    }
}

impl RandomAccessDataset for TestDataset {
    type Record = TestRecord;

    fn size(&self) -> usize {
        self.index.len()
    }

    fn get(&self, index: usize) -> Result<TestRecord> {
        check_index(index, self.size())?;
        let mut rng = rand::thread_rng();

        let (image_path, label_path) = match &self.index {
            SampleIndex::Labeled(pairs) => {
                let SamplePair { image, label } = &pairs[index];
                (self.image_dir.join(image), Some(self.label_dir.join(label)))
            }
            SampleIndex::Unlabeled(images) => (self.image_dir.join(&images[index]), None),
        };

        let image = read_image(&image_path, ColorMode::Color)?;
        let (height, width, _) = image.dim();
        let file_name = output_file_name(&image_path);

        let sample = match label_path {
            Some(label_path) => {
                let label = read_image(&label_path, ColorMode::Color)?;
                let op = GeometryPolicy::FloorThenRoundUp.plan(height, width, &mut rng)?;
                let (image, label) = op.apply_pair(image.view(), Some(label.view()))?;
                let label = label.ok_or_else(|| {
                    Error::Precondition(format!("label of '{}' is lost", image_path.display()))
                })?;

                Sample::Labeled {
                    image: self.transform.image(image.view())?,
                    label: self.transform.label(label.view())?,
                }
            }
            None => {
                let op = GeometryPolicy::RoundUp.plan(height, width, &mut rng)?;
                let image = op.apply(image.view())?;

                Sample::Unlabeled {
                    image: self.transform.image(image.view())?,
                }
            }
        };

        debug!(
            "loaded '{}' of size {}x{}, normalized to {:?}",
            image_path.display(),
            height,
            width,
            sample.image().shape()
        );

        Ok(TestRecord {
            sample,
            file_name,
            image_shape: [height, width],
        })
    }
}

/// The image base name with the extension replaced by `.png`.
pub fn output_file_name(image_path: impl AsRef<Path>) -> String {
    let stem = image_path
        .as_ref()
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    format!("{}.png", stem)
}
