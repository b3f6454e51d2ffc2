use crate::common::*;

/// A pair of image and label paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SamplePair {
    pub image: PathBuf,
    pub label: PathBuf,
}

impl<I, L> From<(I, L)> for SamplePair
where
    I: Into<PathBuf>,
    L: Into<PathBuf>,
{
    fn from((image, label): (I, L)) -> Self {
        Self {
            image: image.into(),
            label: label.into(),
        }
    }
}

/// The ordered list of samples of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleIndex {
    Labeled(Vec<SamplePair>),
    Unlabeled(Vec<PathBuf>),
}

impl SampleIndex {
    pub fn len(&self) -> usize {
        match self {
            Self::Labeled(pairs) => pairs.len(),
            Self::Unlabeled(images) => images.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The image path at `index`.
    pub fn image(&self, index: usize) -> Option<&Path> {
        match self {
            Self::Labeled(pairs) => pairs.get(index).map(|pair| pair.image.as_path()),
            Self::Unlabeled(images) => images.get(index).map(PathBuf::as_path),
        }
    }

    /// The label path at `index`. It is `None` for unlabeled datasets.
    pub fn label(&self, index: usize) -> Option<&Path> {
        match self {
            Self::Labeled(pairs) => pairs.get(index).map(|pair| pair.label.as_path()),
            Self::Unlabeled(_) => None,
        }
    }
}

/// Read a list file of whitespace separated image and label paths.
pub fn load_list_file(path: impl AsRef<Path>) -> Result<Vec<SamplePair>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
    parse_list(&text, path)
}

/// Parse the content of a list file. `path` is only used in error messages.
pub fn parse_list(text: &str, path: impl AsRef<Path>) -> Result<Vec<SamplePair>> {
    text.lines()
        .enumerate()
        .map(|(line_idx, line)| {
            let malformed = |reason: String| Error::MalformedList {
                path: path.as_ref().to_owned(),
                line: line_idx + 1,
                reason,
            };

            let tokens: Vec<_> = line.split_whitespace().collect();
            match *tokens {
                [image, label] => Ok(SamplePair::from((image, label))),
                [] => Err(malformed("blank line".into())),
                _ => Err(malformed(format!(
                    "expect 2 paths, but get {}",
                    tokens.len()
                ))),
            }
        })
        .collect()
}

/// List the names of regular files in a flat directory.
///
/// Entries are returned in directory listing order unless `sort` is set.
pub fn scan_image_dir(dir: impl AsRef<Path>, sort: bool) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut names = vec![];

    for path in read_dir(dir, sort)? {
        if !path.is_file() {
            warn!("skip non-file entry '{}'", path.display());
            continue;
        }
        if let Some(name) = path.file_name() {
            names.push(PathBuf::from(name));
        }
    }

    Ok(names)
}

/// Subsets of the augmented dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TrainMode {
    Train,
    Test,
}

/// Image types of the augmented dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DatasetType {
    Rgbr,
}

/// The directory of augmented samples.
pub const AUG_DATA_TYPE: &str = "aug";

/// Walk the augmented dataset tree and pair images with edge maps.
///
/// Images are found at `<root>/imgs/<mode>/<type>/aug/<subdir>/<name>.jpg` and
/// paired with `<root>/edge_maps/<mode>/<type>/aug/<subdir>/<name>.png`. Paths
/// in the returned pairs are absolute.
pub fn scan_augmented_tree(
    data_root: impl AsRef<Path>,
    mode: TrainMode,
    dataset_type: DatasetType,
    sort: bool,
) -> Result<Vec<SamplePair>> {
    let data_root = data_root.as_ref();
    let data_root = if data_root.is_absolute() {
        data_root.to_owned()
    } else {
        let cwd = std::env::current_dir().map_err(|err| Error::io(data_root, err))?;
        cwd.join(data_root)
    };

    let subpath = |top: &str| {
        data_root
            .join(top)
            .join(mode.to_string())
            .join(dataset_type.to_string())
            .join(AUG_DATA_TYPE)
    };
    let images_dir = subpath("imgs");
    let labels_dir = subpath("edge_maps");

    if !images_dir.is_dir() {
        return Err(Error::Config(format!(
            "the image directory '{}' does not exist",
            images_dir.display()
        )));
    }

    let mut pairs = vec![];

    for subdir in read_dir(&images_dir, sort)? {
        let dir_name = match subdir.file_name() {
            Some(name) if subdir.is_dir() => name.to_owned(),
            _ => {
                warn!("skip non-directory entry '{}'", subdir.display());
                continue;
            }
        };

        for file in read_dir(&subdir, sort)? {
            let stem = match file.file_stem() {
                Some(stem) => stem,
                None => continue,
            };
            let with_ext = |ext: &str| {
                let mut name = stem.to_owned();
                name.push(ext);
                name
            };
            let image_name = with_ext(".jpg");
            let label_name = with_ext(".png");

            pairs.push(SamplePair {
                image: images_dir.join(&dir_name).join(image_name),
                label: labels_dir.join(&dir_name).join(label_name),
            });
        }
    }

    Ok(pairs)
}

fn read_dir(dir: &Path, sort: bool) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<_> = fs::read_dir(dir)
        .map_err(|err| Error::io(dir, err))?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<_, _>>()
        .map_err(|err| Error::io(dir, err))?;

    if sort {
        paths.sort();
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_two_lines() {
        let pairs = parse_list("img1.jpg lbl1.png\nimg2.jpg lbl2.png\n", "/d/list.lst").unwrap();
        assert_eq!(
            pairs,
            vec![
                SamplePair::from(("img1.jpg", "lbl1.png")),
                SamplePair::from(("img2.jpg", "lbl2.png")),
            ]
        );
    }

    #[test]
    fn parse_trims_whitespace() {
        let pairs = parse_list("  a/x.jpg\t b/x.png  \r\n", "list.lst").unwrap();
        assert_eq!(pairs, vec![SamplePair::from(("a/x.jpg", "b/x.png"))]);
    }

    #[test]
    fn reject_malformed_lines() {
        let err = parse_list("a.jpg a.png\n\nb.jpg b.png\n", "list.lst").unwrap_err();
        assert!(matches!(err, Error::MalformedList { line: 2, .. }));

        let err = parse_list("a.jpg\n", "list.lst").unwrap_err();
        assert!(matches!(err, Error::MalformedList { line: 1, .. }));

        let err = parse_list("a.jpg a.png extra\n", "list.lst").unwrap_err();
        assert!(matches!(err, Error::MalformedList { line: 1, .. }));
    }

    #[test]
    fn missing_list_file() {
        assert!(matches!(
            load_list_file("/nonexistent/list.lst"),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn scan_flat_dir_skips_subdirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.jpg"), b"").unwrap();
        fs::write(dir.path().join("a.png"), b"").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let names = scan_image_dir(dir.path(), true).unwrap();
        assert_eq!(names, vec![PathBuf::from("a.png"), PathBuf::from("b.jpg")]);
    }

    #[test]
    fn index_accessors() {
        let index = SampleIndex::Labeled(vec![SamplePair::from(("x.jpg", "x.png"))]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.image(0), Some(Path::new("x.jpg")));
        assert_eq!(index.label(0), Some(Path::new("x.png")));
        assert_eq!(index.image(1), None);

        let index = SampleIndex::Unlabeled(vec![PathBuf::from("y.jpg")]);
        assert_eq!(index.label(0), None);
        assert!(!index.is_empty());
    }

    #[test]
    fn train_mode_names() {
        assert_eq!(TrainMode::Train.to_string(), "train");
        assert_eq!(TrainMode::from_str("test").unwrap(), TrainMode::Test);
        assert!(TrainMode::from_str("val").is_err());
        assert_eq!(DatasetType::Rgbr.to_string(), "rgbr");
    }
}
