//! Per-dataset configuration and the dataset registry.

use crate::common::*;

/// The accepted version of registry files.
pub static CONFIG_VERSION: Lazy<VersionReq> = Lazy::new(|| VersionReq::parse("0.1.0").unwrap());

/// Names of supported datasets.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum DatasetName {
    Biped,
    Bsds,
    Bsds300,
    Cid,
    Dcd,
    Multicue,
    Pascal,
    Nyud,
    /// Unlabeled images in a flat directory, used for single image inference.
    Classic,
}

impl DatasetName {
    /// Parse a dataset name. An unknown name is a configuration error.
    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| Error::UnknownDataset(name.to_owned()))
    }

    /// True if the dataset has no ground truth labels.
    pub fn is_unlabeled(&self) -> bool {
        matches!(self, Self::Classic)
    }
}

/// Selects the path layout of the built-in registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Platform {
    /// Datasets are installed under `/opt/dataset`.
    Linux,
    /// Datasets are placed relative to the working directory.
    Other,
}

impl Platform {
    /// The platform the program is compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }
}

/// The configuration of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub name: DatasetName,
    pub img_height: usize,
    pub img_width: usize,
    pub data_dir: PathBuf,
    /// The list file of evaluation samples, relative to `data_dir`.
    #[serde(default)]
    pub test_list: Option<PathBuf>,
    /// The list file of training samples, relative to `data_dir`.
    #[serde(default)]
    pub train_list: Option<PathBuf>,
    /// The edge threshold in range [0, 1].
    pub yita: R64,
}

impl DatasetConfig {
    fn new(
        name: DatasetName,
        [img_height, img_width]: [usize; 2],
        data_dir: &str,
        test_list: Option<&str>,
        train_list: Option<&str>,
        yita: f64,
    ) -> Self {
        Self {
            name,
            img_height,
            img_width,
            data_dir: data_dir.into(),
            test_list: test_list.map(PathBuf::from),
            train_list: train_list.map(PathBuf::from),
            yita: r64(yita),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.img_height == 0 || self.img_width == 0 {
            return Err(Error::Config(format!(
                "image size of dataset {} must be positive",
                self.name
            )));
        }
        if !(0.0..=1.0).contains(&self.yita.raw()) {
            return Err(Error::Config(format!(
                "yita of dataset {} must be in range [0, 1], but get {}",
                self.name, self.yita
            )));
        }
        Ok(())
    }

    /// The absolute or working-directory-relative path of the test list file.
    pub fn test_list_path(&self) -> Option<PathBuf> {
        self.test_list.as_ref().map(|list| self.data_dir.join(list))
    }

    /// The absolute or working-directory-relative path of the training list file.
    pub fn train_list_path(&self) -> Option<PathBuf> {
        self.train_list.as_ref().map(|list| self.data_dir.join(list))
    }
}

/// Look up the built-in configuration of a dataset by name.
pub fn dataset_info(name: &str, platform: Platform) -> Result<DatasetConfig> {
    let name = DatasetName::parse(name)?;
    Ok(builtin_config(name, platform))
}

fn builtin_config(name: DatasetName, platform: Platform) -> DatasetConfig {
    use DatasetName as N;

    let config = DatasetConfig::new;
    let pair = Some("test_pair.lst");

    match platform {
        Platform::Linux => match name {
            N::Bsds => config(name, [321, 481], "/opt/dataset/BSDS", pair, None, 0.5),
            N::Bsds300 => config(name, [321, 481], "/opt/dataset/BSDS300", pair, None, 0.5),
            N::Pascal => config(name, [375, 500], "/opt/dataset/PASCAL", pair, None, 0.3),
            N::Cid => config(name, [512, 512], "/opt/dataset/CID", pair, None, 0.3),
            N::Nyud => config(name, [425, 560], "/opt/dataset/NYUD", pair, None, 0.5),
            N::Multicue => config(name, [720, 1280], "/opt/dataset/MULTICUE", pair, None, 0.3),
            N::Biped => config(
                name,
                [720, 1280],
                "/opt/dataset/BIPED/edges",
                Some("test_rgb.lst"),
                Some("train_rgb.lst"),
                0.5,
            ),
            N::Classic => config(name, [512, 512], "data", None, None, 0.5),
            N::Dcd => config(name, [240, 360], "/opt/dataset/DCD", pair, None, 0.2),
        },
        Platform::Other => match name {
            N::Bsds => config(name, [512, 512], "../../dataset/BSDS", pair, None, 0.5),
            N::Bsds300 => config(name, [512, 512], "../../dataset/BSDS300", pair, None, 0.5),
            N::Pascal => config(name, [375, 500], "/opt/dataset/PASCAL", pair, None, 0.3),
            N::Cid => config(name, [512, 512], "../../dataset/CID", pair, None, 0.3),
            N::Nyud => config(name, [425, 560], "/opt/dataset/NYUD", pair, None, 0.5),
            N::Multicue => config(name, [720, 1280], "../../dataset/MULTICUE", pair, None, 0.3),
            N::Biped => config(
                name,
                [720, 1280],
                "../../dataset/BIPED/edges",
                Some("test_rgb.lst"),
                Some("train_rgb.lst"),
                0.5,
            ),
            N::Classic => config(name, [512, 512], "data", None, None, 0.5),
            N::Dcd => config(name, [240, 360], "/opt/dataset/DCD", pair, None, 0.2),
        },
    }
}

/// An immutable table of dataset configurations.
#[derive(Debug, Clone)]
pub struct DatasetRegistry {
    datasets: IndexMap<DatasetName, DatasetConfig>,
}

impl DatasetRegistry {
    /// The built-in registry for the given platform.
    pub fn builtin(platform: Platform) -> Self {
        let datasets = DatasetName::iter()
            .map(|name| (name, builtin_config(name, platform)))
            .collect();
        Self { datasets }
    }

    /// Load a registry from a JSON5 file.
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        let RegistryFile { datasets, .. } =
            json5::from_str(&text).map_err(|source| Error::ConfigFile {
                path: path.to_owned(),
                source,
            })?;
        Self::from_configs(datasets)
    }

    pub fn from_configs(configs: impl IntoIterator<Item = DatasetConfig>) -> Result<Self> {
        let mut datasets = IndexMap::new();

        for config in configs {
            config.validate()?;
            let name = config.name;
            if datasets.insert(name, config).is_some() {
                return Err(Error::Config(format!(
                    "dataset {} is defined more than once",
                    name
                )));
            }
        }

        Ok(Self { datasets })
    }

    /// Look up a dataset by name.
    pub fn get(&self, name: &str) -> Result<&DatasetConfig> {
        let key = DatasetName::parse(name)?;
        self.datasets
            .get(&key)
            .ok_or_else(|| Error::UnknownDataset(name.to_owned()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &DatasetConfig> {
        self.datasets.values()
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RegistryFile {
    #[serde(deserialize_with = "deserialize_version")]
    #[allow(dead_code)]
    version: Version,
    datasets: Vec<DatasetConfig>,
}

fn deserialize_version<'de, D>(deserializer: D) -> Result<Version, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    let version = Version::parse(&text).map_err(|err| {
        D::Error::custom(format!(
            "failed to parse version number '{}': {:?}",
            text, err
        ))
    })?;

    if !CONFIG_VERSION.matches(&version) {
        return Err(D::Error::custom(format!(
            "incompatible version: get '{}', but it is incompatible with requirement '{}'",
            version, &*CONFIG_VERSION,
        )));
    }

    Ok(version)
}
