use anyhow::{bail, Context, Result};
use clap::Parser;
use edge_dataset::{
    dataset::TrainMode,
    processor::{SampleTransform, DEFAULT_MEAN_BGR},
    BipedDatasetInit, DatasetRegistry, Platform, RandomAccessDataset, TestDatasetInit,
};
use log::info;
use ndarray::Array3;
use prettytable::{cell, row, Table};
use rand::{rngs::StdRng, SeedableRng};
use std::{env, path::PathBuf};

#[derive(Debug, Clone, Parser)]
/// Inspect edge detection datasets
enum Opts {
    /// Print the dataset registry.
    List {
        /// path layout of the built-in registry, 'linux' or 'other'
        #[clap(long)]
        platform: Option<Platform>,
        /// registry file that replaces the built-in registry
        #[clap(long)]
        registry: Option<PathBuf>,
    },
    /// Load samples of an evaluation dataset.
    Inspect {
        /// dataset name
        name: String,
        /// override the data directory of the registry
        #[clap(long)]
        data_root: Option<PathBuf>,
        #[clap(long)]
        platform: Option<Platform>,
        #[clap(long)]
        registry: Option<PathBuf>,
        /// comma separated BGR means, e.g. '103.939,116.779,123.68'
        #[clap(long)]
        mean_bgr: Option<String>,
        /// sort files of unlabeled datasets
        #[clap(long)]
        sort: bool,
        /// maximum number of samples to load
        #[clap(long, default_value = "5")]
        limit: usize,
    },
    /// Load samples of the augmented training dataset.
    InspectTrain {
        /// dataset root containing 'imgs' and 'edge_maps'
        data_root: PathBuf,
        #[clap(long)]
        height: usize,
        #[clap(long)]
        width: usize,
        /// 'train' or 'test'
        #[clap(long, default_value = "train")]
        mode: TrainMode,
        /// take random crops instead of resizing
        #[clap(long)]
        crop: bool,
        #[clap(long)]
        sort: bool,
        /// seed of crop locations
        #[clap(long)]
        seed: Option<u64>,
        #[clap(long)]
        mean_bgr: Option<String>,
        #[clap(long, default_value = "5")]
        limit: usize,
    },
}

fn main() -> Result<()> {
    // setup logging
    if env::var("RUST_LOG").is_err() {
        pretty_env_logger::formatted_builder()
            .filter_level(log::LevelFilter::Info)
            .init();
    } else {
        pretty_env_logger::init();
    }

    match Opts::parse() {
        Opts::List { platform, registry } => {
            let registry = load_registry(platform, registry)?;
            list(&registry);
        }
        Opts::Inspect {
            name,
            data_root,
            platform,
            registry,
            mean_bgr,
            sort,
            limit,
        } => {
            let registry = load_registry(platform, registry)?;
            let config = registry.get(&name)?;
            let mut init = TestDatasetInit::from_config(config, parse_mean(mean_bgr.as_deref())?);
            if let Some(data_root) = data_root {
                init.data_root = data_root;
            }
            init.sort_entries = sort;
            inspect(init, limit)?;
        }
        Opts::InspectTrain {
            data_root,
            height,
            width,
            mode,
            crop,
            sort,
            seed,
            mean_bgr,
            limit,
        } => {
            let init = BipedDatasetInit {
                mean_bgr: parse_mean(mean_bgr.as_deref())?,
                train_mode: mode,
                crop_img: crop,
                sort_entries: sort,
                ..BipedDatasetInit::new(data_root, height, width)
            };
            inspect_train(init, seed, limit)?;
        }
    }

    Ok(())
}

fn load_registry(platform: Option<Platform>, file: Option<PathBuf>) -> Result<DatasetRegistry> {
    let registry = match file {
        Some(file) => DatasetRegistry::open(&file)
            .with_context(|| format!("failed to load registry file '{}'", file.display()))?,
        None => DatasetRegistry::builtin(platform.unwrap_or_else(Platform::current)),
    };
    Ok(registry)
}

fn parse_mean(text: Option<&str>) -> Result<[f32; 3]> {
    let text = match text {
        Some(text) => text,
        None => return Ok(DEFAULT_MEAN_BGR),
    };
    let values: Vec<f32> = text
        .split(',')
        .map(|token| {
            token
                .trim()
                .parse()
                .with_context(|| format!("invalid mean value '{}'", token))
        })
        .collect::<Result<_>>()?;
    let transform = SampleTransform::from_mean_pixel_values(&values)?;
    Ok(transform.mean_bgr())
}

fn list(registry: &DatasetRegistry) {
    let mut table = Table::new();
    table.add_row(row![
        "name",
        "height",
        "width",
        "data_dir",
        "test_list",
        "train_list",
        "yita"
    ]);

    let show = |path: &Option<PathBuf>| {
        path.as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "-".into())
    };

    registry.iter().for_each(|config| {
        table.add_row(row![
            config.name,
            config.img_height,
            config.img_width,
            config.data_dir.display(),
            show(&config.test_list),
            show(&config.train_list),
            config.yita,
        ]);
    });

    table.printstd();
}

fn inspect(init: TestDatasetInit, limit: usize) -> Result<()> {
    let dataset = init.build()?;
    let size = dataset.size();
    info!("dataset {} has {} samples", dataset.name(), size);

    let mut table = Table::new();
    table.add_row(row![
        "index",
        "file_name",
        "orig shape",
        "image shape",
        "labeled",
        "label range"
    ]);

    for index in 0..size.min(limit) {
        let record = dataset
            .get(index)
            .with_context(|| format!("failed to load sample {}", index))?;
        let label = record.sample.label();

        table.add_row(row![
            index,
            record.file_name,
            format!("{:?}", record.image_shape),
            format!("{:?}", record.sample.image().shape()),
            record.sample.has_label(),
            value_range(&label),
        ]);
    }

    table.printstd();
    Ok(())
}

fn inspect_train(init: BipedDatasetInit, seed: Option<u64>, limit: usize) -> Result<()> {
    let dataset = init.build()?;
    let size = dataset.size();
    if size == 0 {
        bail!("no samples found");
    }
    info!("found {} samples, policy {:?}", size, dataset.policy());

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut table = Table::new();
    table.add_row(row!["index", "image", "image shape", "label range"]);

    for index in 0..size.min(limit) {
        let record = dataset
            .get_with_rng(index, &mut rng)
            .with_context(|| format!("failed to load sample {}", index))?;

        table.add_row(row![
            index,
            dataset.pairs()[index].image.display(),
            format!("{:?}", record.image.shape()),
            value_range(&record.label),
        ]);
    }

    table.printstd();
    Ok(())
}

fn value_range(array: &Array3<f32>) -> String {
    let (min, max) = array
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &value| {
            (min.min(value), max.max(value))
        });
    format!("[{:.3}, {:.3}]", min, max)
}
