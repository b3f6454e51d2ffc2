//! Dataset loading toolkit for edge detection models.

mod common;
pub mod config;
pub mod dataset;
pub mod error;
pub mod processor;

pub use config::{dataset_info, DatasetConfig, DatasetName, DatasetRegistry, Platform};
pub use dataset::{
    BipedDataset, BipedDatasetInit, RandomAccessDataset, Sample, TestDataset, TestDatasetInit,
    TestRecord, TrainRecord,
};
pub use error::{Error, Result};
