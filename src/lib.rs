pub mod convert;
pub mod error;
pub mod mnist_dataset;
pub mod predict;
pub mod tinn;
pub mod tinn_data;
pub mod tinn_format;
pub mod train;

pub use error::{Error, Result, RowError, Stream};

pub const IMAGE_HEADER_LEN: usize = 16;
pub const LABEL_HEADER_LEN: usize = 8;
pub const IMAGE_SIDE: usize = 28;
pub const IMAGE_LEN: usize = IMAGE_SIDE * IMAGE_SIDE; // 784 bytes per image
pub const NB_CLASSES: usize = 10;

pub const IMAGES_FILE: &str = "train.bin";
pub const LABELS_FILE: &str = "labels.bin";
/// Converted rows, as read by `train` and `predict`
pub const DATA_FILE: &str = "mnist.txt";
pub const MODEL_FILE: &str = "saved.tinn";

/// Number of samples the original converter was hardcoded to process.
pub const LEGACY_MAX_SAMPLES: usize = 30_000;
