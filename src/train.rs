use crate::error::{Error, Result};
use crate::tinn::Tinn;
use crate::tinn_data::{load_file, TinnData};
use crate::{IMAGE_LEN, NB_CLASSES};
use indicatif::{ProgressBar, ProgressStyle};
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOptions {
    pub learning_rate: f32,
    /// Multiplies the learning rate after every iteration
    pub anneal: f32,
    pub nb_hidden: usize,
    pub iterations: usize,
    /// Every how many iterations the model is saved
    pub save_stride: usize,
    pub progress: bool,
}

impl Default for TrainOptions {
    fn default() -> Self {
        TrainOptions {
            learning_rate: 1.0,
            anneal: 0.99,
            nb_hidden: 28,
            iterations: 1000,
            save_stride: 1,
            progress: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationStats {
    pub iteration: usize,
    /// Mean error per row over the iteration
    pub error: f32,
    pub learning_rate: f32,
}

fn progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

/// Trains `tinn` on every row of `data` per iteration, in a fresh random
/// order each time. The learning rate is annealed after each iteration.
/// When `model_path` is set the network is saved there every `save_stride`
/// iterations and after the last one.
pub fn train<R: Rng + ?Sized>(
    tinn: &mut Tinn,
    data: &TinnData,
    options: &TrainOptions,
    rng: &mut R,
    model_path: Option<&Path>,
) -> Result<Vec<IterationStats>> {
    if data.rows() == 0 {
        return Err(Error::EmptyData);
    }

    let mut indices: Vec<usize> = (0..data.rows()).collect();
    let mut rate = options.learning_rate;
    let mut history = Vec::with_capacity(options.iterations);
    let pb = progress_bar(options.iterations as u64, options.progress);

    for iteration in 0..options.iterations {
        indices.shuffle(rng);

        let mut error = 0.0;
        for &idx in &indices {
            error += tinn.train(&data.inputs[idx], &data.targets[idx], rate)?;
        }
        let stats = IterationStats {
            iteration,
            error: error / data.rows() as f32,
            learning_rate: rate,
        };
        log::info!(
            "rows={}, error {:.12}, learning_rate {:.6}",
            data.rows(),
            stats.error,
            stats.learning_rate
        );
        history.push(stats);
        rate *= options.anneal;

        if let Some(path) = model_path {
            let last = iteration + 1 == options.iterations;
            if last || (options.save_stride > 0 && (iteration + 1) % options.save_stride == 0) {
                tinn.save(path)?;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(history)
}

/// Builds a fresh 784-`nb_hidden`-10 network, trains it on the rows of
/// `data_path` and saves it to `model_path`.
pub fn train_file(
    data_path: &Path,
    model_path: &Path,
    options: &TrainOptions,
) -> Result<Vec<IterationStats>> {
    let data = load_file(data_path, IMAGE_LEN, NB_CLASSES)?;
    println!("[TRAIN] len: {}", data.rows());

    let mut rng = rand::thread_rng();
    let mut tinn = Tinn::new(IMAGE_LEN, options.nb_hidden, NB_CLASSES, &mut rng);
    let history = train(&mut tinn, &data, options, &mut rng, Some(model_path))?;
    log::info!("saved model to {}", model_path.display());
    Ok(history)
}
