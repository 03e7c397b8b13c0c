use crate::error::Result;
use crate::mnist_dataset::{expected_samples, open_mnist, MnistReader};
use crate::tinn_format::write_sample;
use crate::{IMAGES_FILE, NB_CLASSES};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    /// Stop after this many samples. `None` converts everything.
    pub max_samples: Option<usize>,
    /// Draw a progress bar on stderr
    pub progress: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConvertSummary {
    pub samples: usize,
    pub class_counts: [usize; NB_CLASSES],
    /// Samples were left unread because of `max_samples`
    pub capped: bool,
}

/// Writes one Tinn row per sample of `reader` to `out`, in record order.
///
/// Stops at the end of the streams, after `max_samples` rows, or at the first
/// error. Rows written before an error are kept and `out` is flushed either way.
pub fn convert<I: Read, L: Read, W: Write>(
    mut reader: MnistReader<I, L>,
    mut out: W,
    options: &ConvertOptions,
    pb: &ProgressBar,
) -> Result<ConvertSummary> {
    let mut summary = ConvertSummary::default();
    let limit = options.max_samples.unwrap_or(usize::MAX);

    let mut result = Ok(());
    for sample in reader.by_ref().take(limit) {
        let sample = match sample {
            Ok(s) => s,
            Err(e) => {
                result = Err(e);
                break;
            }
        };
        if let Err(e) = write_sample(&mut out, &sample) {
            result = Err(e.into());
            break;
        }
        summary.samples += 1;
        summary.class_counts[usize::from(sample.label())] += 1;
        pb.inc(1);
    }

    out.flush()?;
    result?;

    if summary.samples == limit && reader.next().is_some() {
        summary.capped = true;
        log::warn!("stopped after {} samples (--max-samples)", summary.samples);
    }
    Ok(summary)
}

/// Converts `train.bin` and `labels.bin` found in `dir`.
/// Both files are closed when this returns.
pub fn convert_dataset<W: Write>(
    dir: &Path,
    out: W,
    options: &ConvertOptions,
) -> Result<ConvertSummary> {
    let reader = open_mnist(dir)?;

    let pb = if options.progress {
        let total = fs::metadata(dir.join(IMAGES_FILE))
            .map(|m| expected_samples(m.len()))
            .unwrap_or(0);
        let total = match options.max_samples {
            Some(max) => total.min(max as u64),
            None => total,
        };
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let summary = convert(reader, out, options, &pb);
    pb.finish_and_clear();
    let summary = summary?;

    log::info!("converted {} samples", summary.samples);
    for (class, count) in summary.class_counts.iter().enumerate() {
        log::debug!("class {class}: {count} samples");
    }
    Ok(summary)
}
