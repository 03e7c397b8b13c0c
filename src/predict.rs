use crate::error::{Error, Result};
use crate::tinn::{argmax, Tinn};
use crate::tinn_data::{decode_one_hot, load_file, TinnData};
use crate::IMAGE_SIDE;
use rand::Rng;
use std::io::{self, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PredictSummary {
    pub predictions: usize,
    pub correct: usize,
}

/// Renders normalized pixels back as a grid of two-digit hex bytes,
/// `side` values per line.
pub fn hex_dump(inputs: &[f32], side: usize) -> String {
    let mut dump = String::with_capacity(inputs.len() * 2 + inputs.len() / side.max(1));
    for row in inputs.chunks(side.max(1)) {
        for &v in row {
            let byte = (v * 255.0).round().clamp(0.0, 255.0) as u8;
            dump.push_str(&format!("{byte:2x}"));
        }
        dump.push('\n');
    }
    dump
}

fn format_values(values: &[f32]) -> String {
    values
        .iter()
        .map(|v| format!("{v:.6}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Picks `count` random rows and writes, for each one, the image, the
/// target vector and the network's prediction.
pub fn predict_random<R: Rng + ?Sized, W: Write>(
    tinn: &mut Tinn,
    data: &TinnData,
    count: usize,
    rng: &mut R,
    out: &mut W,
) -> Result<PredictSummary> {
    if data.rows() == 0 {
        return Err(Error::EmptyData);
    }

    let mut summary = PredictSummary::default();
    for _ in 0..count {
        let row = rng.gen_range(0..data.rows());
        let (input, target) = (&data.inputs[row], &data.targets[row]);

        writeln!(out, "==========================================")?;
        writeln!(out, "random select row {row}")?;
        write!(out, "{}", hex_dump(input, IMAGE_SIDE))?;
        writeln!(out, "----------------")?;

        let prediction = tinn.predict(input)?;
        writeln!(out, "{}", format_values(target))?;
        writeln!(out, "{}", format_values(prediction))?;

        let expected = decode_one_hot(target);
        let predicted = argmax(prediction);
        if let (Some(e), Some(p)) = (expected, predicted) {
            writeln!(out, "label {e} predicted {p}")?;
            if e == p {
                summary.correct += 1;
            }
        }
        summary.predictions += 1;
    }
    out.flush()?;
    Ok(summary)
}

/// Loads a saved network and a training file and runs `predict_random` on stdout.
pub fn predict_file(model_path: &Path, data_path: &Path, count: usize) -> Result<PredictSummary> {
    let mut tinn = Tinn::load(model_path)?;
    let data = load_file(data_path, tinn.nips(), tinn.nops())?;

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let summary = predict_random(&mut tinn, &data, count, &mut rand::thread_rng(), &mut out)?;
    log::info!("{}/{} predictions correct", summary.correct, summary.predictions);
    Ok(summary)
}
