//! Rendering of samples as Tinn training rows.
//!
//! A row is the normalized pixels followed by the one-hot label, separated by
//! single spaces. Floats use the shortest representation that round-trips and
//! always carries a decimal point (`0.0`, `1.0`, `0.00392156862745098`).

use crate::mnist_dataset::Sample;
use crate::NB_CLASSES;
use std::io::{self, Write};

/// Maps a pixel byte into [0.0, 1.0].
pub fn normalize(pixel: u8) -> f64 {
    f64::from(pixel) / 255.0
}

pub fn one_hot(label: u8) -> Option<[f64; NB_CLASSES]> {
    let mut target = [0.0; NB_CLASSES];
    *target.get_mut(usize::from(label))? = 1.0;
    Some(target)
}

/// Writes `inputs` then `targets` as one newline-terminated row.
pub fn write_row<W: Write>(out: &mut W, inputs: &[f64], targets: &[f64]) -> io::Result<()> {
    let mut values = inputs.iter().chain(targets);
    if let Some(first) = values.next() {
        write!(out, "{first:?}")?;
    }
    for v in values {
        write!(out, " {v:?}")?;
    }
    writeln!(out)
}

pub fn write_sample<W: Write>(out: &mut W, sample: &Sample) -> io::Result<()> {
    let inputs: Vec<f64> = sample.pixels().iter().map(|&p| normalize(p)).collect();
    let target = one_hot(sample.label()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("label {} is not a digit", sample.label()),
        )
    })?;
    write_row(out, &inputs, &target)
}

/// Same as `write_sample`, without the trailing newline.
pub fn format_sample(sample: &Sample) -> io::Result<String> {
    let mut buf = Vec::new();
    write_sample(&mut buf, sample)?;
    let line = String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(line.strip_suffix('\n').unwrap_or(&line).to_string())
}
