//! Reading Tinn training rows back, the way the Tinn trainer does:
//! one sample per line, `nips` inputs followed by `nops` targets.

use crate::error::{Error, Result, RowError};
use crate::{IMAGE_LEN, NB_CLASSES};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// Splits a row into its inputs and targets.
pub fn parse_row(
    line: &str,
    nips: usize,
    nops: usize,
) -> std::result::Result<(Vec<f32>, Vec<f32>), RowError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != nips + nops {
        return Err(RowError::WrongLength {
            expected: nips + nops,
            found: tokens.len(),
        });
    }

    let mut values = Vec::with_capacity(tokens.len());
    for token in tokens {
        let v: f32 = token.parse().map_err(|_| RowError::NotANumber {
            token: token.to_string(),
        })?;
        values.push(v);
    }
    let targets = values.split_off(nips);
    Ok((values, targets))
}

/// Label encoded by a one-hot target, if it is one.
pub fn decode_one_hot(targets: &[f32]) -> Option<usize> {
    let mut label = None;
    for (i, &t) in targets.iter().enumerate() {
        if t == 1.0 && label.is_none() {
            label = Some(i);
        } else if t != 0.0 {
            return None;
        }
    }
    label
}

/// Every row of a training file, inputs and targets kept apart.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TinnData {
    pub inputs: Vec<Vec<f32>>,
    pub targets: Vec<Vec<f32>>,
}

impl TinnData {
    pub fn rows(&self) -> usize {
        self.inputs.len()
    }
}

/// Loads all non-empty rows of `input`.
pub fn load<R: BufRead>(input: R, nips: usize, nops: usize) -> Result<TinnData> {
    let mut data = TinnData::default();
    for (i, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (inputs, targets) =
            parse_row(&line, nips, nops).map_err(|reason| Error::BadRow { line: i + 1, reason })?;
        data.inputs.push(inputs);
        data.targets.push(targets);
    }
    Ok(data)
}

pub fn load_file(path: &Path, nips: usize, nops: usize) -> Result<TinnData> {
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let data = load(BufReader::new(file), nips, nops)?;
    log::debug!("loaded {} rows from {}", data.rows(), path.display());
    Ok(data)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckReport {
    pub rows: usize,
    pub class_counts: [usize; NB_CLASSES],
}

/// Validates every non-empty line of `input` as a converted MNIST sample.
pub fn check<R: BufRead>(input: R) -> Result<CheckReport> {
    let mut report = CheckReport::default();

    for (i, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let bad_row = |reason| Error::BadRow { line: i + 1, reason };

        let (inputs, targets) = parse_row(&line, IMAGE_LEN, NB_CLASSES).map_err(bad_row)?;
        if let Some((column, &value)) = inputs
            .iter()
            .enumerate()
            .find(|(_, v)| !(0.0..=1.0).contains(*v))
        {
            return Err(bad_row(RowError::InputOutOfRange { column, value }));
        }
        let label = decode_one_hot(&targets).ok_or_else(|| bad_row(RowError::NotOneHot))?;

        report.rows += 1;
        report.class_counts[label] += 1;
    }

    log::debug!("checked {} rows", report.rows);
    Ok(report)
}

pub fn write_report<W: Write>(out: &mut W, report: &CheckReport) -> io::Result<()> {
    writeln!(out, "rows: {}", report.rows)?;
    for (class, count) in report.class_counts.iter().enumerate() {
        writeln!(out, "class {}: {}", class, count)?;
    }
    Ok(())
}
