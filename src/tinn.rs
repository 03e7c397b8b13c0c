//! A one-hidden-layer sigmoid network in the style of Tinn.
//!
//! Weights are stored as one flat vector: `nhid * nips` input-to-hidden
//! weights followed by `nops * nhid` hidden-to-output weights. There are two
//! biases (hidden, output) and they are not trained.

use crate::error::{Error, Result};
use rand::Rng;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Squared error of one output.
fn err(a: f32, b: f32) -> f32 {
    0.5 * (a - b) * (a - b)
}

fn pderr(a: f32, b: f32) -> f32 {
    a - b
}

fn toterr(tg: &[f32], o: &[f32]) -> f32 {
    tg.iter().zip(o).map(|(&t, &o)| err(t, o)).sum()
}

fn act(a: f32) -> f32 {
    1.0 / (1.0 + (-a).exp())
}

/// Derivative of the sigmoid expressed through its output.
fn pdact(a: f32) -> f32 {
    a * (1.0 - a)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tinn {
    nips: usize,
    nhid: usize,
    nops: usize,
    weights: Vec<f32>,
    biases: [f32; 2],
    hidden: Vec<f32>,
    output: Vec<f32>,
}

impl Tinn {
    /// Builds a network with weights and biases drawn uniformly from [-0.5, 0.5).
    pub fn new<R: Rng + ?Sized>(nips: usize, nhid: usize, nops: usize, rng: &mut R) -> Self {
        let nw = nhid * (nips + nops);
        let weights = (0..nw).map(|_| rng.gen::<f32>() - 0.5).collect();
        let biases = [rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5];
        Self::from_parts(nips, nhid, nops, weights, biases)
    }

    fn from_parts(nips: usize, nhid: usize, nops: usize, weights: Vec<f32>, biases: [f32; 2]) -> Self {
        Tinn {
            nips,
            nhid,
            nops,
            weights,
            biases,
            hidden: vec![0.0; nhid],
            output: vec![0.0; nops],
        }
    }

    pub fn nips(&self) -> usize {
        self.nips
    }

    pub fn nhid(&self) -> usize {
        self.nhid
    }

    pub fn nops(&self) -> usize {
        self.nops
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn biases(&self) -> [f32; 2] {
        self.biases
    }

    fn check_len(expected: usize, got: usize) -> Result<()> {
        if expected != got {
            return Err(Error::ShapeMismatch { expected, got });
        }
        Ok(())
    }

    fn fprop(&mut self, input: &[f32]) {
        let (w, x) = self.weights.split_at(self.nhid * self.nips);
        for (i, h) in self.hidden.iter_mut().enumerate() {
            let row = &w[i * self.nips..(i + 1) * self.nips];
            let sum: f32 = input.iter().zip(row).map(|(a, b)| a * b).sum();
            *h = act(sum + self.biases[0]);
        }
        for (i, o) in self.output.iter_mut().enumerate() {
            let row = &x[i * self.nhid..(i + 1) * self.nhid];
            let sum: f32 = self.hidden.iter().zip(row).map(|(a, b)| a * b).sum();
            *o = act(sum + self.biases[1]);
        }
    }

    fn bprop(&mut self, input: &[f32], target: &[f32], rate: f32) {
        let (nips, nhid) = (self.nips, self.nhid);
        let (w, x) = self.weights.split_at_mut(nhid * nips);
        for i in 0..nhid {
            let mut sum = 0.0;
            for j in 0..self.nops {
                let a = pderr(self.output[j], target[j]);
                let b = pdact(self.output[j]);
                sum += a * b * x[j * nhid + i];
                x[j * nhid + i] -= rate * a * b * self.hidden[i];
            }
            let grad = rate * sum * pdact(self.hidden[i]);
            for (wij, inj) in w[i * nips..(i + 1) * nips].iter_mut().zip(input) {
                *wij -= grad * inj;
            }
        }
    }

    /// Runs the network on `input` and returns its output layer.
    pub fn predict(&mut self, input: &[f32]) -> Result<&[f32]> {
        Self::check_len(self.nips, input.len())?;
        self.fprop(input);
        Ok(&self.output)
    }

    /// One step of gradient descent on a single sample.
    /// Returns the error of the output computed before the update.
    pub fn train(&mut self, input: &[f32], target: &[f32], rate: f32) -> Result<f32> {
        Self::check_len(self.nips, input.len())?;
        Self::check_len(self.nops, target.len())?;
        self.fprop(input);
        self.bprop(input, target, rate);
        Ok(toterr(target, &self.output))
    }

    /// Text model format: a `nips nhid nops` header line, then the two biases
    /// and every weight, one per line with six decimals.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "{} {} {}", self.nips, self.nhid, self.nops)?;
        for b in &self.biases {
            writeln!(out, "{b:.6}")?;
        }
        for w in &self.weights {
            writeln!(out, "{w:.6}")?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn read_from<R: Read>(mut input: R) -> Result<Self> {
        let mut text = String::new();
        input.read_to_string(&mut text)?;
        let mut tokens = text.split_whitespace();

        let mut size = |what: &str| -> Result<usize> {
            let token = tokens
                .next()
                .ok_or_else(|| Error::BadModel(format!("missing {what}")))?;
            token
                .parse()
                .map_err(|_| Error::BadModel(format!("invalid {what} {token:?}")))
        };
        let nips = size("input count")?;
        let nhid = size("hidden count")?;
        let nops = size("output count")?;

        let nw = nhid * (nips + nops);
        let mut values = Vec::with_capacity(nw + 2);
        for token in tokens {
            let v: f32 = token
                .parse()
                .map_err(|_| Error::BadModel(format!("invalid weight {token:?}")))?;
            values.push(v);
        }
        if values.len() != nw + 2 {
            return Err(Error::BadModel(format!(
                "expected {} values for a {nips}-{nhid}-{nops} network, found {}",
                nw + 2,
                values.len()
            )));
        }
        let weights = values.split_off(2);
        Ok(Self::from_parts(nips, nhid, nops, weights, [values[0], values[1]]))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        self.write_to(&mut BufWriter::new(file))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let tinn = Self::read_from(BufReader::new(file))?;
        log::debug!(
            "loaded {}-{}-{} network from {}",
            tinn.nips,
            tinn.nhid,
            tinn.nops,
            path.display()
        );
        Ok(tinn)
    }
}

/// Index of the largest output.
pub fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(idx, _)| idx)
}
