use crate::error::{Error, Result, Stream};
use crate::{IMAGES_FILE, IMAGE_HEADER_LEN, IMAGE_LEN, LABELS_FILE, LABEL_HEADER_LEN, NB_CLASSES};
use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read};
use std::path::Path;

/// One image with its digit label.
/// The label is always in 0..NB_CLASSES.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    index: usize,
    pixels: [u8; IMAGE_LEN],
    label: u8,
}

impl Sample {
    /// Returns `None` when `label` is not a valid digit class.
    pub fn new(index: usize, pixels: [u8; IMAGE_LEN], label: u8) -> Option<Self> {
        if usize::from(label) < NB_CLASSES {
            Some(Sample {
                index,
                pixels,
                label,
            })
        } else {
            None
        }
    }

    /// Zero-based record index in both streams
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn pixels(&self) -> &[u8; IMAGE_LEN] {
        &self.pixels
    }

    pub fn label(&self) -> u8 {
        self.label
    }
}

/// Reads into `buf` until it is full or the stream ends.
/// Returns the number of bytes read; 0 means the stream was already exhausted.
pub fn read_record<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Consumes exactly `len` header bytes.
pub fn skip_header<R: Read>(reader: &mut R, len: usize, stream: Stream) -> Result<()> {
    let got = io::copy(&mut reader.by_ref().take(len as u64), &mut io::sink())? as usize;
    if got != len {
        return Err(Error::TruncatedHeader {
            stream,
            expected: len,
            got,
        });
    }
    Ok(())
}

/// Number of complete image records a file of `image_file_len` bytes holds.
pub fn expected_samples(image_file_len: u64) -> u64 {
    image_file_len.saturating_sub(IMAGE_HEADER_LEN as u64) / IMAGE_LEN as u64
}

/// Lazily pairs image records with label records.
///
/// Iteration ends when both streams run out at the same record boundary.
/// Anything else (a partial record, one stream outlasting the other, a label
/// that is not a digit) is yielded once as an error, after which the reader
/// is exhausted.
pub struct MnistReader<I, L> {
    images: I,
    labels: L,
    position: usize,
    done: bool,
}

impl<I: Read, L: Read> MnistReader<I, L> {
    /// Skips both headers so that the first sample starts at image offset 16
    /// and label offset 8.
    pub fn new(mut images: I, mut labels: L) -> Result<Self> {
        skip_header(&mut images, IMAGE_HEADER_LEN, Stream::Images)?;
        skip_header(&mut labels, LABEL_HEADER_LEN, Stream::Labels)?;
        Ok(MnistReader {
            images,
            labels,
            position: 0,
            done: false,
        })
    }

    /// Samples yielded so far
    pub fn position(&self) -> usize {
        self.position
    }

    fn next_sample(&mut self) -> Result<Option<Sample>> {
        let index = self.position;

        let mut pixels = [0u8; IMAGE_LEN];
        let got = read_record(&mut self.images, &mut pixels)?;
        if got == 0 {
            // Images are done; the labels must be too.
            let mut probe = [0u8; 1];
            return match read_record(&mut self.labels, &mut probe)? {
                0 => Ok(None),
                _ => Err(Error::UnpairedRecord {
                    index,
                    exhausted: Stream::Images,
                }),
            };
        }
        if got != IMAGE_LEN {
            return Err(Error::TruncatedRecord {
                stream: Stream::Images,
                index,
                expected: IMAGE_LEN,
                got,
            });
        }

        let mut label = [0u8; 1];
        if read_record(&mut self.labels, &mut label)? == 0 {
            return Err(Error::UnpairedRecord {
                index,
                exhausted: Stream::Labels,
            });
        }

        let sample = Sample::new(index, pixels, label[0]).ok_or(Error::LabelOutOfRange {
            index,
            label: label[0],
        })?;
        self.position += 1;
        Ok(Some(sample))
    }
}

impl<I: Read, L: Read> Iterator for MnistReader<I, L> {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_sample() {
            Ok(Some(sample)) => Some(Ok(sample)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<I: Read, L: Read> std::iter::FusedIterator for MnistReader<I, L> {}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Opens `train.bin` and `labels.bin` inside `dir`.
pub fn open_mnist(dir: &Path) -> Result<MnistReader<BufReader<File>, BufReader<File>>> {
    let images_path = dir.join(IMAGES_FILE);
    let labels_path = dir.join(LABELS_FILE);
    log::debug!("opening images from {}", images_path.display());
    let images = open(&images_path)?;
    log::debug!("opening labels from {}", labels_path.display());
    let labels = open(&labels_path)?;
    MnistReader::new(images, labels)
}
