use mnist2tinn::convert::{convert_dataset, ConvertOptions};
use mnist2tinn::predict::predict_random;
use mnist2tinn::tinn::Tinn;
use mnist2tinn::tinn_data::{check, load_file};
use mnist2tinn::train::{train, TrainOptions};
use mnist2tinn::{
    Error, IMAGES_FILE, IMAGE_HEADER_LEN, IMAGE_LEN, LABELS_FILE, LABEL_HEADER_LEN, NB_CLASSES,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Writes an IDX-like pair of files with real MNIST headers into `dir`.
fn write_dataset(dir: &Path, images: &[[u8; IMAGE_LEN]], labels: &[u8]) {
    let mut image_bytes = Vec::with_capacity(IMAGE_HEADER_LEN + images.len() * IMAGE_LEN);
    image_bytes.extend_from_slice(&0x0000_0803u32.to_be_bytes());
    image_bytes.extend_from_slice(&(images.len() as u32).to_be_bytes());
    image_bytes.extend_from_slice(&28u32.to_be_bytes());
    image_bytes.extend_from_slice(&28u32.to_be_bytes());
    for img in images {
        image_bytes.extend_from_slice(img);
    }

    let mut label_bytes = Vec::with_capacity(LABEL_HEADER_LEN + labels.len());
    label_bytes.extend_from_slice(&0x0000_0801u32.to_be_bytes());
    label_bytes.extend_from_slice(&(labels.len() as u32).to_be_bytes());
    label_bytes.extend_from_slice(labels);

    fs::write(dir.join(IMAGES_FILE), image_bytes).unwrap();
    fs::write(dir.join(LABELS_FILE), label_bytes).unwrap();
}

#[test]
fn test_white_digit_three() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    write_dataset(dir.path(), &[[255; IMAGE_LEN]], &[3]);

    let mut out = Vec::new();
    let summary = convert_dataset(dir.path(), &mut out, &ConvertOptions::default())?;
    assert_eq!(summary.samples, 1);

    let text = String::from_utf8(out)?;
    let mut expected = vec!["1.0"; IMAGE_LEN];
    expected.extend(["0.0", "0.0", "0.0", "1.0", "0.0", "0.0", "0.0", "0.0", "0.0", "0.0"]);
    assert_eq!(text, format!("{}\n", expected.join(" ")));
    Ok(())
}

#[test]
fn test_output_passes_check() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let images: Vec<[u8; IMAGE_LEN]> = (0..25)
        .map(|i| {
            let mut img = [0u8; IMAGE_LEN];
            for (j, p) in img.iter_mut().enumerate() {
                *p = ((i * 31 + j) % 256) as u8;
            }
            img
        })
        .collect();
    let labels: Vec<u8> = (0..25).map(|i| (i * 7 % NB_CLASSES) as u8).collect();
    write_dataset(dir.path(), &images, &labels);

    let mut out = Vec::new();
    let summary = convert_dataset(dir.path(), &mut out, &ConvertOptions::default())?;
    let report = check(Cursor::new(out))?;

    assert_eq!(report.rows, 25);
    assert_eq!(report.rows, summary.samples);
    assert_eq!(report.class_counts, summary.class_counts);
    Ok(())
}

#[test]
fn test_header_only_files() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    write_dataset(dir.path(), &[], &[]);

    let mut out = Vec::new();
    let summary = convert_dataset(dir.path(), &mut out, &ConvertOptions::default())?;
    assert_eq!(summary.samples, 0);
    assert!(out.is_empty());
    Ok(())
}

#[test]
fn test_progress_and_cap() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    write_dataset(dir.path(), &[[10; IMAGE_LEN]; 4], &[1, 2, 3, 4]);

    let options = ConvertOptions {
        max_samples: Some(2),
        progress: true,
    };
    let mut out = Vec::new();
    let summary = convert_dataset(dir.path(), &mut out, &options)?;
    assert_eq!(summary.samples, 2);
    assert!(summary.capped);
    assert_eq!(String::from_utf8(out)?.lines().count(), 2);
    Ok(())
}

#[test]
fn test_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let result = convert_dataset(dir.path(), Vec::new(), &ConvertOptions::default());
    match result {
        Err(Error::Open { path, .. }) => assert!(path.ends_with(IMAGES_FILE)),
        other => panic!("unexpected {other:?}"),
    }

    fs::write(dir.path().join(IMAGES_FILE), [0u8; IMAGE_HEADER_LEN]).unwrap();
    let result = convert_dataset(dir.path(), Vec::new(), &ConvertOptions::default());
    match result {
        Err(Error::Open { path, .. }) => assert!(path.ends_with(LABELS_FILE)),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_truncated_label_header() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path(), &[[0; IMAGE_LEN]], &[0]);
    fs::write(dir.path().join(LABELS_FILE), [0u8; 4]).unwrap();

    let result = convert_dataset(dir.path(), Vec::new(), &ConvertOptions::default());
    assert!(matches!(
        result,
        Err(Error::TruncatedHeader {
            expected: 8,
            got: 4,
            ..
        })
    ));
}

#[test]
fn test_convert_train_predict() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut dark = [0u8; IMAGE_LEN];
    dark[..IMAGE_LEN / 2].fill(200);
    let mut light = [0u8; IMAGE_LEN];
    light[IMAGE_LEN / 2..].fill(200);
    write_dataset(dir.path(), &[dark, light, dark, light], &[0, 1, 0, 1]);

    let rows_path = dir.path().join("mnist.txt");
    convert_dataset(dir.path(), fs::File::create(&rows_path)?, &ConvertOptions::default())?;
    let data = load_file(&rows_path, IMAGE_LEN, NB_CLASSES)?;
    assert_eq!(data.rows(), 4);

    let mut rng = StdRng::seed_from_u64(2024);
    let mut tinn = Tinn::new(IMAGE_LEN, 8, NB_CLASSES, &mut rng);
    let options = TrainOptions {
        learning_rate: 0.5,
        iterations: 20,
        ..Default::default()
    };
    let model_path = dir.path().join("saved.tinn");
    let history = train(&mut tinn, &data, &options, &mut rng, Some(&model_path))?;
    assert!(history[19].error < history[0].error);

    let mut loaded = Tinn::load(&model_path)?;
    let mut out = Vec::new();
    let summary = predict_random(&mut loaded, &data, 4, &mut rng, &mut out)?;
    assert_eq!(summary.predictions, 4);
    assert_eq!(String::from_utf8(out)?.matches("random select row").count(), 4);
    Ok(())
}
