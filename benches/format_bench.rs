use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use indicatif::ProgressBar;
use mnist2tinn::convert::{convert, ConvertOptions};
use mnist2tinn::mnist_dataset::MnistReader;
use mnist2tinn::{IMAGE_HEADER_LEN, IMAGE_LEN, LABEL_HEADER_LEN, NB_CLASSES};
use std::hint::black_box;
use std::io::{self, Cursor};

fn gen_streams(nb_samples: usize) -> (Vec<u8>, Vec<u8>) {
    let mut images = vec![0u8; IMAGE_HEADER_LEN];
    let mut labels = vec![0u8; LABEL_HEADER_LEN];
    for i in 0..nb_samples {
        images.extend((0..IMAGE_LEN).map(|j| ((i + j) % 256) as u8));
        labels.push((i % NB_CLASSES) as u8);
    }
    (images, labels)
}

fn convert_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Convert");

    for nb_samples in [100, 1_000] {
        let (images, labels) = gen_streams(nb_samples);
        group.throughput(Throughput::Elements(nb_samples as u64));
        group.bench_function(format!("samples_{nb_samples}"), |b| {
            b.iter(|| {
                let reader =
                    MnistReader::new(Cursor::new(&images[..]), Cursor::new(&labels[..])).unwrap();
                let summary = convert(
                    reader,
                    io::sink(),
                    &ConvertOptions::default(),
                    &ProgressBar::hidden(),
                )
                .unwrap();
                black_box(summary)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, convert_benchmark);
criterion_main!(benches);
