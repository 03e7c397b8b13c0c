use mnist2tinn::convert::{convert_dataset, ConvertOptions};
use mnist2tinn::train::TrainOptions;
use mnist2tinn::{predict, tinn_data, train, DATA_FILE, MODEL_FILE};

use clap::{Parser, Subcommand};
use std::io::{self, BufWriter};
use std::path::Path;

/// Convert train.bin / labels.bin (MNIST IDX) into Tinn training rows,
/// then train and query a Tinn network on them
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Write one training row per sample to stdout (default)
    Convert {
        /// Stop after this many samples
        #[arg(long)]
        max_samples: Option<usize>,
        /// Show a progress bar on stderr
        #[arg(long, default_value_t = false)]
        progress: bool,
    },
    /// Validate training rows read from stdin
    Check,
    /// Train a new network on mnist.txt and save it to saved.tinn
    Train {
        #[arg(long, default_value_t = 1.0)]
        learning_rate: f32,
        #[arg(long, default_value_t = 0.99)]
        anneal: f32,
        #[arg(long, default_value_t = 28)]
        nb_hidden: usize,
        #[arg(long, default_value_t = 1000)]
        iterations: usize,
        #[arg(long, default_value_t = 1)]
        save_stride: usize, // Every how many iterations do we save?
        #[arg(long, default_value_t = false)]
        progress: bool,
    },
    /// Predict random rows of mnist.txt with saved.tinn
    Predict {
        #[arg(long, default_value_t = 1)]
        samples: usize,
    },
}

impl Cli {
    fn command(self) -> Commands {
        self.command.unwrap_or(Commands::Convert {
            max_samples: None,
            progress: false,
        })
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command() {
        Commands::Convert {
            max_samples,
            progress,
        } => {
            let options = ConvertOptions {
                max_samples,
                progress,
            };
            let stdout = io::stdout();
            let out = BufWriter::new(stdout.lock());
            if let Err(e) = convert_dataset(Path::new("."), out, &options) {
                eprintln!("Error during conversion: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Check => {
            let report = match tinn_data::check(io::stdin().lock()) {
                Ok(report) => report,
                Err(e) => {
                    eprintln!("Error checking rows: {}", e);
                    std::process::exit(1);
                }
            };
            if let Err(e) = tinn_data::write_report(&mut io::stdout().lock(), &report) {
                eprintln!("Error writing report: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Train {
            learning_rate,
            anneal,
            nb_hidden,
            iterations,
            save_stride,
            progress,
        } => {
            let options = TrainOptions {
                learning_rate,
                anneal,
                nb_hidden,
                iterations,
                save_stride,
                progress,
            };
            if let Err(e) = train::train_file(Path::new(DATA_FILE), Path::new(MODEL_FILE), &options) {
                eprintln!("Error during training: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Predict { samples } => {
            if let Err(e) = predict::predict_file(Path::new(MODEL_FILE), Path::new(DATA_FILE), samples) {
                eprintln!("Error running prediction: {}", e);
                std::process::exit(1);
            }
        }
    }
}
