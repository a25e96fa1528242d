use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use fidel_recognizer::{
    init_tracing, ImageSize, Prediction, Recognizer, RecognizerConfig, RecognizerError,
};
use tracing::{error, info};

/// Recognize handwritten Amharic (Fidel) characters
#[derive(Parser)]
#[command(name = "fidel-recognizer")]
#[command(about = "Classifies handwritten Fidel characters and prints the mapped glyph")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the ONNX model, overrides the configuration
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Path to the class identifier list (JSON array or one per line), overrides the
    /// configuration. A NumPy class_names.npy must be converted first:
    /// python -c "import json, numpy as np; print(json.dumps([str(c) for c in
    /// np.load('class_names.npy', allow_pickle=True)]))" > class_names.json
    #[arg(long, verbatim_doc_comment)]
    classes: Option<PathBuf>,

    /// Model input size as WIDTHxHEIGHT when the model does not declare one
    #[arg(long)]
    input_size: Option<ImageSize>,

    /// Treat inputs as RGBA drawing canvas captures (channel extraction and inversion)
    #[arg(long)]
    canvas: bool,

    /// Print one JSON object per image
    #[arg(long)]
    json: bool,

    /// Paths to input image files
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

fn display(path: &str, prediction: &Prediction, json: bool) {
    if json {
        match serde_json::to_string(prediction) {
            Ok(line) => println!("{line}"),
            Err(e) => error!("Cannot serialize prediction for {}: {}", path, e),
        }
    } else {
        println!("{path}");
        println!("  Predicted Class: {}", prediction.class_id);
        println!("  Mapped Fidel Character: {}", prediction.glyph);
    }
}

fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RecognizerConfig::load(path),
        None => Ok(RecognizerConfig::default()),
    };
    let mut config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(model) = args.model {
        config.model_path = model;
    }
    if let Some(classes) = args.classes {
        config.classes_path = classes;
    }
    if args.input_size.is_some() {
        config.input_size = args.input_size;
    }

    let recognizer = match Recognizer::from_config(&config) {
        Ok(recognizer) => recognizer,
        Err(e) => {
            error!("Cannot start: {}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                error!("  caused by: {}", cause);
                source = cause.source();
            }
            return ExitCode::FAILURE;
        }
    };

    info!("Processing {} images...", args.images.len());
    let mut failures = 0;
    for path in &args.images {
        let shown = path.display().to_string();
        let result = if args.canvas {
            image::open(path)
                .map_err(RecognizerError::InvalidImage)
                .and_then(|image| recognizer.recognize_canvas(&image.to_rgba8()))
        } else {
            recognizer.recognize_path(path)
        };
        match result {
            Ok(prediction) => display(&shown, &prediction, args.json),
            Err(e) if e.is_input_error() => {
                failures += 1;
                error!("Invalid input {}: {}", shown, e);
            }
            Err(e) => {
                failures += 1;
                error!("Failed to recognize {}: {}", shown, e);
            }
        }
    }

    if failures == args.images.len() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
