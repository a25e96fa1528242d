use std::env;

use fidel_recognizer::{init_tracing, Recognizer, RecognizerConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let path = env::args().nth(1).ok_or("no image path")?;

    let recognizer = Recognizer::from_config(&RecognizerConfig::default())?;
    let prediction = recognizer.recognize_path(&path)?;

    println!("Predicted Class: {}", prediction.class_id);
    println!("Mapped Fidel Character: {}", prediction.glyph);
    Ok(())
}
