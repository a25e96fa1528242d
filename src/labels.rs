//! Loading the class identifier list that ships next to the model.
//!
//! Two layouts are accepted: a JSON array (`["ha", "hu", 3]`, numbers are kept as their decimal
//! text) or plain text with one identifier per line. Order is model output order and is never
//! changed after loading.
//!
//! NumPy `.npy` class lists are refused with a conversion hint; they are usually pickled object
//! arrays and must be re-saved as JSON first (see [`NPY_CONVERSION_HINT`]).

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use super::{RecognizerError, Result};

pub const NPY_CONVERSION_HINT: &str = "convert it to JSON first: python -c \"import json, numpy as np; \
print(json.dumps([str(c) for c in np.load('class_names.npy', allow_pickle=True)]))\" > class_names.json";

fn npy_refusal() -> String {
    format!("NumPy class lists are not read; {NPY_CONVERSION_HINT}")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelFormat {
    Json,
    Lines,
    Numpy,
}

impl LabelFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => LabelFormat::Json,
            Some(ext) if ext.eq_ignore_ascii_case("npy") => LabelFormat::Numpy,
            _ => LabelFormat::Lines,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLabel {
    Text(String),
    Integer(i64),
}

impl From<RawLabel> for String {
    fn from(label: RawLabel) -> Self {
        match label {
            RawLabel::Text(s) => s,
            RawLabel::Integer(n) => n.to_string(),
        }
    }
}

pub fn parse_class_identifiers(
    content: &str,
    format: LabelFormat,
) -> std::result::Result<Vec<String>, String> {
    let ids: Vec<String> = match format {
        LabelFormat::Json => serde_json::from_str::<Vec<RawLabel>>(content)
            .map_err(|e| e.to_string())?
            .into_iter()
            .map(String::from)
            .collect(),
        LabelFormat::Lines => content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect(),
        LabelFormat::Numpy => return Err(npy_refusal()),
    };
    if ids.is_empty() {
        return Err("no class identifiers".to_string());
    }
    Ok(ids)
}

/// Any failure here is fatal for the caller: without identifiers nothing can be reported.
pub fn load_class_identifiers<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let load_error = |message: String| RecognizerError::ClassListLoad {
        path: path.to_path_buf(),
        message,
    };
    let format = LabelFormat::from_path(path);
    if format == LabelFormat::Numpy {
        return Err(load_error(npy_refusal()));
    }
    let content = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
    let ids = parse_class_identifiers(&content, format).map_err(load_error)?;
    info!(path = %path.display(), classes = ids.len(), "loaded class identifiers");
    Ok(ids)
}
