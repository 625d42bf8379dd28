//! Python bindings, built with the `python` feature.

use std::str::FromStr;

use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::{create_exception, PyErr};

use crate::config::{InputFormat, TrainerConfig};
use crate::error::VocabError;
use crate::serialization;
use crate::training::Trainer;
use crate::vocabulary::Vocabulary;

create_exception!(
    molvocgen,
    VocabularyError,
    PyRuntimeError,
    "Malformed vocabulary file or segmentation failure"
);

fn to_py_err(err: VocabError) -> PyErr {
    match err {
        VocabError::Io { .. } | VocabError::Read(_) => PyIOError::new_err(err.to_string()),
        VocabError::InvalidConfig(_) => PyValueError::new_err(err.to_string()),
        _ => VocabularyError::new_err(err.to_string()),
    }
}

fn trainer(num_merges: u32, format: &str, parallel: bool) -> PyResult<Trainer> {
    let format = InputFormat::from_str(format).map_err(to_py_err)?;
    let config = TrainerConfig::new(format, num_merges).with_parallel(parallel);
    Trainer::new(config).map_err(to_py_err)
}

/// Trained vocabulary: token counts and ordered merges.
#[pyclass(module = "molvocgen", name = "Vocabulary")]
pub struct PyVocabulary {
    inner: Vocabulary,
}

impl From<Vocabulary> for PyVocabulary {
    fn from(inner: Vocabulary) -> Self {
        Self { inner }
    }
}

#[pymethods]
impl PyVocabulary {
    /// Count of `token`, or None when absent
    pub fn count(&self, token: &str) -> Option<u64> {
        self.inner.count(token)
    }

    /// Merges as (first, second) tuples in the order they were applied
    pub fn merges(&self) -> Vec<(String, String)> {
        self.inner
            .merges()
            .iter()
            .map(|pair| (pair.first.to_string(), pair.second.to_string()))
            .collect()
    }

    /// (token, count) tuples, most frequent first
    pub fn entries(&self) -> Vec<(String, u64)> {
        self.inner
            .sorted_by_count()
            .into_iter()
            .map(|(token, count)| (token.to_string(), count))
            .collect()
    }

    pub fn __len__(&self) -> usize {
        self.inner.len()
    }

    pub fn __repr__(&self) -> String {
        format!(
            "Vocabulary(tokens={}, merges={})",
            self.inner.len(),
            self.inner.num_merges()
        )
    }

    pub fn save_text(&self, path: &str) -> PyResult<()> {
        serialization::save_text(&self.inner, path).map_err(to_py_err)
    }

    /// Write `<base>.json` and `<base>_freq.json`
    pub fn save_json(&self, base: &str) -> PyResult<()> {
        serialization::save_json(&self.inner, base).map_err(to_py_err)
    }

    #[staticmethod]
    pub fn load_text(path: &str) -> PyResult<Self> {
        serialization::load_text(path)
            .map(Self::from)
            .map_err(to_py_err)
    }

    #[staticmethod]
    pub fn load_json(path: &str) -> PyResult<Self> {
        serialization::load_json(path)
            .map(Self::from)
            .map_err(to_py_err)
    }
}

/// Split one molecule string into its atomic tokens
#[pyfunction]
#[pyo3(signature = (raw, format="selfies"))]
fn segment(raw: &str, format: &str) -> PyResult<Vec<String>> {
    let format = InputFormat::from_str(format).map_err(to_py_err)?;
    let sequence = crate::segmenter::segment(raw, format).map_err(to_py_err)?;
    Ok(sequence.to_strings())
}

/// Train a vocabulary on a corpus file, one molecule per line
#[pyfunction]
#[pyo3(signature = (path, num_merges, format="selfies", parallel=false))]
fn train_file(
    py: Python<'_>,
    path: &str,
    num_merges: u32,
    format: &str,
    parallel: bool,
) -> PyResult<PyVocabulary> {
    let trainer = trainer(num_merges, format, parallel)?;
    let outcome = py
        .detach(|| trainer.train_file(path))
        .map_err(to_py_err)?;
    Ok(outcome.vocabulary.into())
}

/// Train a vocabulary on a list of molecule strings
#[pyfunction]
#[pyo3(signature = (lines, num_merges, format="selfies", parallel=false))]
fn train_lines(
    py: Python<'_>,
    lines: Vec<String>,
    num_merges: u32,
    format: &str,
    parallel: bool,
) -> PyResult<PyVocabulary> {
    let trainer = trainer(num_merges, format, parallel)?;
    let outcome = py.detach(|| trainer.train_lines(&lines));
    Ok(outcome.vocabulary.into())
}

/// BPE vocabulary training for SMILES and SELFIES corpora
#[pymodule]
fn molvocgen(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();
    m.add_class::<PyVocabulary>()?;
    m.add_function(wrap_pyfunction!(segment, m)?)?;
    m.add_function(wrap_pyfunction!(train_file, m)?)?;
    m.add_function(wrap_pyfunction!(train_lines, m)?)?;
    m.add("VocabularyError", m.py().get_type::<VocabularyError>())?;
    Ok(())
}
