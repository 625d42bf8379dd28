//! Persisting vocabularies as plain text or as a vocabulary/frequency JSON pair.
//!
//! Text layout:
//! ```text
//! <merge count>
//! <first> <second>        one line per merge, in order
//! ---VOCABULARY---
//! <token>\t<count>        one line per token
//! ```
//!
//! JSON layout: `<base>.json` maps the five special tokens to 0..=4 and every
//! other token to the next index; `<base>_freq.json` maps the same tokens,
//! in the same order, to their counts. The index file alone carries no counts.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::constants::{Token, FREQ_FILE_SUFFIX, SPECIAL_TOKENS, VOCABULARY_MARKER};
use crate::error::{Result, VocabError};
use crate::hash_table::FrequencyTable;
use crate::stats::Pair;
use crate::vocabulary::Vocabulary;

/// Bucket count for tables rebuilt by the loaders
const LOADED_TABLE_CAPACITY: usize = 100;

/// Turn stream errors into errors naming `path`.
fn with_path(path: &Path) -> impl FnOnce(VocabError) -> VocabError + '_ {
    move |e| match e {
        VocabError::Read(err) => VocabError::io(path, err),
        other => other,
    }
}

// ------------------------ Text format ------------------------

/// Write the text representation.
pub fn write_text<W: Write>(vocab: &Vocabulary, mut writer: W) -> Result<()> {
    writeln!(writer, "{}", vocab.num_merges())?;
    for pair in vocab.merges() {
        writeln!(writer, "{}", pair)?;
    }
    writeln!(writer, "{}", VOCABULARY_MARKER)?;
    for (token, count) in vocab.iter() {
        writeln!(writer, "{}\t{}", token, count)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read the text representation. Any deviation from the layout is an error;
/// no partial vocabulary is returned.
pub fn read_text<R: BufRead>(reader: R) -> Result<Vocabulary> {
    let mut lines = reader.lines();

    let header = lines
        .next()
        .transpose()?
        .ok_or_else(|| VocabError::Format("empty vocabulary file".to_string()))?;
    let merge_count: usize = header
        .trim()
        .parse()
        .map_err(|_| VocabError::Format(format!("invalid merge count line: {:?}", header)))?;

    let mut merges = Vec::with_capacity(merge_count);
    for i in 0..merge_count {
        let line = lines.next().transpose()?.ok_or_else(|| {
            VocabError::Format(format!(
                "expected {} merges, file ends after {}",
                merge_count, i
            ))
        })?;
        let pair = Pair::parse(&line)
            .ok_or_else(|| VocabError::Format(format!("invalid merge line: {:?}", line)))?;
        merges.push(pair);
    }

    let mut found_marker = false;
    for line in lines.by_ref() {
        if line? == VOCABULARY_MARKER {
            found_marker = true;
            break;
        }
    }
    if !found_marker {
        return Err(VocabError::Format(format!(
            "missing {} marker",
            VOCABULARY_MARKER
        )));
    }

    let mut tokens = FrequencyTable::with_capacity(LOADED_TABLE_CAPACITY);
    for line in lines {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        // tokens may contain tabs, counts never do
        let (token, count) = line
            .rsplit_once('\t')
            .ok_or_else(|| VocabError::Format(format!("invalid vocabulary line: {:?}", line)))?;
        let count: u64 = count
            .trim()
            .parse()
            .map_err(|_| VocabError::Format(format!("invalid count for {:?}: {:?}", token, count)))?;
        tokens.set(Token::from(token), count);
    }

    Ok(Vocabulary::from_parts(tokens, merges))
}

/// Save the text representation to `path`.
pub fn save_text(vocab: &Vocabulary, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    write_text(vocab, create(path)?).map_err(with_path(path))?;
    log::info!(
        "Saved {} tokens and {} merges to {}",
        vocab.len(),
        vocab.num_merges(),
        path.display()
    );
    Ok(())
}

/// Load the text representation from `path`.
pub fn load_text(path: impl AsRef<Path>) -> Result<Vocabulary> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| VocabError::io(path, e))?;
    let vocab = read_text(BufReader::new(file)).map_err(with_path(path))?;
    log::info!(
        "Loaded {} tokens and {} merges from {}",
        vocab.len(),
        vocab.num_merges(),
        path.display()
    );
    Ok(vocab)
}

// ------------------------ JSON format ------------------------

/// Escape a token for a JSON string literal.
///
/// `/` is escaped as well, matching files produced by earlier versions of
/// the tool; remaining control characters use `\u` escapes.
pub fn json_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 2);
    for c in input.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '/' => out.push_str("\\/"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// `(<base>.json, <base>_freq.json)`
pub fn json_paths(base: impl AsRef<Path>) -> (PathBuf, PathBuf) {
    let base = base.as_ref().as_os_str();
    let mut vocab_path = OsString::from(base);
    vocab_path.push(".json");
    let mut freq_path = OsString::from(base);
    freq_path.push(FREQ_FILE_SUFFIX);
    (vocab_path.into(), freq_path.into())
}

/// Frequency companion of a vocabulary JSON path: `x.json` becomes `x_freq.json`.
pub fn freq_path_for(json_path: impl AsRef<Path>) -> PathBuf {
    let json_path = json_path.as_ref();
    let base = if json_path.extension().is_some_and(|ext| ext == "json") {
        json_path.with_extension("")
    } else {
        json_path.to_path_buf()
    };
    json_paths(base).1
}

fn is_special(token: &str) -> bool {
    SPECIAL_TOKENS.contains(&token)
}

fn json_entries(vocab: &Vocabulary) -> Vec<(&Token, u64)> {
    vocab.iter().filter(|(t, _)| !is_special(t)).collect()
}

fn separator(i: usize, len: usize) -> &'static str {
    if i + 1 < len {
        ","
    } else {
        ""
    }
}

/// Write the index document: special tokens first, then every other token
/// numbered from `SPECIAL_TOKENS.len()`.
pub fn write_json_index<W: Write>(vocab: &Vocabulary, mut writer: W) -> Result<()> {
    let entries = json_entries(vocab);
    writeln!(writer, "{{")?;

    for (index, special) in SPECIAL_TOKENS.iter().enumerate() {
        let last = index + 1 == SPECIAL_TOKENS.len() && entries.is_empty();
        writeln!(
            writer,
            "  \"{}\": {}{}",
            special,
            index,
            if last { "" } else { "," }
        )?;
    }
    for (i, (token, _)) in entries.iter().enumerate() {
        writeln!(
            writer,
            "  \"{}\": {}{}",
            json_escape(token),
            SPECIAL_TOKENS.len() + i,
            separator(i, entries.len())
        )?;
    }

    writeln!(writer, "}}")?;
    writer.flush()?;
    Ok(())
}

/// Write the frequency document, same tokens in the same order as the index.
pub fn write_json_counts<W: Write>(vocab: &Vocabulary, mut writer: W) -> Result<()> {
    let entries = json_entries(vocab);
    writeln!(writer, "{{")?;
    for (i, (token, count)) in entries.iter().enumerate() {
        writeln!(
            writer,
            "  \"{}\": {}{}",
            json_escape(token),
            count,
            separator(i, entries.len())
        )?;
    }
    writeln!(writer, "}}")?;
    writer.flush()?;
    Ok(())
}

/// Write the index document and the frequency document.
pub fn write_json<V: Write, F: Write>(
    vocab: &Vocabulary,
    vocab_writer: V,
    freq_writer: F,
) -> Result<()> {
    write_json_index(vocab, vocab_writer)?;
    write_json_counts(vocab, freq_writer)
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| VocabError::io(path, e))
}

/// Save `<base>.json` and `<base>_freq.json`.
///
/// Errors name the file that failed.
pub fn save_json(vocab: &Vocabulary, base: impl AsRef<Path>) -> Result<()> {
    let (vocab_path, freq_path) = json_paths(base);
    write_json_index(vocab, create(&vocab_path)?).map_err(with_path(&vocab_path))?;
    write_json_counts(vocab, create(&freq_path)?).map_err(with_path(&freq_path))?;
    log::info!("Vocabulary saved to {}", vocab_path.display());
    log::info!("Frequencies saved to {}", freq_path.display());
    Ok(())
}

fn parse_flat_object(text: &str, what: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        other => Err(VocabError::Format(format!(
            "{} is not a JSON object (found {})",
            what,
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn count_value(key: &str, value: &Value) -> Result<u64> {
    value.as_u64().ok_or_else(|| {
        VocabError::Format(format!(
            "value for {:?} must be a non-negative integer, found {}",
            key, value
        ))
    })
}

/// Rebuild a vocabulary from the index document and, optionally, the
/// frequency document.
///
/// Without frequencies a token's count is its index (or 1 for a string
/// value). String values containing a space are merge entries written by
/// older versions of the tool and are collected in document order. The
/// frequency document only updates tokens already present. Special tokens
/// are skipped.
pub fn read_json(vocab_text: &str, freq_text: Option<&str>) -> Result<Vocabulary> {
    let document = parse_flat_object(vocab_text, "vocabulary")?;

    let mut tokens = FrequencyTable::with_capacity(LOADED_TABLE_CAPACITY);
    let mut merges = Vec::new();
    for (key, value) in document {
        if is_special(&key) {
            continue;
        }
        match &value {
            Value::Number(_) => {
                let index = count_value(&key, &value)?;
                tokens.set(Token::from(key), index);
            }
            Value::String(s) => match Pair::parse(s) {
                Some(pair) => merges.push(pair),
                None => {
                    tokens.set(Token::from(key), 1);
                }
            },
            other => {
                return Err(VocabError::Format(format!(
                    "value for {:?} must be a string or a number, found {}",
                    key,
                    json_kind(other)
                )))
            }
        }
    }

    if let Some(freq_text) = freq_text {
        for (key, value) in parse_flat_object(freq_text, "frequency file")? {
            let count = count_value(&key, &value)?;
            if tokens.contains_key(key.as_str()) {
                tokens.set(Token::from(key), count);
            }
        }
    }

    Ok(Vocabulary::from_parts(tokens, merges))
}

/// Load a vocabulary JSON file and its `_freq.json` companion.
///
/// A missing companion is tolerated (counts stay as index placeholders);
/// any other failure on either file is an error.
pub fn load_json(path: impl AsRef<Path>) -> Result<Vocabulary> {
    let path = path.as_ref();
    let vocab_text = fs::read_to_string(path).map_err(|e| VocabError::io(path, e))?;

    let freq_path = freq_path_for(path);
    let freq_text = match fs::read_to_string(&freq_path) {
        Ok(text) => Some(text),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::warn!(
                "No frequency file at {}; counts are index placeholders",
                freq_path.display()
            );
            None
        }
        Err(e) => return Err(VocabError::io(&freq_path, e)),
    };

    let vocab = read_json(&vocab_text, freq_text.as_deref())?;
    log::info!(
        "Loaded {} tokens and {} merges from {}",
        vocab.len(),
        vocab.num_merges(),
        path.display()
    );
    Ok(vocab)
}
