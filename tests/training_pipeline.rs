use std::fs;

use molvocgen::serialization::{json_paths, load_json, load_text};
use molvocgen::{InputFormat, Pair, Trainer, TrainerConfig, VocabError};
use tempfile::TempDir;

const SMILES_CORPUS: &str = "CCO\nCC(=O)O\n\nc1ccccc1\nCCN(CC)CC\nClCCBr\n";

fn trainer(format: InputFormat, num_merges: u32) -> Trainer {
    Trainer::new(TrainerConfig::new(format, num_merges)).unwrap()
}

#[test]
fn train_and_save_writes_all_outputs() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus.smi");
    fs::write(&corpus, SMILES_CORPUS).unwrap();
    let out_dir = dir.path().join("nested").join("out");

    let (outcome, paths) = trainer(InputFormat::Smiles, 5)
        .train_and_save(&corpus, &out_dir)
        .unwrap();

    assert_eq!(outcome.molecules, 5);
    assert_eq!(outcome.merges_performed, 5);
    assert_eq!(paths.text, out_dir.join("vocab_5.txt"));
    assert!(paths.text.is_file());
    assert!(paths.files().iter().all(|file| file.is_file()));

    let (vocab_json, freq_json) = json_paths(&paths.json_base);
    assert_eq!(vocab_json, out_dir.join("vocab_5.json"));
    assert_eq!(freq_json, out_dir.join("vocab_5_freq.json"));
    assert!(vocab_json.is_file());
    assert!(freq_json.is_file());
}

#[test]
fn text_file_round_trip_preserves_everything() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus.smi");
    fs::write(&corpus, SMILES_CORPUS).unwrap();

    let (outcome, paths) = trainer(InputFormat::Smiles, 8)
        .train_and_save(&corpus, dir.path())
        .unwrap();
    let loaded = load_text(&paths.text).unwrap();

    assert_eq!(loaded.merges(), outcome.vocabulary.merges());
    assert!(loaded.same_entries(&outcome.vocabulary));
}

#[test]
fn json_file_round_trip_preserves_counts() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus.selfies");
    fs::write(&corpus, "[C][C][O]\n[C][C][C][O]\n[C][=O][O]\n").unwrap();

    let (outcome, paths) = trainer(InputFormat::Selfies, 3)
        .train_and_save(&corpus, dir.path())
        .unwrap();
    let (vocab_json, _) = json_paths(&paths.json_base);
    let loaded = load_json(&vocab_json).unwrap();

    assert!(loaded.same_entries(&outcome.vocabulary));
    // the JSON pair carries no merge list
    assert!(loaded.merges().is_empty());

    let raw = fs::read_to_string(&vocab_json).unwrap();
    assert!(raw.starts_with("{\n  \"<s>\": 0,\n  \"<pad>\": 1,"));
    assert!(serde_json::from_str::<serde_json::Value>(&raw).is_ok());
}

#[test]
fn json_load_without_frequency_file_keeps_placeholders() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vocab.json");
    fs::write(&path, "{\n  \"<s>\": 0,\n  \"[C]\": 5,\n  \"[O]\": 6\n}\n").unwrap();

    let loaded = load_json(&path).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.count("[C]"), Some(5));
    assert!(!loaded.contains("<s>"));
}

#[test]
fn missing_corpus_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.smi");

    let err = trainer(InputFormat::Smiles, 1)
        .train_file(&missing)
        .unwrap_err();
    match err {
        VocabError::Io { path, .. } => assert_eq!(path, missing),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn truncated_text_vocabulary_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vocab.txt");
    fs::write(&path, "3\n[C] [C]\n---VOCABULARY---\n[C]\t4\n").unwrap();

    assert!(matches!(load_text(&path), Err(VocabError::Format(_))));
}

#[test]
fn file_and_text_training_agree() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus.smi");
    fs::write(&corpus, SMILES_CORPUS).unwrap();

    let trainer = trainer(InputFormat::Smiles, 6);
    let from_file = trainer.train_file(&corpus).unwrap();
    let from_text = trainer.train_text(SMILES_CORPUS);

    assert_eq!(from_file.vocabulary.merges(), from_text.vocabulary.merges());
    assert!(from_file.vocabulary.same_entries(&from_text.vocabulary));
}

#[test]
fn crlf_corpus_trains_like_lf() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus.smi");
    fs::write(&corpus, "CCO\r\nCCO\r\n\r\nCCN\r\n").unwrap();

    let outcome = trainer(InputFormat::Smiles, 1).train_file(&corpus).unwrap();
    assert_eq!(outcome.molecules, 3);
    assert_eq!(outcome.vocabulary.merges(), &[Pair::new("C", "C")]);
    assert_eq!(outcome.vocabulary.count("CC"), Some(3));
}

#[test]
fn wrong_format_yields_empty_sequences() {
    // SMILES read as SELFIES matches nothing, so there is nothing to merge
    let outcome = trainer(InputFormat::Selfies, 4).train_text("CCO\nc1ccccc1");
    assert_eq!(outcome.molecules, 2);
    assert!(outcome.vocabulary.is_empty());
    assert!(outcome.stopped_early);
}

#[test]
fn undecodable_lines_are_skipped() {
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus.smi");
    fs::write(&corpus, b"CCO\nCCO\n# caf\xe9 comment\nCCN\n").unwrap();

    let outcome = trainer(InputFormat::Smiles, 1).train_file(&corpus).unwrap();
    assert_eq!(outcome.molecules, 3);
    assert_eq!(outcome.vocabulary.count("CC"), Some(3));
}

#[test]
fn crlf_text_counts_molecules_like_files() {
    let text = "CCO\r\n\r\nCCN\r\n";
    let dir = TempDir::new().unwrap();
    let corpus = dir.path().join("corpus.smi");
    fs::write(&corpus, text).unwrap();

    let trainer = trainer(InputFormat::Smiles, 2);
    let from_text = trainer.train_text(text);
    let from_file = trainer.train_file(&corpus).unwrap();

    assert_eq!(from_text.molecules, 2);
    assert_eq!(from_text.molecules, from_file.molecules);
    assert!(from_text.vocabulary.same_entries(&from_file.vocabulary));
}
