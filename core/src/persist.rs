use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use crate::document::Document;
use crate::error::Result;
use crate::index::{InvertedIndex, SignatureIndex, VectorIndex};
use crate::model::{
    InvertedListBooleanModel, Model, ModelKind, SignatureBooleanModel, TermViewOptions, VectorSpaceModel,
};
use crate::tokenizer::StopWords;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Locations of the collection and stop-word files inside a data directory.
pub struct DataPaths {
    pub root: PathBuf,
}

impl DataPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn collection(&self) -> PathBuf { self.root.join("collection.json") }
    pub fn stop_words(&self) -> PathBuf { self.root.join("stopwords.json") }
}

/// Locations of the files of one index snapshot.
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    fn inverted(&self) -> PathBuf { self.root.join("inverted.bin") }
    fn signatures(&self) -> PathBuf { self.root.join("signatures.bin") }
    fn vector(&self) -> PathBuf { self.root.join("vector.bin") }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub created_at: String,
    pub version: u32,
    pub model: ModelKind,
    pub options: TermViewOptions,
}

fn open_or_warn(path: &Path, what: &str) -> Result<Option<File>> {
    match File::open(path) {
        Ok(f) => Ok(Some(f)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "no {what} found, starting empty");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn save_collection(paths: &DataPaths, collection: &[Document]) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.collection())?;
    let json = serde_json::to_string(collection)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

/// Loads the saved collection; a missing file yields an empty collection.
pub fn load_collection(paths: &DataPaths) -> Result<Vec<Document>> {
    let Some(f) = open_or_warn(&paths.collection(), "collection")? else {
        return Ok(Vec::new());
    };
    let collection: Vec<Document> = serde_json::from_reader(BufReader::new(f))?;
    tracing::info!(num_docs = collection.len(), "loaded collection");
    Ok(collection)
}

/// Stop words are written sorted so the file is stable between runs.
pub fn save_stop_words(paths: &DataPaths, stop_words: &StopWords) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut words: Vec<&String> = stop_words.iter().collect();
    words.sort();
    let mut f = File::create(paths.stop_words())?;
    let json = serde_json::to_string(&words)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_stop_words(paths: &DataPaths) -> Result<StopWords> {
    let Some(f) = open_or_warn(&paths.stop_words(), "stop word list")? else {
        return Ok(StopWords::new());
    };
    let words: Vec<String> = serde_json::from_reader(BufReader::new(f))?;
    Ok(words.into_iter().collect())
}

/// Reads a plain-text stop word list with one word per line.
pub fn load_stop_word_list(path: &Path) -> Result<StopWords> {
    let reader = BufReader::new(File::open(path)?);
    let mut stop_words = StopWords::new();
    for line in reader.lines() {
        let word = line?.trim().to_lowercase();
        if !word.is_empty() {
            stop_words.insert(word);
        }
    }
    tracing::info!(path = %path.display(), stop_words = stop_words.len(), "loaded stop word list");
    Ok(stop_words)
}

fn write_bincode<T: Serialize>(path: PathBuf, value: &T) -> Result<()> {
    let mut f = File::create(path)?;
    let bytes = bincode::serialize(value)?;
    f.write_all(&bytes)?;
    Ok(())
}

fn read_bincode<T: for<'de> Deserialize<'de>>(path: PathBuf) -> Result<T> {
    let mut f = File::open(path)?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(bincode::deserialize(&buf)?)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Writes the model's index snapshot next to its metadata.
///
/// The linear model has no index; only the metadata is written for it.
pub fn save_snapshot(paths: &IndexPaths, model: &Model, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    match model {
        Model::Linear => {}
        Model::InvertedList(m) => write_bincode(paths.inverted(), m.index()?)?,
        Model::Signature(m) => write_bincode(paths.signatures(), m.index()?)?,
        Model::VectorSpace(m) => write_bincode(paths.vector(), m.index()?)?,
    }
    save_meta(paths, meta)?;
    tracing::info!(root = %paths.root.display(), model = %model, "saved index snapshot");
    Ok(())
}

pub fn load_snapshot(paths: &IndexPaths) -> Result<(Model, MetaFile)> {
    let meta = load_meta(paths)?;
    if meta.version != SNAPSHOT_VERSION {
        tracing::warn!(found = meta.version, expected = SNAPSHOT_VERSION, "snapshot version differs");
    }
    let model = match meta.model {
        ModelKind::Linear => Model::Linear,
        ModelKind::InvertedList => {
            let index: InvertedIndex = read_bincode(paths.inverted())?;
            Model::InvertedList(InvertedListBooleanModel::with_index(index))
        }
        ModelKind::Signature => {
            let index: SignatureIndex = read_bincode(paths.signatures())?;
            Model::Signature(SignatureBooleanModel::with_index(index))
        }
        ModelKind::VectorSpace => {
            let index: VectorIndex = read_bincode(paths.vector())?;
            Model::VectorSpace(VectorSpaceModel::with_index(index))
        }
    };
    Ok((model, meta))
}

/// Serialized bytes of a model's snapshot; equal inputs give equal bytes.
pub fn snapshot_bytes(model: &Model) -> Result<Vec<u8>> {
    let bytes = match model {
        Model::Linear => Vec::new(),
        Model::InvertedList(m) => bincode::serialize(m.index()?)?,
        Model::Signature(m) => bincode::serialize(m.index()?)?,
        Model::VectorSpace(m) => bincode::serialize(m.index()?)?,
    };
    Ok(bytes)
}
