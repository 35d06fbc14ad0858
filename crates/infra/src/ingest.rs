use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use forumchain_domain::note::{Note, RawNote};
use forumchain_domain::structure::ForumRecord;

const LINE_DELIMITED_EXTENSIONS: &[&str] = &["ndjson", "jsonl"];

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialization error on {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl IngestError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn serialization(path: &Path, source: serde_json::Error) -> Self {
        Self::Serialization {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn is_line_delimited(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            LINE_DELIMITED_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

pub fn load_raw_notes(path: &Path) -> Result<Vec<RawNote>, IngestError> {
    let file = fs::File::open(path).map_err(|err| IngestError::io(path, err))?;
    let reader = BufReader::new(file);

    if !is_line_delimited(path) {
        return serde_json::from_reader(reader).map_err(|err| IngestError::serialization(path, err));
    }

    let mut notes = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| IngestError::io(path, err))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<RawNote>(&line) {
            Ok(note) => notes.push(note),
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    line = index + 1,
                    error = %err,
                    "skipping malformed note line"
                );
            }
        }
    }
    Ok(notes)
}

pub fn normalize_notes(raw: Vec<RawNote>) -> Vec<Note> {
    let mut notes = Vec::with_capacity(raw.len());
    for (index, raw_note) in raw.into_iter().enumerate() {
        match Note::try_from(raw_note) {
            Ok(note) => notes.push(note),
            Err(err) => {
                tracing::warn!(index, error = %err, "skipping invalid note");
            }
        }
    }
    notes
}

pub fn load_notes(path: &Path) -> Result<Vec<Note>, IngestError> {
    let raw = load_raw_notes(path)?;
    let total = raw.len();
    let notes = normalize_notes(raw);
    tracing::info!(
        path = %path.display(),
        total,
        accepted = notes.len(),
        "loaded note dump"
    );
    Ok(notes)
}

pub fn write_records(
    path: &Path,
    records: &BTreeMap<String, ForumRecord>,
) -> Result<(), IngestError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| IngestError::io(parent, err))?;
    }

    let staging = staging_path(path);
    let file = fs::File::create(&staging).map_err(|err| IngestError::io(&staging, err))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)
        .map_err(|err| IngestError::serialization(&staging, err))?;
    writer
        .flush()
        .map_err(|err| IngestError::io(&staging, err))?;
    drop(writer);

    fs::rename(&staging, path).map_err(|err| IngestError::io(path, err))?;
    tracing::info!(path = %path.display(), forums = records.len(), "wrote structured records");
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_pick_the_reader() {
        assert!(is_line_delimited(Path::new("dump.ndjson")));
        assert!(is_line_delimited(Path::new("dump.JSONL")));
        assert!(!is_line_delimited(Path::new("dump.json")));
        assert!(!is_line_delimited(Path::new("dump")));
    }

    #[test]
    fn staging_file_sits_next_to_the_target() {
        assert_eq!(
            staging_path(Path::new("out/records.json")),
            PathBuf::from("out/records.json.tmp")
        );
    }
}
