// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! JSON artifacts on disk.
//!
//! Writers go through a temporary file in the destination directory that is
//! persisted over the target in one rename, so a reader sees either the old
//! artifact or the complete new one.

use std::{
    fs,
    io::{BufWriter, Write},
    path::Path
};

use serde::{Serialize, de::DeserializeOwned};
use tempfile::NamedTempFile;

use crate::error::{self, Error};

/// Serializes `value` as pretty JSON and atomically replaces `path`.
///
/// Parent directories are created when missing.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be written and
/// [`Error::Serialize`] when the value cannot be encoded.
pub fn write_json<T>(path: &Path, value: &T) -> Result<(), Error>
where
    T: Serialize + ?Sized
{
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new(".")
    };
    fs::create_dir_all(parent).map_err(|source| error::io_error(parent, source))?;

    let temp = NamedTempFile::new_in(parent).map_err(|source| error::io_error(parent, source))?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer
            .write_all(b"\n")
            .map_err(|source| error::io_error(path, source))?;
        writer
            .flush()
            .map_err(|source| error::io_error(path, source))?;
    }

    temp.persist(path)
        .map_err(|persist| error::io_error(path, persist.error))?;
    Ok(())
}

/// Reads and decodes a JSON artifact.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be read and [`Error::Decode`]
/// when its contents do not match `T`.
pub fn read_json<T>(path: &Path) -> Result<T, Error>
where
    T: DeserializeOwned
{
    let contents = fs::read_to_string(path).map_err(|source| error::io_error(path, source))?;
    serde_json::from_str(&contents).map_err(|source| error::decode_error(path, source))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn write_json_creates_parent_directories() {
        let dir = tempdir().expect("failed to create tempdir");
        let path = dir.path().join("nested/out/results.json");
        let value = BTreeMap::from([("Rust", 10u64)]);

        write_json(&path, &value).expect("write should succeed");

        let contents = fs::read_to_string(&path).expect("read back");
        assert_eq!(contents, "{\n  \"Rust\": 10\n}\n");
    }

    #[test]
    fn write_json_overwrites_previous_contents() {
        let dir = tempdir().expect("failed to create tempdir");
        let path = dir.path().join("repos.json");
        write_json(&path, &vec!["a", "b", "c"]).expect("first write");
        write_json(&path, &vec!["d"]).expect("second write");

        let stored: Vec<String> = read_json(&path).expect("read back");
        assert_eq!(stored, vec!["d".to_owned()]);
        let leftovers = fs::read_dir(dir.path()).expect("list dir").count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn read_json_reports_missing_file() {
        let dir = tempdir().expect("failed to create tempdir");
        let error = read_json::<Vec<String>>(&dir.path().join("absent.json"))
            .expect_err("missing file");
        assert!(matches!(error, Error::Io { .. }));
    }

    #[test]
    fn read_json_reports_malformed_contents() {
        let dir = tempdir().expect("failed to create tempdir");
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").expect("write fixture");
        let error = read_json::<Vec<String>>(&path).expect_err("malformed file");
        assert!(matches!(error, Error::Decode { .. }));
    }
}
