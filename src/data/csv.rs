//! CSV file backend.
//!
//! A dataset lives at `{path}/{key}.csv`, with a header row. Saving creates
//! the directory when needed and overwrites the file.

use super::{Batch, DataBackend};
use crate::config::Params;
use crate::pipeline::channel::Payload;
use crate::pipeline::error::PipelineResult;
use polars::prelude::{CsvReadOptions, CsvWriter, SerReader, SerWriter};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CsvBackend {
    key: String,
    dir: PathBuf,
}

impl CsvBackend {
    pub fn new(key: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            key: key.into(),
            dir: dir.into(),
        }
    }

    /// Build from the `key` and `path` parameters of node `node`.
    pub fn from_params(node: &str, params: &Params) -> PipelineResult<Self> {
        let key = params.string(node, "key")?;
        let dir = params.string(node, "path")?;
        Ok(Self::new(key, dir))
    }

    pub fn file_path(&self) -> PathBuf {
        self.dir.join(format!("{}.csv", self.key))
    }
}

fn open(path: &Path) -> io::Result<File> {
    File::open(path).map_err(|e| io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))
}

impl DataBackend for CsvBackend {
    fn load(&mut self) -> PipelineResult<Batch> {
        let path = self.file_path();
        let file = open(&path)?;
        let payload = CsvReadOptions::default()
            .with_has_header(true)
            .into_reader_with_file_handle(file)
            .finish()?;
        tracing::debug!("read {} rows from {}", payload.height(), path.display());
        Ok(Batch {
            key: self.key.clone(),
            payload,
        })
    }

    fn save(&mut self, payload: &Payload) -> PipelineResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.file_path();
        let mut file = File::create(&path)?;
        let mut df = payload.clone();
        CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("csv file {}", self.file_path().display())
    }
}
