//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use polars::df;
use polars::prelude::{CsvReadOptions, CsvWriter, DataFrame, SerReader, SerWriter};
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary input/output directories for one test.
pub struct Workspace {
    root: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn input(&self) -> PathBuf {
        self.root.path().join("in")
    }

    pub fn output(&self) -> PathBuf {
        self.root.path().join("out")
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Write `df` as `{input}/{key}.csv`.
    pub fn seed(&self, key: &str, df: &DataFrame) -> PathBuf {
        write_csv(&self.input(), key, df)
    }

    pub fn output_file(&self, key: &str) -> PathBuf {
        self.output().join(format!("{key}.csv"))
    }
}

pub fn write_csv(dir: &Path, key: &str, df: &DataFrame) -> PathBuf {
    std::fs::create_dir_all(dir).expect("create fixture dir");
    let path = dir.join(format!("{key}.csv"));
    let mut file = File::create(&path).expect("create fixture file");
    let mut df = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .expect("write fixture");
    path
}

pub fn read_csv(path: &Path) -> DataFrame {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .expect("open csv")
        .finish()
        .expect("parse csv")
}

/// A small orders table.
pub fn orders() -> DataFrame {
    df!(
        "order_id" => [101i64, 102, 103, 104],
        "customer" => ["ada", "grace", "linus", "ada"],
        "amount" => [12.5f64, 3.0, 99.25, 7.75]
    )
    .expect("orders frame")
}
