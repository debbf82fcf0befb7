//! Synthetic input artifacts for the program under test

use crate::error::{Result, ScaleError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};

/// Characters the generated sequences are drawn from
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// The two files handed to one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPair {
    /// First sequence file
    pub first: PathBuf,
    /// Second sequence file
    pub second: PathBuf,
}

/// Produces the input files for one invocation
pub trait InputGenerator {
    /// Write fresh inputs of `input_size` characters each
    fn generate(&mut self, input_size: u64) -> Result<InputPair>;
}

/// Writes uniformly random character sequences into a work directory
#[derive(Debug)]
pub struct RandomInputGenerator {
    work_dir: PathBuf,
    rng: StdRng,
}

impl RandomInputGenerator {
    /// Generator writing into `work_dir`, seeded from the OS
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator, for reproducible runs
    pub fn with_seed(work_dir: impl Into<PathBuf>, seed: u64) -> Self {
        Self {
            work_dir: work_dir.into(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Directory the files are written to
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn write_sequence(&mut self, path: &Path, length: u64) -> Result<()> {
        let sequence: Vec<u8> = (0..length)
            .map(|_| ALPHABET[self.rng.gen_range(0..ALPHABET.len())])
            .collect();
        fs::write(path, sequence).map_err(|source| ScaleError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl InputGenerator for RandomInputGenerator {
    fn generate(&mut self, input_size: u64) -> Result<InputPair> {
        fs::create_dir_all(&self.work_dir).map_err(|source| ScaleError::Io {
            path: self.work_dir.clone(),
            source,
        })?;

        let pair = InputPair {
            first: self.work_dir.join(format!("test_{input_size}_A.txt")),
            second: self.work_dir.join(format!("test_{input_size}_B.txt")),
        };
        self.write_sequence(&pair.first, input_size)?;
        self.write_sequence(&pair.second, input_size)?;

        log::trace!(
            "Generated inputs of {} characters in {}",
            input_size,
            self.work_dir.display()
        );
        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_generates_files_of_requested_size() {
        let temp_dir = TempDir::new().unwrap();
        let mut generator = RandomInputGenerator::new(temp_dir.path());

        let pair = generator.generate(500).unwrap();
        let first = fs::read(&pair.first).unwrap();
        let second = fs::read(&pair.second).unwrap();

        assert_eq!(first.len(), 500);
        assert_eq!(second.len(), 500);
        assert!(first.iter().all(|c| c.is_ascii_alphanumeric()));
        assert!(pair.first.ends_with("test_500_A.txt"));
        assert!(pair.second.ends_with("test_500_B.txt"));
    }

    #[test]
    fn test_regenerates_fresh_content() {
        let temp_dir = TempDir::new().unwrap();
        let mut generator = RandomInputGenerator::with_seed(temp_dir.path(), 7);

        let pair = generator.generate(256).unwrap();
        let before = fs::read(&pair.first).unwrap();
        generator.generate(256).unwrap();
        let after = fs::read(&pair.first).unwrap();

        assert_ne!(before, after);
    }

    #[test]
    fn test_seeded_generators_agree() {
        let dir_a = TempDir::new().unwrap();
        let dir_b = TempDir::new().unwrap();

        let pair_a = RandomInputGenerator::with_seed(dir_a.path(), 42)
            .generate(128)
            .unwrap();
        let pair_b = RandomInputGenerator::with_seed(dir_b.path(), 42)
            .generate(128)
            .unwrap();

        assert_eq!(
            fs::read(pair_a.first).unwrap(),
            fs::read(pair_b.first).unwrap()
        );
    }

    #[test]
    fn test_creates_missing_work_dir() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("inputs").join("nested");
        let mut generator = RandomInputGenerator::new(&nested);

        generator.generate(10).unwrap();
        assert!(nested.join("test_10_A.txt").exists());
    }
}
