use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::config::{
    ExtractConfig, Overrides, DEFAULT_BLOCK_SIZE, DEFAULT_EXTENT_SIZE, DEFAULT_MOD_COUNT,
};

/// The extraction collaborator: reads the data file and writes the dump.
pub trait Extractor {
    fn dumpfile(&self, config: &ExtractConfig) -> Result<DumpSummary>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Geometry {
    pub block_size: u32,
    pub extent_size: u32,
    pub mod_count: u32,
}

impl Geometry {
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        let geometry = Self {
            block_size: overrides.block_size.map_or(DEFAULT_BLOCK_SIZE, |v| v.get()),
            extent_size: overrides.extent_size.map_or(DEFAULT_EXTENT_SIZE, |v| v.get()),
            mod_count: overrides.mod_count.map_or(DEFAULT_MOD_COUNT, |v| v.get()),
        };
        if geometry.extent_size % geometry.block_size != 0 {
            bail!(
                "Extent size ({}) is not a multiple of block size ({})",
                geometry.extent_size,
                geometry.block_size
            );
        }
        Ok(geometry)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DumpSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub geometry: Geometry,
    pub bytes: u64,
    pub blocks: u64,
    pub zero_blocks: u64,
    pub extents: u64,
    pub partial_tail: bool,
    pub elapsed_ms: i64,
}

/// Walks the data file block by block.
///
/// Claims the output path up front (it must not already exist) so that a
/// later protocol writer never clobbers an existing dump. Interpreting block
/// contents is left to that writer.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileDumper;

fn read_block(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

impl Extractor for FileDumper {
    fn dumpfile(&self, config: &ExtractConfig) -> Result<DumpSummary> {
        let started = chrono::Utc::now();
        let geometry = Geometry::resolve(config.overrides())?;

        let input = File::open(config.input_path())
            .with_context(|| format!("Failed to open data file {:?}", config.input_path()))?;
        let output = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(config.output_path())
            .with_context(|| {
                format!(
                    "Failed to create output file {:?} (it must not already exist)",
                    config.output_path()
                )
            })?;

        let block_size = geometry.block_size as usize;
        let mut reader = BufReader::with_capacity(block_size.max(8 * 1024), input);
        let mut block = vec![0u8; block_size];

        let mut bytes = 0u64;
        let mut blocks = 0u64;
        let mut zero_blocks = 0u64;
        let mut partial_tail = false;

        loop {
            let n = read_block(&mut reader, &mut block)
                .with_context(|| format!("Failed to read block {blocks}"))?;
            if n == 0 {
                break;
            }
            bytes += n as u64;
            blocks += 1;
            if block[..n].iter().all(|b| *b == 0) {
                zero_blocks += 1;
            }
            if n < block_size {
                tracing::warn!(block = blocks - 1, len = n, "short final block");
                partial_tail = true;
                break;
            }
            if blocks % 4096 == 0 {
                tracing::debug!(blocks, bytes, "progress");
            }
        }

        output
            .sync_all()
            .with_context(|| format!("Failed to sync {:?}", config.output_path()))?;

        Ok(DumpSummary {
            input: config.input_path().to_path_buf(),
            output: config.output_path().to_path_buf(),
            geometry,
            bytes,
            blocks,
            zero_blocks,
            extents: bytes.div_ceil(u64::from(geometry.extent_size)),
            partial_tail,
            elapsed_ms: (chrono::Utc::now() - started).num_milliseconds(),
        })
    }
}
