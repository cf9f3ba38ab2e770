//! JSON reading and writing of cubes.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use nimbus_cube::Cube;
use tracing::info;

/// Reads a cube from a JSON file.
pub fn read_cube(path: &Path) -> Result<Cube> {
    info!(path = %path.display(), "reading cube");
    let file =
        File::open(path).with_context(|| format!("failed to open cube: {}", path.display()))?;
    let cube: Cube = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse cube: {}", path.display()))?;
    info!(
        name = cube.name(),
        kind = ?cube.kind(),
        shape = ?cube.data().shape(),
        "cube loaded"
    );
    Ok(cube)
}

/// Writes a cube to a JSON file.
pub fn write_cube(path: &Path, cube: &Cube) -> Result<()> {
    info!(path = %path.display(), "writing cube");
    let file =
        File::create(path).with_context(|| format!("failed to create: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, cube)
        .with_context(|| format!("failed to write cube: {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to flush: {}", path.display()))?;
    Ok(())
}
