use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::Particles;

/// What the presentation layer needs to draw one particle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 3],
    pub species: u8,
}

/// Returns an array of `Vertex`es in particle order, colored by species.
pub fn vertices(particles: &Particles) -> Vec<Vertex> {
    particles
        .position
        .iter()
        .zip(particles.species.iter())
        .map(|(pos, species)| Vertex {
            position: [pos.x, pos.y],
            color: species.color(),
            species: species.0,
        })
        .collect()
}

pub fn frame_path(dir: &Path, frame: usize) -> PathBuf {
    dir.join(format!("{:03}.dat", frame))
}

/// Writes a frame as MessagePack to `dir/NNN.dat`.
pub fn write_frame(dir: &Path, frame: usize, verts: &[Vertex]) -> eyre::Result<PathBuf> {
    let path = frame_path(dir, frame);
    let mut writer = std::fs::File::create(&path)
        .wrap_err_with(|| format!("Failed to create frame file: {:?}", &path))?;
    rmp_serde::encode::write(&mut writer, verts)
        .wrap_err_with(|| format!("Failed to encode frame {}", frame))?;
    Ok(path)
}

pub fn read_frame(path: &Path) -> eyre::Result<Vec<Vertex>> {
    let file = std::fs::File::open(path)
        .wrap_err_with(|| format!("Failed to open frame file: {:?}", path))?;
    rmp_serde::decode::from_read(file).wrap_err("Failed to decode frame")
}
