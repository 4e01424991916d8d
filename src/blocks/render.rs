//! Tile bitmaps for the host renderer
//!
//! Produces a small RGBA raster per block: a flat fill, a border on solid
//! kinds, an arrow for directional kinds and a fill bar for magnitudes. The
//! host scales and composites these; skins are its concern.

use super::attrs::{Directional, TextBearing, VariableValue};
use super::{Attrs, BlockKind};
use crate::consts::CELL_SIZE;
use crate::grid::Dir;

/// Packed 0xRRGGBBAA pixels, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl Bitmap {
    pub fn new(width: usize, height: usize, fill: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, color: u32) {
        self.pixels[y * self.width + x] = color;
    }
}

const TRANSPARENT: u32 = 0x0000_0000;
const ARROW: u32 = 0xFFFF_FFFF;
const BAR: u32 = 0xFFE0_40FF;
const INK: u32 = 0x2020_20FF;

fn base_color(kind: BlockKind) -> u32 {
    match kind {
        BlockKind::Air | BlockKind::Anchor => TRANSPARENT,
        BlockKind::Ground => 0x6B4A_2BFF,
        BlockKind::Ice => 0xA8E0_FFFF,
        BlockKind::Mud => 0x4A3A_22FF,
        BlockKind::Door => 0x8B5A_2BFF,
        BlockKind::OpenDoor => 0x8B5A_2B60,
        BlockKind::Bounce => 0x40C0_40FF,
        BlockKind::Breakable => 0x9A8A_7AFF,
        BlockKind::Lava => 0xFF40_10FF,
        BlockKind::Crash => 0xFF00_FFFF,
        BlockKind::Goal => 0xFFD7_00FF,
        BlockKind::GravityArrow
        | BlockKind::GravityStrength
        | BlockKind::GravityRotate
        | BlockKind::GravityRandom => 0x5050_C0FF,
        BlockKind::Portal => 0xA040_E0FF,
        BlockKind::Activator | BlockKind::Builder | BlockKind::Remover => 0x30A0_A0FF,
        BlockKind::Coin => 0xF0C0_30FF,
        BlockKind::Sign | BlockKind::Unlock => 0xD8C8_A0FF,
        BlockKind::Water => 0x2060_E080,
        BlockKind::Booster => 0xE08A_20FF,
    }
}

fn darken(color: u32) -> u32 {
    let r = (color >> 24) & 0xFF;
    let g = (color >> 16) & 0xFF;
    let b = (color >> 8) & 0xFF;
    ((r / 2) << 24) | ((g / 2) << 16) | ((b / 2) << 8) | (color & 0xFF)
}

/// Whether local point (u, v) in [-0.5, 0.5]² lies in an arrow pointing `dir`
fn in_arrow(u: f64, v: f64, dir: Dir) -> bool {
    let (dx, dy) = (dir.dx() as f64, dir.dy() as f64);
    // Rotate into a frame where the arrow points up (-v)
    let forward = u * dx + v * dy;
    let across = u * -dy + v * dx;
    let back = -forward;
    (-0.3..=0.3).contains(&back) && across.abs() <= (back + 0.3) * 0.5
}

/// Render `kind` with `attrs` under `gravity` at `target_scale` × cell size
pub fn render(kind: BlockKind, attrs: &Attrs, gravity: Dir, target_scale: f64) -> Bitmap {
    let size = (CELL_SIZE * target_scale).round().max(1.0) as usize;
    let fill = base_color(kind);
    let mut bmp = Bitmap::new(size, size, fill);
    if fill == TRANSPARENT {
        return bmp;
    }

    if kind.solid() && size >= 4 {
        let edge = darken(fill);
        for i in 0..size {
            bmp.set(i, 0, edge);
            bmp.set(i, size - 1, edge);
            bmp.set(0, i, edge);
            bmp.set(size - 1, i, edge);
        }
    }

    if let Some(dir) = attrs.pointing(gravity) {
        for y in 0..size {
            for x in 0..size {
                let u = (x as f64 + 0.5) / size as f64 - 0.5;
                let v = (y as f64 + 0.5) / size as f64 - 0.5;
                if in_arrow(u, v, dir) {
                    bmp.set(x, y, ARROW);
                }
            }
        }
    }

    if let Some(m) = attrs.magnitude() {
        let filled = (size as f64 * f64::from(m.min(10)) / 10.0).round() as usize;
        let row = size.saturating_sub(2).max(1) - 1;
        for x in 0..filled.min(size) {
            bmp.set(x, row, BAR);
        }
    }

    // Text-bearing tiles get ruled lines, one per eight characters
    if let Some(text) = attrs.text() {
        let lines = text.chars().count().div_ceil(8).clamp(1, 3);
        for line in 0..lines {
            let y = size * (line + 1) / (lines + 1);
            for x in size / 5..size - size / 5 {
                bmp.set(x, y, INK);
            }
        }
    }

    bmp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::Facing;

    #[test]
    fn size_follows_scale() {
        let b = render(BlockKind::Ground, &Attrs::Plain, Dir::Down, 2.0);
        assert_eq!((b.width, b.height), (60, 60));
        assert_eq!(b.pixels.len(), 3600);
        let tiny = render(BlockKind::Ground, &Attrs::Plain, Dir::Down, 0.0);
        assert_eq!(tiny.width, 1);
    }

    #[test]
    fn air_is_transparent() {
        let b = render(BlockKind::Air, &Attrs::Plain, Dir::Down, 1.0);
        assert!(b.pixels.iter().all(|p| *p == TRANSPARENT));
    }

    #[test]
    fn arrow_tip_follows_locked_rotation() {
        let attrs = Attrs::Facing(Facing::new(Dir::Up, true));
        // Locked "up" under gravity right points left
        let b = render(BlockKind::GravityArrow, &attrs, Dir::Right, 1.0);
        let column = |x: usize| (0..b.height).filter(|&y| b.get(x, y) == ARROW).count();
        // Narrow tip on the left, wide base on the right
        assert!(column(7) > 0);
        assert!(column(7) < column(22));
    }
}
