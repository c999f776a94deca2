// GlyphScene
// copyright glyphscene contributors 2023～2026

//! Utilities shared by the glyph cache and the scene renderer: small vector
//! math (Vec2f / Vec2d / Vec4f), screen dimensions and path helpers.

use std::{
    fs::read_dir,
    io::{self, ErrorKind},
    ops::{Add, AddAssign, Mul, Neg, Sub},
    path::{Path, PathBuf, MAIN_SEPARATOR},
};

/// 2d vector generic over the scalar, so the camera can exist in both a
/// float and a double flavor.  repr(C) because these feed vertex buffers
/// directly.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Vec2T<T> {
    pub x: T,
    pub y: T,
}

pub type Vec2f = Vec2T<f32>;
pub type Vec2d = Vec2T<f64>;

impl<T: Copy> Vec2T<T> {
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    pub const fn splat(v: T) -> Self {
        Self { x: v, y: v }
    }
}

impl<T: Add<Output = T>> Add for Vec2T<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl<T: Add<Output = T> + Copy> AddAssign for Vec2T<T> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<T: Sub<Output = T>> Sub for Vec2T<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// Component-wise product.
impl<T: Mul<Output = T>> Mul for Vec2T<T> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self {
            x: self.x * rhs.x,
            y: self.y * rhs.y,
        }
    }
}

impl<T: Mul<Output = T> + Copy> Mul<T> for Vec2T<T> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl<T: Neg<Output = T>> Neg for Vec2T<T> {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

/// RGBA color / generic 4d vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Vec4f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4f {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

/// Expands 0xRRGGBBAA into a normalized color vector.
pub const fn hex_to_vec4f(rgba: u32) -> Vec4f {
    Vec4f {
        x: ((rgba >> 24) & 0xff) as f32 / 255.0,
        y: ((rgba >> 16) & 0xff) as f32 / 255.0,
        z: ((rgba >> 8) & 0xff) as f32 / 255.0,
        w: (rgba & 0xff) as f32 / 255.0,
    }
}

/// Pixel size of a render surface or texture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScreenDimensions {
    pub width: u32,
    pub height: u32,
}

impl ScreenDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Walks up from the current directory looking for the directory holding
/// `flag_file`, so assets resolve no matter where the binary was started.
fn get_project_root(flag_file: &str) -> io::Result<PathBuf> {
    let path = std::env::current_dir()?;
    let mut path_ancestors = path.as_path().ancestors();

    for p in &mut path_ancestors {
        let has_flag = read_dir(p)?.any(|p| match p {
            Ok(d) => d.file_name() == *flag_file,
            _ => false,
        });
        if has_flag {
            return Ok(PathBuf::from(p));
        }
    }
    Err(io::Error::new(
        ErrorKind::NotFound,
        "Ran out of places to find flag_file",
    ))
}

/// Root of the deployed tree, located by its Cargo.lock.
pub fn get_root_path() -> String {
    match get_project_root("Cargo.lock") {
        Ok(p) => {
            let s = format!("{:?}", p);
            s[1..s.len() - 1].to_string()
        }
        Err(_e) => ".".to_string(),
    }
}

pub fn get_abs_path(fpath: &str) -> String {
    if Path::new(fpath).is_relative() {
        format!("{}{}{}", get_root_path(), MAIN_SEPARATOR, fpath)
    } else {
        fpath.to_string()
    }
}

/// Joins an asset root with a relative path using the platform separator.
pub fn combine_paths(root: &str, rel: &str) -> String {
    if root.is_empty() {
        return rel.to_string();
    }
    format!("{}{}{}", root.trim_end_matches(MAIN_SEPARATOR), MAIN_SEPARATOR, rel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_expands_channels() {
        let c = hex_to_vec4f(0xFF000080);
        assert_eq!(c.x, 1.0);
        assert_eq!(c.y, 0.0);
        assert_eq!(c.z, 0.0);
        assert!((c.w - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn vec2_component_ops() {
        let a = Vec2f::new(1.0, 2.0);
        let b = Vec2f::new(3.0, 5.0);
        assert_eq!(a + b, Vec2f::new(4.0, 7.0));
        assert_eq!(b - a, Vec2f::new(2.0, 3.0));
        assert_eq!(a * Vec2f::splat(2.0), Vec2f::new(2.0, 4.0));
        assert_eq!(-a, Vec2f::new(-1.0, -2.0));
    }

    #[test]
    fn combine_paths_trims_trailing_separator() {
        let joined = combine_paths(&format!("root{}", MAIN_SEPARATOR), "shaders/image.frag");
        assert_eq!(
            joined,
            format!("root{}shaders/image.frag", MAIN_SEPARATOR)
        );
    }
}
