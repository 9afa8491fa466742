//! Cubemap to equirectangular projection
//!
//! Output pixel `(c, r)` of a `w`×`h` image looks along
//!
//! ```text
//! u    = 1 - (c + 0.5) / w        v   = (r + 0.5) / h
//! long = u·2π - π/2               lat = v·π
//! dir  = (-sin long · sin lat, cos lat, -cos long · sin lat)
//! ```
//!
//! Row 0 is straight up. The mapping agrees with light placement, so a
//! light at latlon `(x, y)` lands at `((x+1)/2·w, (1-y)/2·h)`.
//!
//! Projection runs on a [`RenderSurface`]: the surface is resized to the
//! output, drawn, read back, then restored to its previous size even when
//! the readback fails.

use core::f64::consts::{FRAC_PI_2, PI, TAU};
use std::ops::{Deref, DerefMut};

use glam::{DVec3, Vec4};

use lightform_scene::linear_to_srgb;

use crate::cubemap::Cubemap;
use crate::error::{EnvError, EnvResult};

/// Transfer function applied to output pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorEncoding {
    #[default]
    Srgb,
    Linear,
}

/// Storage type of output pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PixelType {
    #[default]
    U8,
    F32,
}

/// Output size and pixel format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectorOptions {
    pub width: u32,
    pub height: u32,
    pub encoding: ColorEncoding,
    pub pixel_type: PixelType,
}

impl Default for ProjectorOptions {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 512,
            encoding: ColorEncoding::Srgb,
            pixel_type: PixelType::U8,
        }
    }
}

impl ProjectorOptions {
    /// `width`×`width/2` with the given format
    pub fn new(width: u32, encoding: ColorEncoding, pixel_type: PixelType) -> Self {
        Self { width, height: width / 2, encoding, pixel_type }
    }

    /// Reject empty and non-2:1 sizes
    pub fn validate(&self) -> EnvResult<()> {
        let (width, height) = (self.width, self.height);
        if width == 0 || height == 0 || width != height.saturating_mul(2) {
            return Err(EnvError::InvalidResolution { width, height });
        }
        Ok(())
    }
}

/// RGBA pixel buffer
#[derive(Clone, Debug, PartialEq)]
pub enum PixelData {
    U8(Vec<u8>),
    F32(Vec<f32>),
}

impl PixelData {
    /// Number of channel values
    pub fn len(&self) -> usize {
        match self {
            Self::U8(v) => v.len(),
            Self::F32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Projected image, rows top to bottom, four channels per pixel
#[derive(Clone, Debug, PartialEq)]
pub struct EquirectImage {
    pub width: u32,
    pub height: u32,
    pub encoding: ColorEncoding,
    pub pixels: PixelData,
}

/// View direction of output pixel `(c, r)`
pub fn equirect_direction(c: u32, r: u32, width: u32, height: u32) -> DVec3 {
    let u = 1.0 - (c as f64 + 0.5) / width as f64;
    let v = (r as f64 + 0.5) / height as f64;
    let long = u * TAU - FRAC_PI_2;
    let lat = v * PI;
    let (sin_long, cos_long) = long.sin_cos();
    let (sin_lat, cos_lat) = lat.sin_cos();
    DVec3::new(-sin_long * sin_lat, cos_lat, -cos_long * sin_lat)
}

/// Drawable target with a resizable backbuffer
pub trait RenderSurface {
    fn size(&self) -> (u32, u32);

    fn set_size(&mut self, width: u32, height: u32);

    /// Draw `pixels` (linear RGBA, row-major, row 0 on top)
    fn draw(&mut self, pixels: &[Vec4]);

    /// Read the backbuffer back as linear RGBA
    fn read_pixels(&self) -> EnvResult<Vec<Vec4>>;
}

/// Resizes a surface and restores its previous size when dropped
pub struct SizeGuard<'a, S: RenderSurface + ?Sized> {
    surface: &'a mut S,
    restore: (u32, u32),
}

impl<'a, S: RenderSurface + ?Sized> SizeGuard<'a, S> {
    pub fn new(surface: &'a mut S, width: u32, height: u32) -> Self {
        let restore = surface.size();
        surface.set_size(width, height);
        Self { surface, restore }
    }
}

impl<S: RenderSurface + ?Sized> Deref for SizeGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: RenderSurface + ?Sized> DerefMut for SizeGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: RenderSurface + ?Sized> Drop for SizeGuard<'_, S> {
    fn drop(&mut self) {
        let (w, h) = self.restore;
        self.surface.set_size(w, h);
    }
}

/// CPU backbuffer
#[derive(Clone, Debug, Default)]
pub struct SoftwareSurface {
    width: u32,
    height: u32,
    pixels: Vec<Vec4>,
}

impl SoftwareSurface {
    pub fn new(width: u32, height: u32) -> Self {
        let mut surface = Self::default();
        surface.set_size(width, height);
        surface
    }
}

impl RenderSurface for SoftwareSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![Vec4::ZERO; width as usize * height as usize];
    }

    fn draw(&mut self, pixels: &[Vec4]) {
        let n = self.pixels.len().min(pixels.len());
        self.pixels[..n].copy_from_slice(&pixels[..n]);
    }

    fn read_pixels(&self) -> EnvResult<Vec<Vec4>> {
        Ok(self.pixels.clone())
    }
}

/// Sample `cubemap` into linear equirectangular pixels
pub fn project_linear(cubemap: &Cubemap, width: u32, height: u32) -> Vec<Vec4> {
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for r in 0..height {
        for c in 0..width {
            pixels.push(cubemap.sample(equirect_direction(c, r, width, height)));
        }
    }
    pixels
}

/// Project onto an off-screen software surface
pub fn project(cubemap: &Cubemap, options: &ProjectorOptions) -> EnvResult<EquirectImage> {
    let mut surface = SoftwareSurface::default();
    project_on(&mut surface, cubemap, options)
}

/// Project through `surface`, restoring its size afterwards
pub fn project_on<S: RenderSurface + ?Sized>(
    surface: &mut S,
    cubemap: &Cubemap,
    options: &ProjectorOptions,
) -> EnvResult<EquirectImage> {
    options.validate()?;
    let (width, height) = (options.width, options.height);

    let mut target = SizeGuard::new(surface, width, height);
    target.draw(&project_linear(cubemap, width, height));
    let linear = target.read_pixels()?;
    drop(target);

    let expected = width as usize * height as usize;
    if linear.len() != expected {
        return Err(EnvError::Readback(format!(
            "expected {} pixels, surface returned {}",
            expected,
            linear.len()
        )));
    }

    log::debug!("Projected {}px cubemap to {}x{} equirect", cubemap.size(), width, height);
    Ok(EquirectImage {
        width,
        height,
        encoding: options.encoding,
        pixels: encode(&linear, options.encoding, options.pixel_type),
    })
}

fn encode(linear: &[Vec4], encoding: ColorEncoding, pixel_type: PixelType) -> PixelData {
    let transfer = |v: f32| {
        let v = if v.is_finite() { v.max(0.0) } else { 0.0 };
        match encoding {
            ColorEncoding::Srgb => linear_to_srgb(v),
            ColorEncoding::Linear => v,
        }
    };
    let channels = linear.iter().flat_map(|p| [transfer(p.x), transfer(p.y), transfer(p.z), p.w.clamp(0.0, 1.0)]);

    match pixel_type {
        PixelType::F32 => PixelData::F32(channels.collect()),
        PixelType::U8 => PixelData::U8(channels.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8).collect()),
    }
}
