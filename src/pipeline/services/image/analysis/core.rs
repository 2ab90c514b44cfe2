use super::config::RuleSet;
use crate::error::ClassifierError;
use crate::pipeline::types::FeatureVector;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, Luma, RgbImage};

/// HSV pixel in OpenCV 8-bit units: H in 0..180, S and V in 0..=255.
pub type Hsv = [u8; 3];

/// Canonical raster plus the colour views every analyzer reads.
/// Each call builds its own context, nothing is shared between calls.
pub struct AnalysisContext {
    pub hsv: Vec<Hsv>,
    pub gray: GrayImage,
    pub dimensions: (u32, u32),
}

impl AnalysisContext {
    pub fn decode(bytes: &[u8], canonical_size: u32) -> Result<Self, ClassifierError> {
        let image = image::load_from_memory(bytes)?;
        Self::from_image(&image, canonical_size)
    }

    pub fn from_image(image: &DynamicImage, canonical_size: u32) -> Result<Self, ClassifierError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ClassifierError::EmptyImage);
        }

        let rgb = imageops::resize(
            &image.to_rgb8(),
            canonical_size,
            canonical_size,
            FilterType::Triangle,
        );
        let hsv = rgb.pixels().map(|p| rgb_to_hsv(p.0)).collect();
        let gray = rgb_to_gray(&rgb);
        let dimensions = rgb.dimensions();

        Ok(Self {
            hsv,
            gray,
            dimensions,
        })
    }

    pub fn pixel_count(&self) -> usize {
        (self.dimensions.0 * self.dimensions.1) as usize
    }

    /// Share of the canonical raster covered by `count` pixels.
    pub fn fraction(&self, count: usize) -> f64 {
        count as f64 / self.pixel_count() as f64
    }
}

/// A feature extraction step that fills in part of the feature vector.
pub trait FeatureAnalyzer: Send + Sync {
    fn analyze(&self, context: &AnalysisContext, rules: &RuleSet, features: &mut FeatureVector);
    fn name(&self) -> &'static str;
}

/// OpenCV-compatible 8-bit RGB to HSV.
pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> Hsv {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let v = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let diff = v - min;

    let s = if v > 0.0 { 255.0 * diff / v } else { 0.0 };

    let h = if diff == 0.0 {
        0.0
    } else if v == rf {
        60.0 * (gf - bf) / diff
    } else if v == gf {
        120.0 + 60.0 * (bf - rf) / diff
    } else {
        240.0 + 60.0 * (rf - gf) / diff
    };
    let h = if h < 0.0 { h + 360.0 } else { h };

    // Half-degree hue; 360 rounds back onto 0.
    let h = ((h / 2.0).round() as u16 % 180) as u8;

    [h, s.round() as u8, v as u8]
}

/// Grayscale using ITU-R BT.601 luminance.
pub fn rgb_to_gray(rgb: &RgbImage) -> GrayImage {
    let (w, h) = rgb.dimensions();
    let mut gray = GrayImage::new(w, h);
    for (x, y, p) in rgb.enumerate_pixels() {
        let luma = 0.299 * p.0[0] as f32 + 0.587 * p.0[1] as f32 + 0.114 * p.0[2] as f32;
        gray.put_pixel(x, y, Luma([luma.round().min(255.0) as u8]));
    }
    gray
}
