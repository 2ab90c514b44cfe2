use serde::{Deserialize, Serialize};

/// Image statistics measured on the canonical 300x300 raster.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct FeatureVector {
    pub green_ratio: f64,
    pub yellow_ratio: f64,
    pub blue_ratio: f64,
    pub brown_ratio: f64,
    pub red_ratio: f64,
    pub white_ratio: f64,
    pub black_ratio: f64,
    pub grey_ratio: f64,
    pub low_saturation_ratio: f64,
    pub edge_ratio: f64,
    pub texture_variance: f64,
    pub brightness_std: f64,
    pub noise_level: f64,
    pub color_diversity: f64,
}

/// Named handle for a single feature, used by the rule tables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    GreenRatio,
    YellowRatio,
    BlueRatio,
    BrownRatio,
    RedRatio,
    WhiteRatio,
    BlackRatio,
    GreyRatio,
    LowSaturationRatio,
    EdgeRatio,
    TextureVariance,
    BrightnessStd,
    NoiseLevel,
    ColorDiversity,
}

impl FeatureVector {
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::GreenRatio => self.green_ratio,
            Feature::YellowRatio => self.yellow_ratio,
            Feature::BlueRatio => self.blue_ratio,
            Feature::BrownRatio => self.brown_ratio,
            Feature::RedRatio => self.red_ratio,
            Feature::WhiteRatio => self.white_ratio,
            Feature::BlackRatio => self.black_ratio,
            Feature::GreyRatio => self.grey_ratio,
            Feature::LowSaturationRatio => self.low_saturation_ratio,
            Feature::EdgeRatio => self.edge_ratio,
            Feature::TextureVariance => self.texture_variance,
            Feature::BrightnessStd => self.brightness_std,
            Feature::NoiseLevel => self.noise_level,
            Feature::ColorDiversity => self.color_diversity,
        }
    }

    /// All ratio features, for range checks.
    pub fn ratios(&self) -> [f64; 10] {
        [
            self.green_ratio,
            self.yellow_ratio,
            self.blue_ratio,
            self.brown_ratio,
            self.red_ratio,
            self.white_ratio,
            self.black_ratio,
            self.grey_ratio,
            self.low_saturation_ratio,
            self.edge_ratio,
        ]
    }
}
