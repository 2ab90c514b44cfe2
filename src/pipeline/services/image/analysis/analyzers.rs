/// Feature analyzers. Each one measures a family of statistics on the canonical raster.
use super::config::RuleSet;
use super::core::{AnalysisContext, FeatureAnalyzer};
use crate::pipeline::types::FeatureVector;
use image::GrayImage;
use std::collections::VecDeque;

/// Colour band ratios over HSV ranges, plus the white ratio over grayscale.
pub struct ColorRatioAnalyzer;

impl FeatureAnalyzer for ColorRatioAnalyzer {
    fn analyze(&self, context: &AnalysisContext, rules: &RuleSet, features: &mut FeatureVector) {
        let colors = &rules.colors;
        let mut counts = [0usize; 8];

        for &hsv in &context.hsv {
            let bands = [
                colors.green.contains(hsv),
                colors.yellow.contains(hsv),
                colors.blue.contains(hsv),
                colors.brown.contains(hsv),
                colors.black.contains(hsv),
                colors.grey.contains(hsv),
                colors.low_saturation.contains(hsv),
                colors.red.iter().any(|range| range.contains(hsv)),
            ];
            for (count, hit) in counts.iter_mut().zip(bands) {
                *count += hit as usize;
            }
        }

        let white = context
            .gray
            .pixels()
            .filter(|p| p.0[0] > rules.thresholds.white_intensity)
            .count();

        features.green_ratio = context.fraction(counts[0]);
        features.yellow_ratio = context.fraction(counts[1]);
        features.blue_ratio = context.fraction(counts[2]);
        features.brown_ratio = context.fraction(counts[3]);
        features.black_ratio = context.fraction(counts[4]);
        features.grey_ratio = context.fraction(counts[5]);
        features.low_saturation_ratio = context.fraction(counts[6]);
        features.red_ratio = context.fraction(counts[7]);
        features.white_ratio = context.fraction(white);
    }

    fn name(&self) -> &'static str {
        "ColorRatioAnalyzer"
    }
}

/// Fraction of pixels flagged by a Canny edge detector.
pub struct EdgeAnalyzer;

impl FeatureAnalyzer for EdgeAnalyzer {
    fn analyze(&self, context: &AnalysisContext, rules: &RuleSet, features: &mut FeatureVector) {
        let edges = canny_edge_count(
            &context.gray,
            rules.thresholds.canny_low,
            rules.thresholds.canny_high,
        );
        features.edge_ratio = context.fraction(edges);
    }

    fn name(&self) -> &'static str {
        "EdgeAnalyzer"
    }
}

/// Spread of grayscale intensity and of the HSV value channel.
pub struct TextureAnalyzer;

impl FeatureAnalyzer for TextureAnalyzer {
    fn analyze(&self, context: &AnalysisContext, _rules: &RuleSet, features: &mut FeatureVector) {
        features.texture_variance = std_dev(context.gray.pixels().map(|p| p.0[0] as f64));
        features.brightness_std = std_dev(context.hsv.iter().map(|hsv| hsv[2] as f64));
    }

    fn name(&self) -> &'static str {
        "TextureAnalyzer"
    }
}

/// Variance of the Laplacian response.
pub struct NoiseAnalyzer;

impl FeatureAnalyzer for NoiseAnalyzer {
    fn analyze(&self, context: &AnalysisContext, _rules: &RuleSet, features: &mut FeatureVector) {
        features.noise_level = laplacian_variance(&context.gray);
    }

    fn name(&self) -> &'static str {
        "NoiseAnalyzer"
    }
}

/// Peaks in the hue and saturation histograms, averaged over the two channels.
pub struct ColorDiversityAnalyzer;

impl FeatureAnalyzer for ColorDiversityAnalyzer {
    fn analyze(&self, context: &AnalysisContext, rules: &RuleSet, features: &mut FeatureVector) {
        let mut hue = [0u32; 180];
        let mut saturation = [0u32; 256];
        for hsv in &context.hsv {
            hue[hsv[0] as usize % 180] += 1;
            saturation[hsv[1] as usize] += 1;
        }

        let floor = rules.thresholds.histogram_peak_floor;
        let peaks = count_peaks(&hue, floor) + count_peaks(&saturation, floor);
        features.color_diversity = peaks as f64 / 2.0;
    }

    fn name(&self) -> &'static str {
        "ColorDiversityAnalyzer"
    }
}

/// Interior bins strictly above both neighbours and above `floor`.
pub fn count_peaks(histogram: &[u32], floor: u32) -> usize {
    histogram
        .windows(3)
        .filter(|w| w[1] > w[0] && w[1] > w[2] && w[1] > floor)
        .count()
}

/// Population standard deviation.
pub fn std_dev(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut count = 0u64;

    for value in values {
        sum += value;
        sum_sq += value * value;
        count += 1;
    }

    if count == 0 {
        return 0.0;
    }

    let mean = sum / count as f64;
    let variance = (sum_sq / count as f64) - (mean * mean);
    variance.max(0.0).sqrt()
}

/// Reflect-101 border index (`dcb|abcd|cba`).
fn reflect(i: i64, n: i64) -> usize {
    if n == 1 {
        return 0;
    }
    let i = if i < 0 { -i } else { i };
    let i = if i >= n { 2 * (n - 1) - i } else { i };
    i as usize
}

/// Variance of the 4-neighbour Laplacian `[0,1,0; 1,-4,1; 0,1,0]` over every pixel.
pub fn laplacian_variance(img: &GrayImage) -> f64 {
    let (w, h) = (img.width() as i64, img.height() as i64);
    let at = |x: i64, y: i64| img.get_pixel(reflect(x, w) as u32, reflect(y, h) as u32).0[0] as f64;

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut count = 0u64;

    for y in 0..h {
        for x in 0..w {
            let laplacian =
                at(x, y - 1) + at(x, y + 1) + at(x - 1, y) + at(x + 1, y) - 4.0 * at(x, y);
            sum += laplacian;
            sum_sq += laplacian * laplacian;
            count += 1;
        }
    }

    if count == 0 {
        return 0.0;
    }

    let mean = sum / count as f64;
    let variance = (sum_sq / count as f64) - (mean * mean);
    variance.max(0.0)
}

/// Canny edge detector: 3x3 Sobel with L1 magnitude, non-maximum suppression and
/// hysteresis between `low` and `high`. Returns the number of edge pixels.
pub fn canny_edge_count(img: &GrayImage, low: f32, high: f32) -> usize {
    let (w, h) = (img.width() as usize, img.height() as usize);
    if w < 3 || h < 3 {
        return 0;
    }

    let px = |x: isize, y: isize| -> i32 {
        let cx = x.clamp(0, w as isize - 1) as u32;
        let cy = y.clamp(0, h as isize - 1) as u32;
        img.get_pixel(cx, cy).0[0] as i32
    };

    let mut gx = vec![0i32; w * h];
    let mut gy = vec![0i32; w * h];
    let mut magnitude = vec![0f32; w * h];

    for y in 0..h as isize {
        for x in 0..w as isize {
            let dx = (px(x + 1, y - 1) + 2 * px(x + 1, y) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2 * px(x - 1, y) + px(x - 1, y + 1));
            let dy = (px(x - 1, y + 1) + 2 * px(x, y + 1) + px(x + 1, y + 1))
                - (px(x - 1, y - 1) + 2 * px(x, y - 1) + px(x + 1, y - 1));
            let i = y as usize * w + x as usize;
            gx[i] = dx;
            gy[i] = dy;
            magnitude[i] = (dx.abs() + dy.abs()) as f32;
        }
    }

    let mag_at = |x: isize, y: isize| -> f32 {
        if x < 0 || y < 0 || x >= w as isize || y >= h as isize {
            0.0
        } else {
            magnitude[y as usize * w + x as usize]
        }
    };

    const TAN_22_5: f32 = 0.414_213_56;
    const TAN_67_5: f32 = 2.414_213_6;

    // 0 = suppressed, 1 = weak candidate, 2 = strong edge
    let mut state = vec![0u8; w * h];
    let mut queue = VecDeque::new();

    for y in 0..h as isize {
        for x in 0..w as isize {
            let i = y as usize * w + x as usize;
            let m = magnitude[i];
            if m <= low {
                continue;
            }

            let (ax, ay) = (gx[i].abs() as f32, gy[i].abs() as f32);
            let (a, b) = if ay <= ax * TAN_22_5 {
                (mag_at(x - 1, y), mag_at(x + 1, y))
            } else if ay >= ax * TAN_67_5 {
                (mag_at(x, y - 1), mag_at(x, y + 1))
            } else if (gx[i] > 0) == (gy[i] > 0) {
                (mag_at(x - 1, y - 1), mag_at(x + 1, y + 1))
            } else {
                (mag_at(x + 1, y - 1), mag_at(x - 1, y + 1))
            };

            if m > a && m >= b {
                if m > high {
                    state[i] = 2;
                    queue.push_back((x, y));
                } else {
                    state[i] = 1;
                }
            }
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        for ny in (y - 1)..=(y + 1) {
            for nx in (x - 1)..=(x + 1) {
                if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                    continue;
                }
                let j = ny as usize * w + nx as usize;
                if state[j] == 1 {
                    state[j] = 2;
                    queue.push_back((nx, ny));
                }
            }
        }
    }

    state.iter().filter(|&&s| s == 2).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, Luma, Rgb, RgbImage};

    fn context_from(rgb: RgbImage) -> AnalysisContext {
        AnalysisContext::from_image(&DynamicImage::ImageRgb8(rgb), 300).unwrap()
    }

    fn solid(color: [u8; 3]) -> AnalysisContext {
        context_from(ImageBuffer::from_pixel(300, 300, Rgb(color)))
    }

    fn run(analyzer: &dyn FeatureAnalyzer, context: &AnalysisContext) -> FeatureVector {
        let mut features = FeatureVector::default();
        analyzer.analyze(context, &RuleSet::default(), &mut features);
        features
    }

    #[test]
    fn test_black_image_ratios() {
        let features = run(&ColorRatioAnalyzer, &solid([0, 0, 0]));
        assert_eq!(features.black_ratio, 1.0);
        assert_eq!(features.low_saturation_ratio, 1.0);
        assert_eq!(features.grey_ratio, 0.0);
        assert_eq!(features.white_ratio, 0.0);
        assert_eq!(features.red_ratio, 0.0);
    }

    #[test]
    fn test_pure_green_image_ratios() {
        let features = run(&ColorRatioAnalyzer, &solid([0, 255, 0]));
        assert_eq!(features.green_ratio, 1.0);
        assert_eq!(features.yellow_ratio, 0.0);
        assert_eq!(features.blue_ratio, 0.0);
        assert_eq!(features.black_ratio, 0.0);
    }

    #[test]
    fn test_white_image_ratio() {
        let features = run(&ColorRatioAnalyzer, &solid([255, 255, 255]));
        assert_eq!(features.white_ratio, 1.0);
        assert_eq!(features.low_saturation_ratio, 1.0);
    }

    #[test]
    fn test_half_red_image_ratio() {
        let rgb = ImageBuffer::from_fn(300, 300, |x, _| {
            if x < 150 { Rgb([220, 10, 10]) } else { Rgb([0, 0, 0]) }
        });
        let features = run(&ColorRatioAnalyzer, &context_from(rgb));
        assert!((features.red_ratio - 0.5).abs() < 0.01);
        assert!((features.black_ratio - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_uniform_image_has_no_edges_or_texture() {
        let context = solid([120, 80, 40]);
        assert_eq!(run(&EdgeAnalyzer, &context).edge_ratio, 0.0);
        let features = run(&TextureAnalyzer, &context);
        assert_eq!(features.texture_variance, 0.0);
        assert_eq!(features.brightness_std, 0.0);
        assert_eq!(run(&NoiseAnalyzer, &context).noise_level, 0.0);
    }

    #[test]
    fn test_step_edge_is_detected() {
        let rgb = ImageBuffer::from_fn(300, 300, |x, _| {
            if x < 150 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        });
        let features = run(&EdgeAnalyzer, &context_from(rgb));
        assert!(features.edge_ratio > 0.0);
        assert!(features.edge_ratio < 0.05);
    }

    #[test]
    fn test_half_black_half_white_texture() {
        let rgb = ImageBuffer::from_fn(300, 300, |x, _| {
            if x < 150 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        });
        let features = run(&TextureAnalyzer, &context_from(rgb));
        assert!((features.texture_variance - 127.5).abs() < 1.0);
        assert!((features.brightness_std - 127.5).abs() < 1.0);
    }

    #[test]
    fn test_checkerboard_is_noisy() {
        let rgb = ImageBuffer::from_fn(300, 300, |x, y| {
            if (x + y) % 2 == 0 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        });
        let features = run(&NoiseAnalyzer, &context_from(rgb));
        assert!(features.noise_level > 800.0);
    }

    #[test]
    fn test_count_peaks_scans_interior_only() {
        let histogram = [900, 10, 600, 10, 400, 10, 700];
        // Bin 0 and bin 6 are borders; bin 4 is under the floor.
        assert_eq!(count_peaks(&histogram, 500), 1);
    }

    #[test]
    fn test_count_peaks_requires_strict_maximum() {
        let histogram = [0, 800, 800, 0];
        assert_eq!(count_peaks(&histogram, 500), 0);
    }

    #[test]
    fn test_single_color_peaks_once_per_channel() {
        // Hue 169 and saturation 217 are both interior bins.
        let features = run(&ColorDiversityAnalyzer, &solid([200, 30, 90]));
        assert_eq!(features.color_diversity, 1.0);
    }

    #[test]
    fn test_black_image_has_no_diversity() {
        let features = run(&ColorDiversityAnalyzer, &solid([0, 0, 0]));
        assert_eq!(features.color_diversity, 0.0);
    }

    #[test]
    fn test_striped_colors_raise_diversity() {
        let palette = [
            Rgb([255, 0, 0]),
            Rgb([0, 255, 0]),
            Rgb([0, 0, 255]),
            Rgb([255, 255, 0]),
        ];
        let rgb = ImageBuffer::from_fn(300, 300, |x, _| palette[(x / 75) as usize]);
        let features = run(&ColorDiversityAnalyzer, &context_from(rgb));
        // Hue peaks at 30, 60 and 120; hue 0 is a border bin and saturation is all 255.
        assert_eq!(features.color_diversity, 1.5);
    }

    #[test]
    fn test_std_dev_of_empty_is_zero() {
        assert_eq!(std_dev(std::iter::empty()), 0.0);
    }

    #[test]
    fn test_laplacian_of_tiny_image() {
        let img = ImageBuffer::from_pixel(1, 1, Luma([7u8]));
        assert_eq!(laplacian_variance(&img), 0.0);
    }
}
