/// Gray-scale view of a 2D spectrum
///
/// Two coordinate systems meet here. Image coordinates address the sample
/// grid: column 0 is the highest x, row 0 the last subspectrum. Screen
/// coordinates address the pixel rectangle the image is drawn into. The view
/// window `(x_view1, y_view1)..=(x_view2, y_view2)` is the part of the image
/// currently mapped onto that rectangle.
use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

use super::view_data::{ScaleTarget, ViewData};
use crate::config::ImageConfig;
use crate::data::coordinate::into_range;
use crate::data::Spectrum;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageView {
    pub x_pixel0: i32,
    pub y_pixel0: i32,
    pub x_pixel1: i32,
    pub y_pixel1: i32,
    /// Points per subspectrum
    pub image_width: i32,
    /// Number of subspectra
    pub image_height: i32,
    pub x_pixels: i32,
    pub y_pixels: i32,
    pub x_pixel_zoom1: i32,
    pub y_pixel_zoom1: i32,
    pub x_pixel_zoom2: i32,
    pub y_pixel_zoom2: i32,
    pub x_view1: i32,
    pub y_view1: i32,
    pub x_view2: i32,
    pub y_view2: i32,
    pub min_x: f64,
    pub max_x: f64,
    pub min_z: f64,
    pub max_z: f64,
    pub average_gray: f64,
    #[serde(skip)]
    buffer: Option<GrayImage>,
    #[serde(skip)]
    gray_factor_last: f64,
}

impl Default for ImageView {
    fn default() -> Self {
        Self {
            x_pixel0: 0,
            y_pixel0: 0,
            x_pixel1: 0,
            y_pixel1: 0,
            image_width: 0,
            image_height: 0,
            x_pixels: 0,
            y_pixels: 0,
            x_pixel_zoom1: 0,
            y_pixel_zoom1: 0,
            x_pixel_zoom2: 0,
            y_pixel_zoom2: 0,
            x_view1: 0,
            y_view1: 0,
            x_view2: 0,
            y_view2: 0,
            min_x: f64::NAN,
            max_x: 0.0,
            min_z: 0.0,
            max_z: 0.0,
            average_gray: 0.0,
            buffer: None,
            gray_factor_last: f64::NAN,
        }
    }
}

impl ImageView {
    /// Image for `spec`, or `None` unless it is a 2D spectrum with rows of
    /// equal length.
    pub fn for_spectrum(spec: &Spectrum, view: &ViewData) -> Option<Self> {
        if spec.is_1d() || spec.subspectra.is_empty() || !spec.continuous {
            return None;
        }
        let width = spec.subspectra[0].coords.len();
        if width < 2 || spec.subspectra.iter().any(|r| r.coords.len() != width) {
            return None;
        }
        let mut iv = Self::default();
        iv.set(view);
        iv.set_image_size(width as i32, spec.subspectra.len() as i32, true);
        Some(iv)
    }

    /// Take the X range (first time only) and the intensity range from a view.
    pub fn set(&mut self, view: &ViewData) {
        if self.min_x.is_nan() {
            self.min_x = view.min_x();
            self.max_x = view.max_x();
        }
        let s = view.scale(0);
        self.min_z = s.min_y;
        self.max_z = s.max_y;
    }

    pub fn set_zoom(&mut self, x_pixel1: i32, y_pixel1: i32, x_pixel2: i32, y_pixel2: i32) {
        self.x_pixel_zoom1 = x_pixel1.min(x_pixel2);
        self.y_pixel_zoom1 = y_pixel1.min(y_pixel2);
        self.x_pixel_zoom2 = x_pixel1.max(x_pixel2);
        self.y_pixel_zoom2 = y_pixel1.max(y_pixel2);
        self.set_view();
    }

    pub fn set_image_size(&mut self, width: i32, height: i32, reset_view: bool) {
        self.image_width = width;
        self.image_height = height;
        if reset_view {
            self.reset_view();
        }
    }

    pub fn set_xy0(&mut self, x_pixel: i32, y_pixel: i32) {
        self.x_pixel0 = x_pixel;
        self.y_pixel0 = y_pixel;
        self.x_pixel1 = self.x_pixel0 + self.x_pixels - 1;
        self.y_pixel1 = self.y_pixel0 + self.y_pixels - 1;
    }

    pub fn set_pixel_width_height(&mut self, x_pixels: i32, y_pixels: i32) {
        self.x_pixels = x_pixels;
        self.y_pixels = y_pixels;
    }

    pub fn reset_view(&mut self) {
        self.x_view1 = 0;
        self.y_view1 = 0;
        self.x_view2 = self.image_width - 1;
        self.y_view2 = self.image_height - 1;
    }

    /// Show every column, keeping the row window.
    pub fn reset_view_x(&mut self) {
        self.set_view_window(0, self.y_view1, self.image_width - 1, self.y_view2);
    }

    /// Show every row, keeping the column window.
    pub fn reset_view_y(&mut self) {
        self.set_view_window(self.x_view1, 0, self.x_view2, self.image_height - 1);
    }

    fn set_view(&mut self) {
        if self.x_pixel_zoom1 == 0 {
            self.reset_zoom();
        }
        let x1 = self.to_image_x(self.x_pixel_zoom1);
        let y1 = self.to_image_y(self.y_pixel_zoom1);
        let x2 = self.to_image_x(self.x_pixel_zoom2);
        let y2 = self.to_image_y(self.y_pixel_zoom2);
        self.set_view_window(x1, y1, x2, y2);
    }

    fn set_view_window(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.x_view1 = x1.min(x2);
        self.y_view1 = y1.min(y2);
        self.x_view2 = x1.max(x2);
        self.y_view2 = y1.max(y2);
        self.reset_zoom();
    }

    pub fn reset_zoom(&mut self) {
        self.x_pixel_zoom1 = self.x_pixel0;
        self.y_pixel_zoom1 = self.y_pixel0;
        self.x_pixel_zoom2 = self.x_pixel1;
        self.y_pixel_zoom2 = self.y_pixel1;
    }

    pub fn fix_x(&self, x_pixel: i32) -> i32 {
        x_pixel.max(self.x_pixel0).min(self.x_pixel1)
    }

    pub fn fix_y(&self, y_pixel: i32) -> i32 {
        y_pixel.max(self.y_pixel0).min(self.y_pixel1)
    }

    pub fn to_image_x(&self, x_pixel: i32) -> i32 {
        let span = (self.x_pixels - 1).max(1) as f64;
        self.x_view1
            + ((x_pixel - self.x_pixel0) as f64 / span * (self.x_view2 - self.x_view1) as f64).floor() as i32
    }

    pub fn to_image_y(&self, y_pixel: i32) -> i32 {
        let span = (self.y_pixels - 1).max(1) as f64;
        self.y_view1
            + ((y_pixel - self.y_pixel0) as f64 / span * (self.y_view2 - self.y_view1) as f64).floor() as i32
    }

    /// Image column under `x_pixel` with the whole image in view.
    pub fn to_image_x0(&self, x_pixel: i32) -> i32 {
        let span = (self.x_pixels - 1).max(1) as f64;
        let v = ((x_pixel - self.x_pixel0) as f64 / span * (self.image_width - 1) as f64) as i32;
        into_range(v, 0, self.image_width - 1)
    }

    pub fn to_image_y0(&self, y_pixel: i32) -> i32 {
        let span = (self.y_pixels - 1).max(1) as f64;
        let v = ((y_pixel - self.y_pixel0) as f64 / span * (self.image_height - 1) as f64) as i32;
        into_range(v, 0, self.image_height - 1)
    }

    pub fn is_x_within_range(&self, x_pixel: i32) -> bool {
        x_pixel >= self.x_pixel0 - 5 && x_pixel < self.x_pixel0 + self.x_pixels + 5
    }

    pub fn is_in_image(&self, x_pixel: i32, y_pixel: i32) -> bool {
        x_pixel == self.fix_x(x_pixel) && y_pixel == self.fix_y(y_pixel)
    }

    pub fn to_x(&self, x_pixel: i32) -> f64 {
        let w = (self.image_width - 1).max(1) as f64;
        self.max_x + (self.min_x - self.max_x) * self.to_image_x(self.fix_x(x_pixel)) as f64 / w
    }

    pub fn to_x0(&self, x_pixel: i32) -> f64 {
        let span = (self.x_pixels - 1).max(1) as f64;
        self.max_x + (self.min_x - self.max_x) * (self.fix_x(x_pixel) - self.x_pixel0) as f64 / span
    }

    pub fn to_pixel_x(&self, x: f64) -> i32 {
        let x0 = self.to_x(self.x_pixel0);
        let x1 = self.to_x(self.x_pixel1);
        if x1 == x0 {
            return self.x_pixel0;
        }
        self.x_pixel0 + ((x - x0) / (x1 - x0) * (self.x_pixels - 1) as f64) as i32
    }

    /// Pixel of `x` with the whole image in view (high x on the left).
    pub fn to_pixel_x0(&self, x: f64) -> i32 {
        if self.max_x == self.min_x {
            return self.x_pixel1;
        }
        self.x_pixel1 - ((x - self.min_x) / (self.max_x - self.min_x) * (self.x_pixels - 1) as f64) as i32
    }

    pub fn to_subspectrum_index(&self, y_pixel: i32) -> usize {
        into_range(
            self.image_height - 1 - self.to_image_y(y_pixel),
            0,
            self.image_height - 1,
        )
        .max(0) as usize
    }

    pub fn to_pixel_y0(&self, ysub: f64) -> i32 {
        let h = (self.image_height - 1).max(1) as f64;
        self.y_pixel1 - (ysub / h * (self.y_pixels - 1) as f64) as i32
    }

    pub fn to_pixel_y(&self, sub_index: usize) -> i32 {
        let dv = (self.y_view2 - self.y_view1).max(1) as f64;
        let f = (self.image_height - 1 - sub_index as i32 - self.y_view1) as f64 / dv;
        self.y_pixel0 + (f * (self.y_pixels - 1) as f64) as i32
    }

    /// Clamp a subspectrum index into the rows currently in view.
    pub fn fix_sub_index(&self, sub_index: i32) -> i32 {
        into_range(
            sub_index,
            self.image_height - 1 - self.y_view2,
            self.image_height - 1 - self.y_view1,
        )
    }

    /// Set the view window from screen pixels measured against the full image.
    pub fn set_view0(&mut self, xp1: i32, yp1: i32, xp2: i32, yp2: i32) {
        let x1 = self.to_image_x0(xp1);
        let y1 = self.to_image_y0(yp1);
        let x2 = self.to_image_x0(xp2);
        let y2 = self.to_image_y0(yp2);
        self.set_view_window(x1, y1, x2, y2);
    }

    pub fn buffer(&self) -> Option<&GrayImage> {
        self.buffer.as_ref()
    }

    /// Recompute the gray buffer unless nothing it depends on has changed.
    ///
    /// One pixel per sample: image column `c` is point `width - 1 - c`, image
    /// row `r` is subspectrum `height - 1 - r`.
    pub fn update_buffer(&mut self, spec: &Spectrum, force_new: bool) -> Option<&GrayImage> {
        if spec.subspectra.is_empty() {
            return None;
        }
        let width = self.image_width.max(0) as u32;
        let height = self.image_height.max(0) as u32;
        let gray_factor = 255.0 / (self.max_z - self.min_z);
        if !force_new && self.buffer.is_some() && gray_factor == self.gray_factor_last {
            return self.buffer.as_ref();
        }
        if spec.subspectra.len() != height as usize
            || spec.subspectra.iter().any(|r| r.coords.len() != width as usize)
        {
            return None;
        }
        self.gray_factor_last = gray_factor;
        let f = spec.user_y_factor;
        let (min_z, w, h) = (self.min_z, width as usize, height as usize);
        let mut total = 0.0;
        let img = GrayImage::from_fn(width, height, |c, r| {
            let row = &spec.subspectra[h - 1 - r as usize];
            let y = row.coords[w - 1 - c as usize].y;
            let level = if gray_factor.is_finite() {
                into_range(((y * f - min_z) * gray_factor) as i32, 0, 255)
            } else {
                0
            };
            let gray = 255 - level;
            total += gray as f64;
            Luma([gray as u8])
        });
        let n = (w * h).max(1) as f64;
        self.average_gray = 1.0 - total / n / 255.0;
        self.buffer = Some(img);
        self.buffer.as_ref()
    }

    /// Bring the average gray into `[min_gray, max_gray]` by halving or
    /// doubling the intensity range, at most `max_adjust_iterations` times.
    /// Returns the number of passes made.
    pub fn adjust_view(&mut self, spec: &Spectrum, view: &mut ViewData, config: &ImageConfig) -> usize {
        if self.buffer.is_none() {
            self.update_buffer(spec, true);
        }
        let mut passes = 0;
        while passes < config.max_adjust_iterations {
            let is_low = self.average_gray < config.min_gray;
            if !is_low && self.average_gray <= config.max_gray {
                break;
            }
            passes += 1;
            view.scale_spectrum(ScaleTarget::TwoD, if is_low { 2.0 } else { 0.5 });
            self.set(view);
            if self.update_buffer(spec, true).is_none() {
                break;
            }
        }
        log::debug!(
            "Image contrast adjusted in {} passes (average gray {:.3})",
            passes,
            self.average_gray
        );
        passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Coordinate, Nucleus, Subspectrum};

    fn map(rows: usize, cols: usize, peak: f64) -> Spectrum {
        let subs = (0..rows)
            .map(|r| Subspectrum {
                y2d: r as f64,
                coords: (0..cols)
                    .map(|c| {
                        let y = if r == rows / 2 && c == cols / 2 { peak } else { 0.0 };
                        Coordinate::new(c as f64, y)
                    })
                    .collect(),
            })
            .collect();
        Spectrum::two_d("hsqc", Nucleus::H1, 400.0, subs)
    }

    fn placed(spec: &Spectrum) -> (ImageView, ViewData) {
        let view = ViewData::full(&[spec], 14, 10);
        let mut iv = ImageView::for_spectrum(spec, &view).unwrap();
        iv.set_pixel_width_height(101, 51);
        iv.set_xy0(200, 10);
        iv.reset_zoom();
        (iv, view)
    }

    #[test]
    fn test_rejects_1d() {
        let spec = Spectrum::new("1d", vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)]);
        let view = ViewData::full(&[&spec], 14, 10);
        assert!(ImageView::for_spectrum(&spec, &view).is_none());
    }

    #[test]
    fn test_pixel_conversions() {
        let spec = map(11, 21, 10.0);
        let (iv, _) = placed(&spec);
        assert_eq!(iv.x_pixel1, 300);
        assert_eq!(iv.y_pixel1, 60);
        assert_eq!(iv.to_image_x(200), 0);
        assert_eq!(iv.to_image_x(300), 20);
        // column 0 is the highest x
        assert_eq!(iv.to_x(200), 20.0);
        assert_eq!(iv.to_x(300), 0.0);
        assert_eq!(iv.to_x(999), 0.0);
        assert_eq!(iv.to_subspectrum_index(10), 10);
        assert_eq!(iv.to_subspectrum_index(60), 0);
        assert_eq!(iv.to_pixel_y(10), 10);
        assert_eq!(iv.to_pixel_x0(20.0), 200);
        assert_eq!(iv.fix_sub_index(42), 10);
    }

    #[test]
    fn test_zoom_and_reset() {
        let spec = map(11, 21, 10.0);
        let (mut iv, _) = placed(&spec);
        iv.set_zoom(250, 35, 200, 10);
        assert_eq!((iv.x_view1, iv.x_view2), (0, 10));
        assert_eq!((iv.y_view1, iv.y_view2), (0, 5));
        assert_eq!(iv.fix_sub_index(0), 5);
        iv.reset_view();
        assert_eq!((iv.x_view2, iv.y_view2), (20, 10));
        iv.set_view0(300, 60, 250, 10);
        assert_eq!((iv.x_view1, iv.x_view2), (10, 20));
    }

    #[test]
    fn test_reset_one_axis_keeps_the_other() {
        let spec = map(11, 21, 10.0);
        let (mut iv, _) = placed(&spec);
        iv.set_zoom(250, 35, 200, 10);
        iv.reset_view_x();
        assert_eq!((iv.x_view1, iv.x_view2), (0, 20));
        assert_eq!((iv.y_view1, iv.y_view2), (0, 5));
        iv.reset_view();
        iv.set_zoom(250, 35, 200, 10);
        iv.reset_view_y();
        assert_eq!((iv.x_view1, iv.x_view2), (0, 10));
        assert_eq!((iv.y_view1, iv.y_view2), (0, 10));
    }

    #[test]
    fn test_buffer_and_average_gray() {
        let spec = map(4, 5, 10.0);
        let view = ViewData::full(&[&spec], 14, 10);
        let mut iv = ImageView::for_spectrum(&spec, &view).unwrap();
        iv.min_z = 0.0;
        iv.max_z = 10.0;
        let img = iv.update_buffer(&spec, true).unwrap().clone();
        assert_eq!(img.dimensions(), (5, 4));
        // row 2 of 4 and column 2 of 5 map to image (2, 1)
        assert_eq!(img.get_pixel(2, 1)[0], 0);
        assert_eq!(img.get_pixel(0, 0)[0], 255);
        assert!((iv.average_gray - 1.0 / 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_adjust_view_is_bounded() {
        let spec = map(6, 6, 1.0);
        let view0 = ViewData::full(&[&spec], 14, 10);
        let mut view = view0.clone();
        let mut iv = ImageView::for_spectrum(&spec, &view).unwrap();
        let config = ImageConfig::default();
        let passes = iv.adjust_view(&spec, &mut view, &config);
        assert!(passes <= config.max_adjust_iterations);

        // a target nothing can reach still stops at the cap
        let strict = ImageConfig {
            min_gray: 0.5,
            max_gray: 0.4,
            max_adjust_iterations: 3,
        };
        let mut view = view0;
        let passes = iv.adjust_view(&spec, &mut view, &strict);
        assert_eq!(passes, 3);
    }
}
