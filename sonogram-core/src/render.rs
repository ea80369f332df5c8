use std::path::Path;

use plotters::prelude::*;
use serde::{Deserialize, Serialize};

use crate::axis::{format_db_label, format_freq_label, format_time_label, time_tick_interval};
use crate::colormap::{ColorLut, Colormap};
use crate::error::RenderError;
use crate::fonts::{self, FONT_FAMILY};
use crate::types::SpectrogramMatrix;

/// Fixed conversion between canvas pixels and figure inches.
pub const PIXELS_PER_INCH: f64 = 100.0;

pub const MIN_WIDTH: u32 = 200;
pub const MIN_HEIGHT: u32 = 150;

pub const TITLE: &str = "Spectrogram";

/// Target colormap and canvas size for one render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSpec {
    pub colormap: Colormap,
    pub width: u32,
    pub height: u32,
}

impl Default for RenderSpec {
    /// 10 × 6 inch figure.
    fn default() -> Self {
        Self::from_inches(Colormap::default(), 10.0, 6.0)
    }
}

impl RenderSpec {
    pub fn new(colormap: Colormap, width: u32, height: u32) -> Self {
        Self {
            colormap,
            width,
            height,
        }
    }

    pub fn from_inches(colormap: Colormap, width_in: f64, height_in: f64) -> Self {
        Self::new(
            colormap,
            (width_in * PIXELS_PER_INCH).round() as u32,
            (height_in * PIXELS_PER_INCH).round() as u32,
        )
    }

    /// Physical figure size in inches.
    pub fn inches(&self) -> (f64, f64) {
        (
            self.width as f64 / PIXELS_PER_INCH,
            self.height as f64 / PIXELS_PER_INCH,
        )
    }

    pub fn with_colormap(self, colormap: Colormap) -> Self {
        Self { colormap, ..self }
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if self.width < MIN_WIDTH || self.height < MIN_HEIGHT {
            return Err(RenderError::InvalidSize {
                width: self.width,
                height: self.height,
                min_width: MIN_WIDTH,
                min_height: MIN_HEIGHT,
            });
        }
        Ok(())
    }
}

/// Pixel rectangle inside an artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    fn from_ranges(xs: std::ops::Range<i32>, ys: std::ops::Range<i32>) -> Self {
        Self {
            x: xs.start.max(0) as u32,
            y: ys.start.max(0) as u32,
            width: (xs.end - xs.start).max(0) as u32,
            height: (ys.end - ys.start).max(0) as u32,
        }
    }

    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// A rendered spectrogram figure (RGB, row-major, 3 bytes per pixel).
#[derive(Clone, Debug, PartialEq)]
pub struct SpectrogramArtifact {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub colormap: Colormap,
    pub title: &'static str,
    /// Where the heat map was drawn.
    pub plot_area: PixelRect,
    /// Where the colour bar gradient was drawn.
    pub colorbar_area: PixelRect,
    /// Whether title and tick labels were drawn.
    pub has_labels: bool,
}

impl SpectrogramArtifact {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }
}

struct Layout {
    margin: i32,
    caption_size: f64,
    label_size: f64,
    x_label_area: i32,
    y_label_area: i32,
    colorbar_width: i32,
    colorbar_label_area: i32,
}

impl Layout {
    /// Label areas are reserved whether or not text is drawn, so the heat
    /// map and colour bar sit at the same place either way.
    fn for_size(width: u32, height: u32) -> Self {
        let label_size = (height as f64 * 0.025).clamp(10.0, 16.0);
        let colorbar_label_area = (label_size * 3.6) as i32;
        Self {
            margin: 8,
            caption_size: (height as f64 * 0.04).clamp(12.0, 24.0),
            label_size,
            x_label_area: (label_size * 3.2) as i32,
            y_label_area: (label_size * 5.0) as i32,
            colorbar_width: (width as i32 / 10).clamp(24, 60) + colorbar_label_area,
            colorbar_label_area,
        }
    }
}

fn draw_err(e: impl std::fmt::Display) -> RenderError {
    RenderError::Draw(e.to_string())
}

/// Render `matrix` as a figure with title and tick labels. `font_path` is
/// tried before the bundled DejaVu Sans.
pub fn render_with_font(
    matrix: &SpectrogramMatrix,
    spec: &RenderSpec,
    font_path: Option<&Path>,
) -> Result<SpectrogramArtifact, RenderError> {
    let labels = fonts::labels_available(font_path);
    render_figure(matrix, spec, labels)
}

/// Draw the figure: log-frequency heat map on the left, dB colour bar on the
/// right, title on top. `labels` switches all text on or off without moving
/// the axes; it is ignored when no font could be registered.
pub(crate) fn render_figure(
    matrix: &SpectrogramMatrix,
    spec: &RenderSpec,
    labels: bool,
) -> Result<SpectrogramArtifact, RenderError> {
    spec.validate()?;
    if matrix.frame_count() == 0 || matrix.bin_count() < 2 {
        return Err(RenderError::EmptyMatrix);
    }

    let labels = labels && fonts::labels_available(None);
    let started = std::time::Instant::now();
    let (w, h) = (spec.width, spec.height);
    let layout = Layout::for_size(w, h);
    let lut = spec.colormap.lut();

    let max_db = matrix.max_db();
    let min_db = {
        let min = matrix.min_db();
        // Flat matrices (e.g. silence) still need a non-empty colour range.
        if max_db - min < 1e-3 { max_db - 1.0 } else { min }
    };

    let duration = matrix.duration_secs();
    let f_min = matrix.freq_resolution;
    let f_max = matrix.max_freq;

    let mut pixels = vec![255u8; w as usize * h as usize * 3];
    let (plot_area, colorbar_area) = {
        let root = BitMapBackend::with_buffer(&mut pixels, (w, h)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        let (left, right) = root.split_horizontally(w as i32 - layout.colorbar_width);

        // ── Heat map ──
        let mut builder = ChartBuilder::on(&left);
        builder
            .margin(layout.margin)
            .margin_top(layout.margin + layout.caption_size as i32 + 6)
            .x_label_area_size(layout.x_label_area)
            .y_label_area_size(layout.y_label_area);
        let mut chart = builder
            .build_cartesian_2d(0f64..duration, (f_min..f_max).log_scale())
            .map_err(draw_err)?;

        let (xs, ys) = chart.plotting_area().get_pixel_range();
        let plot_rect = PixelRect::from_ranges(xs, ys);
        draw_heatmap(&left, matrix, plot_rect, &lut, min_db, max_db)?;

        if labels {
            let interval = time_tick_interval(duration, 10);
            chart
                .configure_mesh()
                .disable_mesh()
                .x_labels(10)
                .y_labels(8)
                .x_desc("Time")
                .y_desc("Frequency")
                .x_label_formatter(&|t| format_time_label(*t, interval))
                .y_label_formatter(&|f| format_freq_label(*f))
                .label_style((FONT_FAMILY, layout.label_size).into_font())
                .axis_desc_style((FONT_FAMILY, layout.label_size).into_font())
                .draw()
                .map_err(draw_err)?;

            root.draw_text(
                TITLE,
                &(FONT_FAMILY, layout.caption_size).into_font().color(&BLACK),
                (plot_rect.x as i32, layout.margin),
            )
            .map_err(draw_err)?;
        } else {
            chart
                .plotting_area()
                .draw(&Rectangle::new([(0.0, f_min), (duration, f_max)], BLACK.stroke_width(1)))
                .map_err(draw_err)?;
        }

        // ── Colour bar, aligned with the heat map vertically ──
        let bar_base = right.get_base_pixel();
        let mut bar_builder = ChartBuilder::on(&right);
        bar_builder
            .margin_left(layout.margin)
            .margin_right(layout.margin)
            .margin_top(plot_rect.y as i32 - bar_base.1)
            .margin_bottom(h as i32 - (plot_rect.y + plot_rect.height) as i32)
            .right_y_label_area_size(layout.colorbar_label_area);
        let mut bar = bar_builder
            .build_cartesian_2d(0f64..1f64, min_db as f64..max_db as f64)
            .map_err(draw_err)?;

        let steps = 256;
        let step_db = (max_db - min_db) as f64 / steps as f64;
        bar.draw_series((0..steps).map(|i| {
            let lo = min_db as f64 + i as f64 * step_db;
            let [r, g, b] = lut.apply(i as u8);
            Rectangle::new([(0.0, lo), (1.0, lo + step_db)], RGBColor(r, g, b).filled())
        }))
        .map_err(draw_err)?;

        if labels {
            bar.configure_mesh()
                .disable_mesh()
                .disable_x_axis()
                .y_labels(6)
                .y_label_formatter(&|db| format_db_label(*db))
                .label_style((FONT_FAMILY, layout.label_size).into_font())
                .draw()
                .map_err(draw_err)?;
        }
        bar.plotting_area()
            .draw(&Rectangle::new(
                [(0.0, min_db as f64), (1.0, max_db as f64)],
                BLACK.stroke_width(1),
            ))
            .map_err(draw_err)?;

        let (bxs, bys) = bar.plotting_area().get_pixel_range();
        root.present().map_err(draw_err)?;
        (plot_rect, PixelRect::from_ranges(bxs, bys))
    };

    log::debug!(
        "rendered {}x{} {} figure in {:?}",
        w,
        h,
        spec.colormap,
        started.elapsed()
    );

    Ok(SpectrogramArtifact {
        width: w,
        height: h,
        pixels,
        colormap: spec.colormap,
        title: TITLE,
        plot_area,
        colorbar_area,
        has_labels: labels,
    })
}

/// Paint the heat map pixel by pixel. Columns map linearly to frames, rows
/// map logarithmically to frequency bins (row 0 = highest frequency).
fn draw_heatmap<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    matrix: &SpectrogramMatrix,
    rect: PixelRect,
    lut: &ColorLut,
    min_db: f32,
    max_db: f32,
) -> Result<(), RenderError> {
    if rect.width == 0 || rect.height == 0 {
        return Ok(());
    }

    let n_frames = matrix.frame_count();
    let n_bins = matrix.bin_count();
    let ln_min = matrix.freq_resolution.ln();
    let ln_span = matrix.max_freq.ln() - ln_min;

    let row_bins: Vec<usize> = (0..rect.height)
        .map(|row| {
            let frac = 1.0 - (row as f64 + 0.5) / rect.height as f64;
            let freq = (ln_min + frac * ln_span).exp();
            ((freq / matrix.freq_resolution).round() as usize).min(n_bins - 1)
        })
        .collect();
    let col_frames: Vec<usize> = (0..rect.width)
        .map(|col| (((col as f64 + 0.5) / rect.width as f64) * n_frames as f64) as usize)
        .map(|frame| frame.min(n_frames - 1))
        .collect();

    let base = area.get_base_pixel();
    for (col, &frame) in col_frames.iter().enumerate() {
        let column = &matrix.columns[frame];
        let x = rect.x as i32 + col as i32 - base.0;
        for (row, &bin) in row_bins.iter().enumerate() {
            let [r, g, b] = lut.db_color(column.db[bin], min_db, max_db);
            let y = rect.y as i32 + row as i32 - base.1;
            area.draw_pixel((x, y), &RGBColor(r, g, b)).map_err(draw_err)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::Palette;
    use crate::types::SpectrogramColumn;
    use std::sync::Arc;

    /// 4 frames x 65 bins ramping from -80 dB (low bins) to 0 dB (top bin).
    fn ramp_matrix() -> SpectrogramMatrix {
        let bins = 65;
        let columns = (0..4)
            .map(|i| SpectrogramColumn {
                db: (0..bins)
                    .map(|b| -80.0 + 80.0 * b as f32 / (bins - 1) as f32)
                    .collect(),
                time_offset: i as f64 * 0.1,
            })
            .collect();
        SpectrogramMatrix {
            columns: Arc::new(columns),
            freq_resolution: 100.0,
            time_resolution: 0.1,
            max_freq: 6400.0,
            sample_rate: 12_800,
            fft_size: 128,
            hop_size: 1280,
        }
    }

    #[test]
    fn inches_use_fixed_scale() {
        let spec = RenderSpec::default();
        assert_eq!((spec.width, spec.height), (1000, 600));
        assert_eq!(spec.inches(), (10.0, 6.0));
        assert_eq!(spec.colormap, Colormap::default());

        let spec = RenderSpec::from_inches(Colormap::default(), 12.0, 8.0);
        assert_eq!((spec.width, spec.height), (1200, 800));
    }

    #[test]
    fn output_matches_requested_size() {
        let matrix = ramp_matrix();
        for (w, h) in [(1000, 600), (640, 480), (201, 151)] {
            let spec = RenderSpec::new(Colormap::default(), w, h);
            let art = render_figure(&matrix, &spec, false).unwrap();
            assert_eq!((art.width, art.height), (w, h));
            assert_eq!(art.pixels.len(), (w * h * 3) as usize);
            assert_eq!(art.title, TITLE);
        }
    }

    #[test]
    fn too_small_is_rejected() {
        let spec = RenderSpec::new(Colormap::default(), 100, 600);
        let err = render_figure(&ramp_matrix(), &spec, false).unwrap_err();
        assert!(matches!(err, RenderError::InvalidSize { .. }), "{err:?}");
    }

    #[test]
    fn empty_matrix_is_rejected() {
        let mut matrix = ramp_matrix();
        matrix.columns = Arc::new(Vec::new());
        let err = render_figure(&matrix, &RenderSpec::default(), false).unwrap_err();
        assert!(matches!(err, RenderError::EmptyMatrix));
    }

    #[test]
    fn does_not_mutate_matrix() {
        let matrix = ramp_matrix();
        let before = matrix.clone();
        render_figure(&matrix, &RenderSpec::default(), false).unwrap();
        assert_eq!(matrix, before);
    }

    #[test]
    fn heatmap_uses_requested_colormap() {
        let matrix = ramp_matrix();
        let spec = RenderSpec::new(Colormap::new(Palette::Gray), 400, 300);
        let art = render_figure(&matrix, &spec, false).unwrap();

        let rect = art.plot_area;
        assert!(rect.width > 100 && rect.height > 100, "{rect:?}");

        // Top of the plot is the loudest bin (white in gray), bottom the quietest.
        let (cx, _) = rect.center();
        let top = art.pixel(cx, rect.y + 1).unwrap();
        let bottom = art.pixel(cx, rect.y + rect.height - 2).unwrap();
        assert!(top[0] > 230, "top {top:?}");
        assert!(bottom[0] < top[0], "bottom {bottom:?}");
        assert_eq!(top[0], top[1]);

        let inferno = render_figure(&matrix, &spec.with_colormap(Colormap::new(Palette::Inferno)), false)
            .unwrap();
        assert_eq!(inferno.plot_area, art.plot_area);
        assert_ne!(inferno.pixels, art.pixels);
    }

    #[test]
    fn labels_do_not_move_the_axes() {
        let matrix = ramp_matrix();
        for (w, h) in [(1000, 600), (400, 300)] {
            let spec = RenderSpec::new(Colormap::default(), w, h);
            let plain = render_figure(&matrix, &spec, false).unwrap();
            let labeled = render_figure(&matrix, &spec, true).unwrap();
            assert!(!plain.has_labels);
            assert!(labeled.has_labels);
            assert_eq!(labeled.plot_area, plain.plot_area);
            assert_eq!(labeled.colorbar_area, plain.colorbar_area);
        }
    }

    #[test]
    fn labeled_figure_has_text_above_the_plot() {
        let matrix = ramp_matrix();
        let art = render_with_font(&matrix, &RenderSpec::default(), None).unwrap();
        assert!(art.has_labels);

        let title_band = (0..art.plot_area.y)
            .flat_map(|y| (0..art.width).map(move |x| (x, y)))
            .filter(|&(x, y)| art.pixel(x, y).is_some_and(|p| p[0] < 128))
            .count();
        assert!(title_band > 0);

        let plain = render_figure(&matrix, &RenderSpec::default(), false).unwrap();
        let blank = (0..plain.plot_area.y)
            .flat_map(|y| (0..plain.width).map(move |x| (x, y)))
            .all(|(x, y)| plain.pixel(x, y) == Some([255, 255, 255]));
        assert!(blank);
    }

    #[test]
    fn colorbar_sits_right_of_heatmap() {
        let art = render_figure(&ramp_matrix(), &RenderSpec::default(), false).unwrap();
        let plot = art.plot_area;
        let bar = art.colorbar_area;
        assert!(bar.x >= plot.x + plot.width, "{plot:?} {bar:?}");
        assert_eq!(bar.y, plot.y);
        assert!(bar.width > 0 && bar.height > 0);
    }
}
