use serde::Deserialize;

const POINTS_PER_MM: f32 = 72.0 / 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    A4,
    Letter,
    Legal,
}

impl PageSize {
    /// Width and height in mm, portrait.
    pub fn dimensions(&self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
        }
    }
}

/// Layout parameters for rendered invoice documents.
#[derive(Debug, Clone)]
pub struct PdfConfig {
    pub page_size: PageSize,
    /// Uniform page margin in mm.
    pub margin: f32,
    /// One of the 14 standard PDF base fonts.
    pub font_family: String,
    pub font_size: f32,
    pub title_size: f32,
    /// Baseline distance as a multiple of `font_size`.
    pub line_height: f32,
}

impl Default for PdfConfig {
    fn default() -> Self {
        PdfConfig {
            page_size: PageSize::A4,
            margin: 20.0,
            font_family: "Helvetica".to_string(),
            font_size: 12.0,
            title_size: 18.0,
            line_height: 2.0,
        }
    }
}

impl PdfConfig {
    pub fn with_page_size(page_size: PageSize) -> Self {
        PdfConfig {
            page_size,
            ..PdfConfig::default()
        }
    }

    /// Page width and height in PDF points.
    pub fn page_points(&self) -> (f32, f32) {
        let (w, h) = self.page_size.dimensions();
        (w * POINTS_PER_MM, h * POINTS_PER_MM)
    }

    pub fn margin_points(&self) -> f32 {
        self.margin * POINTS_PER_MM
    }

    pub fn line_advance(&self) -> f32 {
        self.font_size * self.line_height
    }
}
