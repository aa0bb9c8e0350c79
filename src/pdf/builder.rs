use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::core::{DocumentResult, PdfConfig};

// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone)]
enum Section {
    Text { text: String, size: f32, align: Align },
    Space(f32),
}

/// Lays out lines of text on a single page and serializes them to PDF.
pub struct PdfBuilder {
    sections: Vec<Section>,
    config: PdfConfig,
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBuilder {
    pub fn new() -> Self {
        PdfBuilder {
            sections: Vec::new(),
            config: PdfConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PdfConfig) -> Self {
        self.config = config;
        self
    }

    pub fn add_title(&mut self, title: &str) -> &mut Self {
        self.sections.push(Section::Text {
            text: title.to_string(),
            size: self.config.title_size,
            align: Align::Center,
        });
        self
    }

    pub fn add_line(&mut self, text: &str) -> &mut Self {
        self.sections.push(Section::Text {
            text: text.to_string(),
            size: self.config.font_size,
            align: Align::Left,
        });
        self
    }

    pub fn add_line_break(&mut self) -> &mut Self {
        self.sections.push(Section::Space(self.config.line_advance()));
        self
    }

    fn operations(&self) -> Vec<Operation> {
        let (page_width, page_height) = self.config.page_points();
        let margin = self.config.margin_points();
        let left = margin;
        let usable_width = page_width - 2.0 * margin;

        let mut operations = Vec::new();
        let mut cursor = page_height - margin;

        for section in &self.sections {
            match section {
                Section::Space(height) => cursor -= height,
                Section::Text { text, size, align } => {
                    cursor -= size * self.config.line_height;
                    let x = match align {
                        Align::Left => left,
                        Align::Center => {
                            let width = text.chars().count() as f32 * size * AVG_GLYPH_WIDTH;
                            left + ((usable_width - width) / 2.0).max(0.0)
                        }
                    };

                    operations.push(Operation::new("BT", vec![]));
                    operations.push(Operation::new("Tf", vec!["F1".into(), Object::Real(*size)]));
                    operations.push(Operation::new(
                        "Td",
                        vec![Object::Real(round(x)), Object::Real(round(cursor))],
                    ));
                    operations.push(Operation::new(
                        "Tj",
                        vec![Object::string_literal(encode_win_ansi(text))],
                    ));
                    operations.push(Operation::new("ET", vec![]));
                }
            }
        }

        operations
    }

    /// Serializes the page. Output depends only on the added sections and
    /// the config.
    pub fn build(&self) -> DocumentResult<Vec<u8>> {
        let (page_width, page_height) = self.config.page_points();

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => Object::Name(self.config.font_family.clone().into_bytes()),
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let content = Content {
            operations: self.operations(),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(round(page_width)),
                Object::Real(round(page_height)),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

fn round(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Standard fonts use a single-byte encoding; characters outside Latin-1
/// print as `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
