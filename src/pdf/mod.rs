pub mod builder;
pub mod generator;

pub use builder::{Align, PdfBuilder};
pub use generator::{InvoiceRenderer, RenderedDocument};
