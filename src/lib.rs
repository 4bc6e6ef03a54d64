//! A mid-level, opinionated library for laying out structured sales briefs
//! as PDF documents.
//!
//! The input is a title plus a sequence of sections of loosely formatted,
//! human-authored text. Sections describing trigger summaries or benefits
//! are parsed into a nested outline (category → numbered item → bullet
//! examples) by [parse_outline]; everything is then placed onto fixed-size
//! pages by [compose], wrapping lines to measured text widths with hanging
//! indents and inserting page breaks exactly when vertical space runs out.
//! The resulting [Document] serializes to a complete PDF; an external
//! assembler can splice fixed cover and template pages around the generated
//! content first.
//!
//! ```no_run
//! use brief_gen::{compose_document, Brief, FontSet, Section, Style};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fonts = FontSet::load(
//!     std::fs::read("fonts/Regular.ttf")?,
//!     std::fs::read("fonts/Bold.ttf")?,
//! )?;
//!
//! let brief = Brief {
//!     title: "Ihr Angebot".to_string(),
//!     sections: vec![Section {
//!         heading: "Typische Auslöser".to_string(),
//!         body: "Ängste:\n1. Kontrollverlust\n2. Versteckte Kosten".to_string(),
//!     }],
//! };
//!
//! let document = compose_document(&brief, fonts, &Style::default());
//! document.write(std::fs::File::create("brief.pdf")?)?;
//! # Ok(())
//! # }
//! ```

mod colour;
pub use colour::*;

mod compose;
pub use compose::*;

mod document;
pub use document::*;

mod error;
pub use error::*;

mod font;
pub use font::*;

mod info;
pub use info::*;

/// Utility functions and structures to lay out text on pages
pub mod layout;

mod outline;
pub use outline::*;

mod page;
pub use page::*;

/// Pre-defined page sizes
pub mod pagesize;

mod rect;
pub use rect::*;

pub(crate) mod refs;

mod units;
pub use units::*;

/// Re-export PDF-writer functionality, mostly for custom content generation
pub use pdf_writer;
