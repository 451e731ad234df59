//! The digest conversion pipeline.
//!
//! Each stage is a small module with one job, wired together by
//! [`crate::convert`]:
//!
//! ```text
//!   Markdown text
//!        │
//!        ▼
//!   normalize   — strip empty headings, undo escaped punctuation,
//!        │         separate pipe tables from trailing headings
//!        ▼
//!   parse       — CommonMark + tables → HTML fragment
//!        │
//!        ▼
//!   (DOM build — lenient HTML parse into the arena tree)
//!        │
//!        ▼
//!   grid        — <table> → splittable .gridtable divs
//!        │
//!        ▼
//!   sections    — tag topic titles, wrap numbered sections in colorboxes
//!        │
//!        ▼
//!   assemble    — full document shell with the embedded stylesheet
//!        │
//!        ▼
//!   pdf         — optional: headless Chromium → A4 PDF bytes
//! ```
//!
//! Every stage up to and including `assemble` is total: bad input degrades
//! to plainer output, never to an error. Only `pdf` can fail.

pub mod assemble;
pub mod grid;
pub mod normalize;
pub mod parse;
pub mod pdf;
pub mod sections;
