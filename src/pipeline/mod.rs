//! Pipeline stages for résumé generation.
//!
//! Each submodule implements one step. Data flows in one direction:
//!
//! ```text
//! extract ──▶ translate ──▶ assemble
//! (records)   (sv → en)     (docx)
//!                 assets ───┘
//!              (logo cache)
//! ```
//!
//! 1. [`extract`]  : recover records from the website's component sources
//! 2. [`translate`]: chunked translation with fall-back to the original
//!    text; the only stage besides logo fetching with network I/O
//! 3. [`assets`]   : company logo lookup: cache directory first, then one
//!    best-effort fetch per company per run
//! 4. [`assemble`] : lay typed content out as paragraphs of a template

pub mod assemble;
pub mod assets;
pub mod extract;
pub mod translate;
