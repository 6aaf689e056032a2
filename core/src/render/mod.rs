#![deny(missing_docs)]

//! # Rendering
//!
//! Turns a `ClientModule` into source text for one output language.
//!
//! - **typescript**: TypeScript + zod.
//! - **writer**: Indentation-aware line writer shared by targets.
//! - **format**: Post-processing of rendered text.

pub mod format;
pub mod typescript;
pub mod writer;

use crate::error::AppResult;
use crate::module::ClientModule;

pub use format::{BuiltinFormatter, ExternalFormatter, Formatter};
pub use typescript::TypeScriptZodTarget;
pub use writer::CodeWriter;

/// An output language for the generated client.
///
/// Implementors decide only syntax; every semantic decision is already encoded
/// in the `ClientModule`.
pub trait ClientTarget {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// File extension of rendered modules, without the dot.
    fn file_extension(&self) -> &'static str;

    /// Renders the whole module.
    fn render_module(&self, module: &ClientModule) -> AppResult<String>;
}
