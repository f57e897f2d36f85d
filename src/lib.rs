//! Longan - convert MathType equations to LaTeX
//!
//! This library decodes MathType's binary equation format (MTEF version 5)
//! as found inside OLE compound documents and produces LaTeX source strings.
//!
//! # Features
//!
//! - **MTEF v5 decoder**: walks the tagged binary record stream
//! - **Tree assembly**: reconstructs the equation tree from the flat stream
//! - **LaTeX emission**: fractions, radicals, fences, big operators,
//!   matrices, embellishments, scripts
//! - **OLE2 reader**: extracts the `Equation Native` stream from embedded
//!   MathType objects
//! - **DOCX support**: converts every object under `word/embeddings/`
//!
//! # Example - Converting an equation payload
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Contents of an `Equation Native` stream
//! let payload = std::fs::read("equation.bin")?;
//! let latex = longan::decode(&payload)?;
//! println!("{latex}");
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Converting a MathType OLE object file
//!
//! ```no_run
//! use std::fs::File;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let latex = longan::mtef::decode_ole_object(File::open("oleObject1.bin")?)?;
//! println!("{latex}");
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Converting every equation in a DOCX
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! for eq in longan::docx::convert_docx(std::path::Path::new("thesis.docx"))? {
//!     match eq.latex {
//!         Ok(latex) => println!("{}: {latex}", eq.name),
//!         Err(err) => eprintln!("{}: {err}", eq.name),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// DOCX (OOXML) equation discovery
pub mod docx;
/// Unified error types
pub mod error;
/// MTEF v5 decoding, tree assembly, and LaTeX emission
pub mod mtef;
/// OLE2 compound-file reading
pub mod ole;

// Re-export the common entry points for convenience
pub use error::{Error, Result};
pub use mtef::{decode, Equation, LatexEmitter, MtefDecoder};
pub use ole::OleFile;
