//! Asset loading: images, material libraries and OBJ geometry
//!
//! Every loader in this module is line-oriented and forgiving. Problems that only
//! affect a single line are reported as [`Diagnostic`]s (and logged) instead of
//! aborting the load.

pub mod image_loader;
pub mod materials;
pub mod obj_loader;

pub use image_loader::{FileImageDecoder, ImageData, ImageDecoder, PixelFormat};
pub use materials::{MaterialLibrary, MtlParser};
pub use obj_loader::{AttributePool, FaceAssembler, ObjLoader, ObjOutput};

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Failed to decode asset contents
    #[error("Failed to load asset: {0}")]
    LoadFailed(String),
}

/// Which attribute pool a face corner index refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    /// `v` entries
    Position,
    /// `vt` entries
    TexCoord,
    /// `vn` entries
    Normal,
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position => write!(f, "position"),
            Self::TexCoord => write!(f, "texcoord"),
            Self::Normal => write!(f, "normal"),
        }
    }
}

/// Recoverable problems found while scanning OBJ and MTL text
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// File could not be opened or read
    #[error("failed to open file: {0}")]
    Unreadable(String),

    /// Directive keyword not understood
    #[error("unknown directive: {0}")]
    UnknownDirective(String),

    /// Token that should have been a number
    #[error("{directive}: invalid number '{token}'")]
    InvalidNumber {
        /// Directive keyword
        directive: String,
        /// Offending token
        token: String,
    },

    /// Directive without its required argument
    #[error("{0}: missing argument")]
    MissingArgument(String),

    /// Face corner whose position index is not a number
    #[error("bad face corner '{0}'")]
    MissingPositionIndex(String),

    /// Face corner index outside its pool
    #[error("{pool} index {index} out of range (pool has {len} entries)")]
    IndexOutOfRange {
        /// Pool the index refers to
        pool: PoolKind,
        /// Index as written in the file
        index: i64,
        /// Pool size at the time of the face
        len: usize,
    },

    /// Face with fewer than three usable corners
    #[error("face has {0} usable corners, need at least 3")]
    DegenerateFace(usize),

    /// Material property directive before any `newmtl`
    #[error("{0} before any newmtl")]
    NoCurrentMaterial(String),

    /// `usemtl` naming a material that was never defined
    #[error("unknown material: {0}")]
    UnknownMaterial(String),

    /// Texture referenced by `map_Kd` could not be decoded
    #[error("failed to load texture {path}: {reason}")]
    TextureLoad {
        /// Resolved texture path
        path: String,
        /// Decoder message
        reason: String,
    },
}

/// A recoverable problem tied to a file and line
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// File the problem was found in
    pub file: PathBuf,
    /// 1-based line number, 0 when the problem concerns the whole file
    pub line: usize,
    /// What went wrong
    pub error: ParseError,
}

impl Diagnostic {
    /// Create a diagnostic and log it at warn level
    pub fn report(file: &Path, line: usize, error: ParseError) -> Self {
        let diagnostic = Self {
            file: file.to_path_buf(),
            line,
            error,
        };
        log::warn!("{diagnostic}");
        diagnostic
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .file
            .file_name()
            .map_or_else(|| self.file.display().to_string(), |n| n.to_string_lossy().into_owned());
        if self.line == 0 {
            write!(f, "{name}: {}", self.error)
        } else {
            write!(f, "{name}({}) {}", self.line, self.error)
        }
    }
}

/// Directory containing `path`, used to resolve references relative to a file
pub(crate) fn base_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Parse up to `N` leading numeric tokens into `target`
///
/// Components past the supplied tokens keep their current value; extra tokens are ignored.
pub(crate) fn parse_leading_floats<'a, const N: usize>(
    tokens: impl Iterator<Item = &'a str>,
    directive: &str,
    target: &mut [f32; N],
) -> Result<(), ParseError> {
    let mut parsed = *target;
    for (slot, token) in parsed.iter_mut().zip(tokens) {
        *slot = token.parse::<f32>().map_err(|_| ParseError::InvalidNumber {
            directive: directive.to_string(),
            token: token.to_string(),
        })?;
    }
    *target = parsed;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_floats_partial() {
        let mut value = [1.0, 1.0, 1.0];
        parse_leading_floats("0.2 0.4".split_whitespace(), "Kd", &mut value).unwrap();
        assert_eq!(value, [0.2, 0.4, 1.0]);
    }

    #[test]
    fn test_leading_floats_ignores_extra_tokens() {
        let mut value = [0.0; 2];
        parse_leading_floats("0.5 0.25 0.0 9".split_whitespace(), "vt", &mut value).unwrap();
        assert_eq!(value, [0.5, 0.25]);
    }

    #[test]
    fn test_leading_floats_rejects_bad_token_without_partial_write() {
        let mut value = [0.0; 3];
        let err = parse_leading_floats("1.0 abc 3.0".split_whitespace(), "v", &mut value).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber { directive: "v".to_string(), token: "abc".to_string() }
        );
        assert_eq!(value, [0.0; 3]);
    }

    #[test]
    fn test_diagnostic_display_uses_file_name_and_line() {
        let diagnostic = Diagnostic {
            file: PathBuf::from("models/castle/castle.obj"),
            line: 12,
            error: ParseError::UnknownDirective("o".to_string()),
        };
        assert_eq!(diagnostic.to_string(), "castle.obj(12) unknown directive: o");
    }

    #[test]
    fn test_base_dir_of_bare_file_name_is_empty() {
        assert_eq!(base_dir(Path::new("scene.obj")), PathBuf::new());
        assert_eq!(base_dir(Path::new("models/scene.obj")), PathBuf::from("models"));
    }
}
