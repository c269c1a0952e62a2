//! MTL (Material Template Library) file parser
//!
//! Parses Wavefront .mtl files into an ordered [`MaterialTable`]. Property
//! directives apply to the material opened by the most recent `newmtl`; texture
//! paths are resolved relative to the library's directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::assets::{base_dir, parse_leading_floats, Diagnostic, ImageDecoder, ParseError};
use crate::foundation::math::Vec3;
use crate::render::material::{Material, MaterialIndex, MaterialTable};

/// Result of loading one material library
#[derive(Debug, Default)]
pub struct MaterialLibrary {
    /// Materials in definition order
    pub materials: MaterialTable,
    /// Recoverable problems, already logged
    pub diagnostics: Vec<Diagnostic>,
}

impl MaterialLibrary {
    /// Load a material library from disk
    ///
    /// An unreadable file yields an empty table and a single diagnostic.
    pub fn load(path: impl AsRef<Path>, decoder: &dyn ImageDecoder) -> Self {
        let path = path.as_ref();
        match fs::read(path) {
            Ok(bytes) => MtlParser::parse(&String::from_utf8_lossy(&bytes), path, decoder),
            Err(e) => {
                Self {
                    materials: MaterialTable::new(),
                    diagnostics: vec![Diagnostic::report(path, 0, ParseError::Unreadable(e.to_string()))],
                }
            }
        }
    }
}

/// Which color a `Ka`/`Kd`/`Ks`/`Ke` directive sets
#[derive(Debug, Clone, Copy)]
enum ColorSlot {
    Ambient,
    Diffuse,
    Specular,
    Emissive,
}

/// Which scalar a `Ni`/`Ns`/`Tr`/`d` directive sets
#[derive(Debug, Clone, Copy)]
enum ScalarSlot {
    Refraction,
    SpecularExponent,
    Transparency,
    Dissolve,
}

/// MTL file parser
pub struct MtlParser<'a> {
    file: PathBuf,
    base_dir: PathBuf,
    decoder: &'a dyn ImageDecoder,
    materials: MaterialTable,
    current: Option<MaterialIndex>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> MtlParser<'a> {
    /// Parse MTL file contents
    ///
    /// # Arguments
    /// * `contents` - The text contents of the MTL file
    /// * `file` - Path of the library, used for diagnostics and texture resolution
    /// * `decoder` - Decoder for `map_Kd` images
    pub fn parse(contents: &str, file: &Path, decoder: &'a dyn ImageDecoder) -> MaterialLibrary {
        let mut parser = Self {
            file: file.to_path_buf(),
            base_dir: base_dir(file),
            decoder,
            materials: MaterialTable::new(),
            current: None,
            diagnostics: Vec::new(),
        };

        for (line_num, line) in contents.lines().enumerate() {
            if let Err(error) = parser.parse_line(line) {
                parser.diagnostics.push(Diagnostic::report(&parser.file, line_num + 1, error));
            }
        }

        log::debug!(
            "Parsed {} material(s) from {}",
            parser.materials.len(),
            parser.file.display()
        );

        MaterialLibrary {
            materials: parser.materials,
            diagnostics: parser.diagnostics,
        }
    }

    fn parse_line(&mut self, line: &str) -> Result<(), ParseError> {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let mut tokens = line.split_whitespace();
        let Some(command) = tokens.next() else {
            return Ok(());
        };

        match command {
            "newmtl" => {
                // A nameless material still opens a new record so later
                // properties never land on the previous one
                let name = tokens.next();
                self.current = Some(self.materials.push(Material::new(name.unwrap_or_default())));
                match name {
                    Some(_) => Ok(()),
                    None => Err(ParseError::MissingArgument(command.to_string())),
                }
            }
            "illum" => {
                let token = tokens
                    .next()
                    .ok_or_else(|| ParseError::MissingArgument(command.to_string()))?;
                let model = token.parse::<u32>().map_err(|_| ParseError::InvalidNumber {
                    directive: command.to_string(),
                    token: token.to_string(),
                })?;
                self.current_material(command)?.illumination_model = Some(model);
                Ok(())
            }
            "map_Kd" => {
                // Texture paths may contain spaces, take the rest of the line
                let texture = tokens.collect::<Vec<_>>().join(" ");
                if texture.is_empty() {
                    return Err(ParseError::MissingArgument(command.to_string()));
                }
                self.load_texture(command, &texture)
            }
            "Ka" => self.set_color(command, tokens, ColorSlot::Ambient),
            "Kd" => self.set_color(command, tokens, ColorSlot::Diffuse),
            "Ks" => self.set_color(command, tokens, ColorSlot::Specular),
            "Ke" => self.set_color(command, tokens, ColorSlot::Emissive),
            "Ni" => self.set_scalar(command, tokens.next(), ScalarSlot::Refraction),
            "Ns" => self.set_scalar(command, tokens.next(), ScalarSlot::SpecularExponent),
            "Tr" => self.set_scalar(command, tokens.next(), ScalarSlot::Transparency),
            "d" => self.set_scalar(command, tokens.next(), ScalarSlot::Dissolve),
            _ => Err(ParseError::UnknownDirective(command.to_string())),
        }
    }

    /// Material opened by the latest `newmtl`
    fn current_material(&mut self, command: &str) -> Result<&mut Material, ParseError> {
        self.current
            .and_then(|index| self.materials.get_mut(index))
            .ok_or_else(|| ParseError::NoCurrentMaterial(command.to_string()))
    }

    fn set_color<'t>(
        &mut self,
        command: &str,
        tokens: impl Iterator<Item = &'t str>,
        slot: ColorSlot,
    ) -> Result<(), ParseError> {
        let material = self.current_material(command)?;
        let color = match slot {
            ColorSlot::Ambient => &mut material.ambient,
            ColorSlot::Diffuse => &mut material.diffuse,
            ColorSlot::Specular => &mut material.specular,
            ColorSlot::Emissive => &mut material.emissive,
        };
        let mut components = [color.x, color.y, color.z];
        parse_leading_floats(tokens, command, &mut components)?;
        *color = Vec3::from(components);
        Ok(())
    }

    fn set_scalar(&mut self, command: &str, token: Option<&str>, slot: ScalarSlot) -> Result<(), ParseError> {
        let token = token.ok_or_else(|| ParseError::MissingArgument(command.to_string()))?;
        let value = token.parse::<f32>().map_err(|_| ParseError::InvalidNumber {
            directive: command.to_string(),
            token: token.to_string(),
        })?;
        let material = self.current_material(command)?;
        match slot {
            ScalarSlot::Refraction => material.refraction_index = value,
            ScalarSlot::SpecularExponent => material.specular_exponent = value,
            ScalarSlot::Transparency => material.transparency = value,
            ScalarSlot::Dissolve => material.transparency = 1.0 - value,
        }
        Ok(())
    }

    fn load_texture(&mut self, command: &str, texture: &str) -> Result<(), ParseError> {
        // Fail before decoding when there is nothing to attach the texture to
        self.current_material(command)?;

        let path = self.base_dir.join(texture);
        let image = self.decoder.decode(&path).map_err(|e| ParseError::TextureLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        log::debug!("{}: {}x{} {:?} texture", texture, image.width, image.height, image.format());
        self.current_material(command)?.texture = Some(image);
        Ok(())
    }
}
