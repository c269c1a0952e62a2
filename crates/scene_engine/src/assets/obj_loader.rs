//! OBJ file loader for 3D models
//!
//! Scans a Wavefront `.obj` file line by line. Attribute directives (`v`, `vn`,
//! `vt`) grow the [`AttributePool`]; faces are resolved against it and
//! fan-triangulated by the [`FaceAssembler`], which cuts a new draw batch at
//! every `usemtl`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::assets::{
    base_dir, parse_leading_floats, Diagnostic, ImageDecoder, MaterialLibrary, ParseError, PoolKind,
};
use crate::render::batch::DrawBatch;
use crate::render::material::{MaterialIndex, MaterialTable};
use crate::render::vertex::Vertex;

/// Positions, normals and texture coordinates accumulated from the file
///
/// Entries are append-only. Face corners address them with 1-based indices,
/// or negative indices counting back from the newest entry.
#[derive(Debug, Clone, Default)]
pub struct AttributePool {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    tex_coords: Vec<[f32; 2]>,
}

impl AttributePool {
    /// Append a position
    pub fn push_position(&mut self, position: [f32; 3]) {
        self.positions.push(position);
    }

    /// Append a normal
    pub fn push_normal(&mut self, normal: [f32; 3]) {
        self.normals.push(normal);
    }

    /// Append a texture coordinate
    pub fn push_tex_coord(&mut self, tex_coord: [f32; 2]) {
        self.tex_coords.push(tex_coord);
    }

    /// Number of entries in a pool
    pub fn len(&self, pool: PoolKind) -> usize {
        match pool {
            PoolKind::Position => self.positions.len(),
            PoolKind::TexCoord => self.tex_coords.len(),
            PoolKind::Normal => self.normals.len(),
        }
    }

    /// Convert a file index into a 0-based slot, checking it against the pool size
    pub fn resolve_index(&self, pool: PoolKind, index: i64) -> Result<usize, ParseError> {
        let len = self.len(pool);
        let slot = match index {
            i if i > 0 => usize::try_from(i - 1).ok(),
            i if i < 0 => usize::try_from(len as i64 + i).ok(),
            _ => None,
        };
        slot.filter(|&slot| slot < len)
            .ok_or(ParseError::IndexOutOfRange { pool, index, len })
    }

    /// Build the vertex a face corner refers to
    ///
    /// Missing normal or texture coordinate references resolve to zero vectors.
    pub fn resolve_corner(&self, corner: &CornerRef) -> Result<Vertex, ParseError> {
        let position = self.positions[self.resolve_index(PoolKind::Position, corner.position)?];
        let tex_coord = match corner.tex_coord {
            Some(index) => self.tex_coords[self.resolve_index(PoolKind::TexCoord, index)?],
            None => [0.0; 2],
        };
        let normal = match corner.normal {
            Some(index) => self.normals[self.resolve_index(PoolKind::Normal, index)?],
            None => [0.0; 3],
        };
        Ok(Vertex::new(position, normal, tex_coord))
    }
}

/// The three indices of one face corner, as written in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CornerRef {
    /// Position index
    pub position: i64,
    /// Texture coordinate index, if present
    pub tex_coord: Option<i64>,
    /// Normal index, if present
    pub normal: Option<i64>,
}

impl CornerRef {
    /// Parse `p`, `p/t`, `p//n` or `p/t/n`
    pub fn parse(token: &str) -> Result<Self, ParseError> {
        let mut parts = token.split('/');
        let position = parts
            .next()
            .and_then(|p| p.parse::<i64>().ok())
            .ok_or_else(|| ParseError::MissingPositionIndex(token.to_string()))?;

        let mut optional = || -> Result<Option<i64>, ParseError> {
            match parts.next() {
                None | Some("") => Ok(None),
                Some(part) => part.parse::<i64>().map(Some).map_err(|_| ParseError::InvalidNumber {
                    directive: "f".to_string(),
                    token: token.to_string(),
                }),
            }
        };
        let tex_coord = optional()?;
        let normal = optional()?;

        Ok(Self { position, tex_coord, normal })
    }
}

/// Collects triangle vertices and cuts them into per-material draw batches
#[derive(Debug, Default)]
pub struct FaceAssembler {
    buffer: Vec<Vertex>,
    active: Option<MaterialIndex>,
    batches: Vec<DrawBatch>,
}

impl FaceAssembler {
    /// Create an assembler with no active material
    pub fn new() -> Self {
        Self::default()
    }

    /// Fan-triangulate a convex polygon into the current batch
    ///
    /// Triangle k is (corner 0, corner k, corner k+1). Fewer than three corners add nothing.
    pub fn add_polygon(&mut self, corners: &[Vertex]) {
        let Some((&first, rest)) = corners.split_first() else {
            return;
        };
        for pair in rest.windows(2) {
            self.buffer.extend_from_slice(&[first, pair[0], pair[1]]);
        }
    }

    /// Close the current batch and switch to `material`
    pub fn use_material(&mut self, material: Option<MaterialIndex>) {
        self.flush();
        self.active = material;
    }

    /// Material applied to faces added from now on
    pub fn active_material(&self) -> Option<MaterialIndex> {
        self.active
    }

    /// Vertices waiting in the open batch
    pub fn pending_vertices(&self) -> usize {
        self.buffer.len()
    }

    fn flush(&mut self) {
        let vertices = std::mem::take(&mut self.buffer);
        if let Some(batch) = DrawBatch::new(self.active, vertices) {
            self.batches.push(batch);
        }
    }

    /// Close the open batch and return all batches in file order
    pub fn finish(mut self) -> Vec<DrawBatch> {
        self.flush();
        self.batches
    }
}

/// Everything produced by one OBJ scan
#[derive(Debug, Default)]
pub struct ObjOutput {
    /// Materials from every `mtllib`, in load order
    pub materials: MaterialTable,
    /// Batches in file order
    pub batches: Vec<DrawBatch>,
    /// Recoverable problems, already logged
    pub diagnostics: Vec<Diagnostic>,
}

/// OBJ file loader
pub struct ObjLoader<'a> {
    file: PathBuf,
    base_dir: PathBuf,
    decoder: &'a dyn ImageDecoder,
    pool: AttributePool,
    assembler: FaceAssembler,
    materials: MaterialTable,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ObjLoader<'a> {
    /// Load an OBJ file
    ///
    /// An unreadable file produces no batches and a single diagnostic.
    pub fn load_obj(path: impl AsRef<Path>, decoder: &'a dyn ImageDecoder) -> ObjOutput {
        let path = path.as_ref();
        match fs::read(path) {
            Ok(bytes) => Self::parse(&String::from_utf8_lossy(&bytes), path, decoder),
            Err(e) => ObjOutput {
                diagnostics: vec![Diagnostic::report(path, 0, ParseError::Unreadable(e.to_string()))],
                ..Default::default()
            },
        }
    }

    /// Parse OBJ text; `file` locates `mtllib` references and labels diagnostics
    pub fn parse(contents: &str, file: &Path, decoder: &'a dyn ImageDecoder) -> ObjOutput {
        let mut loader = Self {
            file: file.to_path_buf(),
            base_dir: base_dir(file),
            decoder,
            pool: AttributePool::default(),
            assembler: FaceAssembler::new(),
            materials: MaterialTable::new(),
            diagnostics: Vec::new(),
        };

        for (line_num, line) in contents.lines().enumerate() {
            if let Err(error) = loader.parse_line(line) {
                loader.diagnostics.push(Diagnostic::report(&loader.file, line_num + 1, error));
            }
        }

        let batches = loader.assembler.finish();
        log::info!(
            "Loaded {}: {} positions, {} normals, {} texcoords, {} batch(es), {} problem(s)",
            loader.file.display(),
            loader.pool.len(PoolKind::Position),
            loader.pool.len(PoolKind::Normal),
            loader.pool.len(PoolKind::TexCoord),
            batches.len(),
            loader.diagnostics.len()
        );

        ObjOutput {
            materials: loader.materials,
            batches,
            diagnostics: loader.diagnostics,
        }
    }

    fn parse_line(&mut self, line: &str) -> Result<(), ParseError> {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let mut tokens = line.split_whitespace();
        let Some(command) = tokens.next() else {
            return Ok(());
        };

        match command {
            "mtllib" => self.load_material_libraries(command, tokens),
            "usemtl" => self.use_material(command, tokens.next()),
            // Malformed attribute lines still append (as zero) so later indices stay aligned
            "v" => {
                let mut position = [0.0; 3];
                let result = parse_leading_floats(tokens, command, &mut position);
                self.pool.push_position(position);
                result
            }
            "vn" => {
                let mut normal = [0.0; 3];
                let result = parse_leading_floats(tokens, command, &mut normal);
                self.pool.push_normal(normal);
                result
            }
            "vt" => {
                let mut tex_coord = [0.0; 2];
                let result = parse_leading_floats(tokens, command, &mut tex_coord);
                self.pool.push_tex_coord(tex_coord);
                result
            }
            "f" => self.parse_face(tokens),
            _ => Err(ParseError::UnknownDirective(command.to_string())),
        }
    }

    fn load_material_libraries<'t>(
        &mut self,
        command: &str,
        tokens: impl Iterator<Item = &'t str>,
    ) -> Result<(), ParseError> {
        let mut loaded_any = false;
        for library_path in tokens {
            loaded_any = true;
            let library = MaterialLibrary::load(self.base_dir.join(library_path), self.decoder);
            log::debug!("mtllib {}: {} material(s)", library_path, library.materials.len());
            self.materials.append(library.materials);
            self.diagnostics.extend(library.diagnostics);
        }
        if loaded_any {
            Ok(())
        } else {
            Err(ParseError::MissingArgument(command.to_string()))
        }
    }

    fn use_material(&mut self, command: &str, name: Option<&str>) -> Result<(), ParseError> {
        let material = name.and_then(|name| self.materials.find(name));
        self.assembler.use_material(material);
        match (name, material) {
            (None, _) => Err(ParseError::MissingArgument(command.to_string())),
            (Some(name), None) => Err(ParseError::UnknownMaterial(name.to_string())),
            (Some(_), Some(_)) => Ok(()),
        }
    }

    fn parse_face<'t>(&mut self, tokens: impl Iterator<Item = &'t str>) -> Result<(), ParseError> {
        let mut corners = Vec::new();
        let mut truncated = None;
        for token in tokens {
            match CornerRef::parse(token) {
                Ok(corner) => corners.push(self.pool.resolve_corner(&corner)?),
                Err(error) => {
                    truncated = Some(error);
                    break;
                }
            }
        }

        if corners.len() >= 3 {
            self.assembler.add_polygon(&corners);
        }

        match truncated {
            Some(error) => Err(error),
            None if corners.len() < 3 => Err(ParseError::DegenerateFace(corners.len())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetError, ImageData};
    use std::io::Write;

    struct NoImages;

    impl ImageDecoder for NoImages {
        fn decode(&self, path: &Path) -> Result<ImageData, AssetError> {
            Err(AssetError::NotFound(path.display().to_string()))
        }
    }

    fn parse(contents: &str) -> ObjOutput {
        ObjLoader::parse(contents, Path::new("test.obj"), &NoImages)
    }

    const QUAD_POSITIONS: &str = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv 0 2 0\n";

    fn positions(batch: &DrawBatch) -> Vec<f32> {
        batch.vertices().iter().flat_map(|v| v.position).collect()
    }

    #[test]
    fn test_triangle_count_for_ngons() {
        for n in 3..=7usize {
            let mut obj = String::new();
            for i in 0..n {
                obj.push_str(&format!("v {} 0 0\n", i));
            }
            let corners: Vec<String> = (1..=n).map(|i| i.to_string()).collect();
            obj.push_str(&format!("f {}\n", corners.join(" ")));

            let output = parse(&obj);
            assert_eq!(output.batches.len(), 1);
            assert_eq!(output.batches[0].triangle_count(), n - 2);
            assert_eq!(output.batches[0].vertex_count(), 3 * (n - 2));
        }
    }

    #[test]
    fn test_fan_order() {
        let output = parse(&format!("{QUAD_POSITIONS}f 1 2 3 4 5\n"));
        let xs: Vec<[f32; 3]> = output.batches[0].vertices().iter().map(|v| v.position).collect();
        let p = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 2.0, 0.0]];
        assert_eq!(xs, [p[0], p[1], p[2], p[0], p[2], p[3], p[0], p[3], p[4]]);
    }

    #[test]
    fn test_index_resolution() {
        let output = parse(
            "v 1 2 3\nv 4 5 6\nv 7 8 9\n\
             vt 0.5 0.25\nvt 1 1\n\
             vn 0 0 1\nvn 0 1 0\n\
             f 1/2/1 2//2 3/1\n",
        );
        let v = output.batches[0].vertices();
        assert_eq!(v[0], Vertex::new([1.0, 2.0, 3.0], [0.0, 0.0, 1.0], [1.0, 1.0]));
        assert_eq!(v[1], Vertex::new([4.0, 5.0, 6.0], [0.0, 1.0, 0.0], [0.0, 0.0]));
        assert_eq!(v[2], Vertex::new([7.0, 8.0, 9.0], [0.0, 0.0, 0.0], [0.5, 0.25]));
    }

    #[test]
    fn test_negative_indices_count_from_end() {
        let output = parse("v 0 0 0\nv 1 0 0\nv 2 0 0\nf -3 -2 -1\n");
        assert_eq!(positions(&output.batches[0]), [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_out_of_range_rejects_face() {
        let output = parse("v 0 0 0\nv 1 0 0\nv 2 0 0\nf 1 2 4\nvt 0 0\nf 1/2 2 3\nf 0 1 2\n");
        assert!(output.batches.is_empty());
        let errors: Vec<&ParseError> = output.diagnostics.iter().map(|d| &d.error).collect();
        assert_eq!(
            errors,
            [
                &ParseError::IndexOutOfRange { pool: PoolKind::Position, index: 4, len: 3 },
                &ParseError::IndexOutOfRange { pool: PoolKind::TexCoord, index: 2, len: 1 },
                &ParseError::IndexOutOfRange { pool: PoolKind::Position, index: 0, len: 3 },
            ]
        );
        assert_eq!(output.diagnostics[0].line, 4);
    }

    #[test]
    fn test_index_only_sees_entries_defined_so_far() {
        let output = parse("v 0 0 0\nv 1 0 0\nf 1 2 3\nv 2 0 0\nf 1 2 3\n");
        assert_eq!(output.batches.len(), 1);
        assert_eq!(output.batches[0].triangle_count(), 1);
        assert_eq!(output.diagnostics.len(), 1);
    }

    #[test]
    fn test_bad_corner_truncates_face() {
        let output = parse(&format!("{QUAD_POSITIONS}f 1 2 3 4 x 5\n"));
        assert_eq!(output.batches[0].triangle_count(), 2);
        assert_eq!(
            output.diagnostics[0].error,
            ParseError::MissingPositionIndex("x".to_string())
        );
    }

    #[test]
    fn test_bad_corner_early_emits_nothing() {
        let output = parse(&format!("{QUAD_POSITIONS}f 1 /2 3\n"));
        assert!(output.batches.is_empty());
        assert_eq!(output.diagnostics.len(), 1);
    }

    #[test]
    fn test_degenerate_face() {
        let output = parse(&format!("{QUAD_POSITIONS}f 1 2\n"));
        assert!(output.batches.is_empty());
        assert_eq!(output.diagnostics[0].error, ParseError::DegenerateFace(2));
    }

    #[test]
    fn test_short_attribute_lines_pad_with_zero() {
        let output = parse("v 1 2\nv 3 4 5 6\nvt 0.5\nv 7 8 9\nf 1/1 2 3\n");
        let v = output.batches[0].vertices();
        assert_eq!(v[0].position, [1.0, 2.0, 0.0]);
        assert_eq!(v[0].tex_coord, [0.5, 0.0]);
        assert_eq!(v[1].position, [3.0, 4.0, 5.0]);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_malformed_vertex_keeps_indices_aligned() {
        let output = parse("v 1 1 1\nv a b c\nv 3 3 3\nf 1 2 3\n");
        let v = output.batches[0].vertices();
        assert_eq!(v[1].position, [0.0, 0.0, 0.0]);
        assert_eq!(v[2].position, [3.0, 3.0, 3.0]);
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].line, 2);
    }

    #[test]
    fn test_unknown_directive_is_reported() {
        let output = parse("o castle\n# comment\ns 1\n");
        let lines: Vec<usize> = output.diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, [1, 3]);
        assert_eq!(output.diagnostics[0].error, ParseError::UnknownDirective("o".to_string()));
    }

    #[test]
    fn test_faces_without_material() {
        let output = parse(&format!("{QUAD_POSITIONS}f 1 2 3\n"));
        assert_eq!(output.batches[0].material(), None);
    }

    #[test]
    fn test_assembler_cuts_batches_at_material_switch() {
        let mut table = MaterialTable::new();
        let red = table.push(crate::render::Material::new("red"));
        let blue = table.push(crate::render::Material::new("blue"));
        let tri = [Vertex::default(); 3];

        let mut assembler = FaceAssembler::new();
        assembler.use_material(Some(red));
        assembler.use_material(Some(blue));
        assembler.add_polygon(&tri);
        assembler.use_material(Some(red));
        assembler.add_polygon(&tri);
        assembler.add_polygon(&[Vertex::default(); 4]);
        assert_eq!(assembler.pending_vertices(), 9);
        assert_eq!(assembler.active_material(), Some(red));

        let batches = assembler.finish();
        let summary: Vec<_> = batches.iter().map(|b| (b.material(), b.triangle_count())).collect();
        assert_eq!(summary, [(Some(blue), 1), (Some(red), 3)]);
    }

    #[test]
    fn test_mtllib_and_usemtl() {
        let dir = tempfile::tempdir().unwrap();
        let mut mtl = fs::File::create(dir.path().join("scene.mtl")).unwrap();
        write!(mtl, "newmtl red\nKd 1 0 0\nnewmtl glass\nd 0.5\n").unwrap();
        let obj_path = dir.path().join("scene.obj");
        let mut obj = fs::File::create(&obj_path).unwrap();
        write!(
            obj,
            "mtllib scene.mtl\n{QUAD_POSITIONS}usemtl red\nf 1 2 3\nusemtl glass\nf 1 2 3 4\nusemtl missing\nf 3 4 5\n"
        )
        .unwrap();

        let output = ObjLoader::load_obj(&obj_path, &NoImages);
        assert_eq!(output.materials.len(), 2);
        let summary: Vec<_> = output
            .batches
            .iter()
            .map(|b| (b.material().map(MaterialIndex::index), b.triangle_count()))
            .collect();
        assert_eq!(summary, [(Some(0), 1), (Some(1), 2), (None, 1)]);
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(
            output.diagnostics[0].error,
            ParseError::UnknownMaterial("missing".to_string())
        );
    }

    #[test]
    fn test_multiple_libraries_later_definition_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.mtl"), "newmtl shared\nKd 1 0 0\n").unwrap();
        fs::write(dir.path().join("b.mtl"), "newmtl shared\nKd 0 0 1\n").unwrap();
        let obj_path = dir.path().join("scene.obj");
        fs::write(&obj_path, "mtllib a.mtl\nmtllib b.mtl\nv 0 0 0\nusemtl shared\nf 1 1 1\n").unwrap();

        let output = ObjLoader::load_obj(&obj_path, &NoImages);
        assert_eq!(output.materials.len(), 2);
        assert_eq!(output.batches[0].material().map(MaterialIndex::index), Some(1));
    }

    #[test]
    fn test_missing_library_is_reported_not_fatal() {
        let output = parse(&format!("mtllib nowhere.mtl\n{QUAD_POSITIONS}f 1 2 3\n"));
        assert_eq!(output.batches.len(), 1);
        assert!(matches!(output.diagnostics[0].error, ParseError::Unreadable(_)));
    }

    #[test]
    fn test_missing_obj_file() {
        let output = ObjLoader::load_obj("no/such/model.obj", &NoImages);
        assert!(output.batches.is_empty());
        assert!(output.materials.is_empty());
        assert_eq!(output.diagnostics.len(), 1);
    }

    #[test]
    fn test_corner_ref_forms() {
        assert_eq!(CornerRef::parse("7").unwrap(), CornerRef { position: 7, tex_coord: None, normal: None });
        assert_eq!(CornerRef::parse("7/3").unwrap(), CornerRef { position: 7, tex_coord: Some(3), normal: None });
        assert_eq!(CornerRef::parse("7//2").unwrap(), CornerRef { position: 7, tex_coord: None, normal: Some(2) });
        assert_eq!(CornerRef::parse("7/3/2").unwrap(), CornerRef { position: 7, tex_coord: Some(3), normal: Some(2) });
        assert!(matches!(CornerRef::parse("//2"), Err(ParseError::MissingPositionIndex(_))));
        assert!(matches!(CornerRef::parse("1/a"), Err(ParseError::InvalidNumber { .. })));
    }
}
