//! Gmsh MSH reader for ASCII files of version 4.1 and 2.x.

use crate::error::{ReadError, ReadResult};
use crate::mesh::{CellBlock, CellKind, Mesh, GEOMETRICAL, PHYSICAL};
use glam::DVec3;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Reads a Gmsh MSH file.
///
/// # Errors
///
/// [`ReadError::NotFound`] for a missing file, [`ReadError::UnsupportedFormat`]
/// for binary files, [`ReadError::UnsupportedVersion`] for versions other
/// than 4.1 and 2.x, and [`ReadError::Malformed`] for syntax errors.
pub fn read_msh(path: impl AsRef<Path>) -> ReadResult<Mesh> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| ReadError::from_io(path, e))?;
    match std::str::from_utf8(&bytes) {
        Ok(text) => parse_msh(text),
        Err(err) => {
            let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
            if declares_binary(&head) {
                return Err(binary_unsupported());
            }
            let line = bytes[..err.valid_up_to()]
                .iter()
                .filter(|&&b| b == b'\n')
                .count()
                + 1;
            Err(ReadError::malformed(line, "invalid UTF-8"))
        }
    }
}

/// Parses the text of a Gmsh MSH file.
pub fn parse_msh(text: &str) -> ReadResult<Mesh> {
    let mut tokens = Tokens::new(text);
    let mut version = None;
    let mut builder = MeshBuilder::default();

    while let Some(section) = tokens.next() {
        let line = tokens.last_line();
        if !section.starts_with('$') {
            return Err(ReadError::malformed(
                line,
                format!("expected a section marker, found '{section}'"),
            ));
        }
        match section {
            "$MeshFormat" => version = Some(parse_header(&mut tokens)?),
            "$PhysicalNames" => builder.parse_physical_names(&mut tokens)?,
            "$Entities" => {
                require_version(version, line)?;
                builder.parse_entities(&mut tokens)?;
            }
            "$Nodes" => match require_version(version, line)? {
                Version::V4 => builder.parse_nodes_v4(&mut tokens)?,
                Version::V2 => builder.parse_nodes_v2(&mut tokens)?,
            },
            "$Elements" => match require_version(version, line)? {
                Version::V4 => builder.parse_elements_v4(&mut tokens)?,
                Version::V2 => builder.parse_elements_v2(&mut tokens)?,
            },
            other => {
                debug!(section = other, line, "skipping MSH section");
                tokens.skip_section(other)?;
            }
        }
    }

    if version.is_none() {
        return Err(ReadError::malformed(1, "missing $MeshFormat section"));
    }
    Ok(builder.finish())
}

fn binary_unsupported() -> ReadError {
    ReadError::UnsupportedFormat("binary MSH files are not supported".to_string())
}

/// Checks the `$MeshFormat` header line for file-type 1.
fn declares_binary(head: &str) -> bool {
    head.lines()
        .skip_while(|l| l.trim() != "$MeshFormat")
        .nth(1)
        .and_then(|l| l.split_whitespace().nth(1))
        .is_some_and(|t| t == "1")
}

// =============================================================================
// TOKENS
// =============================================================================

/// Whitespace tokens tagged with their 1-based line number.
struct Tokens<'a> {
    items: Vec<(usize, &'a str)>,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        let items = text
            .lines()
            .enumerate()
            .flat_map(|(i, line)| line.split_whitespace().map(move |t| (i + 1, t)))
            .collect();
        Self { items, pos: 0 }
    }

    fn next(&mut self) -> Option<&'a str> {
        let item = self.items.get(self.pos)?;
        self.pos += 1;
        Some(item.1)
    }

    /// Line of the next token (or of the last one at end of input).
    fn line(&self) -> usize {
        self.items
            .get(self.pos)
            .or_else(|| self.items.last())
            .map_or(1, |item| item.0)
    }

    /// Line of the token just consumed.
    fn last_line(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.items.get(i))
            .map_or(1, |item| item.0)
    }

    fn token(&mut self, what: &str) -> ReadResult<&'a str> {
        let line = self.line();
        self.next().ok_or_else(|| {
            ReadError::malformed(line, format!("unexpected end of file, expected {what}"))
        })
    }

    fn parse<T: FromStr>(&mut self, what: &str) -> ReadResult<T> {
        let line = self.line();
        let token = self.token(what)?;
        token
            .parse()
            .map_err(|_| ReadError::malformed(line, format!("invalid {what}: '{token}'")))
    }

    fn point(&mut self) -> ReadResult<DVec3> {
        Ok(DVec3::new(
            self.parse("x coordinate")?,
            self.parse("y coordinate")?,
            self.parse("z coordinate")?,
        ))
    }

    fn expect(&mut self, marker: &str) -> ReadResult<()> {
        let line = self.line();
        let token = self.token(marker)?;
        if token != marker {
            return Err(ReadError::malformed(
                line,
                format!("expected {marker}, found '{token}'"),
            ));
        }
        Ok(())
    }

    /// Pre-allocation for `count` records of at least `tokens_per_record`
    /// tokens each, bounded by the tokens left in the file.
    fn capacity(&self, count: usize, tokens_per_record: usize) -> usize {
        let left = self.items.len().saturating_sub(self.pos);
        count.min(left / tokens_per_record.max(1))
    }

    fn skip_section(&mut self, section: &str) -> ReadResult<()> {
        let end = format!("$End{}", &section[1..]);
        while self.token(&end)? != end {}
        Ok(())
    }

    /// Remaining tokens of the current line joined by single spaces.
    fn rest_of_line(&mut self) -> String {
        let line = self.last_line();
        let mut parts = Vec::new();
        while let Some(&(l, token)) = self.items.get(self.pos) {
            if l != line {
                break;
            }
            parts.push(token);
            self.pos += 1;
        }
        parts.join(" ")
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Version {
    V2,
    V4,
}

fn require_version(version: Option<Version>, line: usize) -> ReadResult<Version> {
    version.ok_or_else(|| ReadError::malformed(line, "section before $MeshFormat"))
}

fn parse_header(tokens: &mut Tokens<'_>) -> ReadResult<Version> {
    let line = tokens.line();
    let version = tokens.token("format version")?;
    let file_type: i32 = tokens.parse("file type")?;
    let _data_size: usize = tokens.parse("data size")?;
    if file_type != 0 {
        return Err(binary_unsupported());
    }
    let parsed = match version {
        "4.1" => Version::V4,
        v if v.starts_with("2.") => Version::V2,
        v => return Err(ReadError::UnsupportedVersion(format!("MSH {v}"))),
    };
    tokens.expect("$EndMeshFormat")?;
    debug!(version, line, "MSH header");
    Ok(parsed)
}

#[derive(Debug, Default)]
struct MeshBuilder {
    points: Vec<DVec3>,
    node_index: HashMap<usize, usize>,
    cells: Vec<CellBlock>,
    geometrical: Vec<Vec<i32>>,
    physical: Vec<Vec<i32>>,
    has_physical: bool,
    entity_physicals: HashMap<(u8, i32), Vec<i32>>,
    field_data: Vec<(String, (i32, u8))>,
}

impl MeshBuilder {
    fn parse_physical_names(&mut self, tokens: &mut Tokens<'_>) -> ReadResult<()> {
        let count: usize = tokens.parse("physical name count")?;
        for _ in 0..count {
            let dim: u8 = tokens.parse("physical dimension")?;
            let tag: i32 = tokens.parse("physical tag")?;
            let name = tokens.rest_of_line();
            let name = name.trim_matches('"').to_string();
            self.field_data.push((name, (tag, dim)));
        }
        tokens.expect("$EndPhysicalNames")
    }

    fn parse_entities(&mut self, tokens: &mut Tokens<'_>) -> ReadResult<()> {
        let mut counts = [0usize; 4];
        for (dim, count) in counts.iter_mut().enumerate() {
            *count = tokens.parse(&format!("entity count of dimension {dim}"))?;
        }
        for (dim, count) in counts.into_iter().enumerate() {
            let dim = dim as u8;
            for _ in 0..count {
                let tag: i32 = tokens.parse("entity tag")?;
                let coordinates = if dim == 0 { 3 } else { 6 };
                for _ in 0..coordinates {
                    let _: f64 = tokens.parse("entity coordinate")?;
                }
                let physical_count: usize = tokens.parse("physical tag count")?;
                let physicals = (0..physical_count)
                    .map(|_| tokens.parse::<i32>("physical tag"))
                    .collect::<ReadResult<Vec<_>>>()?;
                if dim > 0 {
                    let bounding: usize = tokens.parse("bounding entity count")?;
                    for _ in 0..bounding {
                        let _: i32 = tokens.parse("bounding entity tag")?;
                    }
                }
                if !physicals.is_empty() {
                    self.entity_physicals.insert((dim, tag), physicals);
                }
            }
        }
        tokens.expect("$EndEntities")
    }

    fn add_node(&mut self, tag: usize, point: DVec3, line: usize) -> ReadResult<()> {
        if self.node_index.insert(tag, self.points.len()).is_some() {
            return Err(ReadError::malformed(line, format!("duplicate node tag {tag}")));
        }
        self.points.push(point);
        Ok(())
    }

    fn parse_nodes_v4(&mut self, tokens: &mut Tokens<'_>) -> ReadResult<()> {
        let blocks: usize = tokens.parse("node block count")?;
        let total: usize = tokens.parse("node count")?;
        let _min_tag: usize = tokens.parse("minimum node tag")?;
        let _max_tag: usize = tokens.parse("maximum node tag")?;
        self.points.reserve(tokens.capacity(total, 4));

        for _ in 0..blocks {
            let dim: usize = tokens.parse("entity dimension")?;
            let _entity: i32 = tokens.parse("entity tag")?;
            let parametric: u8 = tokens.parse("parametric flag")?;
            let count: usize = tokens.parse("block node count")?;
            let tags = (0..count)
                .map(|_| tokens.parse::<usize>("node tag"))
                .collect::<ReadResult<Vec<_>>>()?;
            let extra = if parametric == 1 { dim } else { 0 };
            for tag in tags {
                let line = tokens.line();
                let point = tokens.point()?;
                for _ in 0..extra {
                    let _: f64 = tokens.parse("parametric coordinate")?;
                }
                self.add_node(tag, point, line)?;
            }
        }
        if self.points.len() != total {
            return Err(ReadError::malformed(
                tokens.line(),
                format!("expected {total} nodes, read {}", self.points.len()),
            ));
        }
        tokens.expect("$EndNodes")
    }

    fn parse_nodes_v2(&mut self, tokens: &mut Tokens<'_>) -> ReadResult<()> {
        let count: usize = tokens.parse("node count")?;
        self.points.reserve(tokens.capacity(count, 4));
        for _ in 0..count {
            let line = tokens.line();
            let tag: usize = tokens.parse("node tag")?;
            let point = tokens.point()?;
            self.add_node(tag, point, line)?;
        }
        tokens.expect("$EndNodes")
    }

    fn resolve(&self, tag: usize, line: usize) -> ReadResult<usize> {
        self.node_index
            .get(&tag)
            .copied()
            .ok_or_else(|| ReadError::malformed(line, format!("unknown node tag {tag}")))
    }

    fn kind(number: i32) -> ReadResult<CellKind> {
        CellKind::from_gmsh_type(number)
            .ok_or_else(|| ReadError::UnsupportedFormat(format!("Gmsh element type {number}")))
    }

    fn push_block(&mut self, block: CellBlock, geometrical: Vec<i32>, physical: Vec<i32>) {
        self.cells.push(block);
        self.geometrical.push(geometrical);
        self.physical.push(physical);
    }

    fn parse_elements_v4(&mut self, tokens: &mut Tokens<'_>) -> ReadResult<()> {
        let blocks: usize = tokens.parse("element block count")?;
        let _total: usize = tokens.parse("element count")?;
        let _min_tag: usize = tokens.parse("minimum element tag")?;
        let _max_tag: usize = tokens.parse("maximum element tag")?;

        for _ in 0..blocks {
            let dim: u8 = tokens.parse("entity dimension")?;
            let entity: i32 = tokens.parse("entity tag")?;
            let kind = Self::kind(tokens.parse("element type")?)?;
            let count: usize = tokens.parse("block element count")?;

            let npc = kind.nodes_per_cell();
            let mut connectivity = Vec::with_capacity(tokens.capacity(count, npc + 1) * npc);
            for _ in 0..count {
                let _tag: usize = tokens.parse("element tag")?;
                for _ in 0..npc {
                    let line = tokens.line();
                    let node: usize = tokens.parse("element node tag")?;
                    connectivity.push(self.resolve(node, line)?);
                }
            }

            let physical = self
                .entity_physicals
                .get(&(dim, entity))
                .and_then(|tags| tags.first().copied());
            self.has_physical |= physical.is_some();
            let physical = physical.unwrap_or(0);
            self.push_block(
                CellBlock::new(kind, connectivity),
                vec![entity; count],
                vec![physical; count],
            );
        }
        tokens.expect("$EndElements")
    }

    fn parse_elements_v2(&mut self, tokens: &mut Tokens<'_>) -> ReadResult<()> {
        let count: usize = tokens.parse("element count")?;

        // Consecutive elements of equal kind and tags share a block
        let mut current: Option<(CellKind, i32, i32)> = None;
        let mut connectivity = Vec::new();
        let mut run = 0usize;

        for _ in 0..count {
            let _tag: usize = tokens.parse("element tag")?;
            let kind = Self::kind(tokens.parse("element type")?)?;
            let tag_count: usize = tokens.parse("element tag count")?;
            let tags = (0..tag_count)
                .map(|_| tokens.parse::<i32>("element tag value"))
                .collect::<ReadResult<Vec<_>>>()?;
            let physical = tags.first().copied().unwrap_or(0);
            let geometrical = tags.get(1).copied().unwrap_or(0);
            if physical != 0 {
                self.has_physical = true;
            }

            let key = (kind, geometrical, physical);
            if let Some(previous) = current.filter(|c| *c != key) {
                self.flush_run(previous, std::mem::take(&mut connectivity), run);
                run = 0;
            }
            current = Some(key);

            for _ in 0..kind.nodes_per_cell() {
                let line = tokens.line();
                let node: usize = tokens.parse("element node tag")?;
                connectivity.push(self.resolve(node, line)?);
            }
            run += 1;
        }
        if let Some(previous) = current {
            self.flush_run(previous, connectivity, run);
        }
        tokens.expect("$EndElements")
    }

    fn flush_run(&mut self, key: (CellKind, i32, i32), connectivity: Vec<usize>, run: usize) {
        let (kind, geometrical, physical) = key;
        self.push_block(
            CellBlock::new(kind, connectivity),
            vec![geometrical; run],
            vec![physical; run],
        );
    }

    fn finish(self) -> Mesh {
        let mut mesh = Mesh::new(self.points, self.cells);
        if !mesh.cells.is_empty() {
            mesh.cell_data
                .insert(GEOMETRICAL.to_string(), self.geometrical);
            if self.has_physical {
                mesh.cell_data.insert(PHYSICAL.to_string(), self.physical);
            }
        }
        mesh.field_data = self.field_data.into_iter().collect();
        mesh
    }
}
