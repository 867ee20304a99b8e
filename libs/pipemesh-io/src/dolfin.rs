//! # DOLFIN XML
//!
//! Legacy FEniCS mesh format: one cell type per file, vertices and cells
//! listed with explicit indices.
//!
//! ```xml
//! <dolfin xmlns:dolfin="https://fenicsproject.org/">
//!   <mesh celltype="tetrahedron" dim="3">
//!     <vertices size="4">
//!       <vertex index="0" x="0" y="0" z="0"/>
//!     </vertices>
//!     <cells size="1">
//!       <tetrahedron index="0" v0="0" v1="1" v2="2" v3="3"/>
//!     </cells>
//!   </mesh>
//! </dolfin>
//! ```

use crate::error::{ReadError, ReadResult, WriteError, WriteResult};
use crate::mesh::{CellBlock, CellKind, Mesh};
use config::constants::DOLFIN_NAMESPACE;
use glam::DVec3;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

const FORMAT: &str = "DOLFIN XML";

/// DOLFIN cell type name of a cell kind.
fn cell_type_name(kind: CellKind) -> Option<&'static str> {
    match kind {
        CellKind::Line => Some("interval"),
        CellKind::Triangle => Some("triangle"),
        CellKind::Tetra => Some("tetrahedron"),
        _ => None,
    }
}

fn cell_kind(name: &str) -> Option<CellKind> {
    match name {
        "interval" => Some(CellKind::Line),
        "triangle" => Some(CellKind::Triangle),
        "tetrahedron" => Some(CellKind::Tetra),
        _ => None,
    }
}

// =============================================================================
// WRITER
// =============================================================================

/// Cells of the highest dimension, gathered from all matching blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSelection {
    pub kind: CellKind,
    pub connectivity: Vec<usize>,
    /// Lower-dimensional cells left out
    pub dropped: usize,
}

impl CellSelection {
    /// Number of selected cells.
    pub fn len(&self) -> usize {
        self.connectivity.len() / self.kind.nodes_per_cell()
    }

    /// Returns true when no cell was selected.
    pub fn is_empty(&self) -> bool {
        self.connectivity.is_empty()
    }
}

/// Selects the cells a DOLFIN file can hold: every block of the highest
/// dimension. Lower-dimensional blocks are dropped with a warning.
///
/// # Errors
///
/// [`WriteError::NoCells`] for a mesh without cells and
/// [`WriteError::UnsupportedCellKind`] when the top-dimensional cells are
/// not intervals, triangles or tetrahedra, or mix several kinds.
pub fn select_cells(mesh: &Mesh) -> WriteResult<CellSelection> {
    let dimension = mesh.max_dimension().ok_or(WriteError::NoCells)?;
    let mut selected: Option<CellKind> = None;
    let mut connectivity = Vec::new();
    let mut dropped = 0;

    for block in mesh.cells.iter().filter(|b| !b.is_empty()) {
        if block.kind.dimension() < dimension {
            warn!(
                kind = block.kind.name(),
                cells = block.len(),
                "dropping lower-dimensional cells"
            );
            dropped += block.len();
            continue;
        }
        if cell_type_name(block.kind).is_none() || selected.is_some_and(|k| k != block.kind) {
            return Err(WriteError::UnsupportedCellKind {
                kind: block.kind.name(),
                format: FORMAT,
            });
        }
        selected = Some(block.kind);
        connectivity.extend_from_slice(&block.connectivity);
    }

    let kind = selected.ok_or(WriteError::NoCells)?;
    Ok(CellSelection {
        kind,
        connectivity,
        dropped,
    })
}

fn xml_error(context: &str, err: impl std::fmt::Display) -> WriteError {
    WriteError::Xml(format!("failed to write {context}: {err}"))
}

/// Serializes `mesh` to DOLFIN XML text.
///
/// Coordinates use the shortest representation that parses back to the
/// same `f64`.
pub fn to_dolfin_string(mesh: &Mesh) -> WriteResult<String> {
    render(mesh).map(|(text, _)| text)
}

/// Renders the document and returns it with the number of cells written.
fn render(mesh: &Mesh) -> WriteResult<(String, usize)> {
    mesh.validate().map_err(WriteError::InvalidMesh)?;
    let selection = select_cells(mesh)?;
    let cell_type = cell_type_name(selection.kind).ok_or(WriteError::UnsupportedCellKind {
        kind: selection.kind.name(),
        format: FORMAT,
    })?;

    let mut buffer = Vec::new();
    let mut writer = Writer::new_with_indent(Cursor::new(&mut buffer), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| xml_error("XML declaration", e))?;

    let mut root = BytesStart::new("dolfin");
    root.push_attribute(("xmlns:dolfin", DOLFIN_NAMESPACE));
    writer
        .write_event(Event::Start(root))
        .map_err(|e| xml_error("dolfin element", e))?;

    let mut element = BytesStart::new("mesh");
    element.push_attribute(("celltype", cell_type));
    element.push_attribute(("dim", "3"));
    writer
        .write_event(Event::Start(element))
        .map_err(|e| xml_error("mesh element", e))?;

    // Vertices
    let mut vertices = BytesStart::new("vertices");
    vertices.push_attribute(("size", mesh.points.len().to_string().as_str()));
    writer
        .write_event(Event::Start(vertices))
        .map_err(|e| xml_error("vertices element", e))?;
    for (index, p) in mesh.points.iter().enumerate() {
        let mut vertex = BytesStart::new("vertex");
        vertex.push_attribute(("index", index.to_string().as_str()));
        vertex.push_attribute(("x", p.x.to_string().as_str()));
        vertex.push_attribute(("y", p.y.to_string().as_str()));
        vertex.push_attribute(("z", p.z.to_string().as_str()));
        writer
            .write_event(Event::Empty(vertex))
            .map_err(|e| xml_error("vertex", e))?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("vertices")))
        .map_err(|e| xml_error("vertices end", e))?;

    // Cells
    let mut cells = BytesStart::new("cells");
    cells.push_attribute(("size", selection.len().to_string().as_str()));
    writer
        .write_event(Event::Start(cells))
        .map_err(|e| xml_error("cells element", e))?;
    let npc = selection.kind.nodes_per_cell();
    for (index, cell) in selection.connectivity.chunks_exact(npc).enumerate() {
        let mut item = BytesStart::new(cell_type);
        item.push_attribute(("index", index.to_string().as_str()));
        for (slot, node) in cell.iter().enumerate() {
            item.push_attribute((format!("v{slot}").as_str(), node.to_string().as_str()));
        }
        writer
            .write_event(Event::Empty(item))
            .map_err(|e| xml_error("cell", e))?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("cells")))
        .map_err(|e| xml_error("cells end", e))?;

    writer
        .write_event(Event::End(BytesEnd::new("mesh")))
        .map_err(|e| xml_error("mesh end", e))?;
    writer
        .write_event(Event::End(BytesEnd::new("dolfin")))
        .map_err(|e| xml_error("dolfin end", e))?;

    let mut text = String::from_utf8(buffer).map_err(|e| xml_error("document", e))?;
    text.push('\n');
    Ok((text, selection.len()))
}

/// Writes `mesh` as a DOLFIN XML file and returns the number of cells
/// written.
pub fn write_dolfin(mesh: &Mesh, path: impl AsRef<Path>) -> WriteResult<usize> {
    let (text, written) = render(mesh)?;
    fs::write(path.as_ref(), text)?;
    debug!(path = %path.as_ref().display(), cells = written, "wrote DOLFIN XML");
    Ok(written)
}

// =============================================================================
// READER
// =============================================================================

/// Reads a DOLFIN XML file.
pub fn read_dolfin(path: impl AsRef<Path>) -> ReadResult<Mesh> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| ReadError::from_io(path, e))?;
    parse_dolfin(&text)
}

/// Parses DOLFIN XML text.
///
/// # Errors
///
/// [`ReadError::Xml`] for XML syntax errors and [`ReadError::Malformed`]
/// for missing or invalid attributes, out-of-range indices and size
/// mismatches.
pub fn parse_dolfin(text: &str) -> ReadResult<Mesh> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);
    let mut lines = LineCounter::new(text);

    let mut kind: Option<CellKind> = None;
    let mut vertex_count: Option<usize> = None;
    let mut cell_count: Option<usize> = None;
    let mut vertices: Vec<(usize, DVec3)> = Vec::new();
    let mut cells: Vec<(usize, Vec<usize>)> = Vec::new();
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf);
        // Position just past the event, on the line where the tag closes
        let line = lines.at(usize::try_from(reader.buffer_position()).unwrap_or(text.len()));
        match event {
            Ok(Event::Start(ref e) | Event::Empty(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                match name.as_str() {
                    "mesh" => {
                        let attrs = attributes(e, line)?;
                        let cell_type = required(&attrs, "celltype", line)?;
                        kind = Some(cell_kind(cell_type).ok_or_else(|| {
                            ReadError::UnsupportedFormat(format!("DOLFIN cell type '{cell_type}'"))
                        })?);
                    }
                    "vertices" => {
                        vertex_count = Some(number(&attributes(e, line)?, "size", line)?);
                    }
                    "vertex" => {
                        let attrs = attributes(e, line)?;
                        let index: usize = number(&attrs, "index", line)?;
                        let z = match attrs.get("z") {
                            Some(_) => number(&attrs, "z", line)?,
                            None => 0.0,
                        };
                        let p = DVec3::new(number(&attrs, "x", line)?, number(&attrs, "y", line)?, z);
                        if vertex_count.map_or(true, |size| index >= size) {
                            return Err(ReadError::malformed(
                                line,
                                format!("vertex index {index} out of range"),
                            ));
                        }
                        vertices.push((index, p));
                    }
                    "cells" => {
                        cell_count = Some(number(&attributes(e, line)?, "size", line)?);
                    }
                    other => {
                        if let Some(k) = kind.filter(|k| cell_type_name(*k) == Some(other)) {
                            let attrs = attributes(e, line)?;
                            let index: usize = number(&attrs, "index", line)?;
                            let nodes = (0..k.nodes_per_cell())
                                .map(|slot| number(&attrs, &format!("v{slot}"), line))
                                .collect::<ReadResult<Vec<usize>>>()?;
                            cells.push((index, nodes));
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ReadError::Xml(format!("{e} (line {line})"))),
            _ => {}
        }
        buf.clear();
    }

    let kind = kind.ok_or_else(|| ReadError::malformed(1, "missing <mesh> element"))?;
    let end = lines.at(text.len());

    let size = vertex_count.ok_or_else(|| ReadError::malformed(end, "missing <vertices> element"))?;
    // Sizes come from the file; only allocate once they match what was read
    if vertices.len() != size {
        return Err(ReadError::malformed(
            end,
            format!("expected {size} vertices, read {}", vertices.len()),
        ));
    }
    let mut slots: Vec<Option<DVec3>> = vec![None; size];
    for (index, p) in vertices {
        let slot = slots.get_mut(index).ok_or_else(|| {
            ReadError::malformed(end, format!("vertex index {index} out of range"))
        })?;
        *slot = Some(p);
    }
    let points = slots
        .into_iter()
        .enumerate()
        .map(|(i, p)| p.ok_or_else(|| ReadError::malformed(end, format!("vertex {i} missing"))))
        .collect::<ReadResult<Vec<DVec3>>>()?;

    cells.sort_by_key(|(index, _)| *index);
    if let Some(expected) = cell_count {
        if cells.len() != expected {
            return Err(ReadError::malformed(
                end,
                format!("expected {expected} cells, read {}", cells.len()),
            ));
        }
    }
    let mut connectivity = Vec::with_capacity(cells.len() * kind.nodes_per_cell());
    for (position, (index, nodes)) in cells.into_iter().enumerate() {
        if index != position {
            return Err(ReadError::malformed(end, format!("cell index {index} not contiguous")));
        }
        if let Some(bad) = nodes.iter().find(|&&n| n >= points.len()) {
            return Err(ReadError::malformed(
                end,
                format!("cell {index} references vertex {bad}"),
            ));
        }
        connectivity.extend(nodes);
    }

    Ok(Mesh::new(points, vec![CellBlock::new(kind, connectivity)]))
}

/// 1-based line numbers for non-decreasing byte offsets, counted from the
/// previous offset.
struct LineCounter<'a> {
    bytes: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> LineCounter<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            offset: 0,
            line: 1,
        }
    }

    fn at(&mut self, position: usize) -> usize {
        let end = position.min(self.bytes.len());
        if end > self.offset {
            self.line += self.bytes[self.offset..end]
                .iter()
                .filter(|&&b| b == b'\n')
                .count();
            self.offset = end;
        }
        self.line
    }
}

fn attributes(element: &BytesStart<'_>, line: usize) -> ReadResult<HashMap<String, String>> {
    let mut map = HashMap::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| ReadError::Xml(format!("{e} (line {line})")))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| ReadError::Xml(format!("{e} (line {line})")))?;
        map.insert(key, value.into_owned());
    }
    Ok(map)
}

fn required<'m>(attrs: &'m HashMap<String, String>, key: &str, line: usize) -> ReadResult<&'m str> {
    attrs
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| ReadError::malformed(line, format!("missing attribute '{key}'")))
}

fn number<T: std::str::FromStr>(
    attrs: &HashMap<String, String>,
    key: &str,
    line: usize,
) -> ReadResult<T> {
    let value = required(attrs, key, line)?;
    value
        .trim()
        .parse()
        .map_err(|_| ReadError::malformed(line, format!("invalid {key}: '{value}'")))
}
