//! Artifact serialization.
//!
//! Binary form, all little-endian:
//!   string table  `[count u16][offset u16 * count][payload]`
//!   blob table    `[count u16][offset u32 * count][payload]`, payload entries `[len u16][bytes]`
//!   records       `capacity * record_size` bytes, slot 0 first
//!   index         `[count u16][(key u16, record offset u32) * count]`
//! Offsets in tables are relative to the start of the payload.
//!
//! Header form: one C/C++ header with byte arrays, size constants and the
//! record array as aggregate initializers.
//!
//! No checks here: [`Artifact::validate`] has already run.

use crate::artifact::{Artifact, HeapSection, OffsetWidth, RecordSection};
use crate::consts::{IDX_ENTRY_SIZE, STR_COUNT_BYTES};
use crate::utils::{write_u16, write_u32};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// Embeddable source literal.
    Header,
    /// Raw resource files.
    Binary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

pub fn emit(artifact: &Artifact, format: Format) -> Vec<OutputFile> {
    match format {
        Format::Header => vec![OutputFile {
            name: format!("{}_data_pack.h", artifact.file_prefix),
            bytes: render_header(artifact).into_bytes(),
        }],
        Format::Binary => render_binary(artifact),
    }
}

pub fn offset_table(heap: &HeapSection) -> Vec<u8> {
    let width = match heap.offset_width { OffsetWidth::U16 => 2, OffsetWidth::U32 => 4 };
    let mut out = Vec::with_capacity(STR_COUNT_BYTES + heap.entries.len() * width + heap.bytes.len());
    // Vec<u8> writes cannot fail
    let _ = write_u16(&mut out, heap.entries.len() as u16);
    for &off in &heap.entries {
        let _ = match heap.offset_width {
            OffsetWidth::U16 => write_u16(&mut out, off as u16),
            OffsetWidth::U32 => write_u32(&mut out, off as u32),
        };
    }
    out.extend_from_slice(&heap.bytes);
    out
}

pub fn index_file(records: &RecordSection) -> Vec<u8> {
    let mut out = Vec::with_capacity(STR_COUNT_BYTES + records.index.len() * IDX_ENTRY_SIZE);
    let _ = write_u16(&mut out, records.index.len() as u16);
    for &(key, off) in &records.index {
        let _ = write_u16(&mut out, key as u16);
        let _ = write_u32(&mut out, off as u32);
    }
    out
}

pub fn render_binary(a: &Artifact) -> Vec<OutputFile> {
    let mut files: Vec<OutputFile> = a
        .heaps
        .iter()
        .map(|h| OutputFile { name: format!("{}_{}.{}", a.file_prefix, h.stem, h.extension), bytes: offset_table(h) })
        .collect();
    files.push(OutputFile { name: format!("{}_data.rec", a.file_prefix), bytes: a.records.bytes.clone() });
    files.push(OutputFile { name: format!("{}_index.idx", a.file_prefix), bytes: index_file(&a.records) });
    files
}

fn write_list<T: std::fmt::Display>(s: &mut String, items: impl IntoIterator<Item = T>) {
    let mut any = false;
    for (i, v) in items.into_iter().enumerate() {
        if i > 0 {
            s.push(',');
            if i % 32 == 0 {
                s.push_str("\n  ");
            }
        }
        let _ = write!(s, "{v}");
        any = true;
    }
    // `{}` is not a valid C initializer
    if !any {
        s.push('0');
    }
}

pub fn render_header(a: &Artifact) -> String {
    let p = &a.ident_prefix;
    let mut s = String::new();
    s.push_str("// AUTO-GENERATED by fixpack. Do not edit.\n");
    s.push_str("#pragma once\n");
    let _ = writeln!(s, "#include \"{}\"\n", a.header_include);

    for h in &a.heaps {
        let _ = write!(s, "const uint8_t {p}_{}_BYTES[] = {{", h.ident);
        write_list(&mut s, &h.bytes);
        s.push_str("};\n");
        let _ = writeln!(s, "const uint32_t {p}_{}_SIZE = {};", h.ident, h.bytes.len());
        if h.header_offsets {
            let ty = match h.offset_width { OffsetWidth::U16 => "uint16_t", OffsetWidth::U32 => "uint32_t" };
            let _ = write!(s, "const {ty} {p}_{}_OFFSETS[] = {{", h.ident);
            write_list(&mut s, &h.entries);
            s.push_str("};\n");
            let _ = writeln!(s, "const uint16_t {p}_{}_COUNT = {};", h.ident, h.entries.len());
        }
        s.push('\n');
    }

    let r = &a.records;
    let cap = r.capacity();
    let _ = writeln!(s, "const uint16_t {p}_{}_CAPACITY = {cap};", r.ident);
    let _ = writeln!(s, "const {} {p}_{}[{cap}] = {{", r.c_type, r.ident);
    for (k, row) in r.rows.iter().enumerate() {
        match row {
            Some(fields) => {
                let _ = writeln!(s, "  {{{}}},", fields.join(","));
            }
            None if k == 0 => s.push_str("  {0}, // index 0 unused\n"),
            None => s.push_str("  {0},\n"),
        }
    }
    s.push_str("};\n");
    s
}
