//! Load → pack → validate → render → publish.
//!
//! `compile` is pure: it returns every output in memory. Nothing touches the
//! filesystem until `write_outputs`, and a failure anywhere before that leaves
//! the destination as it was.

use crate::config::PackConfig;
use crate::domain::{CreatureDomain, DomainKind, ElementDomain, SpriteSet};
use crate::emit::{emit, Format, OutputFile};
use crate::errors::Result;
use crate::packer::{pack_all, Domain};
use crate::publish::{publish, publish_dir};
use crate::report::{BuildReport, FileEntry};
use crate::value::Descriptor;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct Compiled {
    pub format: Format,
    pub outputs: Vec<OutputFile>,
    pub report: BuildReport,
}

pub fn compile<D: Domain>(domain: &D, descriptors: &[Descriptor], format: Format) -> Result<Compiled> {
    let packed = pack_all(domain, descriptors)?;
    let artifact = domain.artifact(&packed)?;
    artifact.validate()?;

    let mut outputs = emit(&artifact, format);
    let report = BuildReport {
        domain: D::NAME.to_string(),
        format,
        entities: packed.entities,
        capacity: packed.slots.capacity(),
        filled: packed.slots.filled_count(),
        degradations: packed.degradations,
        files: outputs.iter().map(FileEntry::of).collect(),
    };
    if format == Format::Binary {
        outputs.push(OutputFile {
            name: format!("{}.manifest.json", artifact.file_prefix),
            bytes: serde_json::to_vec_pretty(&report)?,
        });
    }

    tracing::info!(
        domain = D::NAME,
        entities = report.entities,
        filled = report.filled,
        degraded = report.degradations.total(),
        "compiled"
    );
    Ok(Compiled { format, outputs, report })
}

/// Compile one of the built-in domains with its section of `config`.
/// `sprites` is only consulted for creatures.
pub fn compile_kind(
    kind: DomainKind,
    descriptors: &[Descriptor],
    config: &PackConfig,
    format: Format,
    sprites: SpriteSet,
) -> Result<Compiled> {
    match kind {
        DomainKind::Elements => compile(&ElementDomain::new(config.elements.clone()), descriptors, format),
        DomainKind::Creatures => compile(&CreatureDomain::new(config.creatures.clone(), sprites), descriptors, format),
    }
}

/// Header form: `dest` is the header file, or a directory to hold it under
/// its default name. Binary form: `dest` is a directory, created if missing.
pub fn write_outputs(compiled: &Compiled, dest: &Path) -> Result<Vec<PathBuf>> {
    match compiled.format {
        Format::Header => {
            let mut written = Vec::with_capacity(compiled.outputs.len());
            let mut targets = Vec::with_capacity(compiled.outputs.len());
            for out in &compiled.outputs {
                let path = if dest.is_dir() { dest.join(&out.name) } else { dest.to_path_buf() };
                targets.push((path.clone(), out.bytes.as_slice()));
                written.push(path);
            }
            publish(&targets)?;
            Ok(written)
        }
        Format::Binary => publish_dir(dest, &compiled.outputs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PackError;
    use crate::sample;

    #[test]
    fn binary_output_set_has_manifest() {
        let descs = sample::descriptors(DomainKind::Elements);
        let c = compile_kind(DomainKind::Elements, &descs, &PackConfig::default(), Format::Binary, SpriteSet::Synthetic).unwrap();
        let names: Vec<&str> = c.outputs.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "periodic_symbols.str",
                "periodic_names.str",
                "periodic_discoverers.str",
                "periodic_data.rec",
                "periodic_index.idx",
                "periodic.manifest.json"
            ]
        );
        assert_eq!(c.report.files.len(), 5);
        assert_eq!(c.report.filled, 20);
        assert_eq!(c.report.capacity, 119);
        let manifest: BuildReport = serde_json::from_slice(&c.outputs[5].bytes).unwrap();
        assert_eq!(manifest, c.report);
        // published last, after every file it describes
        assert_eq!(names.last(), Some(&"periodic.manifest.json"));
    }

    #[test]
    fn header_is_one_file() {
        let descs = sample::descriptors(DomainKind::Elements);
        let c = compile_kind(DomainKind::Elements, &descs, &PackConfig::default(), Format::Header, SpriteSet::Synthetic).unwrap();
        assert_eq!(c.outputs.len(), 1);
        let text = String::from_utf8(c.outputs[0].bytes.clone()).unwrap();
        assert!(text.contains("const PackedElement PT_ELEMENTS[119] = {"));
        assert!(text.contains("#include \"periodic_data.h\""));
    }

    #[test]
    fn duplicate_key_is_a_validation_error() {
        let descs = crate::dataset::parse(r#"[{"number":1},{"number":1}]"#, &["elements"]).unwrap();
        let err = compile_kind(DomainKind::Elements, &descs, &PackConfig::default(), Format::Binary, SpriteSet::Synthetic)
            .unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(err, PackError::Validation(crate::errors::ValidationError::DuplicateKey { key: 1 })));
    }

    #[test]
    fn header_into_directory_uses_default_name() {
        let td = tempfile::tempdir().unwrap();
        let descs = sample::descriptors(DomainKind::Elements);
        let c = compile_kind(DomainKind::Elements, &descs, &PackConfig::default(), Format::Header, SpriteSet::Synthetic).unwrap();
        let written = write_outputs(&c, td.path()).unwrap();
        assert_eq!(written, vec![td.path().join("periodic_data_pack.h")]);
        assert!(written[0].exists());
    }
}
