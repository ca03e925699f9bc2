pub mod consts;
pub mod errors;
pub mod utils;
pub mod numeric;
pub mod enums;
pub mod heap;
pub mod bitmap;
pub mod value;
pub mod dataset;
pub mod record;
pub mod slots;
pub mod packer;
pub mod artifact;
pub mod emit;
pub mod publish;
pub mod report;
pub mod config;
pub mod domain;
pub mod reader;
pub mod sample;
pub mod pipeline;

pub use config::PackConfig;
pub use domain::{CreatureDomain, DomainKind, ElementDomain, SpriteSet};
pub use emit::{Format, OutputFile};
pub use errors::{PackError, Result, ValidationError};
pub use numeric::{decode, encode};
pub use packer::{pack_all, Domain};
pub use pipeline::{compile, compile_kind, write_outputs, Compiled};
pub use report::BuildReport;
