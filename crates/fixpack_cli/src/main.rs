use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

use fixpack_core::{
    compile_kind, dataset,
    domain::creature::type_name,
    numeric::decode,
    reader::{CreatureFiles, ElementFiles},
    sample,
    value::Descriptor,
    write_outputs, BuildReport, DomainKind, Format, PackConfig, SpriteSet,
};

#[derive(Parser)]
#[command(name = "fixpack", about = "Compile datasets into fixed-layout binary resources")]
struct Cli {
    /// More logging (debug)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Warnings and errors only
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(ValueEnum, Clone, Copy)]
enum CliDomain {
    Elements,
    Creatures,
}

impl From<CliDomain> for DomainKind {
    fn from(d: CliDomain) -> Self {
        match d {
            CliDomain::Elements => DomainKind::Elements,
            CliDomain::Creatures => DomainKind::Creatures,
        }
    }
}

#[derive(ValueEnum, Clone, Copy)]
enum CliFormat {
    Header,
    Binary,
}

impl From<CliFormat> for Format {
    fn from(f: CliFormat) -> Self {
        match f {
            CliFormat::Header => Format::Header,
            CliFormat::Binary => Format::Binary,
        }
    }
}

#[derive(Args)]
struct BuildOpts {
    /// header (C initializers) or binary (resource files); default per domain
    #[arg(long, value_enum)]
    format: Option<CliFormat>,
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the build report as JSON instead of a summary line
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand)]
enum Cmd {
    /// Compile a dataset file
    Pack {
        #[arg(value_enum)]
        domain: CliDomain,
        input: PathBuf,
        /// Header file, or directory for binary output
        output: PathBuf,
        /// Sprite directory (default: `images/` next to INPUT)
        #[arg(long)]
        images: Option<PathBuf>,
        #[command(flatten)]
        opts: BuildOpts,
    },

    /// Compile the built-in sample dataset
    Sample {
        #[arg(value_enum)]
        domain: CliDomain,
        output: PathBuf,
        #[command(flatten)]
        opts: BuildOpts,
    },

    /// Read a binary artifact set back and list its entries
    Inspect {
        #[arg(value_enum)]
        domain: CliDomain,
        dir: PathBuf,
        /// File prefix (default from configuration)
        #[arg(long)]
        prefix: Option<String>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else if cli.quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).with_target(false).with_writer(std::io::stderr).init();
}

fn load_config(path: Option<&Path>) -> Result<PackConfig> {
    match path {
        Some(p) => PackConfig::load(p).with_context(|| format!("loading config {}", p.display())),
        None => Ok(PackConfig::default()),
    }
}

fn report(r: &BuildReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(r)?);
    } else {
        println!("{}", r.summary_line());
    }
    Ok(())
}

fn build(
    kind: DomainKind,
    descriptors: &[Descriptor],
    cfg: &PackConfig,
    sprites: SpriteSet,
    output: &Path,
    opts: &BuildOpts,
) -> Result<()> {
    let format = opts.format.map(Format::from).unwrap_or(kind.default_format());
    let compiled = compile_kind(kind, descriptors, cfg, format, sprites)
        .with_context(|| format!("compiling {kind}; nothing was written"))?;
    write_outputs(&compiled, output).with_context(|| format!("writing {}", output.display()))?;
    report(&compiled.report, opts.json)
}

fn inspect_elements(dir: &Path, prefix: &str) -> Result<()> {
    let f = ElementFiles::open(dir, prefix).with_context(|| format!("opening {prefix}_* in {}", dir.display()))?;
    println!("{prefix}: {} elements, capacity {}", f.index.len(), f.records.capacity());
    for (key, off) in f.index.iter() {
        let r = f.records.at_offset(off).ok_or_else(|| anyhow!("index entry {key} points past the record file"))?;
        println!(
            "{:>3} {:<3} {:<14} mass={:.3} melt={} EN={:.2} group={} period={} cat={} block={} disc={}",
            key,
            f.symbol(&r).unwrap_or("?"),
            f.name(&r).unwrap_or("?"),
            decode(r.mass, 1000.0),
            if r.melt < 0 { "-".to_string() } else { format!("{:.2}K", decode(r.melt, 100.0)) },
            decode(r.electronegativity, 100.0),
            r.group,
            r.period,
            r.category,
            r.block,
            f.discoverer(&r).filter(|s| !s.is_empty()).unwrap_or("-"),
        );
    }
    Ok(())
}

fn inspect_creatures(dir: &Path, prefix: &str) -> Result<()> {
    let f = CreatureFiles::open(dir, prefix).with_context(|| format!("opening {prefix}_* in {}", dir.display()))?;
    println!("{prefix}: {} creatures, capacity {}", f.index.len(), f.records.capacity());
    for (key, off) in f.index.iter() {
        let r = f.records.at_offset(off).ok_or_else(|| anyhow!("index entry {key} points past the record file"))?;
        let types = [r.type1, r.type2].into_iter().filter_map(type_name).collect::<Vec<_>>().join("/");
        println!(
            "{:>4} {:<12} {:<8} hp={} atk={} def={} spa={} spd={} spe={} genus={} sprite={}B",
            key,
            f.name(key).unwrap_or("?"),
            if types.is_empty() { "-" } else { types.as_str() },
            r.stats[0],
            r.stats[1],
            r.stats[2],
            r.stats[3],
            r.stats[4],
            r.stats[5],
            f.genus(&r).unwrap_or("?"),
            f.sprite(&r).map(<[u8]>::len).unwrap_or(0),
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    match cli.cmd {
        Cmd::Pack { domain, input, output, images, opts } => {
            let kind = DomainKind::from(domain);
            let descriptors = dataset::load(&input, kind.list_fields())
                .with_context(|| format!("reading dataset {}", input.display()))?;
            let cfg = load_config(opts.config.as_deref())?;
            let images = images
                .or_else(|| cfg.creatures.images_dir.clone())
                .unwrap_or_else(|| input.parent().unwrap_or(Path::new(".")).join("images"));
            build(kind, &descriptors, &cfg, SpriteSet::Dir(images), &output, &opts)
        }

        Cmd::Sample { domain, output, opts } => {
            let kind = DomainKind::from(domain);
            let cfg = load_config(opts.config.as_deref())?;
            build(kind, &sample::descriptors(kind), &cfg, SpriteSet::Synthetic, &output, &opts)
        }

        Cmd::Inspect { domain, dir, prefix, config } => {
            let cfg = load_config(config.as_deref())?;
            match DomainKind::from(domain) {
                DomainKind::Elements => {
                    inspect_elements(&dir, prefix.as_deref().unwrap_or(&cfg.elements.file_prefix))
                }
                DomainKind::Creatures => {
                    inspect_creatures(&dir, prefix.as_deref().unwrap_or(&cfg.creatures.file_prefix))
                }
            }
        }
    }
}
