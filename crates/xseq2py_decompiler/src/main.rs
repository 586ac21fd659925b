use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use serde::Serialize;

use xseq_core::codegen::{emit_pseudocode, GeneratorOptions};
use xseq_core::format::{AmbiguityPolicy, PointerWidth};
use xseq_core::script::{Function, Jump, SymbolTable};
use xseq_core::{DecodeOptions, DecodeSession, Nls, ScriptProgram};

#[derive(ClapParser, Debug)]
#[command(version, about = "XSEQ script to Python-style pseudocode decompiler")]
struct Args {
    #[arg(short, long)]
    input: PathBuf,

    /// Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, default_value = "sjis")]
    lang: Nls,

    /// Also write a YAML summary of the decoded tables.
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Fail on malformed instructions instead of emitting marker lines.
    #[arg(long)]
    strict: bool,

    /// Fail when table sizes fit both pointer widths.
    #[arg(long)]
    reject_ambiguous: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Summary<'a> {
    input: &'a Path,
    width: PointerWidth,
    compressed: bool,
    global_variable_count: usize,
    instruction_count: usize,
    argument_count: usize,
    functions: &'a [Function],
    jumps: &'a [Jump],
    /// Hashes shared by several names; substitution picks the first.
    function_collisions: Vec<Collision<'a>>,
    jump_collisions: Vec<Collision<'a>>,
}

#[derive(Serialize)]
struct Collision<'a> {
    hash: u16,
    names: Vec<&'a str>,
}

fn collisions(table: &SymbolTable) -> Vec<Collision<'_>> {
    table
        .collisions()
        .map(|(hash, names)| Collision { hash, names })
        .collect()
}

impl<'a> Summary<'a> {
    fn new(input: &'a Path, program: &'a ScriptProgram) -> Self {
        Self {
            input,
            width: program.width,
            compressed: program.compressed,
            global_variable_count: program.global_variable_count,
            instruction_count: program.instructions.len(),
            argument_count: program.arguments.len(),
            functions: &program.functions,
            jumps: &program.jumps,
            function_collisions: collisions(&program.symbols.functions),
            jump_collisions: collisions(&program.symbols.jumps),
        }
    }

    fn export_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        let s = serde_yml::to_string(self)?;
        fs::write(path, s)?;
        Ok(())
    }
}

fn create_output(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::File::create(path).with_context(|| format!("creating {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(level));

    let data = fs::read(&args.input).with_context(|| format!("reading {}", args.input.display()))?;

    let options = DecodeOptions {
        nls: args.lang,
        ambiguity: if args.reject_ambiguous {
            AmbiguityPolicy::Reject
        } else {
            AmbiguityPolicy::PreferFirst
        },
    };
    let program = DecodeSession::new(options)
        .decode(&data)
        .with_context(|| format!("decoding {}", args.input.display()))?;
    log::info!(
        "{}: {} functions, {} jumps, {} instructions",
        args.input.display(),
        program.functions.len(),
        program.jumps.len(),
        program.instructions.len()
    );

    let generator = GeneratorOptions {
        strict: args.strict,
    };
    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(create_output(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    emit_pseudocode(&mut writer, &program, generator)?;
    writer.flush()?;

    if let Some(path) = &args.summary {
        Summary::new(&args.input, &program)
            .export_yaml(path)
            .with_context(|| format!("writing summary {}", path.display()))?;
    }
    Ok(())
}
