//! Minimal CLI: schema document(s) → generated class model (JSON)
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use json_typemodel::compile::SchemaCompiler;
use json_typemodel::config::{AnnotatorKind, DecodePolicy, GenerationConfig};
use json_typemodel::fragment::FragmentResolver;
use json_typemodel::ir::GeneratedClass;
use json_typemodel::store::{DocumentId, FileSystemDocuments};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// compile JSON Schema documents into a target-agnostic class model
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,

    /// debug-level logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// compile each input document and print the generated classes
    Compile(CompileOut),
    /// print the node a fragment path points at
    Resolve(ResolveOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more schema documents. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// settings file (JSON); command line flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// character encoding of percent-escapes in $ref paths
    #[arg(long)]
    ref_encoding: Option<String>,

    /// fail on $ref segments that cannot be decoded instead of warning
    #[arg(long, default_value_t = false)]
    strict_decoding: bool,
}

#[derive(clap::Parser, Debug)]
struct CompileOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// root class name (defaults to each document's file name)
    #[arg(long)]
    class: Option<String>,

    /// package of the generated classes
    #[arg(long)]
    package: Option<String>,

    /// public members without getter/setter pairs
    #[arg(long, default_value_t = false)]
    no_accessors: bool,

    /// add fluent `with<Name>` builder methods
    #[arg(long, default_value_t = false)]
    builders: bool,

    /// skip pattern/range/size metadata
    #[arg(long, default_value_t = false)]
    no_constraints: bool,

    /// presentation metadata strategy
    #[arg(long, value_enum)]
    annotator: Option<AnnotatorArg>,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct ResolveOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// fragment path, e.g. '#/definitions/address'
    #[arg(long, short)]
    path: String,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum AnnotatorArg {
    JsonEditor,
    None,
}

#[derive(Serialize)]
struct CompiledDocument {
    document: DocumentId,
    classes: Vec<GeneratedClass>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl From<AnnotatorArg> for AnnotatorKind {
    fn from(arg: AnnotatorArg) -> Self {
        match arg {
            AnnotatorArg::JsonEditor => AnnotatorKind::JsonEditor,
            AnnotatorArg::None => AnnotatorKind::None,
        }
    }
}

impl InputSettings {
    fn base_config(&self) -> anyhow::Result<GenerationConfig> {
        let mut config = match self.config.as_ref() {
            Some(path) => GenerationConfig::load(path)?,
            None => GenerationConfig::default(),
        };
        if let Some(encoding) = self.ref_encoding.as_ref() {
            config.ref_encoding = encoding.clone();
            config.segment_encoding()?;
        }
        if self.strict_decoding {
            config.decode_policy = DecodePolicy::Strict;
        }
        Ok(config)
    }

    fn documents(&self) -> anyhow::Result<Vec<DocumentId>> {
        let paths = resolve_file_path_patterns(&self.input).context("failed to resolve input file paths")?;
        Ok(paths
            .iter()
            .map(|path| DocumentId::new(path.to_string_lossy().to_string()))
            .collect())
    }
}

impl CompileOut {
    fn config(&self) -> anyhow::Result<GenerationConfig> {
        let mut config = self.input_settings.base_config()?;
        if let Some(package) = self.package.as_ref() {
            config.target_package = package.clone();
        }
        if self.no_accessors {
            config.include_accessors = false;
        }
        if self.builders {
            config.generate_builders = true;
        }
        if self.no_constraints {
            config.include_constraints = false;
        }
        if let Some(annotator) = self.annotator {
            config.annotator = annotator.into();
        }
        Ok(config)
    }

    fn run(&self) -> anyhow::Result<()> {
        let compiler = SchemaCompiler::from_config(self.config()?);
        let mut compiled = Vec::new();
        for document in self.input_settings.documents()? {
            let mut session = compiler.session(FileSystemDocuments)?;
            let classes = compiler
                .compile_document(&mut session, &document, self.class.as_deref())
                .with_context(|| format!("failed to compile {document}"))?;
            eprintln!(
                "{} {document} ({} classes)",
                "compiled".green().bold(),
                classes.len()
            );
            compiled.push(CompiledDocument { document, classes });
        }
        let model_src = serde_json::to_string_pretty(&compiled)?;
        write_output(self.out.as_deref(), &model_src)
    }
}

impl ResolveOut {
    fn run(&self) -> anyhow::Result<()> {
        let config = self.input_settings.base_config()?;
        let resolver = FragmentResolver::new(config.segment_encoding()?, config.decode_policy);
        for document in self.input_settings.documents()? {
            let source = std::fs::read_to_string(document.as_str())
                .with_context(|| format!("failed to read {document}"))?;
            let tree: serde_json::Value = serde_json::from_str(&source)
                .with_context(|| format!("failed to parse JSON source file ({document})"))?;
            let node = resolver
                .resolve(&tree, &self.path)
                .with_context(|| format!("{document}#{}", self.path.trim_start_matches('#')))?;
            println!("{}", serde_json::to_string_pretty(node)?);
        }
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        init_tracing(self.verbose);
        match &self.cmd {
            Command::Compile(target) => target.run(),
            Command::Resolve(target) => target.run(),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn write_output(out: Option<&Path>, contents: &str) -> anyhow::Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, contents).with_context(|| format!("failed to write {}", out.display()))?;
            eprintln!("{} {}", "wrote".green().bold(), out.display());
        }
        None => println!("{contents}"),
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
