use crate::compiler::Compiler;
use crate::emitter::ToVmText;
use anyhow::{bail, Context, Result};
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub const SOURCE_EXTENSION: &str = "jack";
pub const OUTPUT_EXTENSION: &str = "vm";

/// A single source file, or every source file directly inside a directory
/// sorted by name.
pub fn discover(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        bail!("{} is neither a file nor a directory", path.display());
    }
    let mut sources = Vec::new();
    for entry in fs::read_dir(path).with_context(|| format!("reading {}", path.display()))? {
        let entry = entry?;
        let source = entry.path();
        if source.is_file() && source.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            sources.push(source);
        }
    }
    sources.sort();
    Ok(sources)
}

/// `Foo.jack` becomes `Foo.vm`, next to the source unless `out_dir` is set.
pub fn output_path(source: &Path, out_dir: Option<&Path>) -> PathBuf {
    let file_name = source.with_extension(OUTPUT_EXTENSION);
    match (out_dir, file_name.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => file_name,
    }
}

/// Write to a sibling temporary file and rename it over `path`, so readers
/// only ever see a complete file.
pub fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let tmp = path.with_extension(format!("{OUTPUT_EXTENSION}.tmp"));
    fs::write(&tmp, contents).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("renaming {}", tmp.display()))?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct Summary {
    pub compiled: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

impl Summary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct Driver {
    compiler: Compiler,
    out_dir: Option<PathBuf>,
    stdout: bool,
}

impl Driver {
    pub fn new(compiler: Compiler) -> Self {
        Self {
            compiler,
            ..Default::default()
        }
    }

    pub fn out_dir(mut self, out_dir: Option<PathBuf>) -> Self {
        self.out_dir = out_dir;
        self
    }

    pub fn stdout(mut self, stdout: bool) -> Self {
        self.stdout = stdout;
        self
    }

    /// Compile every source under `path`. A file that fails to compile is
    /// reported and skipped; the rest of the batch still runs.
    pub fn run(&self, path: &Path) -> Result<Summary> {
        let sources = discover(path)?;
        if sources.is_empty() {
            warn!("no .{SOURCE_EXTENSION} files in {}", path.display());
        }
        if let Some(dir) = &self.out_dir {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }

        let mut summary = Summary::default();
        for source in sources {
            match self.compile_file(&source) {
                Ok(true) => summary.compiled.push(source),
                Ok(false) => summary.failed.push(source),
                Err(err) => {
                    error!("{}: {err:#}", source.display());
                    if let Err(err) = self.remove_stale(&source) {
                        error!("{err:#}");
                    }
                    summary.failed.push(source);
                }
            }
        }
        Ok(summary)
    }

    /// Returns `false` when the source had a compile error, and `Err` when it
    /// could not be read or its output could not be written.
    pub fn compile_file(&self, source: &Path) -> Result<bool> {
        let src = fs::read_to_string(source)
            .with_context(|| format!("reading {}", source.display()))?;

        let program = match self.compiler.compile(&src) {
            Ok(program) => program,
            Err(err) => {
                err.report(&source.display().to_string(), &src)?;
                error!("{}: {err}", source.display());
                self.remove_stale(source)?;
                return Ok(false);
            }
        };

        let text = program.to_vm_text();
        if self.stdout {
            print!("{text}");
        } else {
            let output = output_path(source, self.out_dir.as_deref());
            write_atomically(&output, &text)?;
            info!("{} -> {}", source.display(), output.display());
        }
        Ok(true)
    }

    /// Delete output left by an earlier build of a source that now fails.
    fn remove_stale(&self, source: &Path) -> Result<()> {
        let output = output_path(source, self.out_dir.as_deref());
        if self.stdout || !output.exists() {
            return Ok(());
        }
        warn!("removing stale {}", output.display());
        fs::remove_file(&output).with_context(|| format!("removing {}", output.display()))
    }
}
