//! Pipeline orchestration: lex, parse, analyze, lower, emit, then hand the
//! text to `nasm` and `ld`.
//!
//! Each stage validates its input and halts the compilation on critical
//! diagnostics. The session owns the diagnostic buffer and flushes it to
//! standard error before failing.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use wombatc_gen::CodeGen;
use wombatc_ir::lower_program;
use wombatc_par::pretty::AstPrinter;
use wombatc_par::Parser;
use wombatc_sem::SemanticAnalyzer;
use wombatc_util::{ColorMode, Diagnostic, Handler, Location, Renderer, SourceFile};

use crate::cli::{BuildMode, Config};

/// Source files must carry this extension.
const SOURCE_EXT: &str = "wo";

/// Default extension of the linked executable.
const OUTPUT_EXT: &str = "obj";

/// One compilation, start to finish.
pub struct Session {
    config: Config,
    renderer: Renderer,
    handler: Handler,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            renderer: Renderer::new(ColorMode::Auto),
            handler: Handler::new(),
        }
    }

    /// Runs the configured build. Any error has already been rendered to
    /// standard error by the time this returns.
    pub fn run(mut self) -> Result<()> {
        self.validate_input()?;
        self.compile_target()
    }

    /// Pre-compilation validation: the pipeline never starts on a bad path.
    fn validate_input(&mut self) -> Result<()> {
        let input = self.config.input.clone();
        if !input.exists() {
            self.report(
                Diagnostic::critical(format!("no such file: {}", input.display()))
                    .with_hint("check the path"),
            );
            self.flush();
            bail!("invalid input");
        }
        if !input.is_file() {
            self.report(
                Diagnostic::critical(format!("not a regular file: {}", input.display())),
            );
            self.flush();
            bail!("invalid input");
        }
        if input.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXT) {
            self.report(
                Diagnostic::critical(format!(
                    "invalid source extension: {}",
                    input.display()
                ))
                .with_hint("expected a '.wo' file"),
            );
            self.flush();
            bail!("invalid input");
        }
        Ok(())
    }

    fn compile_target(&mut self) -> Result<()> {
        let input = self.config.input.clone();

        // Lexical analysis.
        info!("lexing {}", input.display());
        let (stream, file) = wombatc_lex::lex_file(&input, &self.handler);
        if self.config.dump_tokens {
            for token in stream.iter() {
                println!("{:<16} {:?} @ {}", format!("{:?}", token.kind), token.lexeme, token.loc);
            }
        }
        if self.handler.has_criticals() {
            self.flush();
            bail!("lexing failed");
        }

        // Syntactic analysis.
        info!("parsing");
        let mut ast = match Parser::new(stream).parse() {
            Ok(ast) => ast,
            Err(err) => {
                let diag = self.pretty(&file, &err.message, &err.hint, Some(err.loc));
                self.report(diag);
                self.flush();
                bail!("parsing failed");
            }
        };
        if self.config.dump_ast {
            print!("{}", AstPrinter::new().print(&ast));
        }

        // Semantic analysis.
        info!("analyzing");
        if let Err(err) = SemanticAnalyzer::new().analyze(&mut ast) {
            let diag = self.pretty(&file, &err.message, &err.hint, err.loc);
            self.report(diag);
            self.flush();
            bail!("semantic analysis failed");
        }

        // IR lowering.
        info!("lowering");
        let ir = match lower_program(&ast, &input) {
            Ok(ir) => ir,
            Err(err) => {
                let diag = self.pretty(&file, &err.message, "", err.loc);
                self.report(diag);
                self.flush();
                bail!("lowering failed");
            }
        };
        debug!("lowered program:\n{}", ir.dump());

        // Code emission.
        info!("emitting assembly");
        let asm = match CodeGen::new().assemble(&ir) {
            Ok(asm) => asm,
            Err(err) => {
                self.report(Diagnostic::critical(err.to_string()).with_hint(
                    "this is a compiler bug; the front-end should never hand broken IR onward",
                ));
                self.flush();
                bail!("code generation failed");
            }
        };

        let asm_path = input.with_extension("asm");
        std::fs::write(&asm_path, &asm)
            .with_context(|| format!("cannot write {}", asm_path.display()))?;
        info!("wrote {}", asm_path.display());

        self.flush();
        if self.config.mode == BuildMode::CompileOnly {
            return Ok(());
        }

        let exe = self.build_target_into_executable(&asm_path)?;
        if self.config.mode == BuildMode::Run {
            self.execute(&exe)?;
        }
        Ok(())
    }

    /// Assembles with `nasm`, then links with `ld`. The intermediate object
    /// file is removed once linking succeeds.
    fn build_target_into_executable(&self, asm_path: &Path) -> Result<PathBuf> {
        let obj_path = asm_path.with_extension("o");
        let out_path = self
            .config
            .output
            .clone()
            .unwrap_or_else(|| self.config.input.with_extension(OUTPUT_EXT));

        info!("assembling {}", obj_path.display());
        let status = Command::new("nasm")
            .args(["-f", "elf64", "-o"])
            .arg(&obj_path)
            .arg(asm_path)
            .status()
            .context("failed to spawn nasm")?;
        if !status.success() {
            bail!("assembly process failed with {status}");
        }
        if self.config.mode == BuildMode::Assemble {
            return Ok(obj_path);
        }

        info!("linking {}", out_path.display());
        let status = Command::new("ld")
            .arg("-o")
            .arg(&out_path)
            .arg(&obj_path)
            .status()
            .context("failed to spawn ld")?;
        if !status.success() {
            bail!("linking failed with {status}");
        }

        std::fs::remove_file(&obj_path).ok();
        Ok(out_path)
    }

    /// Run mode: mark the output executable and surface its exit status.
    fn execute(&self, exe: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(exe)?.permissions();
            perms.set_mode(perms.mode() | 0o111);
            std::fs::set_permissions(exe, perms)?;
        }

        info!("executing {}", exe.display());
        let status = Command::new(exe)
            .status()
            .with_context(|| format!("failed to launch {}", exe.display()))?;
        match status.code() {
            Some(0) => Ok(()),
            Some(code) => bail!("program exited with code {code}"),
            None => bail!("program terminated unexpectedly"),
        }
    }

    /// Builds a pretty diagnostic citing the source when a location is
    /// known, a short one otherwise.
    fn pretty(
        &self,
        file: &SourceFile,
        message: &str,
        hint: &str,
        loc: Option<Location>,
    ) -> Diagnostic {
        let diag = Diagnostic::critical(message).with_hint(hint);
        match loc {
            Some(loc) => diag.with_region("", file.region_at(loc)),
            None => diag,
        }
    }

    fn report(&self, diag: Diagnostic) {
        self.handler.emit(diag);
    }

    /// Drains the buffered diagnostics to standard error.
    fn flush(&mut self) {
        for diag in self.handler.take() {
            eprint!("{}", self.renderer.render(&diag));
        }
    }
}
