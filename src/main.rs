use jackc::{cli::Cli, compiler::Compiler, driver::Driver};

use clap::Parser as ClapParser;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .init();

    let compiler = Compiler::default()
        .debug_tokens(args.tokens)
        .debug_symbol_table(args.symbols);
    let summary = Driver::new(compiler)
        .out_dir(args.out_dir.clone())
        .stdout(args.stdout)
        .run(&args.path)?;

    if !summary.is_success() {
        let total = summary.failed.len() + summary.compiled.len();
        log::error!("{} of {total} files failed", summary.failed.len());
        std::process::exit(1);
    }
    Ok(())
}
