use clap::Parser;
use codebundle::cli::{expand_args, BundleArgs, CreateRspArgs, InitConfigArgs};
use codebundle::{
    BundlerError, Cli, CodeBundle, Commands, LinePrompter, OutputFormatter, OutputMode,
    TerminalPrompter, UserFriendlyError,
};
use std::io::IsTerminal;
use std::path::Path;
use std::process;
use tracing::Level;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let args = match expand_args(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };
    let cli = Cli::parse_from(args);

    setup_logging(&cli);

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            print_startup_error(&BundlerError::directory_access(".", e));
            return 1;
        }
    };

    match cli.command {
        Commands::Bundle(ref args) => handle_bundle(&cli, args, &cwd),
        Commands::CreateRsp(ref args) => handle_create_rsp(&cli, args, &cwd),
        Commands::InitConfig(ref args) => handle_init_config(args),
    }
}

fn handle_bundle(cli: &Cli, args: &BundleArgs, cwd: &Path) -> i32 {
    let codebundle = match CodeBundle::from_cli(cli, cwd) {
        Ok(codebundle) => codebundle,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };

    let request = args.to_request(codebundle.config());
    let report = codebundle.run_bundle(cwd, &request);
    report.exit_code()
}

fn handle_create_rsp(cli: &Cli, args: &CreateRspArgs, cwd: &Path) -> i32 {
    let codebundle = match CodeBundle::from_cli(cli, cwd) {
        Ok(codebundle) => codebundle,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };

    let result = if std::io::stdin().is_terminal() {
        codebundle.create_response_file(&args.output, &mut TerminalPrompter::new())
    } else {
        let stdin = std::io::stdin();
        let mut prompter = LinePrompter::new(stdin.lock(), std::io::stdout());
        codebundle.create_response_file(&args.output, &mut prompter)
    };

    match result {
        Ok(_) => 0,
        Err(e) => {
            codebundle.handle_error(&e);
            1
        }
    }
}

fn handle_init_config(args: &InitConfigArgs) -> i32 {
    match CodeBundle::generate_sample_config(&args.output, args.force) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", args.output.display());
            println!("\nTo use this configuration:");
            println!("  codebundle bundle -o all.txt -l csharp --config {}", args.output.display());
            println!("\nFiles named codebundle.toml in the working directory are picked up automatically.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn print_startup_error(error: &BundlerError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

/// RUST_LOG always wins; otherwise -v maps to debug and -q to errors only.
fn setup_logging(cli: &Cli) {
    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
