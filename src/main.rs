use clap::Parser;
use sensor_table::app::{Options, RunError, run_with_io};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::panic::{self, PanicHookInfo};

/// Exit codes for the application
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_PANIC: i32 = 2;

/// Install the logger. `RUST_LOG` overrides the level picked by `--verbose`.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    // Fails only if a logger is already installed.
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}

/// Open the input named in `options` (or stdin) and run the tool against stdout.
fn run(options: &Options) -> Result<(), RunError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &options.input {
        Some(path) => {
            let file = File::open(path).map_err(|source| RunError::Open {
                path: path.clone(),
                source,
            })?;
            run_with_io(options, &mut BufReader::new(file), &mut out)?;
        }
        None => {
            let stdin = io::stdin();
            run_with_io(options, &mut stdin.lock(), &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn main() {
    // Set up panic hook to ensure clean exit codes for scripts that check exit status
    panic::set_hook(Box::new(move |info: &PanicHookInfo| {
        eprintln!("Panic! {}", info);
        std::process::exit(EXIT_PANIC);
    }));

    let options = Options::parse();
    init_logging(options.verbose);

    match run(&options) {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(why) => {
            eprintln!("error: {}", why);
            std::process::exit(EXIT_ERROR);
        }
    }
}
