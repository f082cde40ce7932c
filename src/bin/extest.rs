use extest::{
    dispatch_table, init_dev_logging, init_logging, init_prod_logging, measure, CallRecord, Config, Runtime, Value,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info};

#[derive(Debug)]
enum Command {
    Test,
    List,
    Call { name: String, args: Vec<String> },
    Contend { depth: Option<i64> },
    PrintConfig,
}

#[derive(Debug)]
struct Cli {
    command: Command,
    config: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    verbose: bool,
}

impl Cli {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let prog = args.first().map(String::as_str).unwrap_or("extest");

        let mut config = None;
        let mut log_dir = None;
        let mut verbose = false;
        let mut depth = None;
        let mut positional = Vec::new();

        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--help" | "-h" => return Err(Self::usage(prog)),
                "--verbose" | "-v" => verbose = true,
                "--config" => {
                    let path = iter.next().ok_or("--config needs a path")?;
                    config = Some(PathBuf::from(path));
                }
                "--log-dir" => {
                    let path = iter.next().ok_or("--log-dir needs a directory")?;
                    log_dir = Some(PathBuf::from(path));
                }
                "--depth" => {
                    let n = iter.next().ok_or("--depth needs a number")?;
                    depth = Some(n.parse::<i64>().map_err(|e| format!("Bad --depth '{}': {}", n, e))?);
                }
                opt if opt.starts_with("--") => {
                    return Err(format!("Unknown option: {}\n\n{}", opt, Self::usage(prog)))
                }
                value => positional.push(value.to_string()),
            }
        }

        let mut positional = positional.into_iter();
        let command = match positional.next().as_deref() {
            Some("test") => Command::Test,
            Some("list") => Command::List,
            Some("contend") => Command::Contend { depth },
            Some("config") => Command::PrintConfig,
            Some("call") => {
                let name = positional.next().ok_or("call needs a routine name")?;
                Command::Call { name, args: positional.collect() }
            }
            Some(other) => return Err(format!("Unknown command: {}\n\n{}", other, Self::usage(prog))),
            None => return Err(Self::usage(prog)),
        };

        Ok(Self { command, config, log_dir, verbose })
    }

    fn usage(prog: &str) -> String {
        format!(
            "Extest - native routines behind a scripting-host binding\n\n\
            USAGE:\n    {} [OPTIONS] <COMMAND>\n\n\
            COMMANDS:\n    \
            test                      Run the demonstration routine\n    \
            list                      Show the dispatch table\n    \
            call <name> [args...]     Call a routine; args parse as int, else str\n    \
            contend                   Compare lock policies under contention\n    \
            config                    Print the default configuration\n\n\
            OPTIONS:\n    \
            -h, --help                Print help information\n    \
            -v, --verbose             Trace every call phase\n    \
            --config <path>           Use this config file instead of .extestrc.toml\n    \
            --log-dir <dir>           Write JSON logs to a daily file in <dir>\n    \
            --depth <n>               Fibonacci depth for `contend`\n\n\
            EXAMPLES:\n    \
            {} call fac 12\n    \
            {} call doppel abcdef\n    \
            {} contend --depth 32",
            prog, prog, prog, prog
        )
    }
}

fn parse_arg(raw: &str) -> Value {
    match raw.parse::<i64>() {
        Ok(i) => Value::Int(i),
        Err(_) => Value::Str(raw.to_string()),
    }
}

fn run(cli: Cli, config: Config) -> Result<(), String> {
    let runtime = Runtime::new();
    let table = dispatch_table();

    match cli.command {
        Command::Test => {
            let mut gil = runtime.acquire();
            table.call(&mut gil, "test", &[]).map_err(|e| e.to_string())?;
        }
        Command::List => {
            for routine in table.routines() {
                let args: Vec<_> = routine.signature().iter().map(|t| t.host_name()).collect();
                println!("{:<10} ({}) policy={}", routine.name(), args.join(", "), routine.policy());
            }
        }
        Command::Call { name, args } => {
            let record: CallRecord = args.iter().map(|a| parse_arg(a)).collect();
            debug!(routine = %name, args = ?record, "Calling routine");

            let mut gil = runtime.acquire();
            let value = table.call(&mut gil, &name, &record).map_err(|e| e.to_string())?;
            let json = serde_json::to_string(&value).map_err(|e| e.to_string())?;
            println!("{}", json);
        }
        Command::Contend { depth } => {
            let depth = depth.unwrap_or(config.contention.depth);
            info!(depth, "Measuring lock contention");

            for name in ["fib", "fib2"] {
                let report = measure(&runtime, table, name, &[Value::Int(depth)])
                    .map_err(|e| e.to_string())?;
                println!("{}", report);
            }
        }
        Command::PrintConfig => print!("{}", Config::generate_default()),
    }

    let stats = table.stats();
    debug!(
        calls = stats.calls_made,
        rejected = stats.rejected_calls,
        releases = stats.lock_releases,
        "Dispatch statistics"
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::from_args() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    let config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::from(2);
            }
        },
        None => Config::discover(),
    };

    let _guard = if cli.verbose {
        init_dev_logging()
    } else if let Some(dir) = &cli.log_dir {
        init_prod_logging(dir)
    } else {
        match config.log_config() {
            Ok(log) => init_logging(log),
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::from(2);
            }
        }
    };

    debug!(command = ?cli.command, "Configuration loaded");

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
