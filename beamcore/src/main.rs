use clap::Parser as ClapParser;
use std::process::ExitCode;

use beamcore::{HeapCreateInfo, ProcessId, Term, VM, VMCreateInfo, VMProxy, bif::arith};

#[derive(ClapParser, Debug)]
#[command(
    author,
    version,
    about = "Apply a built-in function inside a fresh process",
    long_about = None
)]
struct Cli {
    /// Heap limit of the spawned process, in words
    #[arg(long, default_value_t = HeapCreateInfo::default().max_words)]
    heap_words: usize,

    #[arg(long, short, default_value = "erlang")]
    module: String,

    /// e.g. `+`, `div`, `bsl`, `self`
    function: String,

    /// Integers, `[]`, or atoms
    #[arg(allow_hyphen_values = true)]
    args: Vec<String>,
}

fn parse_arg(proxy: &VMProxy, pid: ProcessId, arg: &str) -> Result<Term, String> {
    if arg == "[]" {
        return Ok(Term::Nil);
    }
    match arg.parse::<i64>() {
        Ok(value) => proxy
            .with_process(pid, |process| arith::make_integer(process, 0, value))
            .ok_or_else(|| format!("process {pid} vanished"))?
            .map_err(|err| format!("cannot build {value}: {err}")),
        Err(_) => Ok(Term::Atom(proxy.intern(arg.as_bytes()))),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let vm = VM::new(VMCreateInfo {
        heap: HeapCreateInfo {
            max_words: cli.heap_words,
            ..Default::default()
        },
    });
    let proxy = vm.new_proxy();

    let pid = match proxy.spawn() {
        Ok(pid) => pid,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut args = Vec::with_capacity(cli.args.len());
    for arg in &cli.args {
        match parse_arg(&proxy, pid, arg) {
            Ok(term) => args.push(term),
            Err(err) => {
                eprintln!("Error: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    let module = proxy.intern(cli.module.as_bytes());
    let function = proxy.intern(cli.function.as_bytes());
    match proxy.call(pid, module, function, &args) {
        Ok(result) => {
            let rendered = proxy.display(pid, result).unwrap_or_default();
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("** {err}");
            ExitCode::FAILURE
        }
    }
}
