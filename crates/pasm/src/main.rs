//! CLI entry point for the PASM checker.

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use pasm::converter::{convert_file, default_output_path, ConvertError, Tables};
use pasm::source::Encoding;
use pasm_core::{ParseOptions, DEFAULT_STUB_OPCODE};
#[cfg(test)]
use tempfile as _;

const USAGE_TEXT: &str = "\
Usage: pasm [options] <pasm_file>

Checks a PASM script and writes its canonical listing.

Options:
  -f, --fix-labels         Add a stub definition for every missing jump target
  -o, --output <file>      Output file path (default: qe_<pasm_file>)
  -e, --encoding <name>    Input and output encoding: utf16 or utf8 (default: utf16)
      --opcodes <file>     Replace the built-in opcode table
      --aliases <file>     Replace the built-in alias table
  -h, --help               Show this help message

Examples:
  pasm quest.pasm
  pasm -f quest.pasm -o fixed.pasm
";

#[derive(Debug, PartialEq, Eq)]
struct ConvertArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    fix_labels: bool,
    encoding: Encoding,
    opcodes: Option<PathBuf>,
    aliases: Option<PathBuf>,
}

#[derive(Debug)]
enum CliAction {
    Convert(ConvertArgs),
    Help,
}

fn option_value(
    args: &mut impl Iterator<Item = OsString>,
    flag: &OsString,
) -> Result<OsString, String> {
    args.next()
        .ok_or_else(|| format!("missing value for {}", flag.to_string_lossy()))
}

#[allow(clippy::while_let_on_iterator)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<CliAction, String> {
    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut fix_labels = false;
    let mut encoding = Encoding::default();
    let mut opcodes: Option<PathBuf> = None;
    let mut aliases: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        if arg == "--help" || arg == "-h" {
            return Ok(CliAction::Help);
        }

        if arg == "--fix-labels" || arg == "-f" {
            fix_labels = true;
            continue;
        }

        if arg == "-o" || arg == "--output" {
            output = Some(PathBuf::from(option_value(&mut args, &arg)?));
            continue;
        }

        if arg == "-e" || arg == "--encoding" {
            let value = option_value(&mut args, &arg)?;
            let name = value.to_string_lossy();
            encoding =
                Encoding::from_name(&name).ok_or_else(|| format!("unknown encoding: {name}"))?;
            continue;
        }

        if arg == "--opcodes" {
            opcodes = Some(PathBuf::from(option_value(&mut args, &arg)?));
            continue;
        }

        if arg == "--aliases" {
            aliases = Some(PathBuf::from(option_value(&mut args, &arg)?));
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if input.is_some() {
            return Err("multiple input paths provided".to_string());
        }
        input = Some(PathBuf::from(arg));
    }

    let input = input.ok_or_else(|| "missing input path".to_string())?;
    Ok(CliAction::Convert(ConvertArgs {
        input,
        output,
        fix_labels,
        encoding,
        opcodes,
        aliases,
    }))
}

fn run_convert(args: ConvertArgs) -> Result<(), i32> {
    let tables = match Tables::load(args.opcodes.as_deref(), args.aliases.as_deref()) {
        Ok(t) => t,
        Err(e) => {
            report_convert_error(&e);
            return Err(1);
        }
    };

    let options = ParseOptions {
        fix_labels: args.fix_labels,
        stub_opcode: DEFAULT_STUB_OPCODE.to_string(),
    };
    let output_path = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input));

    let conversion =
        match convert_file(&args.input, &output_path, &tables, &options, args.encoding) {
            Ok(c) => c,
            Err(e) => {
                report_convert_error(&e);
                return Err(1);
            }
        };

    for warning in &conversion.warnings {
        eprintln!("warning: {warning}");
        if warning.stub_added {
            eprintln!("warning: Adding dummy entry for label '{}'.", warning.label);
        }
    }

    println!(
        "Converted {} ({} statements) -> {}",
        args.input.display(),
        conversion.program.len(),
        output_path.display()
    );

    Ok(())
}

fn report_convert_error(e: &ConvertError) {
    match (&e.path, e.parse_error()) {
        (Some(path), Some(parse_error)) => {
            eprintln!(
                "{}:{}:{}: error: {}",
                path.display(),
                parse_error.line,
                parse_error.column,
                parse_error.kind
            );
            eprintln!("{}", parse_error.text);
            eprintln!("{}^", parse_error.caret_padding());
        }
        _ => eprintln!("error: {e}"),
    }
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(CliAction::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(CliAction::Convert(args)) => match run_convert(args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            1
        }
    };

    std::process::exit(exit_code);
}
