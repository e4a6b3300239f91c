// Command-line front end for framegen.
//
// Usage:
//   framegen <building|warehouse> [FORM.json] [OPTIONS]
//     --settings <PATH>    Settings JSON (units, material, section table)
//     --script <PATH>      Write a STAAD command file
//     --snapshot <PATH>    Write a JSON snapshot of the model on save
//     --udl                Apply the default batch UDL after generation
//     --udl-form <PATH>    Apply the batch UDL described in PATH

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use framegen::{
    apply_uniform_load, generate_building, generate_warehouse, render_summary,
    render_uniform_load, AnalysisHost, BuildingForm, ModelHost, RunError, ScriptHost, Settings,
    UniformLoadForm, WarehouseForm,
};
use serde::de::DeserializeOwned;

/// Structure requested on the command line.
#[derive(Clone, Copy, Debug)]
enum Mode {
    /// Multistory grid building.
    Building,
    /// Portal-frame warehouse.
    Warehouse,
}

/// Parsed command line.
#[derive(Debug, Default)]
struct Options {
    /// Structure to generate.
    mode: Option<Mode>,
    /// Parameter form; defaults when absent.
    form: Option<PathBuf>,
    /// Settings file; defaults when absent.
    settings: Option<PathBuf>,
    /// Command file destination.
    script: Option<PathBuf>,
    /// Model snapshot destination.
    snapshot: Option<PathBuf>,
    /// Whether to run the batch UDL after generation.
    udl: bool,
    /// Batch UDL form; defaults when absent.
    udl_form: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = match parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("error: {message}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match run(&options) {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

/// Parse arguments after the program name.
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut options = Options::default();

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .map(PathBuf::from)
                .ok_or_else(|| format!("{flag} requires a path"))
        };
        match arg.as_str() {
            "building" if options.mode.is_none() => options.mode = Some(Mode::Building),
            "warehouse" if options.mode.is_none() => options.mode = Some(Mode::Warehouse),
            "--settings" => options.settings = Some(value("--settings")?),
            "--script" => options.script = Some(value("--script")?),
            "--snapshot" => options.snapshot = Some(value("--snapshot")?),
            "--udl" => options.udl = true,
            "--udl-form" => {
                options.udl = true;
                options.udl_form = Some(value("--udl-form")?);
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other if other.starts_with("--") => return Err(format!("unknown option {other}")),
            other if options.mode.is_some() && options.form.is_none() => {
                options.form = Some(PathBuf::from(other));
            }
            other => return Err(format!("unexpected argument {other:?}")),
        }
    }

    if options.mode.is_none() {
        return Err("expected `building` or `warehouse`".to_string());
    }
    Ok(options)
}

/// Run one generation, optionally followed by the batch UDL, and return the report.
fn run(options: &Options) -> Result<String, Box<dyn Error>> {
    let settings = match &options.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    }
    .with_env_overrides()?;
    log::debug!("settings: {settings:?}");

    let mut model = ModelHost::new();
    if let Some(path) = &options.snapshot {
        model = model.with_snapshot(path);
    }

    match &options.script {
        Some(path) => {
            let mut host = ScriptHost::wrap(model).with_output(path);
            generate(&mut host, options, &settings)
        }
        None => generate(&mut model, options, &settings),
    }
}

/// Drive the workflow against `host`.
fn generate<H: AnalysisHost>(
    host: &mut H,
    options: &Options,
    settings: &Settings,
) -> Result<String, Box<dyn Error>> {
    let summary = match options.mode {
        Some(Mode::Warehouse) => {
            let form: WarehouseForm = read_form(options.form.as_deref())?;
            generate_warehouse(host, &form, settings)?
        }
        Some(Mode::Building) | None => {
            let form: BuildingForm = read_form(options.form.as_deref())?;
            generate_building(host, &form, settings)?
        }
    };
    let mut report = render_summary(&summary);

    if options.udl {
        let form: UniformLoadForm = read_form(options.udl_form.as_deref())?;
        let applied = apply_uniform_load(host, &form, settings)?;
        host.save().map_err(|source| RunError::Host {
            operation: "save model",
            source,
        })?;
        report.push_str(&render_uniform_load(&applied));
    }
    Ok(report)
}

/// Read a form from JSON, or take its defaults when no path is given.
fn read_form<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(T::default());
    };
    let text = fs::read_to_string(path)
        .map_err(|error| format!("cannot read {}: {error}", path.display()))?;
    let form = serde_json::from_str(&text)
        .map_err(|error| format!("invalid form {}: {error}", path.display()))?;
    Ok(form)
}

fn print_usage() {
    eprintln!("Usage: framegen <building|warehouse> [FORM.json] [OPTIONS]");
    eprintln!("  --settings <PATH>   settings JSON");
    eprintln!("  --script <PATH>     write a STAAD command file");
    eprintln!("  --snapshot <PATH>   write a JSON model snapshot on save");
    eprintln!("  --udl               apply the default batch UDL");
    eprintln!("  --udl-form <PATH>   apply the batch UDL described in PATH");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter()
            .map(|arg| (*arg).to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_mode_form_and_flags() {
        let options = parse_args(args(&[
            "warehouse",
            "form.json",
            "--script",
            "out.std",
            "--udl",
        ]))
        .expect("valid arguments");
        assert!(matches!(options.mode, Some(Mode::Warehouse)));
        assert_eq!(options.form, Some(PathBuf::from("form.json")));
        assert_eq!(options.script, Some(PathBuf::from("out.std")));
        assert!(options.udl);
    }

    #[test]
    fn rejects_missing_mode_and_values() {
        assert!(parse_args(args(&[])).is_err());
        assert!(parse_args(args(&["building", "--script"])).is_err());
        assert!(parse_args(args(&["building", "--verbose"])).is_err());
    }
}
