#![forbid(unsafe_code)]

//! TestDeck demo binary.
//!
//! Registers a handful of simulated suites, loads the runtime
//! configuration (falling back to built-in defaults when the document is
//! missing or malformed), applies it, and drives the menu from the
//! terminal. `--dump-config` writes a template document for the registered
//! catalog and exits.

use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tdeck::prelude::*;
use tdeck::{TerminalInput, TerminalSurface};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Simulated device state shared by every suite.
///
/// Stands in for the real device executor: cases record what they rendered
/// and the baseline suite resets the state.
#[derive(Debug, Default)]
struct DemoDevice {
    cleared: bool,
    frames_rendered: u32,
}

impl DemoDevice {
    fn render(&mut self, what: &str) {
        self.frames_rendered += 1;
        info!(
            what,
            cleared = self.cleared,
            frames = self.frames_rendered,
            "rendered"
        );
    }
}

struct Opts {
    config: PathBuf,
    dump_config: Option<PathBuf>,
    autorun_now: bool,
}

impl Opts {
    fn parse() -> std::result::Result<Self, String> {
        let mut opts = Self {
            config: PathBuf::from("tdeck.json"),
            dump_config: None,
            autorun_now: false,
        };

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    opts.config = args
                        .next()
                        .map(PathBuf::from)
                        .ok_or("--config requires a path")?;
                }
                "--dump-config" => {
                    opts.dump_config = Some(
                        args.next()
                            .map(PathBuf::from)
                            .ok_or("--dump-config requires a path")?,
                    );
                }
                "--autorun-now" => opts.autorun_now = true,
                "--help" | "-h" => {
                    return Err(concat!(
                        "usage: tdeck-demo [--config PATH] [--dump-config PATH] [--autorun-now]\n",
                        "keys: arrows move, enter activates, esc backs out, s runs the\n",
                        "current suite, r runs everything and exits",
                    )
                    .to_string());
                }
                other => return Err(format!("unknown argument: {other}")),
            }
        }
        Ok(opts)
    }
}

/// Registration order is execution order. The baseline suite resets
/// simulated device state and must precede all others.
fn register_suites(catalog: &mut Catalog, device: &Rc<RefCell<DemoDevice>>) {
    let mut baseline = {
        let device = Rc::clone(device);
        TestSuite::new("Baseline")
            .with_initialize(move || device.borrow_mut().cleared = true)
    };
    {
        let device = Rc::clone(device);
        baseline.add("ClearState", move || {
            let mut device = device.borrow_mut();
            device.frames_rendered = 0;
            device.render("clear");
        });
    }
    {
        let device = Rc::clone(device);
        baseline.add("SanityFill", move || device.borrow_mut().render("fill"));
    }
    catalog.register(baseline);

    for (suite_name, cases) in [
        ("Gradient", ["Horizontal", "Vertical", "Radial"].as_slice()),
        ("Blend", ["Additive", "Multiply"].as_slice()),
    ] {
        let mut suite = TestSuite::new(suite_name);
        for case_name in cases {
            let device = Rc::clone(device);
            let what = format!("{suite_name}/{case_name}");
            suite.add(*case_name, move || device.borrow_mut().render(&what));
        }
        catalog.register(suite);
    }
}

fn load_config(opts: &Opts) -> RuntimeConfig {
    let mut warnings = Vec::new();
    let config = match RuntimeConfig::load_file(&opts.config, ParseMode::Strict, &mut warnings) {
        Ok(config) => config,
        Err(error) => {
            warn!(%error, "config load failed, using built-in defaults");
            RuntimeConfig::default()
        }
    };
    for warning in &warnings {
        warn!(%warning, "config");
    }
    config
}

fn run(opts: &Opts) -> tdeck::Result<ExitReason> {
    let device = Rc::new(RefCell::new(DemoDevice::default()));
    let mut catalog = Catalog::new();
    register_suites(&mut catalog, &device);

    let config = load_config(opts);

    if let Some(path) = &opts.dump_config {
        config.dump_to_file(path, &catalog)?;
        info!(path = %path.display(), "config template written");
        return Ok(ExitReason::Exit);
    }

    config.apply(&mut catalog);
    config.configure_runs(&mut catalog);

    let mut options = DriverOptions::from_config(&config);
    if opts.autorun_now {
        options.disable_autorun = false;
        options.autorun_immediately = true;
    }

    enable_raw_mode()?;
    let mut driver = Driver::new(
        catalog,
        TerminalInput::new(),
        TerminalSurface::stdout(),
        options,
    );
    let reason = driver.run();
    disable_raw_mode()?;

    info!(
        frames = device.borrow().frames_rendered,
        violations = driver.contract_violations(),
        "driver stopped"
    );
    Ok(reason)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = match Opts::parse() {
        Ok(opts) => opts,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    match run(&opts) {
        Ok(ExitReason::ShutdownRequested) => {
            info!("configuration requested shutdown on completion");
            ExitCode::SUCCESS
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("fatal: {error}");
            ExitCode::FAILURE
        }
    }
}
