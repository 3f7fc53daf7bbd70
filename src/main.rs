use color_eyre::eyre::{bail, Result};
use monitorres::{ChangeOutcome, DisplayControl, ModeRequest, Resolution};
use serde::Serialize;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "monitorres", about = "List monitors and change display resolutions")]
struct Opts {
    /// Print JSON instead of text
    #[structopt(long, global = true)]
    json: bool,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt, Debug)]
struct ChangeOpts {
    /// Target resolution, e.g. 1920x1080
    resolution: Resolution,

    /// Refresh rate in Hz, 0 lets the driver decide
    #[structopt(short, long, default_value = "60")]
    refresh_rate: u32,

    /// Skip checking the mode against the driver's mode list
    #[structopt(long)]
    no_validate: bool,

    /// Do not store the mode in the registry
    #[structopt(long)]
    temporary: bool,
}

impl ChangeOpts {
    fn request(&self) -> ModeRequest {
        let mut request = ModeRequest::from(self.resolution).with_refresh_rate(self.refresh_rate);
        if self.no_validate {
            request = request.without_validation();
        }
        if self.temporary {
            request = request.temporary();
        }
        request
    }
}

#[derive(StructOpt, Debug)]
enum Command {
    /// List all monitors attached to the desktop
    List,
    /// Show the current mode of the primary display
    Primary,
    /// Show the current mode of a monitor
    Get {
        /// Monitor id, e.g. \\.\DISPLAY1
        id: String,
    },
    /// List the modes a monitor supports
    Modes { id: String },
    /// Change the resolution of a monitor
    Set {
        id: String,
        #[structopt(flatten)]
        change: ChangeOpts,
    },
    /// Change the resolution of every monitor
    SetAll {
        #[structopt(flatten)]
        change: ChangeOpts,
    },
    /// Show the system DPI
    Dpi,
}

fn print<T: Serialize + std::fmt::Display>(json: bool, value: &T) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn print_all<T: Serialize + std::fmt::Display>(json: bool, values: &[T]) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(values)?);
    } else {
        for value in values {
            println!("{}", value);
        }
    }
    Ok(())
}

fn report(json: bool, outcome: ChangeOutcome) -> Result<()> {
    print(json, &outcome)?;
    if !outcome.is_success() {
        bail!("display change failed with {:?}", outcome.code);
    }
    Ok(())
}

fn run(opts: Opts) -> Result<()> {
    let control = DisplayControl::system();
    let json = opts.json;

    match opts.command {
        Command::List => print_all(json, &control.list_monitors()),
        Command::Primary => print(json, &control.screen_resolution()?),
        Command::Get { id } => print(json, &control.monitor_resolution(&id)?),
        Command::Modes { id } => print_all(json, &control.available_resolutions(&id)?),
        Command::Set { id, change } => {
            report(json, control.set_monitor_resolution(&id, &change.request())?)
        }
        Command::SetAll { change } => {
            report(json, control.set_all_screen_resolutions(&change.request())?)
        }
        Command::Dpi => print(json, &control.system_dpi()?),
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let opts = Opts::from_args();
    log::debug!("{:?}", opts);
    run(opts)
}
