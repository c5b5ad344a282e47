use anyhow::Context;
use clap::{error::ErrorKind, CommandFactory, Parser};
use config::{app::Output, cli::Cli};

mod brightness;
mod config;
mod controller;
mod device_file;
mod frame;

fn main() -> anyhow::Result<()> {
    let panic_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        panic_hook(panic_info);
        std::process::exit(1);
    }));

    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse_from(config::cli::normalize_args(std::env::args_os()));
    let config = config::load(&cli)
        .unwrap_or_else(|err| Cli::command().error(ErrorKind::ValueValidation, err).exit());

    log::debug!("Using {:#?}", config);

    let brightness = init_brightness(&config.output)?;

    if cli.list {
        for line in brightness::describe(brightness.as_ref())? {
            println!("{line}");
        }
        return Ok(());
    }

    let displays = brightness.list()?;
    let target = brightness::resolve(&displays, config.output.display())?;
    log::info!("Controlling display {}: {}", target.index, target.name);
    log::info!(
        "Tolerance: {}%, brightness: {}-{}%, interval: {:?}",
        config.tolerance,
        config.min_brightness,
        config.max_brightness,
        config.interval
    );

    let stop = controller::Stop::default();
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || handler_stop.raise())
        .context("Unable to install the interrupt handler")?;

    let capturer = Box::<frame::capturer::screen::Screen>::default();
    controller::Controller::new(config, capturer, brightness).run(&stop)
}

fn init_brightness(output: &Output) -> anyhow::Result<Box<dyn brightness::Brightness>> {
    Ok(match output {
        Output::DdcUtil { .. } => Box::new(brightness::DdcUtil::new()),
        Output::Backlight { path, .. } => Box::new(
            brightness::Backlight::new(path)
                .with_context(|| format!("Unable to open backlight devices at '{path}'"))?,
        ),
    })
}
