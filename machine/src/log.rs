use std::path::PathBuf;

#[derive(Default)]
pub struct LogSettings {
    /// Per micro-cycle trace of the sequencer.
    pub cpu: bool,
    /// Bus drivers and sinks for every micro-step.
    pub bus: bool,
    pub clock: bool,
    /// Mirror everything into this file as well as stdout.
    pub log_file: Option<PathBuf>,
}

pub fn setup_logging(settings: LogSettings) -> Result<(), fern::InitError> {
    let LogSettings { cpu, bus, clock, log_file } = settings;
    let mut dispatch = fern::Dispatch::new()
        .filter(move |metadata| match metadata.target() {
            "cpu" => cpu,
            "bus" => bus,
            "clock" => clock || metadata.level() <= log::Level::Warn,
            _ => true,
        })
        .format(|out, message, record| {
            out.finish(format_args!("[{}]: {}", record.target(), message))
        })
        .level(log::LevelFilter::Trace)
        .chain(std::io::stdout());
    if let Some(path) = log_file {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }
    dispatch.apply()?;
    Ok(())
}
