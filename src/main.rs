use anyhow::Context as _;
use clap::Parser;

use billboard::config::Cli;
use billboard::event::{EventSink, Fanout, QueuedSink};
use billboard::logger::Logger;
use billboard::scheduler::SampleScheduler;
use billboard::sensor::{AltitudeSource, Barometer, ReplaySource};
use billboard::timebase::{FixedRateTimebase, Unpaced};
use billboard::transmitter::Transmitter;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let source: Box<dyn AltitudeSource> = match &cli.replay {
        Some(path) => {
            let replay = ReplaySource::from_path(path)
                .with_context(|| format!("reading replay file {}", path.display()))?;
            log::info!("Replaying {} samples from {}", replay.len(), path.display());
            Box::new(replay)
        }
        None => Box::new(Barometer::new(cli.sensor_attempts).context("starting barometer")?),
    };

    let logger = Logger::create(&cli.log_dir).context("creating flight log")?;
    // Flight goes on without the radio if the port will not open.
    let transmitter = cli
        .serial_port
        .as_deref()
        .and_then(|port| match Transmitter::open(port) {
            Ok(transmitter) => Some(transmitter),
            Err(e) => {
                log::warn!("Downlink disabled: {}", e);
                None
            }
        });
    let storage: Box<dyn EventSink + Send> = match transmitter {
        Some(transmitter) => Box::new(Fanout::new(logger, transmitter)),
        None => Box::new(logger),
    };
    let sink = QueuedSink::spawn(storage, cli.queue_capacity);

    let mut scheduler = SampleScheduler::new(source, sink);
    let limits = cli.run_limits();
    let summary = if cli.replay.is_some() && !cli.realtime {
        scheduler.run(&mut Unpaced, limits)
    } else {
        scheduler.run(&mut FixedRateTimebase::default(), limits)
    };

    log::info!(
        "Finished after {} ticks in phase {}; landed at tick {:?}, {} sensor faults, {} log records dropped",
        summary.ticks,
        summary.phase.name(),
        summary.landed_at,
        summary.sensor_faults,
        scheduler.sink().dropped()
    );
    // Dropping the scheduler drains the log queue.
    drop(scheduler);
    Ok(())
}
