use color_eyre::Result;
use inky::component::codes::{gamepad, keyboard};
use inky::{Components, Control, Dispatcher, InkySettings, InputHub, SystemClock};
use std::path::PathBuf;
use tokio::task::LocalSet;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    setup()?;

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let settings = InkySettings::load_or_default(config_path.as_deref()).await;

    LocalSet::new().run_until(run(settings)).await
}

async fn run(settings: InkySettings) -> Result<()> {
    let hub = InputHub::with_settings(settings, SystemClock);
    let dispatcher = Dispatcher::new(&hub);

    let logger = Control::builder()
        .label("logger")
        .on_press(|e| info!("Press {} ({:?})", e.component, e.device))
        .on_release(|e| {
            info!(
                "Release {} after {} ms",
                e.component,
                e.duration.map_or(0, |d| d.num_milliseconds())
            )
        })
        .on_move(|e| {
            if let (Some(v), Some(dv)) = (e.value(), e.delta()) {
                info!("Move {} v={:.3} dv={:.3}", e.component, v, dv);
            }
        })
        .build();
    dispatcher.bind(&logger, Components::All);

    // Start remaps the south button to whatever is pressed next
    let jump = Control::builder()
        .label("jump")
        .on_press(|_| info!("Jump"))
        .build();
    dispatcher.bind(&jump, gamepad::BUTTON_0);
    let remap = Control::builder()
        .label("remap")
        .on_release(move |e| {
            if let Some(dispatcher) = e.dispatcher() {
                if dispatcher.rebind(&jump) {
                    info!("Press any component to bind jump");
                }
            }
        })
        .build();
    dispatcher.bind(&remap, [gamepad::START, keyboard::ENTER]);

    attach_gamepads(&dispatcher);
    let poll_loop = dispatcher.spawn_poll_loop();

    info!("Listening for input, press Ctrl+C to quit");
    tokio::signal::ctrl_c().await?;

    info!("Shutting down");
    hub.shutdown();
    poll_loop.await?;
    Ok(())
}

#[cfg(feature = "gilrs")]
fn attach_gamepads(dispatcher: &Dispatcher) {
    match inky::device::GilrsSource::new() {
        Ok(source) => dispatcher.set_gamepad_source(source),
        Err(e) => tracing::warn!("Continuing without gamepads: {}", e),
    }
}

#[cfg(not(feature = "gilrs"))]
fn attach_gamepads(_dispatcher: &Dispatcher) {
    info!("Built without gamepad support");
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
