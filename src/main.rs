use anyhow::Result;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tokio::signal::ctrl_c;
use tracing::{error, info, warn};
use iqx_garagedoor::config::Settings;
use iqx_garagedoor::init;
use iqx_garagedoor::models::{ChangeSource, DoorEvent, TargetDoorState};
use iqx_garagedoor::state_management::GarageDoorStateManager;
use iqx_garagedoor::utils::logging;

/// The main entry point of the IQX garage door simulator
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}

/// Runs a single simulated door with a minimal stand-in host
///
/// 1. Loads settings and initializes logging
/// 2. Restores the door from its state store and spawns the command processor
/// 3. Reads `open`, `close`, `state` or raw target values from stdin and forwards them as target state requests
/// 4. Logs every door event, re-issuing reverted targets as requests the way a host characteristic would
/// 5. Shuts down on ctrl-c or end of input
async fn run() -> Result<()> {
    let settings = Settings::new()?;
    let _guard = logging::init_logger(settings.logging.path.clone(), &settings.logging.level)?;

    let init::AppContext { state_manager, command_processor, mut event_receiver, .. } =
        init::initialize(settings)?;

    let processor_handle = tokio::spawn(async move {
        if let Err(e) = command_processor.run().await {
            error!("Command processor error: {:?}", e);
        }
    });

    let mut lines = BufReader::new(stdin()).lines();
    info!("Ready. Commands: open | close | state | <raw target value>");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => handle_input(&state_manager, line.trim()).await?,
                    None => {
                        info!("End of input. Shutting down...");
                        break;
                    }
                }
            }
            Some(event) = event_receiver.recv() => {
                forward_event(&state_manager, event).await?;
            }
            _ = ctrl_c() => {
                info!("Received shutdown signal. Shutting down gracefully...");
                break;
            }
        }
    }

    state_manager.shutdown();
    processor_handle.await?;
    Ok(())
}

async fn handle_input(state_manager: &GarageDoorStateManager, input: &str) -> Result<()> {
    let value = match input {
        "" => return Ok(()),
        "open" => TargetDoorState::Open.as_u8(),
        "close" => TargetDoorState::Closed.as_u8(),
        "state" => {
            let snapshot = state_manager.snapshot().await?;
            info!("{}", serde_json::to_string(&snapshot)?);
            return Ok(());
        }
        other => match other.parse::<u8>() {
            Ok(value) => value,
            Err(_) => {
                warn!("Unknown command {:?}", other);
                return Ok(());
            }
        },
    };

    let outcome = state_manager.request_target_state(value).await?;
    info!("{}: request {} acknowledged: {:?}", state_manager.name(), value, outcome);
    Ok(())
}

async fn forward_event(state_manager: &GarageDoorStateManager, event: DoorEvent) -> Result<()> {
    match &event {
        DoorEvent::CurrentStateChanged(e) => {
            info!("{}: current state {} -> {}", e.door_name, e.old_state, e.new_state);
        }
        DoorEvent::TargetStateChanged(e) => {
            info!("{}: target state {} -> {} ({})", e.door_name, e.old_state, e.new_state, e.source);
            if e.source == ChangeSource::AutoRevert {
                state_manager.request_target_state(e.new_state.as_u8()).await?;
            }
        }
    }
    Ok(())
}
