//! Gamepad snapshots from `gilrs`.

use super::gamepad::{GamepadSnapshot, GamepadSource};
use crate::component::codes::gamepad;
use gilrs::{Axis, Button, Event, EventType, GamepadId, Gilrs};
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to initialize gamepad backend: {0}")]
    InitializationError(String),
}

/// Axis slots in standard-mapping order. Y is flipped so down is positive.
const AXES: [(Axis, f64); gamepad::MAX_AXES] = [
    (Axis::LeftStickX, 1.0),
    (Axis::LeftStickY, -1.0),
    (Axis::RightStickX, 1.0),
    (Axis::RightStickY, -1.0),
];

/// Button slots in standard-mapping order.
const BUTTONS: [Button; 17] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
    Button::Mode,
];

/// Keeps gamepads in stable slots in connection order.
pub struct GilrsSource {
    gilrs: Gilrs,
    slots: [Option<GamepadId>; gamepad::MAX_PADS],
}

impl GilrsSource {
    pub fn new() -> Result<Self, SourceError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(SourceError::InitializationError(e.to_string()));
            }
        };

        let mut source = Self {
            gilrs,
            slots: [None; gamepad::MAX_PADS],
        };
        let connected: Vec<GamepadId> = source.gilrs.gamepads().map(|(id, _)| id).collect();
        for id in connected {
            source.connect(id);
        }
        Ok(source)
    }

    fn connect(&mut self, id: GamepadId) {
        if self.slots.contains(&Some(id)) {
            return;
        }
        match self.slots.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(id);
                info!(
                    "Gamepad connected: {} ({})",
                    self.gilrs.gamepad(id).name(),
                    id
                );
            }
            None => debug!("No free gamepad slot for {}", id),
        }
    }

    fn disconnect(&mut self, id: GamepadId) {
        for slot in self.slots.iter_mut() {
            if *slot == Some(id) {
                *slot = None;
                info!("Gamepad disconnected: {}", id);
            }
        }
    }

    fn snapshot(&self, id: GamepadId) -> GamepadSnapshot {
        let pad = self.gilrs.gamepad(id);
        GamepadSnapshot {
            id: format!("{} ({})", pad.name(), id),
            timestamp: None,
            axes: AXES
                .iter()
                .map(|(axis, sign)| f64::from(pad.value(*axis)) * sign)
                .collect(),
            buttons: BUTTONS
                .iter()
                .map(|button| {
                    pad.button_data(*button)
                        .map_or(0.0, |data| f64::from(data.value()))
                })
                .collect(),
        }
    }
}

impl GamepadSource for GilrsSource {
    fn snapshots(&mut self) -> Vec<Option<GamepadSnapshot>> {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected => self.connect(id),
                EventType::Disconnected => self.disconnect(id),
                _ => {}
            }
        }

        self.slots
            .iter()
            .map(|slot| slot.map(|id| self.snapshot(id)))
            .collect()
    }
}
