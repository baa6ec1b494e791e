//! Diff-polled gamepad tracking.
//!
//! A [`GamepadSource`] reports the current state of every pad slot on each
//! poll. The tracker compares it with what it saw last time and raises
//! events for whatever changed, under both the generic component name
//! (`Left Stick X`) and the per-pad one (`Gamepad 0 Left Stick X`).

use crate::component::codes::gamepad;
use crate::component::{AsyncValues, Component};
use crate::config::AnalogSettings;
use crate::dispatcher::event::Signal;
use crate::normalize::{clamp_radial, normalize_radial, AxisSettings, AxisState, Scaling};
use tracing::info;

/// State of one connected pad at poll time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GamepadSnapshot {
    pub id: String,
    /// Source timestamp. A pad whose timestamp did not move is skipped.
    pub timestamp: Option<u64>,
    pub axes: Vec<f64>,
    /// Button values, `0..=1`.
    pub buttons: Vec<f64>,
}

pub trait GamepadSource {
    /// Current pad slots; `None` marks an empty slot.
    fn snapshots(&mut self) -> Vec<Option<GamepadSnapshot>>;
}

impl<F: FnMut() -> Vec<Option<GamepadSnapshot>>> GamepadSource for F {
    fn snapshots(&mut self) -> Vec<Option<GamepadSnapshot>> {
        self()
    }
}

#[derive(Debug, Clone)]
struct PadState {
    id: String,
    timestamp: Option<u64>,
    axes: Vec<AxisState>,
    buttons: Vec<AxisState>,
    radial: [AxisState; 4],
}

impl PadState {
    fn from_snapshot(snapshot: &GamepadSnapshot) -> Self {
        let seed = |values: &[f64], limit: usize| -> Vec<AxisState> {
            let mut states = vec![AxisState::default(); limit];
            for (state, value) in states.iter_mut().zip(values.iter().take(limit)) {
                state.seed(*value);
            }
            states
        };

        Self {
            id: snapshot.id.clone(),
            timestamp: snapshot.timestamp,
            axes: seed(&snapshot.axes, gamepad::MAX_AXES),
            buttons: seed(&snapshot.buttons, gamepad::MAX_BUTTONS),
            radial: [AxisState::default(); 4],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GamepadTracker {
    pads: [Option<PadState>; gamepad::MAX_PADS],
}

impl GamepadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connected(&self) -> usize {
        self.pads.iter().filter(|pad| pad.is_some()).count()
    }

    pub fn pad_id(&self, index: usize) -> Option<&str> {
        self.pads.get(index)?.as_ref().map(|pad| pad.id.as_str())
    }

    /// Compares `snapshots` with the previous poll.
    ///
    /// A connect, disconnect or id change only refreshes the stored state;
    /// events resume on the next poll.
    pub(crate) fn tick(
        &mut self,
        snapshots: &[Option<GamepadSnapshot>],
        settings: &AnalogSettings,
        values: &mut AsyncValues,
    ) -> Vec<Signal> {
        let mut signals = Vec::new();

        if self.needs_refresh(snapshots) {
            for (index, slot) in self.pads.iter_mut().enumerate() {
                *slot = snapshots
                    .get(index)
                    .and_then(|s| s.as_ref())
                    .map(PadState::from_snapshot);
            }
            info!("Gamepads changed, {} connected", self.connected());
            return signals;
        }

        let axis_settings = AxisSettings::new(settings.dead_zone, settings.threshold);
        let plain = Scaling::select(settings.normalized, true);
        let radial = Scaling::select(settings.normalized, false);

        for (index, snapshot) in snapshots.iter().take(gamepad::MAX_PADS).enumerate() {
            let (Some(snapshot), Some(pad)) = (snapshot, self.pads[index].as_mut()) else {
                continue;
            };
            if snapshot.timestamp.is_some() && snapshot.timestamp == pad.timestamp {
                continue;
            }
            pad.timestamp = snapshot.timestamp;

            let mut raise = |state: &mut AxisState, code: &str, raw: f64, scaling: Scaling| {
                if let Some(t) = state.update(raw, &axis_settings, scaling) {
                    let generic = Component::from(code);
                    let per_pad = Component::for_pad(index, code);
                    values.set(&generic, t.value);
                    values.set(&per_pad, t.value);
                    Signal::push_transition(&mut signals, &generic, &t);
                    Signal::push_transition(&mut signals, &per_pad, &t);
                }
            };

            for (i, raw) in snapshot.axes.iter().take(gamepad::MAX_AXES).enumerate() {
                raise(&mut pad.axes[i], gamepad::AXES[i], *raw, plain);
            }
            for (i, raw) in snapshot.buttons.iter().take(gamepad::MAX_BUTTONS).enumerate() {
                raise(&mut pad.buttons[i], gamepad::BUTTONS[i], *raw, plain);
            }

            let axis = |i: usize| snapshot.axes.get(i).copied().unwrap_or(0.0);
            let (lx, ly) = stick(axis(0), axis(1), settings);
            let (rx, ry) = stick(axis(2), axis(3), settings);
            for (i, raw) in [lx, ly, rx, ry].into_iter().enumerate() {
                raise(&mut pad.radial[i], gamepad::RADIALS[i], raw, radial);
            }
        }

        signals
    }

    fn needs_refresh(&self, snapshots: &[Option<GamepadSnapshot>]) -> bool {
        (0..gamepad::MAX_PADS).any(|index| {
            let new = snapshots.get(index).and_then(|s| s.as_ref());
            match (new, &self.pads[index]) {
                (Some(new), Some(old)) => new.id != old.id,
                (None, None) => false,
                _ => true,
            }
        })
    }
}

fn stick(x: f64, y: f64, settings: &AnalogSettings) -> (f64, f64) {
    if settings.normalized {
        normalize_radial(x, y, settings.dead_zone)
    } else {
        clamp_radial(x, y)
    }
}
