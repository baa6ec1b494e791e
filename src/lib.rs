//! Input normalization and event dispatch.
//!
//! Raw samples from keyboards, pointers, gamepads, motion sensors and
//! user-defined devices are turned into one stream of press, hold, release
//! and move events. Controls are bound to named components on a
//! [`Dispatcher`]; everything a set of dispatchers shares lives in an
//! [`InputHub`].
//!
//! ```text
//!  Device / TouchArea ──► InputHub ──► Dispatcher* ──► Binding ──► Control
//!                                        ▲
//!  keys, pointer, gamepads, motion ──────┘
//! ```

pub mod clock;
pub mod component;
pub mod config;
pub mod device;
pub mod dispatcher;
pub mod filter;
pub mod hub;
pub mod math;
pub mod motion;
pub mod normalize;

pub use clock::{Clock, ManualClock, SystemClock};
pub use component::Component;
pub use config::{ConfigError, InkySettings};
pub use device::{Device, DeviceSchema, SchemaError, TouchArea};
pub use dispatcher::{
    BindOptions, Components, Control, Dispatcher, EventKind, InputEvent, Motion, MouseButton,
    MoveTransform,
};
pub use hub::InputHub;
pub use motion::{AxisCalibration, MotionSample, OrientationSample};
