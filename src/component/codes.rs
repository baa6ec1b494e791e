//! Built-in component and device names.

pub mod gamepad {
    pub const DEVICE: &str = "Gamepad";
    pub const MAX_PADS: usize = 4;
    pub const MAX_AXES: usize = 4;
    pub const MAX_BUTTONS: usize = 32;

    pub const LEFT_STICK_X: &str = "Left Stick X";
    pub const LEFT_STICK_Y: &str = "Left Stick Y";
    pub const RIGHT_STICK_X: &str = "Right Stick X";
    pub const RIGHT_STICK_Y: &str = "Right Stick Y";

    pub const BUTTON_0: &str = "Button 0";
    pub const BUTTON_1: &str = "Button 1";
    pub const BUTTON_2: &str = "Button 2";
    pub const BUTTON_3: &str = "Button 3";
    pub const LEFT_SHOULDER: &str = "Left Shoulder";
    pub const RIGHT_SHOULDER: &str = "Right Shoulder";
    pub const LEFT_TRIGGER: &str = "Left Trigger";
    pub const RIGHT_TRIGGER: &str = "Right Trigger";
    pub const SELECT: &str = "Select";
    pub const START: &str = "Start";
    pub const LEFT_STICK_BUTTON: &str = "Left Stick Button";
    pub const RIGHT_STICK_BUTTON: &str = "Right Stick Button";
    pub const DPAD_UP: &str = "DPad Up";
    pub const DPAD_DOWN: &str = "DPad Down";
    pub const DPAD_LEFT: &str = "DPad Left";
    pub const DPAD_RIGHT: &str = "DPad Right";

    pub const LEFT_STICK_RADIAL_X: &str = "Left Stick Radial X";
    pub const LEFT_STICK_RADIAL_Y: &str = "Left Stick Radial Y";
    pub const RIGHT_STICK_RADIAL_X: &str = "Right Stick Radial X";
    pub const RIGHT_STICK_RADIAL_Y: &str = "Right Stick Radial Y";

    /// Axis slots in standard-mapping order.
    pub const AXES: [&str; MAX_AXES] = [LEFT_STICK_X, LEFT_STICK_Y, RIGHT_STICK_X, RIGHT_STICK_Y];

    /// Button slots in standard-mapping order.
    pub const BUTTONS: [&str; MAX_BUTTONS] = [
        BUTTON_0,
        BUTTON_1,
        BUTTON_2,
        BUTTON_3,
        LEFT_SHOULDER,
        RIGHT_SHOULDER,
        LEFT_TRIGGER,
        RIGHT_TRIGGER,
        SELECT,
        START,
        LEFT_STICK_BUTTON,
        RIGHT_STICK_BUTTON,
        DPAD_UP,
        DPAD_DOWN,
        DPAD_LEFT,
        DPAD_RIGHT,
        "Button 16",
        "Button 17",
        "Button 18",
        "Button 19",
        "Button 20",
        "Button 21",
        "Button 22",
        "Button 23",
        "Button 24",
        "Button 25",
        "Button 26",
        "Button 27",
        "Button 28",
        "Button 29",
        "Button 30",
        "Button 31",
    ];

    /// Radial components derived from the stick axes.
    pub const RADIALS: [&str; 4] = [
        LEFT_STICK_RADIAL_X,
        LEFT_STICK_RADIAL_Y,
        RIGHT_STICK_RADIAL_X,
        RIGHT_STICK_RADIAL_Y,
    ];

    pub fn pad_device(index: usize) -> String {
        format!("{} {}", DEVICE, index)
    }

    pub fn all() -> impl Iterator<Item = &'static str> {
        AXES.into_iter().chain(BUTTONS).chain(RADIALS)
    }
}

pub mod motion {
    pub const DEVICE: &str = "Motion";

    pub const ORIENTATION_X: &str = "Orientation X";
    pub const ORIENTATION_Y: &str = "Orientation Y";
    pub const ORIENTATION_Z: &str = "Orientation Z";

    pub const ACCELERATION: [&str; 4] = [
        "Acceleration X",
        "Acceleration Y",
        "Acceleration Z",
        "Acceleration Magnitude",
    ];
    pub const ACCELERATION_WITH_GRAVITY: [&str; 4] = [
        "Acceleration with Gravity X",
        "Acceleration with Gravity Y",
        "Acceleration with Gravity Z",
        "Acceleration with Gravity Magnitude",
    ];
    pub const ROTATION: [&str; 4] = [
        "Rotational Speed X",
        "Rotational Speed Y",
        "Rotational Speed Z",
        "Rotational Speed Magnitude",
    ];
    pub const VELOCITY: [&str; 4] = [
        "Velocity X",
        "Velocity Y",
        "Velocity Z",
        "Velocity Magnitude",
    ];
    pub const POSITION: [&str; 4] = [
        "Position X",
        "Position Y",
        "Position Z",
        "Position Magnitude",
    ];

    pub fn all() -> impl Iterator<Item = &'static str> {
        [ORIENTATION_X, ORIENTATION_Y, ORIENTATION_Z]
            .into_iter()
            .chain(ACCELERATION)
            .chain(ACCELERATION_WITH_GRAVITY)
            .chain(ROTATION)
            .chain(VELOCITY)
            .chain(POSITION)
    }
}

pub mod mouse {
    pub const DEVICE: &str = "Mouse";

    pub const MOVE: &str = "Mouse Move";
    pub const LEFT_BUTTON: &str = "Left Mouse Button";
    pub const RIGHT_BUTTON: &str = "Right Mouse Button";
    pub const MIDDLE_BUTTON: &str = "Middle Mouse Button";
    pub const SCROLL_UP: &str = "Mouse Scroll Up";
    pub const SCROLL_DOWN: &str = "Mouse Scroll Down";

    pub fn all() -> impl Iterator<Item = &'static str> {
        [
            MOVE,
            LEFT_BUTTON,
            RIGHT_BUTTON,
            MIDDLE_BUTTON,
            SCROLL_UP,
            SCROLL_DOWN,
        ]
        .into_iter()
    }
}

pub mod keyboard {
    pub const DEVICE: &str = "Keyboard";

    pub const BACKSPACE: &str = "Backspace";
    pub const TAB: &str = "Tab";
    pub const ENTER: &str = "Enter";
    pub const SHIFT: &str = "Shift";
    pub const CTRL: &str = "Ctrl";
    pub const ALT: &str = "Alt";
    pub const ESC: &str = "Esc";
    pub const SPACE: &str = "Space";
    pub const LEFT: &str = "Left Arrow";
    pub const UP: &str = "Up Arrow";
    pub const RIGHT: &str = "Right Arrow";
    pub const DOWN: &str = "Down Arrow";

    pub const KEYS: &[&str] = &[
        BACKSPACE, TAB, ENTER, SHIFT, CTRL, ALT, "Pause/Break", "Caps Lock", ESC, SPACE,
        "Page Up", "Page Down", "End", "Home", LEFT, UP, RIGHT, DOWN, "Insert", "Delete",
        "0", "1", "2", "3", "4", "5", "6", "7", "8", "9",
        "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M",
        "N", "O", "P", "Q", "R", "S", "T", "U", "V", "W", "X", "Y", "Z",
        "Numpad 0", "Numpad 1", "Numpad 2", "Numpad 3", "Numpad 4",
        "Numpad 5", "Numpad 6", "Numpad 7", "Numpad 8", "Numpad 9",
        "Numpad *", "Numpad +", "Numpad -", "Numpad .", "Numpad /",
        "F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10", "F11", "F12",
        ";", "=", "-", ",", ".", "/", "`", "[", "\\", "]", "'",
    ];

    pub fn all() -> impl Iterator<Item = &'static str> {
        KEYS.iter().copied()
    }
}
