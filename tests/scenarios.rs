use inky::component::codes::{keyboard, motion};
use inky::config::DeviceSettings;
use inky::motion::MotionFilters;
use inky::{
    AxisCalibration, Clock, Components, Control, Device, DeviceSchema, Dispatcher, InkySettings,
    InputHub, ManualClock, MotionSample, OrientationSample,
};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<String>>>;

fn recorder(tag: &'static str, log: &Log) -> Rc<Control> {
    let (p, h, r) = (log.clone(), log.clone(), log.clone());
    Control::builder()
        .label(tag)
        .on_press(move |e| p.borrow_mut().push(format!("{} press {}", tag, e.component)))
        .on_hold(move |e| {
            h.borrow_mut().push(format!(
                "{} hold {}",
                tag,
                e.duration.map_or(-1, |d| d.num_milliseconds())
            ))
        })
        .on_release(move |e| {
            r.borrow_mut().push(format!(
                "{} release {}",
                tag,
                e.duration.map_or(-1, |d| d.num_milliseconds())
            ))
        })
        .build()
}

fn manual_hub() -> (Rc<ManualClock>, InputHub) {
    let clock = Rc::new(ManualClock::default());
    let hub = InputHub::with_clock(clock.clone());
    (clock, hub)
}

#[test]
fn hub_broadcasts_to_dispatchers_in_creation_order() {
    let (_clock, hub) = manual_hub();
    let first = Dispatcher::new(&hub);
    let second = Dispatcher::new(&hub);
    let log = Log::default();
    first.bind(&recorder("first", &log), keyboard::ESC);
    second.bind(&recorder("second", &log), keyboard::ESC);

    hub.press(keyboard::ESC, None);
    assert_eq!(
        *log.borrow(),
        vec!["first press Esc", "second press Esc"]
    );

    drop(second);
    assert_eq!(hub.dispatchers().len(), 1);
}

#[test]
fn hold_durations_follow_the_poll_ticks() {
    let (clock, hub) = manual_hub();
    let dispatcher = Dispatcher::new(&hub);
    let log = Log::default();
    dispatcher.bind(&recorder("c", &log), keyboard::SPACE);

    dispatcher.key_down(keyboard::SPACE);
    for _ in 0..3 {
        clock.advance_ms(50);
        dispatcher.poll();
    }
    dispatcher.key_up(keyboard::SPACE);

    assert_eq!(
        *log.borrow(),
        vec![
            "c press Space",
            "c hold 50",
            "c hold 100",
            "c hold 150",
            "c release 150"
        ]
    );
}

#[test]
fn device_values_reach_every_dispatcher() {
    let (_clock, hub) = manual_hub();
    let schema = DeviceSchema::builder()
        .name("Dial")
        .component("angle", "Angle")
        .validate()
        .unwrap();
    let device = Device::with_settings(
        &hub,
        schema,
        DeviceSettings {
            dead_zone: 0.1,
            ..DeviceSettings::default()
        },
    );

    let log = Log::default();
    let a = Dispatcher::new(&hub);
    let b = Dispatcher::new(&hub);
    a.bind(&recorder("a", &log), "Dial Angle");
    b.bind(&recorder("b", &log), "Dial Angle");

    device.set_value("angle", 0.05);
    assert!(log.borrow().is_empty());

    device.set_value("angle", 0.6);
    device.set_value("angle", 0.0);
    assert_eq!(
        *log.borrow(),
        vec![
            "a press Dial Angle",
            "b press Dial Angle",
            "a release 0",
            "b release 0"
        ]
    );
}

#[test]
fn orientation_calibration_zeroes_the_pose() {
    let (_clock, hub) = manual_hub();
    let dispatcher = Dispatcher::new(&hub);
    let log = Log::default();
    dispatcher.bind(
        &recorder("tilt", &log),
        [motion::ORIENTATION_X, motion::ORIENTATION_Y],
    );

    let pose = OrientationSample {
        alpha: 0.0,
        beta: 35.0,
        gamma: -20.0,
    };
    dispatcher.handle_orientation(pose);
    assert!(hub.value(motion::ORIENTATION_X).unwrap() > 0.0);

    dispatcher.calibrate_orientation(
        AxisCalibration::Current,
        AxisCalibration::Current,
        AxisCalibration::Current,
    );
    log.borrow_mut().clear();
    dispatcher.handle_orientation(pose);

    assert!(log.borrow().iter().all(|l| !l.contains("press")));
    assert_eq!(hub.value(motion::ORIENTATION_X), Some(0.0));
    assert_eq!(hub.value(motion::ORIENTATION_Y), Some(0.0));
}

#[test]
fn unfiltered_motion_integrates_velocity() {
    let (_clock, hub) = manual_hub();
    let dispatcher = Dispatcher::new(&hub);
    dispatcher.set_motion_filters(MotionFilters::default());
    let log = Log::default();
    dispatcher.bind(&recorder("accel", &log), motion::ACCELERATION[0]);

    dispatcher.handle_motion(MotionSample {
        interval_ms: 100.0,
        acceleration: Some([1.0, 0.0, 0.0]),
        ..MotionSample::default()
    });

    assert_eq!(log.borrow().first().map(String::as_str), Some("accel press Acceleration X"));
    assert!((dispatcher.velocity()[0] - 0.1).abs() < 1e-9);
    assert_eq!(hub.value(motion::ACCELERATION[0]), Some(1.0));
}

#[test]
fn rebind_while_pending_keeps_the_original_binding() {
    let (_clock, hub) = manual_hub();
    let dispatcher = Dispatcher::new(&hub);
    let fire = Control::builder().label("fire").build();
    let aim = Control::builder().label("aim").build();
    dispatcher.bind(&fire, keyboard::CTRL);
    dispatcher.bind(&aim, keyboard::SHIFT);

    assert!(dispatcher.rebind(&fire));
    assert!(!dispatcher.rebind(&aim));
    assert!(dispatcher.is_bound(&aim, keyboard::SHIFT));

    dispatcher.press(keyboard::ALT, None);
    assert!(dispatcher.is_bound(&fire, keyboard::ALT));
    assert!(!dispatcher.is_bound(&fire, keyboard::CTRL));
}

#[test]
fn settings_file_drives_new_dispatchers() {
    let settings = InkySettings::from_toml_str(
        r#"
        [dispatcher]
        poll_rate_ms = 20

        [dispatcher.analog]
        dead_zone = 0.25
        "#,
    )
    .unwrap();
    let clock = ManualClock::default();
    let start = clock.now();
    let hub = InputHub::with_settings(settings, clock);
    let dispatcher = Dispatcher::new(&hub);

    assert_eq!(dispatcher.settings().poll_rate_ms, 20);
    assert_eq!(dispatcher.settings().analog.dead_zone, 0.25);
    assert_eq!(hub.now(), start);
}

#[test]
fn disposed_dispatcher_stops_listening() {
    let (_clock, hub) = manual_hub();
    let dispatcher = Dispatcher::new(&hub);
    let log = Log::default();
    dispatcher.bind(&recorder("x", &log), Components::All);

    hub.shutdown();
    assert!(dispatcher.is_disposed());
    hub.press(keyboard::SPACE, None);
    dispatcher.key_down(keyboard::SPACE);
    assert!(log.borrow().is_empty());
}
