use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use blitwin::backends::headless::{HeadlessBackend, HeadlessController, HeadlessWindow};
use blitwin::core::{PlatformEvent, WindowKey};
use blitwin::{
    Action, ClientApi, KeyCode, Runtime, WindowConfig, WindowHints, WindowSession,
};

struct Harness {
    runtime: Runtime<HeadlessBackend>,
    ctl: HeadlessController,
    session: WindowSession<HeadlessWindow>,
    key: WindowKey,
}

impl Harness {
    fn new() -> Self {
        Self::with_hints(WindowHints {
            client_api: ClientApi::NoApi,
            ..WindowHints::default()
        })
    }

    fn with_hints(hints: WindowHints) -> Self {
        let backend = HeadlessBackend::new();
        let ctl = backend.controller();
        let mut runtime = Runtime::new(backend);
        let session = runtime
            .create_session(&WindowConfig::new(320, 240, "input").with_hints(hints))
            .unwrap();
        let key = session.key().unwrap();
        Self {
            runtime,
            ctl,
            session,
            key,
        }
    }

    fn send(&self, event: PlatformEvent) {
        self.ctl.push_event(self.key, event);
    }

    fn key_event(&self, code: KeyCode, pressed: bool, repeat: bool) {
        self.send(PlatformEvent::Key {
            code,
            pressed,
            repeat,
        });
    }

    fn poll(&mut self) -> usize {
        self.session.poll_events(&mut self.runtime)
    }
}

fn recorder<T: 'static>() -> (Rc<RefCell<Vec<T>>>, Rc<RefCell<Vec<T>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    (log.clone(), log)
}

// ============================================================================
// Keys
// ============================================================================

#[test]
fn test_key_stays_down_until_release() {
    let mut h = Harness::new();
    h.key_event(KeyCode::KeyW, true, false);
    h.poll();

    for _ in 0..3 {
        h.poll();
        assert!(h.session.key_down(KeyCode::KeyW));
    }

    h.key_event(KeyCode::KeyW, true, true);
    h.poll();
    assert!(h.session.key_down(KeyCode::KeyW));

    h.key_event(KeyCode::KeyW, false, false);
    h.poll();
    assert!(!h.session.key_down(KeyCode::KeyW));
}

#[test]
fn test_untouched_key_reads_released() {
    let h = Harness::new();
    assert!(!h.session.key_down(KeyCode::Space));
}

#[test]
fn test_key_callback_reports_press_repeat_release() {
    let mut h = Harness::new();
    let (sink, seen) = recorder();
    h.session.set_key_callback(Some(Box::new(move |code: KeyCode, action: Action| {
        sink.borrow_mut().push((code, action));
    })));

    h.key_event(KeyCode::KeyA, true, false);
    h.key_event(KeyCode::KeyA, true, true);
    h.key_event(KeyCode::KeyA, false, false);
    assert_eq!(h.poll(), 3);

    assert_eq!(
        *seen.borrow(),
        vec![
            (KeyCode::KeyA, Action::Press),
            (KeyCode::KeyA, Action::Repeat),
            (KeyCode::KeyA, Action::Release),
        ]
    );
}

#[test]
fn test_press_only_key_callback_when_release_reporting_off() {
    let mut h = Harness::with_hints(WindowHints {
        client_api: ClientApi::NoApi,
        report_key_release: false,
        ..WindowHints::default()
    });
    let (sink, seen) = recorder();
    h.session.set_key_callback(Some(Box::new(move |code: KeyCode, action: Action| {
        sink.borrow_mut().push((code, action));
    })));

    h.key_event(KeyCode::Enter, true, false);
    h.key_event(KeyCode::Enter, false, false);
    h.poll();

    assert_eq!(*seen.borrow(), vec![(KeyCode::Enter, Action::Press)]);
    // State still tracks the release
    assert!(!h.session.key_down(KeyCode::Enter));
}

#[test]
fn test_replaced_key_callback_is_not_called() {
    let mut h = Harness::new();
    let (first_sink, first) = recorder();
    let (second_sink, second) = recorder();

    h.session.set_key_callback(Some(Box::new(move |code: KeyCode, _: Action| {
        first_sink.borrow_mut().push(code);
    })));
    let previous = h.session.set_key_callback(Some(Box::new(move |code: KeyCode, _: Action| {
        second_sink.borrow_mut().push(code);
    })));
    assert!(previous.is_some());

    h.key_event(KeyCode::KeyQ, true, false);
    h.poll();

    assert!(first.borrow().is_empty());
    assert_eq!(*second.borrow(), vec![KeyCode::KeyQ]);
}

#[test]
fn test_snapshots_give_press_edges() {
    let mut h = Harness::new();
    let before = h.session.snapshot();

    h.key_event(KeyCode::Space, true, false);
    h.poll();
    let after = h.session.snapshot();

    assert!(after.pressed_since(&before, KeyCode::Space));
    h.poll();
    assert!(!h.session.snapshot().pressed_since(&after, KeyCode::Space));
}

// ============================================================================
// Characters, cursor, scroll
// ============================================================================

#[test]
fn test_char_callback_is_transient() {
    let mut h = Harness::new();
    h.send(PlatformEvent::Char('x'));
    h.poll();

    // Registered too late: the earlier character is gone
    let (sink, seen) = recorder();
    h.session.set_char_callback(Some(Box::new(move |c: char| {
        sink.borrow_mut().push(c);
    })));
    h.send(PlatformEvent::Char('é'));
    h.send(PlatformEvent::Char('\u{8}'));
    h.poll();

    assert_eq!(*seen.borrow(), vec!['é', '\u{8}']);
    assert!(!h.session.key_down(KeyCode::KeyX));
}

#[test]
fn test_cursor_callback_sees_updated_state() {
    let mut h = Harness::new();
    let (sink, seen) = recorder();
    h.session.set_cursor_pos_callback(Some(Box::new(move |x: f64, y: f64| {
        sink.borrow_mut().push((x, y));
    })));

    h.send(PlatformEvent::CursorMoved { x: 1.5, y: 2.5 });
    h.send(PlatformEvent::CursorMoved { x: 3.0, y: 4.0 });
    h.poll();

    assert_eq!(*seen.borrow(), vec![(1.5, 2.5), (3.0, 4.0)]);
    assert_eq!(h.session.cursor_position(), (3.0, 4.0));
}

#[test]
fn test_scroll_callback() {
    let mut h = Harness::new();
    let (sink, seen) = recorder();
    h.session.set_scroll_callback(Some(Box::new(move |dx: f64, dy: f64| {
        sink.borrow_mut().push((dx, dy));
    })));

    h.send(PlatformEvent::Scroll { dx: 0.0, dy: -1.0 });
    h.poll();
    assert_eq!(*seen.borrow(), vec![(0.0, -1.0)]);
}

// ============================================================================
// File drops
// ============================================================================

#[test]
fn test_drop_gesture_arrives_as_one_ordered_list() {
    let mut h = Harness::new();
    let (sink, seen) = recorder();
    h.session.set_drop_callback(Some(Box::new(move |paths: &[PathBuf]| {
        // Borrowed for the call only; keep a copy
        sink.borrow_mut().push(paths.to_vec());
    })));

    h.send(PlatformEvent::FilesDropped(vec![PathBuf::from("a.png")]));
    h.send(PlatformEvent::FilesDropped(vec![PathBuf::from("b.png")]));
    h.send(PlatformEvent::FilesDropped(vec![PathBuf::from("c.txt")]));
    h.poll();

    assert_eq!(
        *seen.borrow(),
        vec![vec![
            PathBuf::from("a.png"),
            PathBuf::from("b.png"),
            PathBuf::from("c.txt"),
        ]]
    );
}

#[test]
fn test_events_without_callbacks_only_touch_state() {
    let mut h = Harness::new();
    h.send(PlatformEvent::FilesDropped(vec![PathBuf::from("a")]));
    h.send(PlatformEvent::Scroll { dx: 1.0, dy: 1.0 });
    h.send(PlatformEvent::Char('a'));
    h.key_event(KeyCode::KeyZ, true, false);
    assert_eq!(h.poll(), 4);
    assert!(h.session.key_down(KeyCode::KeyZ));
}
