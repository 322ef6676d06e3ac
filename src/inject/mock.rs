//! Recording test double for [`InputBackend`].

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{InjectError, InputBackend, InputDriver, SpecialKey};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    MovePointer { x: i32, y: i32 },
    Click,
    Key(SpecialKey),
    Type(String),
    Focus { x: i32, y: i32 },
    ReleaseAll,
}

/// Shared, ordered log of actions.
pub type ActionLog = Arc<Mutex<Vec<InputAction>>>;

/// Records every call; the first `fail_typing` calls to `type_chars` and
/// `press_key` fail without being recorded.
pub struct RecordingBackend {
    log: ActionLog,
    fail_typing: Arc<Mutex<usize>>,
    fail_focus: bool,
    type_delay: Duration,
    panic_on_type: bool,
}

impl RecordingBackend {
    pub fn new(log: ActionLog) -> Self {
        Self {
            log,
            fail_typing: Arc::new(Mutex::new(0)),
            fail_focus: false,
            type_delay: Duration::ZERO,
            panic_on_type: false,
        }
    }

    pub fn failing_first(log: ActionLog, failures: usize) -> Self {
        Self {
            log,
            fail_typing: Arc::new(Mutex::new(failures)),
            fail_focus: false,
            type_delay: Duration::ZERO,
            panic_on_type: false,
        }
    }

    fn push(&self, action: InputAction) {
        self.log.lock().unwrap().push(action);
    }

    fn maybe_fail(&self) -> Result<(), InjectError> {
        let mut remaining = self.fail_typing.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(InjectError::KeySimulation("injected failure".into()));
        }
        Ok(())
    }
}

impl InputBackend for RecordingBackend {
    fn move_pointer(&mut self, x: i32, y: i32, _duration: Duration) -> Result<(), InjectError> {
        self.push(InputAction::MovePointer { x, y });
        Ok(())
    }

    fn click(&mut self) -> Result<(), InjectError> {
        self.push(InputAction::Click);
        Ok(())
    }

    fn press_key(&mut self, key: SpecialKey) -> Result<(), InjectError> {
        self.maybe_fail()?;
        self.push(InputAction::Key(key));
        Ok(())
    }

    fn type_chars(&mut self, chunk: &str, _interval: Duration) -> Result<(), InjectError> {
        if self.panic_on_type {
            panic!("backend crashed while typing {chunk:?}");
        }
        // Ignores cancellation on purpose, like a stuck OS call.
        std::thread::sleep(self.type_delay);
        self.maybe_fail()?;
        self.push(InputAction::Type(chunk.to_string()));
        Ok(())
    }

    fn pointer_position(&mut self) -> Result<(i32, i32), InjectError> {
        Ok((0, 0))
    }

    fn screen_size(&mut self) -> Result<(i32, i32), InjectError> {
        Ok((1920, 1080))
    }

    fn focus_window_at(&mut self, x: i32, y: i32) -> Result<bool, InjectError> {
        if self.fail_focus {
            return Err(InjectError::Query("no window".into()));
        }
        self.push(InputAction::Focus { x, y });
        Ok(true)
    }

    fn release_all(&mut self) -> Result<(), InjectError> {
        self.push(InputAction::ReleaseAll);
        Ok(())
    }
}

/// [`InputDriver`] handing out [`RecordingBackend`]s that share one log.
#[derive(Clone, Default)]
pub struct RecordingDriver {
    pub log: ActionLog,
    pub fail_focus: bool,
    pub refuse_connect: bool,
    /// Blocking delay inside every `type_chars` call.
    pub type_delay: Duration,
    pub panic_on_type: bool,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> Vec<InputAction> {
        self.log.lock().unwrap().clone()
    }

    /// Concatenation of every typed chunk.
    pub fn typed_text(&self) -> String {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                InputAction::Type(s) => Some(s),
                _ => None,
            })
            .collect()
    }
}

impl InputDriver for RecordingDriver {
    fn connect(&self) -> Result<Box<dyn InputBackend>, InjectError> {
        if self.refuse_connect {
            return Err(InjectError::Backend("no display".into()));
        }
        let mut backend = RecordingBackend::new(Arc::clone(&self.log));
        backend.fail_focus = self.fail_focus;
        backend.type_delay = self.type_delay;
        backend.panic_on_type = self.panic_on_type;
        Ok(Box::new(backend))
    }
}
