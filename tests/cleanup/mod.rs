use std::cell::RefCell;
use std::io::{self, BufWriter, Write};
use std::rc::Rc;
use std::sync::{Mutex, RwLock};

use scope_rail::handlers::{self, Discard};
use scope_rail::{attach, handler_fn, into_cleanup, selector, Close, Config, ScopeState};

/// Records how it was closed.
struct Pipe {
    log: Rc<RefCell<Vec<String>>>,
    fail_close: bool,
}

impl Close<String> for Pipe {
    fn close(self) -> Result<(), String> {
        self.log.borrow_mut().push("close".to_string());
        if self.fail_close {
            Err("pipe close failed".to_string())
        } else {
            Ok(())
        }
    }

    fn close_with_error(self, cause: &String) -> Result<(), String> {
        self.log.borrow_mut().push(format!("close_with_error({cause})"));
        Ok(())
    }
}

fn pipe(log: &Rc<RefCell<Vec<String>>>, fail_close: bool) -> Pipe {
    Pipe { log: Rc::clone(log), fail_close }
}

#[test]
fn close_is_used_after_success() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let config = Config::<String>::new();

    let result = config.run(|e| {
        e.defer_close(pipe(&log, false));
        Ok(())
    });

    assert_eq!(result, Ok(()));
    assert_eq!(*log.borrow(), ["close"]);
}

#[test]
fn close_with_error_receives_the_pending_error() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let config = Config::<String>::new();

    let result = config.run(|e| {
        e.defer_close(pipe(&log, false));
        e.fail_now(Some("upstream reset".to_string()))
    });

    assert_eq!(result, Err("upstream reset".to_string()));
    assert_eq!(*log.borrow(), ["close_with_error(upstream reset)"]);
}

#[test]
fn close_errors_go_through_attached_handlers() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let config = Config::<String>::new();

    let result = config.run(|e| {
        e.defer_close_with(pipe(&log, true), attach![handlers::message("flushing")]);
        Ok(())
    });
    assert_eq!(result, Err("flushing: pipe close failed".to_string()));

    let result = config.run(|e| {
        e.defer_close_with(pipe(&log, true), attach![Discard]);
        Ok(())
    });
    assert_eq!(result, Ok(()));
}

#[test]
fn buf_writer_is_flushed_on_close() {
    let mut sink = Vec::new();
    let config = Config::<io::Error>::new();

    let result = config.run(|e| {
        let mut out = BufWriter::with_capacity(64, &mut sink);
        e.must(out.write_all(b"payload"))?;
        e.defer_close(out);
        Ok(())
    });

    assert!(result.is_ok());
    assert_eq!(sink, b"payload");
}

struct FullDisk;

impl Write for FullDisk {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "no space left"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn buf_writer_flush_failure_is_reported() {
    let config = Config::<io::Error>::new();

    let result = config.run(|e| {
        let mut out = BufWriter::new(FullDisk);
        e.must(out.write_all(b"buffered"))?;
        e.defer_close(out);
        Ok(())
    });

    assert_eq!(result.unwrap_err().to_string(), "no space left");
}

#[test]
fn unlock_releases_guards() {
    let counter = Mutex::new(0);
    let table = RwLock::new(vec![1, 2]);
    let config = Config::<String>::new();

    let result = config.run(|e| {
        let mut guard = counter.lock().unwrap();
        *guard += 1;
        e.defer_unlock(guard);
        let reader = table.read().unwrap();
        e.defer_unlock(reader);
        Ok(())
    });

    assert_eq!(result, Ok(()));
    assert!(counter.try_lock().is_ok());
    assert!(table.try_write().is_ok());
}

#[test]
fn defer_func_passes_target_and_state() {
    let removed = RefCell::new(Vec::new());
    let config = Config::<String>::new();

    let result = config.run(|e| {
        e.defer_func(
            "/tmp/a.lock",
            |state, path| {
                removed.borrow_mut().push((path, state.err().cloned()));
                Ok(())
            },
            [],
        );
        e.fail_now(Some("interrupted".to_string()))
    });

    assert_eq!(result, Err("interrupted".to_string()));
    assert_eq!(*removed.borrow(), [("/tmp/a.lock", Some("interrupted".to_string()))]);
}

#[test]
fn attached_handlers_apply_in_listed_order() {
    let config = Config::<String>::new();

    let result = config.run(|e| {
        e.defer_with(
            |_| Err("unlink".to_string()),
            attach![handlers::message("inner"), handlers::message("outer")],
        );
        Ok(())
    });

    assert_eq!(result, Err("outer: inner: unlink".to_string()));
}

#[test]
fn handlers_built_inside_the_block_can_be_attached() {
    let config = Config::<String>::new();

    let result = config.run(|e| {
        for job in 1..=2 {
            let label = format!("job {job}");
            e.defer_with(
                move |_| Err(format!("spool {job} busy")),
                attach![handler_fn(move |_, err: String| Some(format!("{label}: {err}")))],
            );
        }
        Ok(())
    });

    assert_eq!(result, Err("job 2: spool 2 busy".to_string()));
}

#[test]
fn defer_any_accepts_builtin_callables() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let config = Config::<String>::new();

    let result = config.run(|e| {
        let l = Rc::clone(&log);
        let plain: Box<dyn FnOnce()> = Box::new(move || l.borrow_mut().push("plain".to_string()));
        e.defer_any(plain, []);

        let l = Rc::clone(&log);
        let fallible: Box<dyn FnOnce() -> Result<(), String>> = Box::new(move || {
            l.borrow_mut().push("fallible".to_string());
            Err("fallible failed".to_string())
        });
        e.defer_any(fallible, attach![Discard]);

        let l = Rc::clone(&log);
        let observing: Box<dyn FnOnce(Option<&String>)> =
            Box::new(move |err: Option<&String>| l.borrow_mut().push(format!("observing({err:?})")));
        e.defer_any(observing, []);

        let l = Rc::clone(&log);
        let full = into_cleanup(move |state: &ScopeState<'_, String>| {
            l.borrow_mut().push(format!("full({})", state.is_panicking()));
            Ok(())
        });
        e.defer_any(full, []);
        Ok(())
    });

    assert_eq!(result, Ok(()));
    assert_eq!(*log.borrow(), ["full(false)", "observing(None)", "fallible", "plain"]);
}

#[test]
fn defer_any_falls_back_to_configured_selectors() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let config = Config::<String>::builder()
        .cleanup_selector(selector::close::<Pipe, String>())
        .cleanup_selector(selector::with(|_, id: u32| -> Result<(), String> {
            Err(format!("session {id} leaked"))
        }))
        .build();

    let result = config.run(|e| {
        e.defer_any(pipe(&log, false), []);
        e.defer_any(7_u32, []);
        Ok(())
    });

    assert_eq!(result, Err("session 7 leaked".to_string()));
    assert_eq!(*log.borrow(), ["close_with_error(session 7 leaked)"].map(String::from));
}

#[test]
fn first_matching_selector_wins() {
    let config = Config::<String>::builder()
        .cleanup_selector(selector::with(|_, _: u8| -> Result<(), String> { Err("first".into()) }))
        .cleanup_selector(selector::with(|_, _: u8| -> Result<(), String> { Err("second".into()) }))
        .build();

    let result = config.run(|e| {
        e.defer_any(1_u8, []);
        Ok(())
    });

    assert_eq!(result, Err("first".to_string()));
}
