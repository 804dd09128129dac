use std::any::Any;
use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};

use scope_rail::handlers::Discard;
use scope_rail::{attach, ensure, handler_fn, Config, FromPanic, Phase};


#[test]
fn cleanups_run_in_reverse_registration_order() {
    let log = RefCell::new(Vec::new());
    let config = Config::<String>::new();

    let result = config.run(|e| {
        for name in ["c1", "c2", "c3"] {
            let log = &log;
            e.defer_call(move || log.borrow_mut().push(name));
        }
        Ok(())
    });

    assert_eq!(result, Ok(()));
    assert_eq!(*log.borrow(), ["c3", "c2", "c1"]);
}

#[test]
fn fail_now_drains_only_what_was_registered() {
    let log = RefCell::new(Vec::new());
    let config = Config::<String>::new();

    let result = config.run(|e| {
        e.defer_call(|| log.borrow_mut().push("a"));
        e.defer_call(|| log.borrow_mut().push("b"));
        e.fail_now(Some("stop".to_string()))?;
        e.defer_call(|| log.borrow_mut().push("c"));
        Ok(())
    });

    assert_eq!(result, Err("stop".to_string()));
    assert_eq!(*log.borrow(), ["b", "a"]);
}

#[test]
fn discarded_error_lets_the_block_continue() {
    let log = RefCell::new(Vec::new());
    let config = Config::<String>::new();

    let result = config.run(|e| {
        e.defer_call(|| log.borrow_mut().push("a"));
        e.fail_now_with(Some("err1".to_string()), &[&Discard])?;
        e.defer_call(|| log.borrow_mut().push("b"));
        Ok(())
    });

    assert_eq!(result, Ok(()));
    assert_eq!(*log.borrow(), ["b", "a"]);
}

#[test]
fn empty_error_is_a_no_op() {
    let config = Config::<String>::new();
    let result = config.run(|e| {
        e.fail_now(None)?;
        e.fail_now_with(None, &[&Discard])?;
        Ok(5)
    });
    assert_eq!(result, Ok(5));
}

#[derive(Debug, PartialEq)]
struct Code(u32);

impl FromPanic for Code {
    fn from_panic(_payload: &(dyn Any + Send)) -> Self {
        Code(u32::MAX)
    }
}

#[test]
fn handler_replacement_is_returned() {
    let increment = handler_fn(|_, err: Code| Some(Code(err.0 + 1)));
    let config = Config::<Code>::new();

    let result = config.run(|e| e.fail_now_with(Some(Code(41)), &[&increment]));

    assert_eq!(result, Err(Code(42)));
}

#[test]
fn first_error_wins_over_cleanup_errors() {
    let config = Config::<String>::new();

    let result = config.run(|e| {
        e.defer(|_| Err("cleanup a".to_string()));
        e.defer(|_| Err("cleanup b".to_string()));
        e.fail_now(Some("body".to_string()))
    });

    assert_eq!(result, Err("body".to_string()));
}

#[test]
fn first_cleanup_error_is_reported_after_success() {
    let config = Config::<String>::new();

    let result = config.run(|e| {
        e.defer(|_| Err("registered first".to_string()));
        e.defer(|_| Err("registered second".to_string()));
        Ok(())
    });

    // Drain order is newest first, so the second registration fails first.
    assert_eq!(result, Err("registered second".to_string()));
}

#[test]
fn discarded_first_error_leaves_room_for_the_next() {
    let config = Config::<String>::new();

    let result = config.run(|e| {
        e.defer(|_| Err("cleanup".to_string()));
        e.fail_now_with(Some("ignored".to_string()), &[&Discard])?;
        e.fail_now(Some("kept".to_string()))
    });

    assert_eq!(result, Err("kept".to_string()));
}

#[test]
fn explicit_handlers_bypass_defaults() {
    static DEFAULT_CALLS: AtomicUsize = AtomicUsize::new(0);
    let config = Config::<String>::builder()
        .default_fn(|_, err| {
            DEFAULT_CALLS.fetch_add(1, Ordering::SeqCst);
            Some(format!("default({err})"))
        })
        .build();
    let explicit = handler_fn(|_, err: String| Some(format!("explicit({err})")));

    let result = config.run(|e| {
        e.defer_with(|_| Err("close".to_string()), attach![Discard]);
        e.fail_now_with(Some("read".to_string()), &[&explicit])
    });

    assert_eq!(result, Err("explicit(read)".to_string()));
    assert_eq!(DEFAULT_CALLS.load(Ordering::SeqCst), 0);

    let result = config.run(|e| e.fail_now(Some("write".to_string())));
    assert_eq!(result, Err("default(write)".to_string()));
    assert_eq!(DEFAULT_CALLS.load(Ordering::SeqCst), 1);
}

#[test]
fn defaults_run_in_configured_order() {
    let config = Config::<String>::builder()
        .default_fn(|_, err| Some(format!("{err}+a")))
        .default_fn(|_, err| Some(format!("{err}+b")))
        .build();

    let result = config.run(|e| e.fail_now(Some("x".to_string())));

    assert_eq!(result, Err("x+a+b".to_string()));
}

#[test]
fn discard_stops_the_chain() {
    let reached = RefCell::new(false);
    let after = handler_fn(|_, err: String| {
        *reached.borrow_mut() = true;
        Some(err)
    });
    let config = Config::<String>::new();

    let result = config.run(|e| e.fail_now_with(Some("x".to_string()), &[&Discard, &after]));

    assert_eq!(result, Ok(()));
    assert!(!*reached.borrow());
}

#[test]
fn must_returns_value_or_default() {
    let config = Config::<String>::new();

    let result = config.run(|e| {
        let a: u32 = e.must(Ok::<_, String>(7))?;
        let b: u32 = e.must_with(Err::<u32, _>("skipped"), &[&Discard])?;
        Ok(a + b)
    });

    assert_eq!(result, Ok(7));
}

#[test]
fn check_distinguishes_discarded_errors() {
    let config = Config::<String>::new();

    let result = config.run(|e| {
        let present = e.check(Ok::<_, String>("value"))?;
        let missing = e.check_with(Err::<&str, _>("gone"), &[&Discard])?;
        Ok((present, missing))
    });

    assert_eq!(result, Ok((Some("value"), None)));
}

#[test]
fn must_aborts_with_converted_error() {
    let config = Config::<String>::new();

    let result = config.run(|e| {
        let byte: u8 = e.must(Err::<u8, _>("bad byte"))?;
        Ok(byte + 1)
    });

    assert_eq!(result, Err("bad byte".to_string()));
}

#[test]
fn abort_propagates_through_helpers() {
    fn step(e: &mut scope_rail::Scope<'_, String>, n: u32) -> scope_rail::Flow<u32> {
        e.assert(n < 3, format!("step {n} out of range"))?;
        Ok(n)
    }

    let config = Config::<String>::new();
    let result = config.run(|e| {
        let mut total = 0;
        for n in 0..5 {
            total += step(e, n)?;
        }
        Ok(total)
    });

    assert_eq!(result, Err("step 3 out of range".to_string()));
}

#[test]
fn formatted_assertions_render_only_on_failure() {
    let config = Config::<String>::new();

    let result = config.run(|e| {
        let (got, want) = (0x1f_u8, 0x2a_u8);
        e.assert_fmt(got < want, format_args!("never rendered"))?;
        ensure!(e, got == want, "checksum {got:#x} != {want:#x}")?;
        Ok(())
    });

    assert_eq!(result, Err("checksum 0x1f != 0x2a".to_string()));
}

#[test]
fn state_exposes_pending_error_to_cleanups() {
    let seen = RefCell::new(Vec::new());
    let config = Config::<String>::new();

    let _ = config.run(|e| {
        e.defer(|state| {
            seen.borrow_mut().push(state.err().cloned());
            Ok(())
        });
        e.fail_now(Some("boom".to_string()))
    });

    let _ = config.run(|e| {
        e.defer(|state| {
            seen.borrow_mut().push(state.err().cloned());
            Ok(())
        });
        Ok(())
    });

    assert_eq!(*seen.borrow(), [Some("boom".to_string()), None]);
}

#[test]
fn phase_and_pending_cleanups_track_progress() {
    let config = Config::<String>::new();

    let result = config.run(|e| {
        assert_eq!(e.phase(), Phase::Running);
        e.defer_call(|| {});
        e.defer_with(|_| Ok(()), attach![Discard, Discard]);
        assert_eq!(e.pending_cleanups(), 2);
        assert!(e.err().is_none());
        Ok(())
    });

    assert_eq!(result, Ok(()));
}

#[test]
fn config_is_reusable_across_runs() {
    let config = Config::<String>::builder().default_fn(|_, err| Some(err.to_uppercase())).build();

    for word in ["alpha", "beta"] {
        let result = config.run(|e| e.fail_now(Some(word.to_string())));
        assert_eq!(result, Err(word.to_uppercase()));
    }
}

#[test]
fn global_default_runs_boxed_errors() {
    let result = scope_rail::run(|e| {
        let n: i64 = e.must("-12".parse::<i64>())?;
        let _: i64 = e.must("twelve".parse::<i64>())?;
        Ok(n)
    });

    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "invalid digit found in string");
    assert!(std::ptr::eq(scope_rail::default_config(), scope_rail::default_config()));
}
