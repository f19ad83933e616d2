//! End-to-end behaviour of chain construction, derivation and dispatch.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use strand::{BoxedHandler, Chain, Handler, Method, Next, Request, ResponseWriter, handler_fn};

/// Counts how often it runs, then continues.
#[derive(Debug, Default)]
struct Counting {
    calls: AtomicUsize,
}

impl Counting {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Handler for Counting {
    fn handle(&self, rw: &mut ResponseWriter, req: &mut Request, next: Next<'_>) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        next.run(rw, req);
    }
}

fn counters(n: usize) -> Vec<Arc<Counting>> {
    (0..n).map(|_| Arc::new(Counting::default())).collect()
}

fn boxed(counters: &[Arc<Counting>]) -> Vec<BoxedHandler> {
    counters.iter().map(|c| Arc::clone(c) as BoxedHandler).collect()
}

fn labelled(trace: &Arc<Mutex<String>>, label: &'static str) -> BoxedHandler {
    let trace = Arc::clone(trace);
    handler_fn(move |rw, req, next| {
        trace.lock().unwrap().push_str(label);
        next.run(rw, req);
    })
    .into_boxed_handler()
}

fn dispatch(chain: &Chain) {
    chain.dispatch(&mut ResponseWriter::new(), &mut Request::new(Method::Get, "/"));
}

#[test]
fn siblings_derived_from_a_full_parent_stay_isolated() {
    let base = counters(7);
    let mut parent = Chain::new();
    for handler in boxed(&base) {
        parent.add_all([handler]);
    }

    let [a, b, c]: [Arc<Counting>; 3] = [
        Arc::new(Counting::default()),
        Arc::new(Counting::default()),
        Arc::new(Counting::default()),
    ];
    let child_a = parent.with(boxed(&[Arc::clone(&a)]));
    let mut child_b = parent.with(boxed(&[Arc::clone(&b)]));
    let child_c = parent.with(boxed(&[Arc::clone(&c)]));

    let expected_tail = |chain: &Chain, exclusive: &Arc<Counting>| {
        let handlers = chain.handlers();
        assert_eq!(handlers.len(), 8);
        for (handler, original) in handlers.iter().zip(base.iter()) {
            assert!(Arc::ptr_eq(handler, &(Arc::clone(original) as BoxedHandler)));
        }
        assert!(Arc::ptr_eq(&handlers[7], &(Arc::clone(exclusive) as BoxedHandler)));
    };
    expected_tail(&child_a, &a);
    expected_tail(&child_b, &b);
    expected_tail(&child_c, &c);

    // The final router-like terminal, appended to one branch only.
    child_b.add_terminal_fn(|_, _| {});
    dispatch(&child_b);

    for (i, counter) in base.iter().enumerate() {
        assert_eq!(counter.calls(), 1, "parent handler {i}");
    }
    assert_eq!(a.calls(), 0);
    assert_eq!(b.calls(), 1);
    assert_eq!(c.calls(), 0);

    assert_eq!(parent.len(), 7);
    assert_eq!(child_a.len(), 8);
    assert_eq!(child_b.len(), 9);
    assert_eq!(child_c.len(), 8);
}

#[test]
fn derived_chains_trace_independently() {
    let trace = Arc::new(Mutex::new(String::new()));
    let mut parent = Chain::new();
    for label in ["one", "two", "three", "four", "five", "six", "seven"] {
        parent.add_all([labelled(&trace, label)]);
    }

    let mut eight = parent.with([labelled(&trace, "eight")]);
    let mut nine = parent.with([labelled(&trace, "nine")]);
    let mut ten = parent.with([labelled(&trace, "ten")]);
    for chain in [&mut eight, &mut nine, &mut ten] {
        chain.add_terminal_fn(|_, _| {});
    }

    let run = |chain: &Chain| {
        trace.lock().unwrap().clear();
        dispatch(chain);
        trace.lock().unwrap().clone()
    };

    assert_eq!(run(&parent), "onetwothreefourfivesixseven");
    assert_eq!(parent.len(), 7);
    assert_eq!(run(&eight), "onetwothreefourfivesixseveneight");
    assert_eq!(eight.len(), 9);
    assert_eq!(run(&nine), "onetwothreefourfivesixsevennine");
    assert_eq!(nine.len(), 9);
    assert_eq!(run(&ten), "onetwothreefourfivesixseventen");
    assert_eq!(ten.len(), 9);
}

#[test]
fn same_handler_may_appear_twice() {
    let counter = Arc::new(Counting::default());
    let handler = Arc::clone(&counter) as BoxedHandler;

    let chain = Chain::from_handlers([Arc::clone(&handler), handler]);
    dispatch(&chain);

    assert_eq!(chain.len(), 2);
    assert_eq!(counter.calls(), 2);
}

#[test]
fn optional_handlers_register_when_present() {
    let enabled: Option<BoxedHandler> = Some(Arc::new(Counting::default()));
    let mut chain = Chain::new();
    chain.add_all([enabled]);
    assert_eq!(chain.len(), 1);
}

#[test]
fn chain_is_shareable_across_threads() {
    let counter = Arc::new(Counting::default());
    let chain = Arc::new(Chain::from_handlers(boxed(&[Arc::clone(&counter)])));

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let chain = Arc::clone(&chain);
            std::thread::spawn(move || {
                for _ in 0..100 {
                    dispatch(&chain);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(counter.calls(), 800);
}

#[test]
fn sub_chain_dispatched_from_app_runs_shared_stack_once() {
    let stack = Arc::new(Counting::default());
    let guard = Arc::new(Counting::default());

    let mut base = Chain::new();
    base.add_all([Arc::clone(&stack) as BoxedHandler]);

    let mut fresh = Chain::new();
    fresh.add_all([Arc::clone(&guard) as BoxedHandler]);
    let derived = base.with([Arc::clone(&guard) as BoxedHandler]);

    for admin in [fresh, derived] {
        let mut app = base.clone();
        app.add_fn(move |rw, req, next| {
            if req.path().starts_with("/admin") {
                admin.dispatch(rw, req);
                return;
            }
            next.run(rw, req);
        });
        app.dispatch(&mut ResponseWriter::new(), &mut Request::new(Method::Get, "/admin/stats"));
    }

    // A sub-chain derived from `base` repeats the stack; a fresh one does not.
    assert_eq!(guard.calls(), 2);
    assert_eq!(stack.calls(), 1 + 2);
}

proptest! {
    /// However many handlers the parent holds (and however much spare
    /// capacity its list has), growing any derived child never shows up in
    /// the parent or in a sibling.
    #[test]
    fn derivation_never_leaks_between_branches(
        parent_len in 0usize..24,
        siblings in 1usize..6,
        growth in proptest::collection::vec(0usize..4, 1..6),
        dispatched in 0usize..6,
    ) {
        let base = counters(parent_len);
        let mut parent = Chain::new();
        for handler in boxed(&base) {
            parent.add_all([handler]);
        }

        let exclusive: Vec<Vec<Arc<Counting>>> = (0..siblings)
            .map(|i| counters(1 + growth[i % growth.len()]))
            .collect();

        let mut children: Vec<Chain> = exclusive
            .iter()
            .map(|own| parent.with(boxed(&own[..1])))
            .collect();
        for (child, own) in children.iter_mut().zip(&exclusive) {
            child.add_all(boxed(&own[1..]));
        }

        prop_assert_eq!(parent.len(), parent_len);
        for (child, own) in children.iter().zip(&exclusive) {
            prop_assert_eq!(child.len(), parent_len + own.len());
        }

        let target = dispatched % siblings;
        dispatch(&children[target]);

        for counter in &base {
            prop_assert_eq!(counter.calls(), 1);
        }
        for (i, own) in exclusive.iter().enumerate() {
            let expected = usize::from(i == target);
            for counter in own {
                prop_assert_eq!(counter.calls(), expected);
            }
        }
    }

    #[test]
    fn dispatch_follows_registration_order(labels in proptest::collection::vec(0u8..=9, 0..32)) {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let mut chain = Chain::new();
        for &label in &labels {
            let trace = Arc::clone(&trace);
            chain.add_fn(move |rw, req, next| {
                trace.lock().unwrap().push(label);
                next.run(rw, req);
            });
        }

        dispatch(&chain);

        prop_assert_eq!(chain.handlers().len(), labels.len());
        prop_assert_eq!(&*trace.lock().unwrap(), &labels);
    }
}
