//! Event dispatch benchmarks.
//!
//! - `do_event` with N triggers per phase (selection, sort, concat, run)
//! - Pause/resume round trips
//! - Request issue plus accepted response

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use ccg_sync::core::{Action, ActionCollection, EventContext, PlayerId};
use ccg_sync::requests::RequestSpec;
use ccg_sync::scheduler::SyncTriggerSystem;
use ccg_sync::triggers::SyncTrigger;

#[derive(Default)]
struct Engine {
    counter: i64,
}

fn bump() -> Action<Engine> {
    Action::named("bump", |_, e: &mut Engine| {
        e.counter += 1;
        Ok(())
    })
}

fn bench_do_event(c: &mut Criterion) {
    let mut group = c.benchmark_group("do_event");
    for triggers in [0usize, 8, 64] {
        let mut system = SyncTriggerSystem::with_config(
            ccg_sync::core::SchedulerConfig::default().with_journal(false),
        );
        for i in 0..triggers {
            let priority = (i % 5) as i32;
            system.register_before(
                "Damage",
                SyncTrigger::new("before", bump()).with_priority(priority),
            );
            system.register_after(
                "Damage",
                SyncTrigger::new("after", bump()).with_condition(|e: &Engine, _| e.counter >= 0),
            );
        }
        let mut engine = Engine::default();

        group.bench_with_input(BenchmarkId::from_parameter(triggers), &triggers, |b, _| {
            b.iter(|| {
                let ctx = EventContext::new("Damage").with("amount", 3);
                let task = system.do_event(&mut engine, ctx, bump()).unwrap();
                system.release_finished();
                black_box(task)
            })
        });
    }
    group.finish();
}

fn bench_pause_resume(c: &mut Criterion) {
    let mut system = SyncTriggerSystem::with_config(
        ccg_sync::core::SchedulerConfig::default().with_journal(false),
    );
    let mut engine = Engine::default();
    let pause = Action::named("pause", |sys: &mut SyncTriggerSystem<Engine>, _: &mut Engine| {
        sys.pause_current()?;
        Ok(())
    });
    let actions: ActionCollection<Engine> = (0..16)
        .map(|i| if i % 2 == 0 { bump() } else { pause.clone() })
        .collect();

    c.bench_function("pause_resume_16", |b| {
        b.iter(|| {
            let task = system.do_task(&mut engine, None, actions.clone()).unwrap();
            while system.resume_task(&mut engine, task).unwrap().is_some() {}
            system.release_finished();
        })
    });
}

fn bench_request_response(c: &mut Criterion) {
    let mut system = SyncTriggerSystem::with_config(
        ccg_sync::core::SchedulerConfig::default().with_journal(false),
    );
    let mut engine = Engine::default();

    c.bench_function("request_response", |b| {
        b.iter(|| {
            let ask = EventContext::new("Choose").with("cards", vec![1, 2, 3]);
            let spec = RequestSpec::to(PlayerId::new(1), ask)
                .with_timeout(Duration::from_secs(3))
                .with_validator(|_, ctx| ctx.get_int("card").is_some())
                .on_timeout(bump());
            system.request(spec);
            let answer = EventContext::new("Answer").with("card", 2);
            let outcome = system.response(&mut engine, PlayerId::new(1), answer).unwrap();
            system.release_finished();
            black_box(outcome)
        })
    });
}

criterion_group!(benches, bench_do_event, bench_pause_resume, bench_request_response);
criterion_main!(benches);
