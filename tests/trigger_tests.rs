//! Trigger system integration tests.
//!
//! These tests verify trigger ordering and event composition through
//! `do_event`, and the registry features card rules lean on (owners,
//! limited uses, enablement).

use std::cell::RefCell;
use std::rc::Rc;

use ccg_sync::core::{Action, ActionCollection, EntityId, EventContext};
use ccg_sync::scheduler::SyncTriggerSystem;
use ccg_sync::triggers::SyncTrigger;

#[derive(Default)]
struct Engine {
    log: Vec<String>,
    armor: i64,
}

type System = SyncTriggerSystem<Engine>;

// Event names
const DAMAGE_DEALT: &str = "DamageDealt";
const TURN_START: &str = "TurnStart";
const CARD_PLAYED: &str = "CardPlayed";

fn log(label: &'static str) -> Action<Engine> {
    Action::named(label, move |_, e: &mut Engine| {
        e.log.push(label.to_string());
        Ok(())
    })
}

/// Test that higher priority triggers run first.
#[test]
fn test_priority_ordering() {
    let mut system = System::new();
    let mut engine = Engine::default();

    system.register_before(TURN_START, SyncTrigger::new("T1", log("t1")).with_priority(1));
    system.register_before(TURN_START, SyncTrigger::new("T2", log("t2")).with_priority(2));

    system
        .do_event(&mut engine, EventContext::new(TURN_START), ActionCollection::new())
        .unwrap();

    assert_eq!(engine.log, vec!["t2", "t1"]);
}

/// Test that equal priorities keep registration order.
#[test]
fn test_priority_ties_keep_registration_order() {
    let mut system = System::new();
    let mut engine = Engine::default();

    for label in ["first", "second", "third"] {
        system.register_after(TURN_START, SyncTrigger::new(label, log(label)).with_priority(3));
    }
    system.register_after(TURN_START, SyncTrigger::new("urgent", log("urgent")).with_priority(4));
    system.register_after(TURN_START, SyncTrigger::new("default", log("default")));

    system.do_event(&mut engine, EventContext::new(TURN_START), log("main")).unwrap();

    assert_eq!(engine.log, vec!["main", "urgent", "first", "second", "third", "default"]);
}

/// Test that priority functions see the engine and the event context.
#[test]
fn test_dynamic_priority() {
    let mut system = System::new();
    let mut engine = Engine { armor: 10, ..Default::default() };

    system.register_before(
        DAMAGE_DEALT,
        SyncTrigger::new("armor", log("armor")).with_priority_fn(|e: &Engine, _| e.armor as i32),
    );
    system.register_before(
        DAMAGE_DEALT,
        SyncTrigger::new("amount", log("amount"))
            .with_priority_fn(|_: &Engine, ctx| ctx.get_int_or("amount", 0) as i32),
    );

    let context = EventContext::new(DAMAGE_DEALT).with("amount", 20);
    system.do_event(&mut engine, context, ActionCollection::new()).unwrap();
    assert_eq!(engine.log, vec!["amount", "armor"]);

    engine.log.clear();
    let context = EventContext::new(DAMAGE_DEALT).with("amount", 5);
    system.do_event(&mut engine, context, ActionCollection::new()).unwrap();
    assert_eq!(engine.log, vec!["armor", "amount"]);
}

/// Test that before-triggers see the event before the main action and
/// after-triggers see it after.
#[test]
fn test_event_composition() {
    let mut system = System::new();
    let mut engine = Engine::default();

    let seen_b = Rc::new(RefCell::new(None));
    let seen_a = Rc::new(RefCell::new(None));

    let observe_b = {
        let seen_b = Rc::clone(&seen_b);
        Action::named("observe_b", move |sys: &mut System, _: &mut Engine| {
            *seen_b.borrow_mut() = sys.current_context().and_then(|c| c.get_int("b"));
            if let Some(ctx) = sys.current_context_mut() {
                ctx.set("b", 20);
            }
            Ok(())
        })
    };
    let observe_a = {
        let seen_a = Rc::clone(&seen_a);
        Action::named("observe_a", move |sys: &mut System, _: &mut Engine| {
            *seen_a.borrow_mut() = sys.current_context().and_then(|c| c.get_int("a"));
            if let Some(ctx) = sys.current_context_mut() {
                ctx.set("a", 10);
            }
            Ok(())
        })
    };
    let main = Action::named("main", |sys: &mut System, e: &mut Engine| {
        let ctx = sys.current_context().cloned().unwrap_or_default();
        e.log.push(format!("main a={} b={}", ctx.get_int_or("a", 0), ctx.get_int_or("b", 0)));
        if let Some(ctx) = sys.current_context_mut() {
            ctx.add_int("a", 100);
        }
        Ok(())
    });

    system.register_before(CARD_PLAYED, SyncTrigger::new("before", observe_b));
    system.register_after(CARD_PLAYED, SyncTrigger::new("after", observe_a));

    let context = EventContext::new(CARD_PLAYED).with("a", 1).with("b", 2);
    let task = system.do_event(&mut engine, context, main).unwrap();

    assert_eq!(*seen_b.borrow(), Some(2), "Before-trigger should see the original b");
    assert_eq!(engine.log, vec!["main a=1 b=20"]);
    assert_eq!(*seen_a.borrow(), Some(101), "After-trigger should see a after the main action");

    let ctx = system.context(task).unwrap();
    assert_eq!(ctx.get_int("a"), Some(10));
    assert_eq!(ctx.get_int("b"), Some(20));
}

/// Test that conditions filter triggers.
#[test]
fn test_condition_filters() {
    let mut system = System::new();
    let mut engine = Engine::default();

    system.register_before(
        DAMAGE_DEALT,
        SyncTrigger::new("Armor", log("armor")).with_condition(|e: &Engine, _| e.armor > 0),
    );
    system.register_before(
        DAMAGE_DEALT,
        SyncTrigger::new("Big hit", log("big"))
            .with_condition(|_: &Engine, ctx| ctx.get_int_or("amount", 0) >= 5),
    );

    system
        .do_event(&mut engine, EventContext::new(DAMAGE_DEALT).with("amount", 3), log("hit"))
        .unwrap();
    assert_eq!(engine.log, vec!["hit"]);

    engine.log.clear();
    engine.armor = 1;
    system
        .do_event(&mut engine, EventContext::new(DAMAGE_DEALT).with("amount", 7), log("hit"))
        .unwrap();
    assert_eq!(engine.log, vec!["armor", "big", "hit"]);
}

/// Test that limited-use triggers stop firing once exhausted.
#[test]
fn test_limited_uses() {
    let mut system = System::new();
    let mut engine = Engine::default();

    let id = system.register_after(TURN_START, SyncTrigger::new("Once", log("once")).with_uses(1));

    for _ in 0..3 {
        system
            .do_event(&mut engine, EventContext::new(TURN_START), ActionCollection::new())
            .unwrap();
    }

    assert_eq!(engine.log, vec!["once"]);
    let trigger = system.triggers().get(id).unwrap();
    assert_eq!(trigger.uses_remaining, Some(0));
    assert!(!trigger.can_fire());
}

/// Test that a disabled trigger is skipped without losing its registration.
#[test]
fn test_enable_disable() {
    let mut system = System::new();
    let mut engine = Engine::default();
    let id = system.register_before(TURN_START, SyncTrigger::new("Toggle", log("toggle")));

    assert!(system.set_trigger_enabled(id, false));
    system
        .do_event(&mut engine, EventContext::new(TURN_START), ActionCollection::new())
        .unwrap();
    assert!(engine.log.is_empty());

    assert!(system.set_trigger_enabled(id, true));
    system
        .do_event(&mut engine, EventContext::new(TURN_START), ActionCollection::new())
        .unwrap();
    assert_eq!(engine.log, vec!["toggle"]);
}

/// Test removing every trigger of a card that leaves play.
#[test]
fn test_remove_triggers_for_owner() {
    let mut system = System::new();
    let mut engine = Engine::default();
    let creature = EntityId::new(7);
    let other = EntityId::new(8);

    system.register_before(
        DAMAGE_DEALT,
        SyncTrigger::new("Shield", log("shield")).with_owner(creature),
    );
    system.register_after(TURN_START, SyncTrigger::new("Regen", log("regen")).with_owner(creature));
    system.register_after(TURN_START, SyncTrigger::new("Other", log("other")).with_owner(other));

    assert_eq!(system.remove_triggers_for(creature), 2);
    assert_eq!(system.remove_triggers_for(creature), 0);
    assert!(system.triggers_before(DAMAGE_DEALT).is_empty());

    system
        .do_event(&mut engine, EventContext::new(TURN_START), ActionCollection::new())
        .unwrap();
    assert_eq!(engine.log, vec!["other"]);
}

/// Test that listing returns registration order regardless of priority.
#[test]
fn test_listing_order() {
    let mut system = System::new();
    let low = system.register_after(
        CARD_PLAYED,
        SyncTrigger::new("low", ActionCollection::new()).with_priority(-1),
    );
    let high = system.register_after(
        CARD_PLAYED,
        SyncTrigger::new("high", ActionCollection::new()).with_priority(9),
    );

    let ids: Vec<_> = system.triggers_after(CARD_PLAYED).into_iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec![low, high]);
    assert!(system.triggers_before(CARD_PLAYED).is_empty());
}

/// Test that a trigger run directly becomes a child of the current task.
#[test]
fn test_do_trigger_nested() {
    let mut system = System::new();
    let mut engine = Engine::default();
    let bonus = SyncTrigger::new("Bonus", log("bonus")).with_condition(|_: &Engine, _| false);

    let run_bonus = Action::new(move |sys: &mut System, e: &mut Engine| {
        sys.do_trigger(e, &bonus, Some(EventContext::new("BonusDraw")))?;
        Ok(())
    });
    let outer = system.do_task(&mut engine, None, vec![run_bonus, log("after")]).unwrap();

    assert_eq!(engine.log, vec!["bonus", "after"]);
    let child = system.task(outer).unwrap().children()[0];
    assert_eq!(system.task(child).unwrap().name(), "BonusDraw");
}

/// Test that a trigger can pause the event task and resume later.
#[test]
fn test_trigger_pauses_event() {
    let mut system = System::new();
    let mut engine = Engine::default();
    let wait = Action::named("wait", |sys: &mut System, e: &mut Engine| {
        e.log.push("wait".to_string());
        sys.pause_current()?;
        Ok(())
    });
    system.register_before(CARD_PLAYED, SyncTrigger::new("Counter window", wait));

    let task = system
        .do_event(&mut engine, EventContext::new(CARD_PLAYED), log("resolve"))
        .unwrap();
    assert_eq!(engine.log, vec!["wait"]);
    assert!(system.task(task).unwrap().is_paused());

    system.resume_task(&mut engine, task).unwrap();
    assert_eq!(engine.log, vec!["wait", "resolve"]);
    assert!(system.task(task).unwrap().is_finished());
}
