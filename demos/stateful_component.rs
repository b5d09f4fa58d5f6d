//! Stateful Component
//!
//! This example demonstrates action bubbling through nested states.
//!
//! Key concepts:
//! - Root actions as the fallback for every state
//! - Handlers returning `Propagation::Bubble` pass the action upward
//! - Handlers requesting transitions through the action context
//! - Entry/exit notifications observed from outside the machine
//!
//! Run with: cargo run --example stateful_component

use stateful::builder::{MachineBuilder, StateDecl};
use stateful::effects::{sync, HookError, Propagation};
use stateful::runtime::StateEvent;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Host environment: a transcript of what the component did.
#[derive(Clone, Default)]
struct Component {
    transcript: Arc<Mutex<Vec<String>>>,
}

impl Component {
    fn say(&self, line: impl Into<String>) {
        if let Ok(mut transcript) = self.transcript.lock() {
            transcript.push(line.into());
        }
    }
}

fn announce(
    line: &'static str,
) -> impl Fn(&Component) -> Result<(), HookError> + Send + Sync + 'static {
    move |component: &Component| {
        component.say(line);
        Ok(())
    }
}

type Decl = StateDecl<Component, String>;

fn component() -> Decl {
    Decl::new()
        .action("doStuff", |ctx| {
            ctx.env().say(format!("root action {}", ctx.msg()));
            Propagation::Stop
        })
        .action("turnOn", |ctx| {
            ctx.transition_to("on");
            Propagation::Stop
        })
        .state(
            "on",
            Decl::new()
                .on_try(sync(announce("entering state on")))
                .on_finally(sync(announce("exiting state on")))
                .action("turnOn", |ctx| {
                    ctx.env().say("already on");
                    Propagation::Stop
                })
                .state(
                    "idle",
                    Decl::new()
                        .default_state()
                        .action("doStuff", |ctx| {
                            ctx.env().say("idling, becoming active");
                            ctx.transition_to("on.active");
                            Propagation::Stop
                        }),
                )
                .state(
                    "active",
                    Decl::new()
                        .action("doStuff", |ctx| {
                            ctx.env().say("activity");
                            Propagation::Stop
                        })
                        .state("dancing", Decl::new())
                        .state("walking", Decl::new().default_state()),
                ),
        )
        .state(
            "off",
            Decl::new()
                .default_state()
                .on_try(sync(announce("entering state off")))
                .on_finally(sync(announce("exiting state off")))
                .action("turnOn", |ctx| {
                    ctx.env().say("turning on");
                    Propagation::Bubble
                })
                .action("doStuff", |ctx| {
                    ctx.env().say(format!("off action {}", ctx.msg()));
                    Propagation::Bubble
                })
                .state("dead", Decl::new()),
        )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Stateful Component ===\n");

    let host = Component::default();
    let machine = MachineBuilder::new(component())
        .label("my-stateful-component")
        .start(host.clone())
        .await?;

    machine.on(StateEvent::enter("on.active"), |event| {
        println!("  (notification: {event})");
    });

    println!("States: {:?}", machine.state_names());
    println!("Actions: {:?}", machine.action_names());
    println!("Initial state: {}\n", machine.current_state()?);

    // Bubbles from `off` to the root handler.
    let handled_by = machine.dispatch("doStuff", "hello".to_string()).await?;
    println!("doStuff handled by {handled_by:?}");

    // `off` bubbles, the root handler asks for `on`.
    machine.dispatch("turnOn", String::new()).await?;
    println!("After turnOn: {}", machine.current_state()?);

    // `on` handles it and stops.
    machine.dispatch("turnOn", String::new()).await?;

    machine.dispatch("doStuff", String::new()).await?;
    println!("After doStuff: {}", machine.current_state()?);
    println!("In on.active? {}", machine.state().is("on.active"));

    if let Err(error) = machine.send("shake", String::new()) {
        println!("\nUnknown action: {error}");
    }

    println!("\nTranscript:");
    for line in host.transcript.lock().map(|t| t.clone()).unwrap_or_default() {
        println!("  {line}");
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
