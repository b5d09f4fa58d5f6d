//! Connection Service
//!
//! This example models a network service that is either offline or online,
//! with timed transitions started from entry hooks.
//!
//! ```text
//! offline.disconnected --connect--> offline.connecting ..1s..> online.connected
//! online.connected --sync--> online.syncing ..1s..> online.connected
//! online.* --disconnect--> online.disconnecting ..500ms..> offline
//! ```
//!
//! Key concepts:
//! - Nested states with default substates
//! - Actions declared on a super state serve all its substates
//! - Timers tied to a state's scope stop when the state is left
//! - Structured logging of every enter and exit
//!
//! Run with: RUST_LOG=stateful=debug cargo run --example connection_service

use stateful::builder::{MachineBuilder, StateDecl};
use stateful::effects::{sync, ActionContext, HookError, Propagation, StateScope};
use std::time::Duration;
use stillwater::effect::BoxedEffect;
use stillwater::prelude::*;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Host environment: a queue of transitions requested by timers.
#[derive(Clone)]
struct Service {
    requests: mpsc::UnboundedSender<&'static str>,
}

/// Entry hook that requests `target` after `delay`, unless the state is
/// left first.
fn after(
    delay: Duration,
    target: &'static str,
) -> impl Fn(&StateScope) -> BoxedEffect<(), HookError, Service> + Send + Sync + 'static {
    move |scope: &StateScope| {
        let scope = scope.clone();
        from_fn(move |service: &Service| {
            let requests = service.requests.clone();
            let scope = scope.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {
                        let _ = requests.send(target);
                    }
                    _ = scope.exited() => {
                        info!(state = scope.state(), "timer cancelled");
                    }
                }
            });
            Ok(())
        })
        .boxed()
    }
}

fn log_exit(
    state: &'static str,
) -> impl Fn(&Service) -> Result<(), HookError> + Send + Sync + 'static {
    move |_| {
        info!(state, "left state");
        Ok(())
    }
}

fn go(
    target: &'static str,
) -> impl Fn(&mut ActionContext<'_, Service, ()>) -> Propagation + Send + Sync + 'static {
    move |ctx| {
        ctx.transition_to(target);
        Propagation::Stop
    }
}

fn service() -> StateDecl<Service> {
    StateDecl::new()
        .state(
            "offline",
            StateDecl::new()
                .default_state()
                .on_finally(sync(log_exit("offline")))
                .state(
                    "disconnected",
                    StateDecl::new()
                        .default_state()
                        .action("connect", go("offline.connecting")),
                )
                .state(
                    "connecting",
                    StateDecl::new()
                        .on_try(after(Duration::from_secs(1), "online"))
                        .action("cancelConnect", go("offline.disconnected")),
                ),
        )
        .state(
            "online",
            StateDecl::new()
                .on_finally(sync(log_exit("online")))
                .action("disconnect", go("online.disconnecting"))
                .action("sync", go("online.syncing"))
                .action("lostConnection", go("offline.connecting"))
                .state("connected", StateDecl::new().default_state())
                .state(
                    "syncing",
                    StateDecl::new().on_try(after(Duration::from_secs(1), "online.connected")),
                )
                .state(
                    "disconnecting",
                    StateDecl::new()
                        .on_try(after(Duration::from_millis(500), "offline"))
                        .action("lostConnection", go("offline")),
                ),
        )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    println!("=== Connection Service ===\n");

    let (requests, mut pending) = mpsc::unbounded_channel();
    let machine = MachineBuilder::new(service())
        .label("connection-service")
        .start(Service { requests })
        .await?;
    println!("Started in: {}", machine.current_state()?);

    machine.dispatch("connect", ()).await?;
    println!("After connect: {}", machine.current_state()?);

    // The connecting timer fires and moves us online.
    let online = machine.wait_for_enter_state("online.connected");
    if let Some(target) = pending.recv().await {
        machine.transition_to(target).await?;
    }
    online.await?;
    println!("Connected: {}", machine.state());

    machine.dispatch("sync", ()).await?;
    println!("Syncing: {}", machine.current_state()?);

    // Losing the connection mid-sync cancels the sync timer.
    machine.dispatch("lostConnection", ()).await?;
    println!("Lost connection: {}", machine.current_state()?);

    machine.dispatch("cancelConnect", ()).await?;
    println!("Gave up: {}", machine.current_state()?);

    println!("\nState view: {}", serde_json::to_string(&machine.state())?);
    println!("Visited: {:?}", machine.history().get_path());

    machine.shutdown().await?;
    println!("\n=== Example Complete ===");
    Ok(())
}
