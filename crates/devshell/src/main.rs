use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;

use gridinv_devshell::{Shell, Step};
use gridinv_events::{EventBus, EventEnvelope, InMemoryEventBus};
use gridinv_infra::{EngineConfig, InMemoryInventoryStore, InventoryService};
use gridinv_inventory::InventoryEvent;

fn main() -> anyhow::Result<()> {
    gridinv_observability::init();

    let config = EngineConfig::load().context("failed to load engine config")?;
    let bus: Arc<InMemoryEventBus<EventEnvelope<InventoryEvent>>> = Arc::new(InMemoryEventBus::new());

    // Audit trail: every committed event is logged at debug level.
    let audit = bus.subscribe();
    std::thread::spawn(move || {
        while let Ok(envelope) = audit.recv() {
            tracing::debug!(
                owner = %envelope.owner(),
                operation = envelope.operation(),
                event_type = envelope.event_type(),
                sequence = envelope.sequence_number(),
                "inventory event committed"
            );
        }
    });

    let service =
        InventoryService::from_config(Arc::new(InMemoryInventoryStore::new()), Arc::clone(&bus), config)
            .context("failed to start inventory service")?;
    tracing::info!(
        definitions = service.catalog().len(),
        subscribers = bus.subscriber_count(),
        "devshell ready"
    );
    let shell = Shell::new(service);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        match shell.handle_line(&line) {
            Step::Skip => continue,
            Step::Quit => break,
            Step::Reply(reply) => {
                writeln!(stdout, "{}", reply.to_json())?;
                stdout.flush()?;
            }
        }
    }
    Ok(())
}
