use crate::{
    messages::chunk::{chunk_reassembler::ReassemblyKey, chunk_splitter::ChunkSplitter},
    world::{
        authority::{
            actor::{Actor, ActorId, RecipientSet},
            authority_gate::{AllowAll, HostOnly},
        },
        component::{
            field_channel::FieldSyncChannel,
            list_channel::ListSyncChannel,
            synced_field::{ComponentLayout, FieldValue, SyncedField},
            synced_state::{SyncedList, SyncedState},
        },
        error::SyncError,
        sync::{
            config::SyncConfig,
            delivery::Outbox,
            sync_world::{ReceiveOutcome, SyncWorld},
        },
    },
    EntityId, Role,
};

const VALVE: EntityId = EntityId::new(10);
const OBSERVER: ActorId = ActorId::new(2);

#[derive(Clone, Debug, PartialEq, Default)]
struct Valve {
    open: bool,
    flow: f32,
}

impl SyncedState for Valve {
    fn layout() -> ComponentLayout {
        ComponentLayout::new()
            .with(SyncedField::flag("open"))
            .with(SyncedField::ranged_float("flow", 0.0, 10.0, 8))
    }

    fn field(&self, index: usize) -> FieldValue {
        match index {
            0 => FieldValue::from(self.open),
            _ => FieldValue::Float(self.flow),
        }
    }

    fn set_field(&mut self, index: usize, value: FieldValue) {
        match index {
            0 => self.open = value.as_bool(),
            _ => self.flow = value.as_f32(),
        }
    }
}

#[derive(Default)]
struct Cable {
    nodes: Vec<(u16, u16)>,
}

impl SyncedList for Cable {
    type Unit = (u16, u16);

    fn units(&self) -> &[(u16, u16)] {
        &self.nodes
    }

    fn set_units(&mut self, units: Vec<(u16, u16)>) {
        self.nodes = units;
    }
}

type ValveChannel = FieldSyncChannel<Valve>;

fn host_world() -> SyncWorld {
    let mut world = SyncWorld::new(Role::Authoritative, SyncConfig::default(), HostOnly);
    world.spawn(VALVE);
    world.insert_component(ValveChannel::new(VALVE, 0, Role::Authoritative, Valve::default()));
    world
}

fn observer_world() -> SyncWorld {
    let mut world = SyncWorld::new(Role::Observer, SyncConfig::default(), AllowAll);
    world.spawn(VALVE);
    world.insert_component(ValveChannel::new(VALVE, 0, Role::Observer, Valve::default()));
    world
}

fn valve(world: &SyncWorld) -> &Valve {
    world.component::<ValveChannel>(VALVE, 0).unwrap().state()
}

fn valve_mut(world: &mut SyncWorld) -> &mut ValveChannel {
    world.component_mut::<ValveChannel>(VALVE, 0).unwrap()
}

fn deliver(outbox: Outbox, to: &mut SyncWorld, actor: ActorId, from: &Actor) {
    for (recipients, bytes) in outbox {
        if recipients.contains(actor) {
            to.receive(from, &bytes);
        }
    }
}

#[test]
fn registry_errors() {
    let mut world = host_world();

    assert_eq!(
        world.try_spawn(VALVE),
        Err(SyncError::EntityAlreadyExists { entity: 10 })
    );
    assert_eq!(
        world.try_insert_component(ValveChannel::new(
            VALVE,
            0,
            Role::Authoritative,
            Valve::default(),
        )),
        Err(SyncError::ComponentIndexTaken {
            entity: 10,
            component: 0
        })
    );
    assert_eq!(
        world.try_insert_component(ValveChannel::new(
            EntityId::new(99),
            0,
            Role::Authoritative,
            Valve::default(),
        )),
        Err(SyncError::EntityNotFound { entity: 99 })
    );
    assert_eq!(
        world.try_insert_component(ValveChannel::new(VALVE, 1, Role::Observer, Valve::default())),
        Err(SyncError::RoleMismatch {
            expected: Role::Authoritative,
            found: Role::Observer
        })
    );
}

#[test]
fn despawn_frees_slot_for_reuse() {
    let mut world = host_world();

    assert!(world.despawn(VALVE));
    assert!(!world.despawn(VALVE));
    assert!(world.component::<ValveChannel>(VALVE, 0).is_none());

    world.spawn(EntityId::new(11));
    world.spawn(VALVE);
    assert_eq!(world.entity_count(), 2);
}

#[test]
fn host_change_reaches_observer() {
    let mut host = host_world();
    let mut observer = observer_world();
    valve_mut(&mut host).mutate(|valve| {
        valve.open = true;
        valve.flow = 10.0;
    });

    let mut outbox = Outbox::new();
    let report = host.tick(1, &mut outbox);
    assert_eq!(report.updates_sent, 1);
    assert_eq!(report.messages_sent, 1);
    assert_eq!(outbox[0].0, RecipientSet::All);

    deliver(outbox, &mut observer, OBSERVER, &Actor::host());
    let report = observer.tick(1, &mut Outbox::new());

    assert_eq!(report.applied, 1);
    assert_eq!(
        valve(&observer),
        &Valve {
            open: true,
            flow: 10.0
        }
    );
}

#[test]
fn idle_world_sends_nothing() {
    let mut host = host_world();
    host.tick(1, &mut Outbox::new());

    let mut outbox = Outbox::new();
    let report = host.tick(2, &mut outbox);

    assert_eq!(report.updates_sent, 0);
    assert!(outbox.is_empty());
}

#[test]
fn denied_observer_edit_is_corrected() {
    let mut host = host_world();
    let mut observer = observer_world();
    host.tick(1, &mut Outbox::new());

    valve_mut(&mut observer).mutate(|valve| valve.open = true);
    let mut outbox = Outbox::new();
    observer.tick(1, &mut outbox);
    assert_eq!(outbox[0].0, RecipientSet::single(ActorId::HOST));
    deliver(outbox, &mut host, ActorId::HOST, &Actor::remote(OBSERVER));

    let mut outbox = Outbox::new();
    let report = host.tick(2, &mut outbox);
    assert_eq!(report.denied, 1);
    assert!(!valve(&host).open);
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].0, RecipientSet::single(OBSERVER));

    deliver(outbox, &mut observer, OBSERVER, &Actor::host());
    observer.tick(2, &mut Outbox::new());
    assert!(!valve(&observer).open);
}

#[test]
fn permitted_observer_edit_is_rebroadcast() {
    let mut host = SyncWorld::new(Role::Authoritative, SyncConfig::default(), AllowAll);
    host.spawn(VALVE);
    host.insert_component(ValveChannel::new(VALVE, 0, Role::Authoritative, Valve::default()));
    host.tick(1, &mut Outbox::new());
    let mut observer = observer_world();

    valve_mut(&mut observer).mutate(|valve| valve.flow = 4.0);
    let mut outbox = Outbox::new();
    observer.tick(1, &mut outbox);
    deliver(outbox, &mut host, ActorId::HOST, &Actor::remote(OBSERVER));

    let mut outbox = Outbox::new();
    let report = host.tick(2, &mut outbox);
    assert_eq!(report.applied, 1);
    assert_eq!(outbox[0].0, RecipientSet::All);
    assert_eq!(valve(&host).flow, valve(&observer).flow);
}

#[test]
fn disconnect_drops_queued_and_partial_updates() {
    let mut host = SyncWorld::new(Role::Authoritative, SyncConfig::default(), AllowAll);
    host.spawn(VALVE);
    host.insert_component(ValveChannel::new(VALVE, 0, Role::Authoritative, Valve::default()));
    host.insert_component(ListSyncChannel::new(VALVE, 1, Role::Authoritative, Cable::default()));
    host.tick(0, &mut Outbox::new());

    let remote = Actor::remote(OBSERVER);
    let nodes: Vec<(u16, u16)> = (0..130).map(|i| (i, i)).collect();
    let mut envelopes = ChunkSplitter::default().split(VALVE, 1, &nodes).unwrap();
    let key = ReassemblyKey {
        source: OBSERVER,
        entity: VALVE,
        component: 1,
        generation: envelopes[0].generation,
    };
    envelopes.truncate(2);
    for envelope in envelopes {
        assert_eq!(host.receive_envelope(&remote, envelope), ReceiveOutcome::Pending);
    }
    assert!(host.is_pending(&key));

    // open = 1, flow = 0
    let write = ChunkSplitter::default().single(VALVE, 0, vec![0x01, 0x00]);
    assert_eq!(host.receive_envelope(&remote, write), ReceiveOutcome::Queued);

    host.disconnect(OBSERVER);

    assert!(!host.is_pending(&key));
    assert_eq!(host.queued_inbound(), 0);
    let report = host.tick(1, &mut Outbox::new());
    assert_eq!(report.applied, 0);
    assert!(!valve(&host).open);
}

#[test]
fn stale_partial_update_expires() {
    let mut host = SyncWorld::new(Role::Authoritative, SyncConfig::default(), AllowAll);
    host.spawn(VALVE);
    host.insert_component(ListSyncChannel::new(VALVE, 1, Role::Authoritative, Cable::default()));

    let nodes: Vec<(u16, u16)> = (0..70).map(|i| (i, i)).collect();
    let envelopes = ChunkSplitter::default().split(VALVE, 1, &nodes).unwrap();
    let key = ReassemblyKey {
        source: OBSERVER,
        entity: VALVE,
        component: 1,
        generation: envelopes[0].generation,
    };
    let first = envelopes.into_iter().next().unwrap();
    host.receive_envelope(&Actor::remote(OBSERVER), first);

    assert_eq!(host.tick(60, &mut Outbox::new()).expired, 0);
    assert!(host.is_pending(&key));
    assert_eq!(host.tick(61, &mut Outbox::new()).expired, 1);
    assert!(!host.is_pending(&key));
}

#[test]
fn byte_budget_rotates_across_components() {
    let config = SyncConfig {
        max_bytes_per_tick: 1,
        ..SyncConfig::default()
    };
    let mut host = SyncWorld::new(Role::Authoritative, config, HostOnly);
    for id in 0..3 {
        let entity = EntityId::new(id);
        host.spawn(entity);
        host.insert_component(ValveChannel::new(entity, 0, Role::Authoritative, Valve::default()));
    }

    let mut outbox = Outbox::new();
    let first = host.tick(1, &mut outbox);
    assert_eq!((first.updates_sent, first.deferred), (1, 2));
    let second = host.tick(2, &mut outbox);
    assert_eq!((second.updates_sent, second.deferred), (1, 1));
    let third = host.tick(3, &mut outbox);
    assert_eq!((third.updates_sent, third.deferred), (1, 0));

    assert_eq!(outbox.len(), 3);
    assert_eq!(host.tick(4, &mut outbox).updates_sent, 0);
}

#[test]
fn receive_drops_garbage_and_unknown_entities() {
    let mut host = host_world();
    let remote = Actor::remote(OBSERVER);

    assert_eq!(host.receive(&remote, &[0xFF]), ReceiveOutcome::Dropped);

    let envelope = ChunkSplitter::default().single(EntityId::new(77), 0, vec![0, 0]);
    assert_eq!(host.receive_envelope(&remote, envelope), ReceiveOutcome::Dropped);
}
