use std::collections::BTreeMap;

use log::debug;

use tether_shared::{
    Actor, ActorId, AuthorityGate, EntityId, FieldSyncChannel, HostOnly, ListSyncChannel, Outbox,
    Role, SyncConfig, SyncWorld, Tick, TickReport,
};

use crate::{
    helpers::lossy_link::LossyLink,
    test_components::{Door, WireNodes, DOOR, WIRE},
};

struct Peer {
    world: SyncWorld,
    downlink: LossyLink,
    uplink: LossyLink,
}

/// One host world and any number of observer worlds, wired through
/// in-memory links. Each `step` ticks the host, delivers its output,
/// ticks every observer and delivers their output back to the host.
/// Observers only mirror entities spawned after they were added.
pub struct TestNetwork {
    config: SyncConfig,
    host: SyncWorld,
    peers: BTreeMap<ActorId, Peer>,
    tick: Tick,
}

impl TestNetwork {
    pub fn new(gate: impl AuthorityGate + 'static) -> Self {
        Self::with_config(SyncConfig::default(), gate)
    }

    pub fn with_config(config: SyncConfig, gate: impl AuthorityGate + 'static) -> Self {
        Self {
            host: SyncWorld::new(Role::Authoritative, config.clone(), gate),
            config,
            peers: BTreeMap::new(),
            tick: 0,
        }
    }

    pub fn add_observer(&mut self, id: ActorId) {
        self.add_observer_with_links(id, LossyLink::perfect(), LossyLink::perfect());
    }

    pub fn add_observer_with_links(&mut self, id: ActorId, downlink: LossyLink, uplink: LossyLink) {
        let world = SyncWorld::new(Role::Observer, self.config.clone(), HostOnly);
        self.peers.insert(
            id,
            Peer {
                world,
                downlink,
                uplink,
            },
        );
    }

    pub fn disconnect(&mut self, id: ActorId) {
        self.peers.remove(&id);
        self.host.disconnect(id);
    }

    pub fn spawn_door(&mut self, entity: EntityId, door: Door) {
        self.host.spawn(entity);
        self.host
            .insert_component(FieldSyncChannel::new(entity, DOOR, Role::Authoritative, door));
        for peer in self.peers.values_mut() {
            peer.world.spawn(entity);
            peer.world.insert_component(FieldSyncChannel::new(
                entity,
                DOOR,
                Role::Observer,
                Door::default(),
            ));
        }
    }

    pub fn spawn_wire(&mut self, entity: EntityId, wire: WireNodes) {
        self.host.spawn(entity);
        self.host
            .insert_component(ListSyncChannel::new(entity, WIRE, Role::Authoritative, wire));
        for peer in self.peers.values_mut() {
            peer.world.spawn(entity);
            peer.world.insert_component(ListSyncChannel::new(
                entity,
                WIRE,
                Role::Observer,
                WireNodes::default(),
            ));
        }
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub fn host(&self) -> &SyncWorld {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut SyncWorld {
        &mut self.host
    }

    pub fn observer(&self, id: ActorId) -> &SyncWorld {
        &self.peers.get(&id).expect("unknown observer").world
    }

    pub fn observer_mut(&mut self, id: ActorId) -> &mut SyncWorld {
        &mut self.peers.get_mut(&id).expect("unknown observer").world
    }

    pub fn downlink(&self, id: ActorId) -> &LossyLink {
        &self.peers.get(&id).expect("unknown observer").downlink
    }

    pub fn host_door(&self, entity: EntityId) -> &Door {
        door_in(&self.host, entity)
    }

    pub fn observer_door(&self, id: ActorId, entity: EntityId) -> &Door {
        door_in(self.observer(id), entity)
    }

    pub fn host_door_channel(&mut self, entity: EntityId) -> &mut FieldSyncChannel<Door> {
        door_channel_in(&mut self.host, entity)
    }

    pub fn observer_door_channel(
        &mut self,
        id: ActorId,
        entity: EntityId,
    ) -> &mut FieldSyncChannel<Door> {
        door_channel_in(self.observer_mut(id), entity)
    }

    pub fn host_wire(&self, entity: EntityId) -> &WireNodes {
        wire_in(&self.host, entity)
    }

    pub fn observer_wire(&self, id: ActorId, entity: EntityId) -> &WireNodes {
        wire_in(self.observer(id), entity)
    }

    pub fn host_wire_channel(&mut self, entity: EntityId) -> &mut ListSyncChannel<WireNodes> {
        self.host
            .component_mut::<ListSyncChannel<WireNodes>>(entity, WIRE)
            .expect("no wire on host")
    }

    /// Runs one tick on every world. Returns the host's report.
    pub fn step(&mut self) -> TickReport {
        self.tick = self.tick.wrapping_add(1);

        let mut outbox = Outbox::new();
        let report = self.host.tick(self.tick, &mut outbox);
        for (id, peer) in self.peers.iter_mut() {
            let batch = outbox
                .iter()
                .filter(|(recipients, _)| recipients.contains(*id))
                .map(|(_, bytes)| bytes.clone())
                .collect();
            for bytes in peer.downlink.transmit(batch) {
                peer.world.receive(&Actor::host(), &bytes);
            }
        }

        for (id, peer) in self.peers.iter_mut() {
            let mut outbox = Outbox::new();
            peer.world.tick(self.tick, &mut outbox);
            let batch = outbox
                .into_iter()
                .filter(|(recipients, _)| recipients.contains(ActorId::HOST))
                .map(|(_, bytes)| bytes)
                .collect();
            for bytes in peer.uplink.transmit(batch) {
                self.host.receive(&Actor::remote(*id), &bytes);
            }
        }

        debug!("step {}: {:?}", self.tick, report);
        report
    }

    pub fn step_n(&mut self, count: usize) {
        for _ in 0..count {
            self.step();
        }
    }
}

fn door_in(world: &SyncWorld, entity: EntityId) -> &Door {
    world
        .component::<FieldSyncChannel<Door>>(entity, DOOR)
        .expect("no door on entity")
        .state()
}

fn door_channel_in(world: &mut SyncWorld, entity: EntityId) -> &mut FieldSyncChannel<Door> {
    world
        .component_mut::<FieldSyncChannel<Door>>(entity, DOOR)
        .expect("no door on entity")
}

fn wire_in(world: &SyncWorld, entity: EntityId) -> &WireNodes {
    world
        .component::<ListSyncChannel<WireNodes>>(entity, WIRE)
        .expect("no wire on entity")
        .state()
}
