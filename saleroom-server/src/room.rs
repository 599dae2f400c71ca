use {
    crate::api::ws::UpdateEvent,
    saleroom_api_types::{
        auction::AuctionId,
        ws::{
            Participant,
            PresenceSnapshot,
        },
    },
    std::collections::HashMap,
    tokio::sync::{
        broadcast,
        RwLock,
    },
    uuid::Uuid,
};

pub type ConnectionId = usize;

/// One member of an auction room, as shown to the other members.
#[derive(Clone, Debug)]
pub struct Member {
    pub identity:     Option<Uuid>,
    pub display_name: String,
}

#[derive(Default)]
struct Rooms {
    members: HashMap<AuctionId, HashMap<ConnectionId, Member>>,
    joined:  HashMap<ConnectionId, AuctionId>,
}

/// Owns room membership for every auction. Handlers never touch the maps
/// directly; all mutation goes through `join`/`leave`, which also publish the
/// recomputed presence snapshot for each affected room. Snapshots are always
/// recomputed in full, never diffed.
pub struct Registry {
    rooms:        RwLock<Rooms>,
    event_sender: broadcast::Sender<UpdateEvent>,
}

impl Registry {
    pub fn new(event_sender: broadcast::Sender<UpdateEvent>) -> Self {
        Self {
            rooms: RwLock::new(Rooms::default()),
            event_sender,
        }
    }

    /// Adds the connection to the auction's room. A connection belongs to one
    /// room at a time, so a connection joined elsewhere leaves that room first.
    /// The returned snapshot includes the new member.
    pub async fn join(
        &self,
        auction_id: AuctionId,
        connection_id: ConnectionId,
        member: Member,
    ) -> PresenceSnapshot {
        let mut rooms = self.rooms.write().await;
        match rooms.joined.insert(connection_id, auction_id) {
            Some(previous) if previous != auction_id => {
                self.remove_member(&mut rooms, previous, connection_id);
            }
            // Rejoining the same room just refreshes the member entry.
            _ => {}
        }
        rooms
            .members
            .entry(auction_id)
            .or_default()
            .insert(connection_id, member);
        let snapshot = Self::presence_of(&rooms, auction_id);
        self.publish(auction_id, snapshot.clone());
        snapshot
    }

    /// Removes the connection from whichever room it is in. Disconnects can race
    /// explicit leaves, so this is a no-op for connections that never joined or
    /// already left, and publishes nothing in that case. An emptied room is
    /// evicted before this returns.
    pub async fn leave(&self, connection_id: ConnectionId) {
        let mut rooms = self.rooms.write().await;
        if let Some(auction_id) = rooms.joined.remove(&connection_id) {
            self.remove_member(&mut rooms, auction_id, connection_id);
        }
    }

    /// The current membership of an auction's room.
    pub async fn presence(&self, auction_id: AuctionId) -> PresenceSnapshot {
        Self::presence_of(&*self.rooms.read().await, auction_id)
    }

    fn remove_member(
        &self,
        rooms: &mut Rooms,
        auction_id: AuctionId,
        connection_id: ConnectionId,
    ) {
        let Some(room) = rooms.members.get_mut(&auction_id) else {
            return;
        };
        room.remove(&connection_id);
        if room.is_empty() {
            // Nobody is left to notify.
            rooms.members.remove(&auction_id);
        } else {
            let snapshot = Self::presence_of(rooms, auction_id);
            self.publish(auction_id, snapshot);
        }
    }

    fn presence_of(rooms: &Rooms, auction_id: AuctionId) -> PresenceSnapshot {
        let participants: Vec<Participant> = rooms
            .members
            .get(&auction_id)
            .map(|room| {
                room.values()
                    .map(|member| Participant {
                        identity:     member.identity,
                        display_name: member.display_name.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        PresenceSnapshot {
            count: participants.len(),
            participants,
        }
    }

    // The send is synchronous and performed while the write lock is held, so
    // presence events leave in the same order the membership changes commit.
    fn publish(&self, auction_id: AuctionId, snapshot: PresenceSnapshot) {
        if let Err(e) = self
            .event_sender
            .send(UpdateEvent::ParticipantUpdate {
                auction_id,
                snapshot,
            })
        {
            tracing::debug!(error = e.to_string(), "No subscribers for presence event");
        }
    }
}
