// Agent registry: arena of live agents addressed by generational handles
//
// Handles stay valid for exactly as long as the agent they name; once an agent is
// removed its slot is recycled under a new generation, so stale handles resolve to
// nothing instead of to a different agent.

use log::info;
use rand::Rng;
use serde::Serialize;

use crate::agent::{Agent, AgentReport, Overlay, PeerSnapshot, TickContext};
use crate::grid::CollisionMap;

/// Stable handle to an agent in an `AgentRegistry`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AgentId {
    index: u32,
    generation: u32,
}

impl AgentId {
    pub fn index(&self) -> u32 {
        self.index
    }
}

#[derive(Default)]
struct Slot {
    generation: u32,
    agent: Option<Agent>,
}

/// Whether an agent stays registered after its update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Keep,
    Remove,
}

#[derive(Default)]
pub struct AgentRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl AgentRegistry {
    pub fn new() -> Self {
        AgentRegistry::default()
    }

    /// Registers an agent and returns its handle
    pub fn insert(&mut self, agent: Agent) -> AgentId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.agent = Some(agent);
            return AgentId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            agent: Some(agent),
        });
        AgentId {
            index,
            generation: 0,
        }
    }

    /// Deregisters an agent; stale or unknown handles return None
    pub fn remove(&mut self, id: AgentId) -> Option<Agent> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let agent = slot.agent.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(agent)
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.agent.as_ref())
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.agent.as_mut())
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Handles of all live agents in slot order
    pub fn ids(&self) -> Vec<AgentId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &Agent)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.agent.as_ref().map(|agent| {
                (
                    AgentId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    agent,
                )
            })
        })
    }

    pub fn find_by_name(&self, name: &str) -> Option<AgentId> {
        self.iter()
            .find(|(_, agent)| agent.name() == name)
            .map(|(id, _)| id)
    }

    /// Positions of every live agent, for peer queries
    pub fn snapshot(&self) -> Vec<PeerSnapshot> {
        self.iter()
            .map(|(id, agent)| PeerSnapshot {
                id,
                position: agent.position(),
            })
            .collect()
    }

    /// Removes every agent (level reset); outstanding handles become stale
    pub fn clear(&mut self) {
        let removed = self.len;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.agent.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
        self.len = 0;
        if removed > 0 {
            info!("Registry cleared ({} agents removed)", removed);
        }
    }

    /// Updates every agent once, in slot order
    pub fn update_all<M: CollisionMap, R: Rng>(
        &mut self,
        ctx: &TickContext<'_, M>,
        rng: &mut R,
    ) -> Vec<(AgentId, AgentReport)> {
        self.update_all_with(ctx, rng, |_, _, _| Disposition::Keep)
    }

    /// Updates every agent once, letting `decide` remove agents mid-broadcast
    ///
    /// The handle list and peer snapshot are taken before the loop. An agent removed
    /// during the broadcast is skipped if its turn has not come yet and vanishes from
    /// the peer snapshot for everyone updated after it.
    pub fn update_all_with<M, R, F>(
        &mut self,
        ctx: &TickContext<'_, M>,
        rng: &mut R,
        mut decide: F,
    ) -> Vec<(AgentId, AgentReport)>
    where
        M: CollisionMap,
        R: Rng,
        F: FnMut(AgentId, &Agent, &AgentReport) -> Disposition,
    {
        let mut peers = self.snapshot();
        let mut reports = Vec::with_capacity(peers.len());

        for id in self.ids() {
            let agent = match self.get_mut(id) {
                Some(agent) => agent,
                None => continue,
            };

            let report = agent.update(id, ctx, &peers, rng);
            let position = agent.position();
            let disposition = decide(id, agent, &report);

            match disposition {
                Disposition::Keep => {
                    if let Some(peer) = peers.iter_mut().find(|peer| peer.id == id) {
                        peer.position = position;
                    }
                }
                Disposition::Remove => {
                    self.remove(id);
                    peers.retain(|peer| peer.id != id);
                }
            }
            reports.push((id, report));
        }

        reports
    }

    /// Debug overlays of every agent with debug mode on
    pub fn overlays(&self) -> Vec<(AgentId, Overlay)> {
        self.iter()
            .filter_map(|(id, agent)| agent.overlay().map(|overlay| (id, overlay)))
            .collect()
    }

    pub fn set_debug_all(&mut self, enabled: bool) {
        for slot in self.slots.iter_mut() {
            if let Some(agent) = slot.agent.as_mut() {
                if agent.debug_mode() != enabled {
                    agent.toggle_debug();
                }
            }
        }
    }
}
