//! Tag-indexed owner of every live entity
//!
//! Mutation is deferred: `entry` only queues, the queue is flushed after the
//! update pass, and dead entities are collected right after the flush. No
//! bucket changes while it is being walked.
//!
//! Buckets keep insertion order, except that `release` swap-removes and so
//! moves the last entity of the bucket into the released slot.

use std::fmt;

use super::mesh::MeshQuery;
use super::object::{GameObject, ObjectTag, UpdateContext};
use crate::input::InputState;
use crate::renderer::RenderSurface;
use crate::settings::ReleasePolicy;

/// Identity handed out by `entry`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Slot {
    id: ObjectId,
    object: Box<dyn GameObject>,
}

/// Counts from one `update` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Entities whose `update` ran
    pub updated: usize,
    /// Pending entities that went live
    pub flushed: usize,
    /// Dead entities collected
    pub destroyed: usize,
}

/// Owns every entity, bucketed by tag
pub struct GameObjectRegistry {
    pending: Vec<Slot>,
    live: [Vec<Slot>; ObjectTag::COUNT],
    next_id: u32,
    release_policy: ReleasePolicy,
}

impl Default for GameObjectRegistry {
    fn default() -> Self {
        Self::new(ReleasePolicy::default())
    }
}

impl GameObjectRegistry {
    pub fn new(release_policy: ReleasePolicy) -> Self {
        Self {
            pending: Vec::new(),
            live: std::array::from_fn(|_| Vec::new()),
            next_id: 1,
            release_policy,
        }
    }

    pub fn release_policy(&self) -> ReleasePolicy {
        self.release_policy
    }

    /// Queue an entity; it goes live at the next flush
    pub fn entry(&mut self, object: Box<dyn GameObject>) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        log::debug!("Entry {} ({:?})", id, object.tag());
        self.pending.push(Slot { id, object });
        id
    }

    /// Update pass, then flush, then dead collection
    ///
    /// Buckets are walked in tag order. Entities spawned through the update
    /// context are queued behind earlier entries and go live in this call's
    /// flush without having been updated. Dead entities are dropped in tag
    /// order, insertion order within a tag.
    pub fn update(&mut self, input: &InputState, dt: f32) -> UpdateStats {
        let mut stats = UpdateStats::default();
        let mut ctx = UpdateContext::new(input);

        for tag in ObjectTag::ALL {
            for slot in self.live[tag.index()].iter_mut() {
                slot.object.update(&mut ctx, dt);
                stats.updated += 1;
            }
        }

        for object in ctx.take_spawned() {
            self.entry(object);
        }

        stats.flushed = self.pending.len();
        for slot in self.pending.drain(..) {
            self.live[slot.object.tag().index()].push(slot);
        }

        for bucket in self.live.iter_mut() {
            let before = bucket.len();
            bucket.retain(|slot| {
                let alive = slot.object.is_alive();
                if !alive {
                    log::debug!("Destroy {} ({:?})", slot.id, slot.object.tag());
                }
                alive
            });
            stats.destroyed += before - bucket.len();
        }

        stats
    }

    /// Draw every visible live entity in tag then insertion order
    pub fn draw(&self, surface: &mut dyn RenderSurface) {
        for bucket in &self.live {
            for slot in bucket.iter().filter(|slot| slot.object.is_visible()) {
                slot.object.draw(surface);
            }
        }
    }

    /// Remove and destroy an entity
    ///
    /// A pending entity is dropped from the queue. A live entity is
    /// swap-removed from its bucket (O(1) after the search; the bucket's last
    /// entity takes its slot). Unknown ids are a no-op. Returns whether the
    /// id was found.
    ///
    /// Under `ReleasePolicy::LegacyCopy` the removal works on a copy of the
    /// storage: a pending entity stays queued and goes live at the next
    /// flush, and a live entity is only marked dead, so it stays in its
    /// bucket until the next collection.
    pub fn release(&mut self, id: ObjectId) -> bool {
        if let Some(index) = self.pending.iter().position(|slot| slot.id == id) {
            match self.release_policy {
                ReleasePolicy::InPlace => {
                    self.pending.swap_remove(index);
                    log::debug!("Released pending {}", id);
                }
                ReleasePolicy::LegacyCopy => {
                    log::warn!("Legacy release of pending {} left it queued", id);
                }
            }
            return true;
        }

        for bucket in self.live.iter_mut() {
            if let Some(index) = bucket.iter().position(|slot| slot.id == id) {
                match self.release_policy {
                    ReleasePolicy::InPlace => {
                        bucket.swap_remove(index);
                        log::debug!("Released {}", id);
                    }
                    ReleasePolicy::LegacyCopy => {
                        bucket[index].object.core_mut().alive = false;
                        log::warn!("Legacy release of {} left it in its bucket", id);
                    }
                }
                return true;
            }
        }

        false
    }

    /// Destroy every pending and live entity
    pub fn clear(&mut self) {
        let count = self.pending.len() + self.live.iter().map(Vec::len).sum::<usize>();
        self.pending.clear();
        for bucket in self.live.iter_mut() {
            bucket.clear();
        }
        log::info!("Released all {} objects", count);
    }

    /// Dispatch the contact matrix
    ///
    /// Player receives every Map then every Enemy, and Enemy receives every
    /// Map. Nothing else is paired.
    pub fn collision(&mut self, meshes: &dyn MeshQuery) {
        let mut players = std::mem::take(&mut self.live[ObjectTag::Player.index()]);
        for player in players.iter_mut() {
            for map in &self.live[ObjectTag::Map.index()] {
                player.object.on_collision_enter(map.object.as_ref(), meshes);
            }
            for enemy in &self.live[ObjectTag::Enemy.index()] {
                player.object.on_collision_enter(enemy.object.as_ref(), meshes);
            }
        }
        self.live[ObjectTag::Player.index()] = players;

        let mut enemies = std::mem::take(&mut self.live[ObjectTag::Enemy.index()]);
        for enemy in enemies.iter_mut() {
            for map in &self.live[ObjectTag::Map.index()] {
                enemy.object.on_collision_enter(map.object.as_ref(), meshes);
            }
        }
        self.live[ObjectTag::Enemy.index()] = enemies;
    }

    /// Earliest surviving live entity of `tag`
    pub fn first(&self, tag: ObjectTag) -> Option<&dyn GameObject> {
        self.live[tag.index()].first().map(|slot| slot.object.as_ref())
    }

    pub fn first_mut(&mut self, tag: ObjectTag) -> Option<&mut (dyn GameObject + 'static)> {
        self.live[tag.index()].first_mut().map(|slot| slot.object.as_mut())
    }

    /// Live or pending entity by id
    pub fn get(&self, id: ObjectId) -> Option<&dyn GameObject> {
        self.slots().find(|slot| slot.id == id).map(|slot| slot.object.as_ref())
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut (dyn GameObject + 'static)> {
        self.pending
            .iter_mut()
            .chain(self.live.iter_mut().flatten())
            .find(|slot| slot.id == id)
            .map(|slot| slot.object.as_mut())
    }

    /// Live ids of `tag` in bucket order
    pub fn ids(&self, tag: ObjectTag) -> Vec<ObjectId> {
        self.live[tag.index()].iter().map(|slot| slot.id).collect()
    }

    /// Live entities of `tag` in bucket order
    pub fn iter(&self, tag: ObjectTag) -> impl Iterator<Item = &dyn GameObject> {
        self.live[tag.index()].iter().map(|slot| slot.object.as_ref())
    }

    pub fn is_live(&self, id: ObjectId) -> bool {
        self.live.iter().flatten().any(|slot| slot.id == id)
    }

    pub fn is_pending(&self, id: ObjectId) -> bool {
        self.pending.iter().any(|slot| slot.id == id)
    }

    pub fn live_count(&self, tag: ObjectTag) -> usize {
        self.live[tag.index()].len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.pending.iter().chain(self.live.iter().flatten())
    }
}
