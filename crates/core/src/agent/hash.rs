//! Stable hashing of the agent's persistent state for deterministic verification.
//! This module exists to keep hashing concerns separate from decision code.
//! It does not own replay execution or recording persistence.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use super::Agent;

impl Agent {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.config.seed);
        hasher.write_u64(self.tick);
        hasher.write_u64(self.store.len() as u64);
        for (spore, target) in self.store.iter() {
            hasher.write(spore.0.as_bytes());
            hasher.write_u8(0xff);
            hasher.write_i32(target.x);
            hasher.write_i32(target.y);
        }
        hasher.finish()
    }
}
