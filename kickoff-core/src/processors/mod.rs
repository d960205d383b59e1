//! Background processors.
//!
//! - `TeamAllocator`: drains the `AllocationQueue`, assigns pool squads to users

pub mod team_allocator;

pub use team_allocator::{
    AllocateTeam, AllocationError, AllocationOutcome, SquadStore, TeamAllocator,
};
