// Composition root for the event log.
//
// Responsibilities
// - Read config from the environment.
// - Instantiate the configured event store backend.
// - Wire the store and the lock registry into the append handler and the router.

pub mod config;
pub mod http;
pub mod state;
