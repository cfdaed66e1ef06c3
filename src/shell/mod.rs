// Composition root for the scores service.
//
// - Read config from the environment.
// - Pick the versioned store backend and wire it into the use case handlers.
// - Expose the HTTP router.

pub mod config;
pub mod http;
pub mod state;
