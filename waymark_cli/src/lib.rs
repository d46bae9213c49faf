// waymark_cli: replay JSON scenarios against a `RouteSession`.
//
// The binary in `main.rs` is a thin wrapper: it parses flags, loads a
// scenario, and hands off to `scenario::run()`, which prints one JSON event
// per line. The library half exists so the replay loop can be tested without
// spawning a process.

pub mod scenario;
