//! Chat UI HTML embedding.
//!
//! The Loglens chat page is a single self-contained HTML file with all CSS
//! and JavaScript inlined, embedded at compile time via `include_str!` so
//! the binary has no external file dependencies at runtime. It talks to the
//! JSON API on the same origin: upload a CSV, click an example question or
//! type a free-text one, and read the transcript with any captured charts.

/// The complete self-contained chat page HTML.
pub const CHAT_HTML: &str = include_str!("../assets/chat.html");
