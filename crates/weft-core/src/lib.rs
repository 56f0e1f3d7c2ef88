//! weft-core: client-side sync logic for a server-authoritative plain-text editor.
//!
//! This crate provides:
//! - `EditOperation` / `CanonicalUpdate` - the wire protocol
//! - `EditCapture` - turns input events into edit operations
//! - `ReconciliationEngine` - applies canonical updates to a surface
//! - `EditorSession` - ties both to one `EditingSurface` and `OperationSink`
//! - `EditorRope` - ropey-backed text storage, shared with the authority
//!
//! Nothing here depends on a browser. The surface and the channel are traits,
//! implemented for the DOM in `weft-browser` and in memory for tests.

pub mod capture;
pub mod channel;
pub mod error;
pub mod input;
pub mod protocol;
pub mod reconcile;
pub mod replica;
pub mod session;
pub mod surface;
pub mod text;
pub mod text_helpers;
pub mod types;

pub use capture::{EditCapture, classify};
pub use channel::{OperationSink, RecordingSink};
pub use error::{ChannelError, Result, SyncError};
pub use input::{InputType, TextInputEvent};
pub use protocol::{
    Applied, CanonicalUpdate, ClientEvent, DOC_UPDATE_EVENT, EditOperation, ServerEvent,
    TEXT_OPERATION_EVENT,
};
pub use reconcile::{Reconciled, ReconciliationEngine};
pub use replica::LocalReplica;
pub use session::{DebugSnapshot, EditorSession, SessionConfig};
pub use smol_str::SmolStr;
pub use surface::{EditingSurface, PlainSurface};
pub use text::{EditorRope, TextBuffer};
pub use text_helpers::{TextDiff, char_len, char_to_utf16_offset, diff_text, utf16_to_char_offset};
pub use types::{EditInfo, Selection};
