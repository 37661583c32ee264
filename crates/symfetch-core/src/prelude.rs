//! Common module for library exports

pub use crate::config::FetchConfig;
pub use crate::error::{Result, SymfetchError};
pub use crate::events::{event_channel, HostEvent, StopReason};
pub use crate::extension::{Extension, COMMAND_NAME};
pub use crate::host::{DebuggerHost, MappingListing, ScriptHost, Submission};
pub use crate::inspect::{create_inspector, ElfInspector, InspectorKind, ObjectInspector, Readelf};
pub use crate::pipeline::{Fetcher, Outcome};
pub use crate::report::{Message, Reporter, Severity};
pub use crate::types::{Address, BuildId, LibraryMapping, SectionTable};
