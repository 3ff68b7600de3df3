//! Port command and query handlers.

mod count_ports;
mod delete_port;
mod fragment_decoder;
mod get_port;
mod list_ports;
mod rename_port;
mod upload_ports;

pub use count_ports::{CountPortsHandler, CountPortsQuery};
pub use delete_port::{DeletePortCommand, DeletePortHandler};
pub use fragment_decoder::{FragmentDecoder, PortFragment, RawPort};
pub use get_port::{GetPortHandler, GetPortQuery};
pub use list_ports::{ListPortsHandler, ListPortsQuery};
pub use rename_port::{RenamePortCommand, RenamePortHandler};
pub use upload_ports::{
    UploadError, UploadPortsHandler, UploadSummary, DEFAULT_MAX_UPLOAD_BYTES,
};
