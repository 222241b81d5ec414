//! Client-server plumbing for transaction streams.
//!
//! # Overview
//!
//! A client and a server exchange protobuf messages over a byte stream. Each frame
//! is a varint length prefix followed by the encoded message:
//!
//! - client to server: one [`TxReq`](crate::proto::transaction::TxReq) per frame,
//! - server to client: one [`ServerFrame`](crate::proto::transaction::ServerFrame)
//!   holding either a response or a terminal status.
//!
//! Every request is answered by exactly one frame. A status frame ends the
//! transaction and the server closes the connection after sending it.
//!
//! # Key Components
//!
//! - [`ProtocolTransport`]: framing over any `Read + Write` stream, and the
//!   [`Transport`] implementation a [`Session`](crate::session::Session) drives.
//! - [`SessionServer`]: accepts TCP connections and serves each on a worker pool,
//!   dispatching requests to a [`Backend`].
//! - [`Backend`] / [`Transaction`]: what a storage engine implements to be served.
mod backend;
mod server;
mod thread;
mod transport;

use thread::ThreadPool;

pub use backend::{
    Backend, BackendError, ConceptStream, ElementStream, MethodReply, Transaction,
};
pub use server::{SessionServer, WORKERS, handle_connection};
pub use transport::{MAX_FRAME_LEN, ProtocolTransport, Transport, TransportError};
