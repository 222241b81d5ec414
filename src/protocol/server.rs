use std::{
    collections::HashMap,
    io::{Read, Write},
    net::{SocketAddr, TcpListener},
    sync::Arc,
};

use log::{debug, info, warn};

use super::{
    ThreadPool,
    backend::{Backend, BackendError, ConceptStream, ElementStream, MethodReply, Transaction},
    transport::{ProtocolTransport, TransportError},
};
use crate::proto::{
    DataType, Empty, IterId, OneConcept, OptionalConcept,
    method::{MethodRes, method_res},
    transaction::{
        Code, ConceptMethodReq, TxIterRes, TxReq, TxRes, tx_iter_res, tx_req, tx_res,
    },
};

/// Worker threads serving connections.
pub const WORKERS: usize = 15;

/// Serves transactions from a [`Backend`] to TCP clients.
pub struct SessionServer<B: Backend> {
    address: SocketAddr,
    backend: Arc<B>,
    pool: ThreadPool,
}

impl<B: Backend> SessionServer<B> {
    pub fn new(address: SocketAddr, backend: B) -> Self {
        Self {
            address,
            backend: Arc::new(backend),
            pool: ThreadPool::new(WORKERS),
        }
    }

    pub fn listen(self) -> Result<(), TransportError> {
        let listener = TcpListener::bind(self.address)?;
        self.serve(listener)
    }

    /// Accepts connections from an already bound listener.
    pub fn serve(self, listener: TcpListener) -> Result<(), TransportError> {
        info!("listening at {}", listener.local_addr()?);

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let peer = stream.peer_addr().ok();
                    let backend = Arc::clone(&self.backend);
                    self.pool.execute(move || {
                        if let Err(e) = handle_connection(stream, &*backend) {
                            warn!("connection {peer:?} dropped: {e}");
                        }
                    });
                }
                Err(e) => warn!("broken connection: {e:?}"),
            }
        }
        Ok(())
    }
}

enum Stream {
    Attributes(ConceptStream),
    Method(ElementStream),
}

/// Open iterators of one connection, keyed by id.
#[derive(Default)]
struct Iterators {
    last_id: i32,
    open: HashMap<i32, Stream>,
}

impl Iterators {
    fn register(&mut self, stream: Stream) -> i32 {
        self.last_id += 1;
        self.open.insert(self.last_id, stream);
        self.last_id
    }

    /// Next page of `id`; the id is dropped once it reports `done`.
    fn next(&mut self, id: i32) -> Result<TxIterRes, BackendError> {
        let stream = self.open.get_mut(&id).ok_or_else(|| {
            BackendError::FailedPrecondition(format!("iterator {id} is not open"))
        })?;

        let element = match stream {
            Stream::Attributes(concepts) => concepts
                .next()
                .map(|concept| tx_iter_res::Res::GetAttributes(OneConcept::from(concept))),
            Stream::Method(elements) => elements.next().map(|element| {
                tx_iter_res::Res::ConceptMethod(element.into())
            }),
        };

        match element {
            Some(element) => Ok(element.into()),
            None => {
                debug!("iterator {id} exhausted");
                self.open.remove(&id);
                Ok(tx_iter_res::Res::Done(true).into())
            }
        }
    }
}

/// Per-connection state: the open transaction and its iterators.
struct Connection<'b, B: Backend> {
    backend: &'b B,
    tx: Option<B::Tx>,
    iterators: Iterators,
}

impl<'b, B: Backend> Connection<'b, B> {
    fn new(backend: &'b B) -> Self {
        Self {
            backend,
            tx: None,
            iterators: Iterators::default(),
        }
    }

    fn tx(&mut self) -> Result<&mut B::Tx, BackendError> {
        self.tx.as_mut().ok_or_else(|| {
            BackendError::FailedPrecondition("no transaction is open".to_string())
        })
    }

    fn dispatch(&mut self, req: TxReq) -> Result<TxRes, BackendError> {
        let req = req
            .req
            .ok_or_else(|| BackendError::InvalidArgument("empty request".to_string()))?;
        debug!("dispatching {}", req.name());

        let res = match req {
            tx_req::Req::Open(open) => {
                if self.tx.is_some() {
                    return Err(BackendError::FailedPrecondition(
                        "transaction already open".to_string(),
                    ));
                }
                self.tx = Some(self.backend.open(&open)?);
                info!("opened transaction on keyspace '{}'", open.keyspace);
                tx_res::Res::Open(Empty {})
            }
            tx_req::Req::Commit(_) => {
                self.tx()?.commit()?;
                self.tx = None;
                self.iterators = Iterators::default();
                tx_res::Res::Commit(Empty {})
            }
            tx_req::Req::Iterate(IterId { id }) => {
                self.tx()?;
                tx_res::Res::Iterate(self.iterators.next(id)?)
            }
            tx_req::Req::GetSchemaConcept(label) => tx_res::Res::GetSchemaConcept(
                OptionalConcept::from(self.tx()?.get_schema_concept(&label.label)?),
            ),
            tx_req::Req::GetConcept(concept) => tx_res::Res::GetConcept(OptionalConcept::from(
                self.tx()?.get_concept(&concept.id)?,
            )),
            tx_req::Req::GetAttributes(value) => {
                let value = value.value.ok_or_else(|| {
                    BackendError::InvalidArgument("attribute lookup without a value".to_string())
                })?;
                let concepts = self.tx()?.get_attributes(&value)?;
                let id = self.iterators.register(Stream::Attributes(concepts));
                tx_res::Res::GetAttributes(IterId { id })
            }
            tx_req::Req::PutEntityType(label) => {
                tx_res::Res::PutEntityType(self.tx()?.put_entity_type(&label.label)?.into())
            }
            tx_req::Req::PutAttributeType(put) => {
                let data_type = DataType::try_from(put.data_type).map_err(|_| {
                    BackendError::InvalidArgument(format!("unknown data type {}", put.data_type))
                })?;
                tx_res::Res::PutAttributeType(
                    self.tx()?
                        .put_attribute_type(&put.label, data_type)?
                        .into(),
                )
            }
            tx_req::Req::PutRelationType(label) => {
                tx_res::Res::PutRelationType(self.tx()?.put_relation_type(&label.label)?.into())
            }
            tx_req::Req::PutRole(label) => {
                tx_res::Res::PutRole(self.tx()?.put_role(&label.label)?.into())
            }
            tx_req::Req::PutRule(rule) => tx_res::Res::PutRule(
                self.tx()?
                    .put_rule(&rule.label, &rule.when, &rule.then)?
                    .into(),
            ),
            tx_req::Req::ConceptMethod(call) => {
                return self.concept_method(call).map(TxRes::concept_method);
            }
        };
        Ok(res.into())
    }

    fn concept_method(&mut self, call: ConceptMethodReq) -> Result<MethodRes, BackendError> {
        let req = call.method.and_then(|method| method.req).ok_or_else(|| {
            BackendError::InvalidArgument(format!("empty method call on '{}'", call.id))
        })?;
        let slot = req.slot();
        let operation = req.name();
        debug!("{operation} on concept '{}'", call.id);

        let res = match self.tx()?.concept_method(&call.id, req)? {
            MethodReply::Res(res) if res.slot() == slot => res,
            MethodReply::Res(res) => {
                return Err(BackendError::Internal(format!(
                    "{operation} answered in slot {}",
                    res.slot()
                )));
            }
            MethodReply::Stream(elements) => {
                let id = self.iterators.register(Stream::Method(elements));
                method_res::Res::iterator(slot, id).ok_or_else(|| {
                    BackendError::Internal(format!("{operation} is not iterable"))
                })?
            }
        };
        Ok(res.into())
    }
}

/// Serves one client until it disconnects or a request fails.
///
/// A failed request is answered with a status frame and ends the connection.
/// So is a frame that cannot be read as a request.
pub fn handle_connection<S, B>(stream: S, backend: &B) -> Result<(), TransportError>
where
    S: Read + Write,
    B: Backend,
{
    let mut transport = ProtocolTransport::new(stream);
    let mut connection = Connection::new(backend);

    loop {
        let req = match transport.read_request() {
            Ok(Some(req)) => req,
            Ok(None) => break,
            Err(
                e @ (TransportError::Decode(_)
                | TransportError::FrameTooLarge(_)
                | TransportError::BadLength),
            ) => {
                warn!("rejecting malformed request: {e}");
                transport.write_status(Code::InvalidArgument, e.to_string())?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        match connection.dispatch(req) {
            Ok(res) => transport.write_response(res)?,
            Err(e) => {
                warn!("aborting transaction: {e}");
                transport.write_status(e.code(), e.to_string())?;
                return Ok(());
            }
        }
    }
    debug!("client closed the connection");
    Ok(())
}
