//! Client side of the concept protocol.
//!
//! A [`Session`] drives one transaction over a [`Transport`]. It turns typed calls
//! into `Method` requests, checks that every response comes back in the slot that
//! was asked for, and wraps iterable results in a lazy [`RemoteIter`].
//!
//! # Overview
//!
//! - Transaction-wide operations live directly on [`Session`] (`commit`,
//!   `get_concept`, `put_entity_type`, ...).
//! - Concept operations are grouped in views obtained from the session, one per
//!   grouping of the catalog: [`SchemaConcept`], [`Rule`], [`Role`], [`Type`],
//!   [`EntityType`], [`RelationType`], [`AttributeType`], [`Thing`], [`Relation`],
//!   [`Attribute`].
//!
//! The transport is held behind a lock and every exchange holds it from send to
//! receive, so at most one request is in flight per session and iterator pulls are
//! serialized with every other call.
//!
//! # Example
//! ```no_run
//! use std::net::TcpStream;
//!
//! use concept_session::{protocol::ProtocolTransport, session::{OpenOptions, Session}};
//!
//! let stream = TcpStream::connect("127.0.0.1:48555").unwrap();
//! let transport = ProtocolTransport::new(stream);
//! let session = Session::open(transport, &OpenOptions::new("social")).unwrap();
//!
//! let person = session.get_schema_concept("person").unwrap().unwrap();
//! for sub in session.as_schema_concept(&person).subs().unwrap() {
//!     println!("{}", sub.unwrap().id);
//! }
//! ```
mod iter;
mod schema;
mod thing;

use std::sync::Mutex;

use log::{debug, warn};
use thiserror::Error;

pub use iter::RemoteIter;
use iter::Rejection;
pub use schema::{AttributeType, EntityType, RelationType, Role, Rule, SchemaConcept, Type};
pub use thing::{Attribute, Relation, Thing};

use crate::{
    proto::{
        AttributeValue, Concept, DataType, Empty, Label, ValueObject,
        method::{MethodReq, method_iter_res, method_req, method_res, operation_name},
        transaction::{
            ConceptId, OpenReq, PutAttributeType, PutRule, TxReq, TxRes, TxType, tx_iter_res,
            tx_req, tx_res,
        },
    },
    protocol::{Transport, TransportError},
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A concept method answered in the wrong `Method` slot.
    #[error("{operation} on '{concept}': expected method slot {expected}, got {actual:?}")]
    UnexpectedResponse {
        operation: &'static str,
        concept: String,
        expected: u32,
        actual: Option<u32>,
    },

    /// The transaction envelope came back in the wrong slot.
    #[error("{operation}: expected transaction slot {expected}, got {actual:?}")]
    UnexpectedTransactionResponse {
        operation: &'static str,
        expected: u32,
        actual: Option<u32>,
    },

    #[error("{operation}: response is missing '{field}'")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    #[error("iterator {iterator} of {operation}: expected element slot {expected}, got {actual:?}")]
    UnexpectedElement {
        operation: &'static str,
        iterator: i32,
        expected: u32,
        actual: Option<u32>,
    },

    #[error("iterator {iterator} of {operation} failed: {source}")]
    Iterator {
        operation: &'static str,
        iterator: i32,
        #[source]
        source: Box<SessionError>,
    },

    #[error("{operation} on concept '{concept}': unknown data type {value}")]
    UnknownDataType {
        operation: &'static str,
        concept: String,
        value: i32,
    },

    #[error("session transport lock poisoned")]
    Poisoned,
}

/// Parameters of the transaction opened by [`Session::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    keyspace: String,
    tx_type: TxType,
    credentials: Option<(String, String)>,
}

impl OpenOptions {
    pub fn new(keyspace: impl Into<String>) -> Self {
        Self {
            keyspace: keyspace.into(),
            tx_type: TxType::Read,
            credentials: None,
        }
    }

    pub fn tx_type(mut self, tx_type: TxType) -> Self {
        self.tx_type = tx_type;
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    fn to_request(&self) -> OpenReq {
        let (username, password) = self.credentials.clone().unwrap_or_default();
        OpenReq {
            keyspace: self.keyspace.clone(),
            tx_type: self.tx_type.into(),
            username,
            password,
        }
    }
}

/// One transaction against a server.
pub struct Session<T: Transport> {
    transport: Mutex<T>,
}

impl<T: Transport> Session<T> {
    /// Wraps a transport whose transaction is already open.
    pub fn new(transport: T) -> Self {
        Self {
            transport: Mutex::new(transport),
        }
    }

    /// Opens a transaction on `transport`.
    pub fn open(transport: T, options: &OpenOptions) -> Result<Self, SessionError> {
        let session = Self::new(transport);
        session.transact(tx_req::Req::Open(options.to_request()), |res| match res {
            tx_res::Res::Open(_) => Ok(()),
            other => Err(other),
        })?;
        debug!(
            "opened {:?} transaction on keyspace '{}'",
            options.tx_type, options.keyspace
        );
        Ok(session)
    }

    pub fn into_transport(self) -> Result<T, SessionError> {
        self.transport.into_inner().map_err(|_| SessionError::Poisoned)
    }

    pub fn commit(&self) -> Result<(), SessionError> {
        self.transact(tx_req::Req::Commit(Empty {}), |res| match res {
            tx_res::Res::Commit(_) => Ok(()),
            other => Err(other),
        })
    }

    /// Looks a concept up by id; `None` when the id is unknown to the transaction.
    pub fn get_concept(&self, id: &str) -> Result<Option<Concept>, SessionError> {
        let req = tx_req::Req::GetConcept(ConceptId { id: id.to_string() });
        let res = self.transact(req, |res| match res {
            tx_res::Res::GetConcept(res) => Ok(res),
            other => Err(other),
        })?;
        Ok(res.into_option())
    }

    pub fn get_schema_concept(&self, label: &str) -> Result<Option<Concept>, SessionError> {
        let req = tx_req::Req::GetSchemaConcept(label_of(label));
        let res = self.transact(req, |res| match res {
            tx_res::Res::GetSchemaConcept(res) => Ok(res),
            other => Err(other),
        })?;
        Ok(res.into_option())
    }

    /// Every attribute holding `value`, across attribute types.
    pub fn get_attributes_by_value(
        &self,
        value: impl Into<ValueObject>,
    ) -> Result<RemoteIter<'_, T, Concept>, SessionError> {
        let req = tx_req::Req::GetAttributes(AttributeValue::from(value.into()));
        let operation = req.name();
        let iter = self.transact(req, |res| match res {
            tx_res::Res::GetAttributes(iter) => Ok(iter),
            other => Err(other),
        })?;
        Ok(RemoteIter::new(
            self,
            operation,
            iter.id,
            ATTRIBUTES_SLOT,
            attribute_element,
        ))
    }

    pub fn put_entity_type(&self, label: &str) -> Result<Concept, SessionError> {
        let req = tx_req::Req::PutEntityType(label_of(label));
        let operation = req.name();
        let res = self.transact(req, |res| match res {
            tx_res::Res::PutEntityType(res) => Ok(res),
            other => Err(other),
        })?;
        required(operation, "entity type", res.concept)
    }

    pub fn put_relation_type(&self, label: &str) -> Result<Concept, SessionError> {
        let req = tx_req::Req::PutRelationType(label_of(label));
        let operation = req.name();
        let res = self.transact(req, |res| match res {
            tx_res::Res::PutRelationType(res) => Ok(res),
            other => Err(other),
        })?;
        required(operation, "relation type", res.concept)
    }

    pub fn put_role(&self, label: &str) -> Result<Concept, SessionError> {
        let req = tx_req::Req::PutRole(label_of(label));
        let operation = req.name();
        let res = self.transact(req, |res| match res {
            tx_res::Res::PutRole(res) => Ok(res),
            other => Err(other),
        })?;
        required(operation, "role", res.concept)
    }

    pub fn put_attribute_type(
        &self,
        label: &str,
        data_type: DataType,
    ) -> Result<Concept, SessionError> {
        let req = tx_req::Req::PutAttributeType(PutAttributeType {
            label: label.to_string(),
            data_type: data_type.into(),
        });
        let operation = req.name();
        let res = self.transact(req, |res| match res {
            tx_res::Res::PutAttributeType(res) => Ok(res),
            other => Err(other),
        })?;
        required(operation, "attribute type", res.concept)
    }

    pub fn put_rule(&self, label: &str, when: &str, then: &str) -> Result<Concept, SessionError> {
        let req = tx_req::Req::PutRule(PutRule {
            label: label.to_string(),
            when: when.to_string(),
            then: then.to_string(),
        });
        let operation = req.name();
        let res = self.transact(req, |res| match res {
            tx_res::Res::PutRule(res) => Ok(res),
            other => Err(other),
        })?;
        required(operation, "rule", res.concept)
    }

    /// Deletes any concept.
    pub fn delete(&self, concept: &Concept) -> Result<(), SessionError> {
        self.call(concept, method_req::Req::ConceptDelete(Empty {}), |res| {
            match res {
                method_res::Res::ConceptDelete(_) => Ok(()),
                other => Err(other),
            }
        })
    }

    pub fn as_schema_concept<'a>(&'a self, concept: &'a Concept) -> SchemaConcept<'a, T> {
        SchemaConcept::new(self, concept)
    }

    pub fn as_rule<'a>(&'a self, concept: &'a Concept) -> Rule<'a, T> {
        Rule::new(self, concept)
    }

    pub fn as_role<'a>(&'a self, concept: &'a Concept) -> Role<'a, T> {
        Role::new(self, concept)
    }

    pub fn as_type<'a>(&'a self, concept: &'a Concept) -> Type<'a, T> {
        Type::new(self, concept)
    }

    pub fn as_entity_type<'a>(&'a self, concept: &'a Concept) -> EntityType<'a, T> {
        EntityType::new(self, concept)
    }

    pub fn as_relation_type<'a>(&'a self, concept: &'a Concept) -> RelationType<'a, T> {
        RelationType::new(self, concept)
    }

    pub fn as_attribute_type<'a>(&'a self, concept: &'a Concept) -> AttributeType<'a, T> {
        AttributeType::new(self, concept)
    }

    pub fn as_thing<'a>(&'a self, concept: &'a Concept) -> Thing<'a, T> {
        Thing::new(self, concept)
    }

    pub fn as_relation<'a>(&'a self, concept: &'a Concept) -> Relation<'a, T> {
        Relation::new(self, concept)
    }

    pub fn as_attribute<'a>(&'a self, concept: &'a Concept) -> Attribute<'a, T> {
        Attribute::new(self, concept)
    }

    /// Runs one concept method and returns the response slot, checked against the request.
    pub fn run_method(
        &self,
        concept: &Concept,
        req: method_req::Req,
    ) -> Result<method_res::Res, SessionError> {
        let operation = req.name();
        let expected = req.slot();
        debug!("{operation} on concept '{}'", concept.id);

        let tx = TxReq::concept_method(concept, MethodReq::from(req));
        let res = match self.round_trip(&tx)?.res {
            Some(tx_res::Res::ConceptMethod(res)) => res,
            other => {
                return Err(transaction_violation(
                    operation,
                    CONCEPT_METHOD_SLOT,
                    other.map(|res| res.slot()),
                ));
            }
        };

        match res.response.and_then(|method| method.res) {
            Some(res) if res.slot() == expected => Ok(res),
            other => Err(self.violation(
                operation,
                concept,
                expected,
                other.map(|res| res.slot()),
            )),
        }
    }

    /// Runs a concept method and unwraps its response payload with `pick`.
    pub(crate) fn call<P>(
        &self,
        concept: &Concept,
        req: method_req::Req,
        pick: fn(method_res::Res) -> Result<P, method_res::Res>,
    ) -> Result<P, SessionError> {
        let operation = req.name();
        let expected = req.slot();
        let res = self.run_method(concept, req)?;
        pick(res).map_err(|other| self.violation(operation, concept, expected, Some(other.slot())))
    }

    /// Runs an iterable concept method and wraps the returned iterator id.
    pub(crate) fn iterate<E>(
        &self,
        concept: &Concept,
        req: method_req::Req,
        extract: fn(u32, tx_iter_res::Res) -> Result<E, Rejection>,
    ) -> Result<RemoteIter<'_, T, E>, SessionError> {
        let operation = req.name();
        let slot = req.slot();
        let res = self.run_method(concept, req)?;
        let id = res.iter_id().ok_or(SessionError::MissingField {
            operation,
            field: "iterator id",
        })?;
        debug!("{operation} on concept '{}' opened iterator {id}", concept.id);
        Ok(RemoteIter::new(self, operation, id, slot, extract))
    }

    /// Pulls the next page of iterator `id`; `None` once the server reports it done.
    pub(crate) fn pull(&self, id: i32) -> Result<Option<tx_iter_res::Res>, SessionError> {
        let operation = "Transaction.Iter";
        match self.round_trip(&TxReq::iterate(id))?.res {
            Some(tx_res::Res::Iterate(page)) => match page.res {
                Some(tx_iter_res::Res::Done(true)) => Ok(None),
                Some(tx_iter_res::Res::Done(false)) | None => Err(SessionError::MissingField {
                    operation,
                    field: "iterator element",
                }),
                Some(element) => Ok(Some(element)),
            },
            other => Err(transaction_violation(
                operation,
                ITERATE_SLOT,
                other.map(|res| res.slot()),
            )),
        }
    }

    fn transact<P>(
        &self,
        req: tx_req::Req,
        pick: fn(tx_res::Res) -> Result<P, tx_res::Res>,
    ) -> Result<P, SessionError> {
        let operation = req.name();
        let expected = req.slot();
        debug!("{operation}");

        let res = self.round_trip(&TxReq::from(req))?;
        match res.res {
            Some(res) => pick(res)
                .map_err(|other| transaction_violation(operation, expected, Some(other.slot()))),
            None => Err(transaction_violation(operation, expected, None)),
        }
    }

    fn round_trip(&self, req: &TxReq) -> Result<TxRes, SessionError> {
        let mut transport = self.transport.lock().map_err(|_| SessionError::Poisoned)?;
        transport.send(req)?;
        Ok(transport.recv()?)
    }

    fn violation(
        &self,
        operation: &'static str,
        concept: &Concept,
        expected: u32,
        actual: Option<u32>,
    ) -> SessionError {
        warn!(
            "protocol violation: {operation} on '{}' answered with slot {actual:?} ({})",
            concept.id,
            actual.map(operation_name).unwrap_or("none")
        );
        SessionError::UnexpectedResponse {
            operation,
            concept: concept.id.clone(),
            expected,
            actual,
        }
    }
}

/// Element slot of `Transaction.GetAttributes` pages.
const ATTRIBUTES_SLOT: u32 = 3;
const ITERATE_SLOT: u32 = 4;
const CONCEPT_METHOD_SLOT: u32 = 13;

fn transaction_violation(
    operation: &'static str,
    expected: u32,
    actual: Option<u32>,
) -> SessionError {
    warn!("protocol violation: {operation} answered with transaction slot {actual:?}");
    SessionError::UnexpectedTransactionResponse {
        operation,
        expected,
        actual,
    }
}

fn label_of(label: &str) -> Label {
    Label {
        label: label.to_string(),
    }
}

/// Unwraps a field the server must always populate.
pub(crate) fn required<V>(
    operation: &'static str,
    field: &'static str,
    value: Option<V>,
) -> Result<V, SessionError> {
    value.ok_or(SessionError::MissingField { operation, field })
}

/// Method iterator element as a concept, when it sits in `slot`.
pub(crate) fn concept_element(slot: u32, res: tx_iter_res::Res) -> Result<Concept, Rejection> {
    match res {
        tx_iter_res::Res::ConceptMethod(page) => match page.res {
            Some(element) if element.slot() == slot => {
                element.into_concept().ok_or(Rejection::Missing("concept"))
            }
            _ => Err(Rejection::Slot),
        },
        _ => Err(Rejection::Slot),
    }
}

pub(crate) fn attribute_element(_slot: u32, res: tx_iter_res::Res) -> Result<Concept, Rejection> {
    match res {
        tx_iter_res::Res::GetAttributes(one) => one.concept.ok_or(Rejection::Missing("concept")),
        _ => Err(Rejection::Slot),
    }
}

/// Method iterator element as a (role, player) pair.
pub(crate) fn role_player_element(
    _slot: u32,
    res: tx_iter_res::Res,
) -> Result<(Concept, Concept), Rejection> {
    match res {
        tx_iter_res::Res::ConceptMethod(page) => match page.res {
            Some(method_iter_res::Res::RelationRolePlayersMap(pair)) => {
                let role = pair.role.ok_or(Rejection::Missing("role"))?;
                let player = pair.player.ok_or(Rejection::Missing("player"))?;
                Ok((role, player))
            }
            _ => Err(Rejection::Slot),
        },
        _ => Err(Rejection::Slot),
    }
}
