use std::iter::FusedIterator;

use log::{debug, trace};

use super::{Session, SessionError};
use crate::{
    proto::{method::operation_name, transaction::tx_iter_res},
    protocol::Transport,
};

/// Why a pulled page did not yield an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rejection {
    /// The page sits in another slot.
    Slot,
    /// The page is in the right slot but lacks a required field.
    Missing(&'static str),
}

/// Lazy cursor over a server-side iterator.
///
/// Each call to `next` sends one `Iterate` request carrying the iterator id and
/// yields the element it returns. The first `done` page ends the sequence, and so
/// does any error; after that no more requests are sent. A `RemoteIter` cannot be
/// restarted, re-run the operation to get a fresh one.
pub struct RemoteIter<'s, T: Transport, E> {
    session: &'s Session<T>,
    operation: &'static str,
    id: i32,
    slot: u32,
    extract: fn(u32, tx_iter_res::Res) -> Result<E, Rejection>,
    finished: bool,
}

impl<'s, T: Transport, E> RemoteIter<'s, T, E> {
    pub(crate) fn new(
        session: &'s Session<T>,
        operation: &'static str,
        id: i32,
        slot: u32,
        extract: fn(u32, tx_iter_res::Res) -> Result<E, Rejection>,
    ) -> Self {
        Self {
            session,
            operation,
            id,
            slot,
            extract,
            finished: false,
        }
    }

    /// Server-assigned iterator id.
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    fn fail(&mut self, err: SessionError) -> Option<Result<E, SessionError>> {
        self.finished = true;
        Some(Err(SessionError::Iterator {
            operation: self.operation,
            iterator: self.id,
            source: Box::new(err),
        }))
    }
}

impl<T: Transport, E> Iterator for RemoteIter<'_, T, E> {
    type Item = Result<E, SessionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let element = match self.session.pull(self.id) {
            Ok(Some(element)) => element,
            Ok(None) => {
                debug!("iterator {} of {} exhausted", self.id, self.operation);
                self.finished = true;
                return None;
            }
            Err(err) => return self.fail(err),
        };

        let actual = element_slot(&element);
        trace!(
            "iterator {} pulled element in slot {actual:?} ({})",
            self.id,
            actual.map(operation_name).unwrap_or("none")
        );
        match (self.extract)(self.slot, element) {
            Ok(value) => Some(Ok(value)),
            Err(Rejection::Missing(field)) => self.fail(SessionError::MissingField {
                operation: self.operation,
                field,
            }),
            Err(Rejection::Slot) => {
                self.finished = true;
                Some(Err(SessionError::UnexpectedElement {
                    operation: self.operation,
                    iterator: self.id,
                    expected: self.slot,
                    actual,
                }))
            }
        }
    }
}

impl<T: Transport, E> FusedIterator for RemoteIter<'_, T, E> {}

/// Slot an element page arrived in: the method slot for concept-method pages,
/// the transaction slot otherwise.
fn element_slot(element: &tx_iter_res::Res) -> Option<u32> {
    match element {
        tx_iter_res::Res::Done(_) => Some(1),
        tx_iter_res::Res::GetAttributes(_) => Some(3),
        tx_iter_res::Res::ConceptMethod(page) => page.res.as_ref().map(|res| res.slot()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        proto::{
            BaseType, Concept, IterId, OneConcept, RolePlayer, ValueObject,
            method::{MethodIterRes, MethodRes, method_iter_res, method_res},
            transaction::{TxIterRes, TxRes, tx_req, tx_res},
        },
        protocol::TransportError,
        session::testing::ScriptedTransport,
    };

    fn element(res: method_iter_res::Res) -> TxRes {
        tx_res::Res::Iterate(TxIterRes::from(tx_iter_res::Res::ConceptMethod(
            MethodIterRes::from(res),
        )))
        .into()
    }

    fn iterator(slot: u32, id: i32) -> TxRes {
        TxRes::concept_method(MethodRes::from(method_res::Res::iterator(slot, id).unwrap()))
    }

    fn pulled_ids(transport: &ScriptedTransport) -> Vec<i32> {
        transport
            .sent
            .iter()
            .filter_map(|req| match &req.req {
                Some(tx_req::Req::Iterate(IterId { id })) => Some(*id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn subs_pulls_every_element_then_stops() {
        let person = Concept::new("V1", BaseType::EntityType);
        let subs = ["V1", "V2", "V3"].map(|id| Concept::new(id, BaseType::EntityType));

        let mut script = vec![iterator(206, 5)];
        script.extend(
            subs.iter()
                .cloned()
                .map(|c| element(method_iter_res::Res::SchemaConceptSubs(c.into()))),
        );
        script.push(TxRes::done());
        let session = Session::new(ScriptedTransport::new(script));

        let mut iter = session.as_schema_concept(&person).subs().unwrap();
        assert_eq!(iter.id(), 5);
        let pulled: Vec<Concept> = iter.by_ref().map(Result::unwrap).collect();
        assert_eq!(pulled, subs.to_vec());

        // Fused: nothing else goes out after `done`.
        assert!(iter.next().is_none());
        drop(iter);

        let transport = session.into_transport().unwrap();
        // One method call, three element pulls, one terminal pull.
        assert_eq!(transport.sent.len(), 5);
        assert_eq!(pulled_ids(&transport), vec![5, 5, 5, 5]);
    }

    #[test]
    fn nothing_is_pulled_until_iterated() {
        let person = Concept::new("V1", BaseType::EntityType);
        let session = Session::new(ScriptedTransport::new([iterator(502, 9)]));

        let iter = session.as_type(&person).instances().unwrap();
        drop(iter);

        let transport = session.into_transport().unwrap();
        assert_eq!(transport.sent.len(), 1);
        assert!(pulled_ids(&transport).is_empty());
    }

    #[test]
    fn empty_iterator_sends_one_pull() {
        let person = Concept::new("V1", BaseType::EntityType);
        let session = Session::new(ScriptedTransport::new([iterator(503, 2), TxRes::done()]));

        let keys: Vec<_> = session.as_type(&person).keys().unwrap().collect();
        assert!(keys.is_empty());

        let transport = session.into_transport().unwrap();
        assert_eq!(pulled_ids(&transport), vec![2]);
    }

    #[test]
    fn element_in_wrong_slot_fails_and_ends_iteration() {
        let person = Concept::new("V1", BaseType::EntityType);
        let stray = Concept::new("V8", BaseType::Entity);
        let session = Session::new(ScriptedTransport::new([
            iterator(206, 3),
            element(method_iter_res::Res::TypeInstances(stray.into())),
            TxRes::done(),
        ]));

        let mut iter = session.as_schema_concept(&person).subs().unwrap();
        match iter.next() {
            Some(Err(SessionError::UnexpectedElement {
                operation,
                iterator,
                expected,
                actual,
            })) => {
                assert_eq!(operation, "SchemaConcept.Subs");
                assert_eq!(iterator, 3);
                assert_eq!(expected, 206);
                assert_eq!(actual, Some(502));
            }
            other => panic!("expected element mismatch, got {other:?}"),
        }
        assert!(iter.next().is_none());
    }

    #[test]
    fn element_without_concept_is_a_missing_field() {
        let person = Concept::new("V1", BaseType::EntityType);
        let session = Session::new(ScriptedTransport::new([
            iterator(206, 4),
            element(method_iter_res::Res::SchemaConceptSubs(OneConcept::default())),
            TxRes::done(),
        ]));

        let mut iter = session.as_schema_concept(&person).subs().unwrap();
        match iter.next() {
            Some(Err(SessionError::Iterator {
                iterator, source, ..
            })) => {
                assert_eq!(iterator, 4);
                assert!(matches!(
                    *source,
                    SessionError::MissingField {
                        operation: "SchemaConcept.Subs",
                        field: "concept",
                    }
                ));
            }
            other => panic!("expected missing field, got {other:?}"),
        }
        assert!(iter.next().is_none());
    }

    #[test]
    fn role_player_pair_without_player_is_a_missing_field() {
        let friendship = Concept::new("V20", BaseType::Relationship);
        let session = Session::new(ScriptedTransport::new([
            iterator(1000, 2),
            element(method_iter_res::Res::RelationRolePlayersMap(RolePlayer {
                role: Some(Concept::new("V3", BaseType::Role)),
                player: None,
            })),
        ]));

        let mut iter = session.as_relation(&friendship).role_players_map().unwrap();
        match iter.next() {
            Some(Err(SessionError::Iterator { source, .. })) => {
                assert!(matches!(
                    *source,
                    SessionError::MissingField {
                        field: "player",
                        ..
                    }
                ));
            }
            other => panic!("expected missing field, got {other:?}"),
        }
    }

    #[test]
    fn transport_failure_reports_iterator_id() {
        let person = Concept::new("V1", BaseType::Entity);
        let session = Session::new(ScriptedTransport::new([iterator(905, 11)]));

        let mut iter = session.as_thing(&person).roles().unwrap();
        match iter.next() {
            Some(Err(SessionError::Iterator {
                iterator, source, ..
            })) => {
                assert_eq!(iterator, 11);
                assert!(matches!(
                    *source,
                    SessionError::Transport(TransportError::Closed)
                ));
            }
            other => panic!("expected iterator failure, got {other:?}"),
        }
        assert!(iter.next().is_none());
    }

    #[test]
    fn role_players_map_yields_pairs() {
        let friendship = Concept::new("V20", BaseType::Relationship);
        let friend = Concept::new("V3", BaseType::Role);
        let alice = Concept::new("V4", BaseType::Entity);
        let session = Session::new(ScriptedTransport::new([
            iterator(1000, 1),
            element(method_iter_res::Res::RelationRolePlayersMap(RolePlayer {
                role: Some(friend.clone()),
                player: Some(alice.clone()),
            })),
            TxRes::done(),
        ]));

        let pairs: Vec<_> = session
            .as_relation(&friendship)
            .role_players_map()
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(pairs, vec![(friend, alice)]);
    }

    #[test]
    fn attributes_by_value_reads_transaction_pages() {
        let age = Concept::new("V30", BaseType::Attribute);
        let session = Session::new(ScriptedTransport::new([
            TxRes::from(tx_res::Res::GetAttributes(IterId { id: 1 })),
            tx_res::Res::Iterate(TxIterRes::from(tx_iter_res::Res::GetAttributes(
                OneConcept::from(age.clone()),
            )))
            .into(),
            TxRes::done(),
        ]));

        let found: Vec<_> = session
            .get_attributes_by_value(ValueObject::long(30))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(found, vec![age]);

        let transport = session.into_transport().unwrap();
        match &transport.sent[0].req {
            Some(tx_req::Req::GetAttributes(value)) => {
                assert_eq!(value.value, Some(ValueObject::long(30)));
            }
            other => panic!("expected attribute lookup, got {other:?}"),
        }
    }

    #[test]
    fn interleaved_iterators_keep_their_ids() {
        let person = Concept::new("V1", BaseType::EntityType);
        let a = Concept::new("V2", BaseType::EntityType);
        let b = Concept::new("V3", BaseType::Entity);
        let session = Session::new(ScriptedTransport::new([
            iterator(206, 1),
            iterator(502, 2),
            element(method_iter_res::Res::TypeInstances(b.clone().into())),
            element(method_iter_res::Res::SchemaConceptSubs(a.clone().into())),
            TxRes::done(),
            TxRes::done(),
        ]));

        let mut subs = session.as_schema_concept(&person).subs().unwrap();
        let mut instances = session.as_type(&person).instances().unwrap();
        assert_eq!(instances.next().unwrap().unwrap(), b);
        assert_eq!(subs.next().unwrap().unwrap(), a);
        assert!(instances.next().is_none());
        assert!(subs.next().is_none());
        drop((subs, instances));

        let transport = session.into_transport().unwrap();
        assert_eq!(pulled_ids(&transport), vec![2, 1, 2, 1]);
    }
}
