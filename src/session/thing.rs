//! Views over instances: things, relations and attributes.
use super::{
    RemoteIter, Session, SessionError, concept_element, required, role_player_element,
    schema::view,
};
use crate::{
    proto::{
        Concept, ConceptList, Empty, OneConcept, RolePlayer, ValueObject,
        method::{method_req::Req, method_res::Res},
    },
    protocol::Transport,
};

view!(
    /// Operations shared by entities, relations and attributes.
    Thing
);
view!(Relation);
view!(Attribute);

fn concept_list(concepts: &[Concept]) -> ConceptList {
    ConceptList {
        concepts: concepts.to_vec(),
    }
}

impl<'a, T: Transport> Thing<'a, T> {
    /// The type this thing is an instance of.
    pub fn thing_type(&self) -> Result<Concept, SessionError> {
        let req = Req::ThingType(Empty {});
        let operation = req.name();
        let one = self.session.call(self.concept, req, |res| match res {
            Res::ThingType(one) => Ok(one),
            other => Err(other),
        })?;
        required(operation, "type", one.concept)
    }

    pub fn is_inferred(&self) -> Result<bool, SessionError> {
        let flag = self
            .session
            .call(self.concept, Req::ThingIsInferred(Empty {}), |res| match res {
                Res::ThingIsInferred(flag) => Ok(flag),
                other => Err(other),
            })?;
        Ok(flag.value)
    }

    /// Key attributes, restricted to `attribute_types` unless it is empty.
    pub fn keys(
        &self,
        attribute_types: &[Concept],
    ) -> Result<RemoteIter<'a, T, Concept>, SessionError> {
        let req = Req::ThingKeys(concept_list(attribute_types));
        self.session.iterate(self.concept, req, concept_element)
    }

    /// Owned attributes, restricted to `attribute_types` unless it is empty.
    pub fn attributes(
        &self,
        attribute_types: &[Concept],
    ) -> Result<RemoteIter<'a, T, Concept>, SessionError> {
        let req = Req::ThingAttributes(concept_list(attribute_types));
        self.session.iterate(self.concept, req, concept_element)
    }

    /// Relations this thing takes part in, restricted to `roles` unless it is empty.
    pub fn relations(&self, roles: &[Concept]) -> Result<RemoteIter<'a, T, Concept>, SessionError> {
        let req = Req::ThingRelations(concept_list(roles));
        self.session.iterate(self.concept, req, concept_element)
    }

    pub fn roles(&self) -> Result<RemoteIter<'a, T, Concept>, SessionError> {
        self.session
            .iterate(self.concept, Req::ThingRoles(Empty {}), concept_element)
    }

    /// Attaches `attribute` and returns the implicit relation created for it.
    pub fn relhas(&self, attribute: &Concept) -> Result<Concept, SessionError> {
        let req = Req::ThingRelhas(OneConcept::from(attribute.clone()));
        let operation = req.name();
        let one = self.session.call(self.concept, req, |res| match res {
            Res::ThingRelhas(one) => Ok(one),
            other => Err(other),
        })?;
        required(operation, "relation", one.concept)
    }

    pub fn unhas(&self, attribute: &Concept) -> Result<(), SessionError> {
        let req = Req::ThingUnhas(OneConcept::from(attribute.clone()));
        self.session.call(self.concept, req, |res| match res {
            Res::ThingUnhas(_) => Ok(()),
            other => Err(other),
        })
    }
}

impl<'a, T: Transport> Relation<'a, T> {
    /// Every (role, player) pair of this relation.
    pub fn role_players_map(&self) -> Result<RemoteIter<'a, T, (Concept, Concept)>, SessionError> {
        self.session.iterate(
            self.concept,
            Req::RelationRolePlayersMap(Empty {}),
            role_player_element,
        )
    }

    /// Players of this relation, restricted to `roles` unless it is empty.
    pub fn role_players(
        &self,
        roles: &[Concept],
    ) -> Result<RemoteIter<'a, T, Concept>, SessionError> {
        let req = Req::RelationRolePlayers(concept_list(roles));
        self.session.iterate(self.concept, req, concept_element)
    }

    pub fn assign(&self, role: &Concept, player: &Concept) -> Result<(), SessionError> {
        let req = Req::RelationAssign(role_player(role, player));
        self.session.call(self.concept, req, |res| match res {
            Res::RelationAssign(_) => Ok(()),
            other => Err(other),
        })
    }

    pub fn unassign(&self, role: &Concept, player: &Concept) -> Result<(), SessionError> {
        let req = Req::RelationUnassign(role_player(role, player));
        self.session.call(self.concept, req, |res| match res {
            Res::RelationUnassign(_) => Ok(()),
            other => Err(other),
        })
    }
}

fn role_player(role: &Concept, player: &Concept) -> RolePlayer {
    RolePlayer {
        role: Some(role.clone()),
        player: Some(player.clone()),
    }
}

impl<'a, T: Transport> Attribute<'a, T> {
    pub fn value(&self) -> Result<ValueObject, SessionError> {
        let req = Req::AttributeValue(Empty {});
        let operation = req.name();
        let value = self.session.call(self.concept, req, |res| match res {
            Res::AttributeValue(value) => Ok(value),
            other => Err(other),
        })?;
        required(operation, "value", value.value)
    }

    /// Things that own this attribute.
    pub fn owners(&self) -> Result<RemoteIter<'a, T, Concept>, SessionError> {
        self.session
            .iterate(self.concept, Req::AttributeOwners(Empty {}), concept_element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        proto::{
            AttributeValue, BaseType, Flag,
            method::{MethodIterRes, MethodRes, method_iter_res, method_res},
            transaction::{TxIterRes, TxRes, tx_iter_res, tx_req, tx_res},
            value_object::Value,
        },
        session::testing::ScriptedTransport,
    };

    fn reply(res: method_res::Res) -> TxRes {
        TxRes::concept_method(MethodRes::from(res))
    }

    fn page(res: method_iter_res::Res) -> TxRes {
        tx_res::Res::Iterate(TxIterRes::from(tx_iter_res::Res::ConceptMethod(
            MethodIterRes::from(res),
        )))
        .into()
    }

    fn sent_method(transport: &ScriptedTransport, index: usize) -> Req {
        match &transport.sent[index].req {
            Some(tx_req::Req::ConceptMethod(call)) => call
                .method
                .as_ref()
                .and_then(|method| method.req.clone())
                .unwrap(),
            other => panic!("expected concept method, got {other:?}"),
        }
    }

    #[test]
    fn thing_type_and_inference() {
        let alice = Concept::new("V40", BaseType::Entity);
        let person = Concept::new("V1", BaseType::EntityType);
        let session = Session::new(ScriptedTransport::new([
            reply(Res::ThingType(person.clone().into())),
            reply(Res::ThingIsInferred(Flag { value: false })),
        ]));

        let view = session.as_thing(&alice);
        assert_eq!(view.thing_type().unwrap(), person);
        assert!(!view.is_inferred().unwrap());
    }

    #[test]
    fn attributes_filter_is_sent_with_the_request() {
        let alice = Concept::new("V40", BaseType::Entity);
        let name_type = Concept::new("V9", BaseType::AttributeType);
        let name = Concept::new("V41", BaseType::Attribute);
        let session = Session::new(ScriptedTransport::new([
            reply(method_res::Res::iterator(903, 4).unwrap()),
            page(method_iter_res::Res::ThingAttributes(name.clone().into())),
            TxRes::done(),
        ]));

        let owned: Vec<_> = session
            .as_thing(&alice)
            .attributes(std::slice::from_ref(&name_type))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(owned, vec![name]);

        let transport = session.into_transport().unwrap();
        assert_eq!(
            sent_method(&transport, 0),
            Req::ThingAttributes(ConceptList {
                concepts: vec![name_type],
            })
        );
    }

    #[test]
    fn relhas_returns_the_implicit_relation() {
        let alice = Concept::new("V40", BaseType::Entity);
        let name = Concept::new("V41", BaseType::Attribute);
        let has_name = Concept::new("V42", BaseType::Relationship);
        let session = Session::new(ScriptedTransport::new([reply(Res::ThingRelhas(
            has_name.clone().into(),
        ))]));

        assert_eq!(session.as_thing(&alice).relhas(&name).unwrap(), has_name);
    }

    #[test]
    fn assign_sends_role_and_player() {
        let friendship = Concept::new("V20", BaseType::Relationship);
        let friend = Concept::new("V3", BaseType::Role);
        let alice = Concept::new("V40", BaseType::Entity);
        let session = Session::new(ScriptedTransport::new([
            reply(Res::RelationAssign(Empty {})),
            reply(Res::RelationUnassign(Empty {})),
        ]));

        let view = session.as_relation(&friendship);
        view.assign(&friend, &alice).unwrap();
        view.unassign(&friend, &alice).unwrap();

        let transport = session.into_transport().unwrap();
        assert_eq!(
            sent_method(&transport, 0),
            Req::RelationAssign(role_player(&friend, &alice))
        );
        assert_eq!(sent_method(&transport, 1).slot(), 1003);
    }

    #[test]
    fn attribute_value_is_typed() {
        let age = Concept::new("V30", BaseType::Attribute);
        let session = Session::new(ScriptedTransport::new([
            reply(Res::AttributeValue(AttributeValue::from(ValueObject::long(30)))),
            reply(Res::AttributeValue(AttributeValue::default())),
        ]));

        let view = session.as_attribute(&age);
        assert_eq!(view.value().unwrap().value, Some(Value::Long(30)));
        assert!(matches!(
            view.value(),
            Err(SessionError::MissingField { field: "value", .. })
        ));
    }

    #[test]
    fn owners_iterates_things() {
        let age = Concept::new("V30", BaseType::Attribute);
        let alice = Concept::new("V40", BaseType::Entity);
        let bob = Concept::new("V43", BaseType::Entity);
        let session = Session::new(ScriptedTransport::new([
            reply(method_res::Res::iterator(1101, 6).unwrap()),
            page(method_iter_res::Res::AttributeOwners(alice.clone().into())),
            page(method_iter_res::Res::AttributeOwners(bob.clone().into())),
            TxRes::done(),
        ]));

        let owners: Vec<_> = session
            .as_attribute(&age)
            .owners()
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(owners, vec![alice, bob]);
    }
}
