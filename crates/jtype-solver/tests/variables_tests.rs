use super::*;

fn table() -> VariableTable {
    let mut table = VariableTable::new();
    table.push(VariableDefinition::new(0, "this", TypeId::OBJECT).with_scope(0, Some(40)));
    table.push(VariableDefinition::new(1, "count", TypeId::INT).with_scope(4, Some(20)));
    table.push(VariableDefinition::new(1, "name", TypeId::STRING).with_scope(22, Some(40)));
    table
}

#[test]
fn find_respects_scopes() {
    let table = table();
    assert_eq!(&*table.find(1, Some(10)).expect("count").name, "count");
    assert_eq!(&*table.find(1, Some(22)).expect("name").name, "name");
    assert_eq!(&*table.find(1, None).expect("any").name, "count");
    assert!(table.try_find(1, Some(21)).is_none());
    assert!(table.try_find(2, None).is_none());
}

#[test]
fn missing_variable_reports_slot_and_offset() {
    let table = table();
    assert_eq!(
        table.find(1, Some(2)),
        Err(TypeError::VariableNotFound { slot: 1, offset: 2 })
    );
    assert_eq!(
        table.find(7, None),
        Err(TypeError::VariableNotFound { slot: 7, offset: -1 })
    );
}

#[test]
fn slot_count_is_highest_slot_plus_one() {
    assert_eq!(VariableTable::new().slot_count(), 0);
    let mut table = table();
    assert_eq!(table.slot_count(), 2);
    table.push(VariableDefinition::new(5, "wide", TypeId::LONG));
    assert_eq!(table.slot_count(), 6);
}

#[test]
fn ensure_reuses_covering_variable() {
    let mut table = table();
    let found = table.ensure(1, SlotAccess::load(SlotKind::Int, 2), 10).clone();
    assert_eq!(&*found.name, "count");
    assert_eq!(table.len(), 3);
}

#[test]
fn store_matches_variable_starting_after_instruction() {
    let mut table = table();
    // astore_1 at 21 opens the `name` scope at 22.
    let found = table
        .ensure(1, SlotAccess::store(SlotKind::Reference, 1), 21)
        .clone();
    assert_eq!(&*found.name, "name");
    assert_eq!(table.len(), 3);

    // A load at the same offset sees nothing and creates a placeholder.
    let created = table.ensure(1, SlotAccess::load(SlotKind::Int, 1), 21).clone();
    assert_eq!(&*created.name, "$1_21$");
    assert_eq!(table.len(), 4);
}

#[test]
fn placeholders_are_typed_from_the_access() {
    let mut table = VariableTable::new();
    let long = table.ensure(3, SlotAccess::store(SlotKind::Long, 1), 10).clone();
    assert_eq!(&*long.name, "$3_10$");
    assert_eq!(long.variable_type, TypeId::LONG);
    assert_eq!(long.scope_start, 10);
    assert_eq!(long.scope_end, None);
    assert!(long.type_known);

    let reference = table
        .ensure(4, SlotAccess::load(SlotKind::Reference, 2), 12)
        .clone();
    assert_eq!(reference.variable_type, TypeId::OBJECT);
    assert!(!reference.type_known);

    // Open scopes cover every later offset.
    assert_eq!(&*table.find(3, Some(500)).expect("open").name, "$3_10$");
}

#[test]
fn update_scopes_closes_at_next_variable_or_code_end() {
    let mut table = VariableTable::new();
    table.push(VariableDefinition::new(2, "first", TypeId::INT).with_scope(5, None));
    table.push(VariableDefinition::new(2, "second", TypeId::STRING).with_scope(30, None));
    table.ensure(3, SlotAccess::store(SlotKind::Float, 1), 8);
    table.push(VariableDefinition::new(4, "fixed", TypeId::DOUBLE).with_scope(0, Some(9)));

    table.update_scopes(64);

    let ends: Vec<_> = table
        .iter()
        .map(|variable| (variable.slot, variable.scope_start, variable.scope_end))
        .collect();
    assert_eq!(
        ends,
        vec![
            (2, 5, Some(30)),
            (2, 30, Some(64)),
            (3, 8, Some(64)),
            (4, 0, Some(9)),
        ]
    );
}
