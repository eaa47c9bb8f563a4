use super::*;
use rayon::prelude::*;

#[test]
fn class_extends_object_unless_it_is_object() {
    let interner = TypeInterner::new();
    let object = TypeDefinition::class(&interner, "java/lang/Object");
    assert_eq!(object.self_type, TypeId::OBJECT);
    assert_eq!(object.base_type, None);

    let foo = TypeDefinition::class(&interner, "demo/Foo");
    assert_eq!(foo.base_type, Some(TypeId::OBJECT));
    assert!(!foo.is_interface());
    assert!(!foo.is_generic_definition());
}

#[test]
fn interface_has_no_base_type() {
    let interner = TypeInterner::new();
    let runnable = TypeDefinition::interface(&interner, "java/lang/Runnable");
    assert_eq!(runnable.base_type, None);
    assert!(runnable.is_interface());
    assert!(runnable.flags.contains(TypeFlags::ABSTRACT));
}

#[test]
fn builders_set_flags() {
    let interner = TypeInterner::new();
    let outer = interner.named("demo/Outer");
    let t = interner.declare_generic_parameter(
        crate::types::GenericOwner::Type(Arc::from("demo/Outer$Inner")),
        0,
        "T",
    );
    let inner = TypeDefinition::class(&interner, "demo/Outer$Inner")
        .with_declaring_type(outer)
        .with_generic_parameters(vec![t]);
    assert!(inner.is_inner_class());
    assert!(inner.is_generic_definition());
    assert_eq!(inner.declaring_type, Some(outer));

    let plain = inner.clone().with_generic_parameters(Vec::new());
    assert!(!plain.is_generic_definition());
}

#[test]
fn store_registers_and_replaces() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();
    assert!(store.is_empty());
    store.register(TypeDefinition::class(&interner, "demo/Foo"));
    assert!(store.contains("demo/Foo"));
    assert_eq!(store.len(), 1);

    let foo = interner.named("demo/Foo");
    let replaced = store.register(
        TypeDefinition::class(&interner, "demo/Foo")
            .with_method(MethodRef::method(foo, "run", TypeId::VOID)),
    );
    assert_eq!(store.len(), 1);
    assert_eq!(store.resolve("demo/Foo"), Some(replaced));
    assert_eq!(store.resolve("demo/Missing"), None);

    store.clear();
    assert!(store.is_empty());
}

#[test]
fn builtin_boxes_extend_number_where_the_jdk_does() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();
    store.register_builtins(&interner);
    let number = interner.named("java/lang/Number");
    let base_of = |kind: PrimitiveKind| {
        store
            .get(kind.box_internal_name())
            .and_then(|def| def.base_type)
    };
    assert_eq!(base_of(PrimitiveKind::Int), Some(number));
    assert_eq!(base_of(PrimitiveKind::Double), Some(number));
    assert_eq!(base_of(PrimitiveKind::Char), Some(TypeId::OBJECT));
    assert_eq!(base_of(PrimitiveKind::Boolean), Some(TypeId::OBJECT));
    let string = store.get("java/lang/String").expect("String registered");
    assert_eq!(string.interfaces, vec![TypeId::SERIALIZABLE]);
}

#[test]
fn store_is_usable_from_many_threads() {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();
    (0..32).into_par_iter().for_each(|i| {
        store.register(TypeDefinition::class(&interner, &format!("demo/C{i}")));
    });
    assert_eq!(store.len(), 32);
    assert!((0..32).all(|i| store.contains(&format!("demo/C{i}"))));
}

#[test]
fn fields_and_methods_are_shared() {
    let interner = TypeInterner::new();
    let foo = interner.named("demo/Foo");
    let def = TypeDefinition::class(&interner, "demo/Foo")
        .with_field(FieldRef::new(foo, "count", TypeId::INT))
        .with_method(MethodRef::constructor(foo));
    assert_eq!(def.fields.len(), 1);
    assert!(def.methods[0].is_constructor());
    let copy = def.clone();
    assert!(Arc::ptr_eq(&copy.methods[0], &def.methods[0]));
}
