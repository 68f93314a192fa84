#![allow(dead_code, reason = "private fields exist to be hidden from access")]

use std::sync::Mutex;

use vc_access::info::{MemberKind, TypeKind};
use vc_access::{
    AccessError, Accessible, CompileError, DispatchMode, ObjectHandle, Value, accessor_of,
    derive::Accessible,
};

// -----------------------------------------------------------------------------
// One shape, three dispatch paths

macro_rules! contract_type {
    ($(#[$($meta:tt)*])* $vis:vis struct $name:ident;) => {
        #[derive(Accessible, Default)]
        #[access(default)]
        #[access(property(name = "Upper", ty = String, get = upper))]
        #[access(property(name = "Reset", ty = u32, set = reset))]
        $(#[$($meta)*])*
        $vis struct $name {
            pub id: i32,
            #[access(rename = "Name")]
            pub name: String,
            #[access(readonly)]
            pub code: u32,
            hidden: u8,
            #[access(skip)]
            pub scratch: Vec<u8>,
        }

        impl $name {
            fn upper(&self) -> String {
                self.name.to_uppercase()
            }

            fn reset(&mut self, code: u32) {
                self.code = code;
            }
        }
    };
}

contract_type! { pub struct Open; }
contract_type! { #[access(restricted)] pub struct Restricted; }
contract_type! { struct Private; }

fn check_contract<T: Accessible + Default>(mode: DispatchMode) {
    let accessor = accessor_of::<T>().unwrap();
    assert_eq!(accessor.dispatch_mode(), mode);

    let names: Vec<&str> = accessor.members().map(|m| m.name()).collect();
    assert_eq!(names, ["id", "Name", "code", "Upper", "Reset"]);

    let mut target = T::default();

    accessor.set(&mut target, "id", Value::new(7_i32)).unwrap();
    accessor.set(&mut target, "Name", Value::new(String::from("ann"))).unwrap();
    assert_eq!(accessor.get(&target, "id").unwrap().downcast::<i32>().unwrap(), 7);
    assert_eq!(accessor.get(&target, "Upper").unwrap().downcast::<String>().unwrap(), "ANN");

    // Renamed, hidden and skipped fields are not found under their idents.
    for name in ["name", "hidden", "scratch", "Missing"] {
        assert!(
            matches!(accessor.get(&target, name), Err(AccessError::MemberNotFound { .. })),
            "{name}",
        );
    }

    // Read-only members refuse writes, write-only members refuse reads.
    assert!(matches!(
        accessor.set(&mut target, "code", Value::new(1_u32)),
        Err(AccessError::MemberNotFound { .. })
    ));
    assert!(matches!(accessor.get(&target, "Reset"), Err(AccessError::MemberNotFound { .. })));
    accessor.set(&mut target, "Reset", Value::new(9_u32)).unwrap();
    assert_eq!(accessor.get(&target, "code").unwrap().downcast::<u32>().unwrap(), 9);

    assert!(matches!(
        accessor.set(&mut target, "Name", Value::new(5_i32)),
        Err(AccessError::TypeMismatch { expected: "alloc::string::String", found: "i32", .. })
    ));

    let fresh = accessor.create_new().unwrap();
    assert!(fresh.is::<T>());
}

#[test]
fn direct_dispatch_follows_the_contract() {
    check_contract::<Open>(DispatchMode::Direct);
}

#[test]
fn restricted_dispatch_follows_the_contract() {
    check_contract::<Restricted>(DispatchMode::Indirect);
}

#[test]
fn private_types_use_the_host() {
    check_contract::<Private>(DispatchMode::Indirect);
}

#[test]
fn member_descriptors_describe_the_fields() {
    let accessor = accessor_of::<Open>().unwrap();

    let code = accessor.member("code").unwrap();
    assert_eq!(code.kind(), MemberKind::Field);
    assert!(code.is_readable() && !code.is_writable());
    assert!(code.value_is::<u32>());
    assert!(code.declaring_type().type_is::<Open>());

    let upper = accessor.member("Upper").unwrap();
    assert_eq!(upper.kind(), MemberKind::Property);
    assert!(upper.is_readable() && !upper.is_writable());
}

// -----------------------------------------------------------------------------
// Value types

#[derive(Accessible, Clone, Copy)]
#[access(value)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[test]
fn value_types_are_read_only() {
    let accessor = accessor_of::<Point>().unwrap();
    assert_eq!(accessor.type_kind(), TypeKind::Value);
    assert!(!accessor.supports_create_new());

    let mut point = Point { x: 1, y: 2 };
    for name in ["x", "y", "z"] {
        let error = accessor.set(&mut point, name, Value::new(0_i32)).unwrap_err();
        assert!(matches!(error, AccessError::ReadOnlyTarget { .. }), "{name}");
    }
    assert_eq!(accessor.get(&point, "y").unwrap().downcast::<i32>().unwrap(), 2);
    assert!(matches!(
        accessor.create_new(),
        Err(AccessError::UnsupportedOperation { .. })
    ));
}

// -----------------------------------------------------------------------------
// The `{Id, Name}` record, as a reference and as a value type

#[derive(Accessible, Default)]
pub struct Customer {
    #[access(rename = "Id")]
    pub id: i32,
    #[access(rename = "Name")]
    pub name: String,
}

#[derive(Accessible, Clone, Default)]
#[access(value)]
pub struct CustomerRow {
    #[access(rename = "Id")]
    pub id: i32,
    #[access(rename = "Name")]
    pub name: String,
}

#[test]
fn handles_over_reference_and_value_records() {
    let mut customer = Customer::default();
    let mut handle = ObjectHandle::new(&mut customer).unwrap();
    handle.set_value("Id", 7_i32).unwrap();
    assert_eq!(handle.get_as::<i32>("Id").unwrap(), 7);
    assert!(matches!(handle.get("Missing"), Err(AccessError::MemberNotFound { .. })));

    let mut row = CustomerRow::default();
    let mut handle = ObjectHandle::new(&mut row).unwrap();
    assert!(matches!(
        handle.set_value("Id", 7_i32),
        Err(AccessError::ReadOnlyTarget { .. })
    ));
    assert_eq!(row.id, 0);
}

// -----------------------------------------------------------------------------
// Constructors and abstract types

#[derive(Accessible)]
#[access(constructor = Session::open)]
pub struct Session {
    pub user: String,
}

impl Session {
    fn open() -> Self {
        Self { user: String::from("guest") }
    }
}

#[derive(Accessible, Default)]
#[access(abstract, default)]
pub struct Shape {
    pub sides: u8,
}

#[test]
fn constructors_are_kept_for_concrete_reference_types() {
    let session = accessor_of::<Session>().unwrap().create_new().unwrap();
    assert_eq!(session.downcast_ref::<Session>().unwrap().user, "guest");

    let shape = accessor_of::<Shape>().unwrap();
    assert!(!shape.supports_create_new());
    assert_eq!(shape.len(), 1);
}

// -----------------------------------------------------------------------------
// Visibility

#[derive(Accessible)]
struct Sealed {
    secret: u32,
}

#[derive(Accessible)]
struct Exposed {
    #[access(expose)]
    secret: u32,
}

#[derive(Accessible)]
pub struct Marker;

#[test]
fn private_fields_need_exposing() {
    assert!(matches!(
        accessor_of::<Sealed>(),
        Err(CompileError::NoAccessibleMembers { .. })
    ));

    let accessor = accessor_of::<Exposed>().unwrap();
    let target = Exposed { secret: 3 };
    assert_eq!(accessor.get(&target, "secret").unwrap().downcast::<u32>().unwrap(), 3);

    assert!(accessor_of::<Marker>().unwrap().is_empty());
}

#[test]
fn unknown_names_are_not_found_on_small_types() {
    let empty = accessor_of::<Marker>().unwrap();
    let mut marker = Marker;
    assert!(matches!(empty.get(&marker, "x"), Err(AccessError::MemberNotFound { .. })));
    assert!(matches!(
        empty.set(&mut marker, "x", Value::new(0_u8)),
        Err(AccessError::MemberNotFound { .. })
    ));

    let single = accessor_of::<Exposed>().unwrap();
    let mut exposed = Exposed { secret: 3 };
    assert!(matches!(single.get(&exposed, "Secret"), Err(AccessError::MemberNotFound { .. })));
    assert!(matches!(
        single.set(&mut exposed, "missing", Value::new(1_u32)),
        Err(AccessError::MemberNotFound { .. })
    ));
    assert_eq!(exposed.secret, 3);
}

#[derive(Accessible)]
pub struct Guarded {
    pub id: i32,
    lock: Mutex<u8>,
}

#[derive(Accessible)]
struct HostedGuarded {
    pub id: i32,
    lock: Mutex<u8>,
}

#[derive(Accessible)]
pub struct Locked<T> {
    pub item: T,
    lock: Mutex<T>,
}

#[test]
fn hidden_fields_need_not_be_clone() {
    let accessor = accessor_of::<Guarded>().unwrap();
    assert_eq!(accessor.dispatch_mode(), DispatchMode::Direct);
    let names: Vec<&str> = accessor.members().map(|m| m.name()).collect();
    assert_eq!(names, ["id"]);

    let target = Guarded { id: 4, lock: Mutex::new(0) };
    assert_eq!(accessor.get(&target, "id").unwrap().downcast::<i32>().unwrap(), 4);
    assert!(matches!(accessor.get(&target, "lock"), Err(AccessError::MemberNotFound { .. })));

    let hosted = accessor_of::<HostedGuarded>().unwrap();
    assert_eq!(hosted.dispatch_mode(), DispatchMode::Indirect);
    let target = HostedGuarded { id: 5, lock: Mutex::new(0) };
    assert_eq!(hosted.get(&target, "id").unwrap().downcast::<i32>().unwrap(), 5);
    assert!(matches!(hosted.get(&target, "lock"), Err(AccessError::MemberNotFound { .. })));

    let locked = accessor_of::<Locked<u16>>().unwrap();
    assert_eq!(locked.len(), 1);
    assert!(locked.member("item").unwrap().value_is::<u16>());
}

// -----------------------------------------------------------------------------
// Generics

#[derive(Accessible, Default)]
#[access(default)]
pub struct Slot<T> {
    pub item: T,
    pub count: usize,
}

#[test]
fn each_instantiation_has_its_own_accessor() {
    let bytes = accessor_of::<Slot<u8>>().unwrap();
    let words = accessor_of::<Slot<String>>().unwrap();
    assert!(!core::ptr::eq(bytes, words));
    assert!(bytes.member("item").unwrap().value_is::<u8>());
    assert!(words.member("item").unwrap().value_is::<String>());

    let mut slot = Slot::<String>::default();
    let mut handle = ObjectHandle::new(&mut slot).unwrap();
    handle.set_value("item", String::from("x")).unwrap();
    assert!(matches!(
        handle.set_value("item", 1_u8),
        Err(AccessError::TypeMismatch { .. })
    ));
    assert_eq!(slot.item, "x");
}
