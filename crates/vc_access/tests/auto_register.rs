#![cfg(feature = "auto_register")]

use vc_access::{Accessible, AccessorRegistry, derive::Accessible};

#[derive(Accessible, Default)]
#[access(default, auto_register)]
pub struct Settings {
    pub volume: u8,
}

#[derive(Accessible)]
#[access(auto_register)]
pub struct Theme {
    pub name: String,
}

// Generic types are never submitted.
#[derive(Accessible)]
#[access(auto_register)]
pub struct Cache<T> {
    pub entry: T,
}

// Not submitted either.
#[derive(Accessible)]
pub struct Unlisted {
    pub id: u32,
}

#[test]
fn preload_compiles_registered_types_once() {
    let registry = AccessorRegistry::new();
    assert!(registry.is_empty());

    assert_eq!(registry.preload(), Ok(2));
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.compilations(), 2);
    assert!(registry.get(Settings::type_descriptor()).is_some());
    assert!(registry.get(Theme::type_descriptor()).is_some());
    assert!(registry.get(Unlisted::type_descriptor()).is_none());
    assert!(registry.get(Cache::<u8>::type_descriptor()).is_none());

    assert_eq!(registry.preload(), Ok(0));
    assert_eq!(registry.compilations(), 2);
}

#[test]
fn preloaded_accessors_are_served_without_compiling() {
    let registry = AccessorRegistry::new();
    registry.preload().unwrap();

    let settings = registry.of::<Settings>().unwrap();
    assert_eq!(registry.compilations(), 2);
    assert!(settings.supports_create_new());
}
