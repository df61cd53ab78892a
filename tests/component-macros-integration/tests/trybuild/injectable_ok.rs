use component_macros::{component, Injectable};
use di_abstractions::{Injectable, NoDependencies, TypeInfo};
use std::sync::Arc;

trait Clock: Send + Sync {}

#[derive(Injectable)]
struct Settings;

#[derive(Injectable)]
struct Worker {
    #[inject]
    settings: Arc<Settings>,
    #[inject]
    clock: Option<Arc<dyn Clock>>,
    retries: u32,
}

struct Server {
    settings: Arc<Settings>,
}

#[component]
impl Server {
    #[constructor]
    fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }
}

fn main() {
    assert_eq!(Worker::injected_members().len(), 2);
    assert_eq!(Server::constructor_parameters(), vec![TypeInfo::of::<Settings>()]);
    assert!(Settings::construct(&NoDependencies).is_ok());
    assert!(Worker::construct(&NoDependencies).is_err());
}
