use std::collections::HashMap;
use std::sync::Mutex;

use inject::{Container, Error, Shared, container};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
struct Settings {
    greeting: String,
}

trait UserRepository: Send + Sync {
    fn add(&self, id: u32, name: &str);
    fn find(&self, id: u32) -> Option<String>;
}

#[derive(Default)]
struct InMemoryUsers {
    users: Mutex<HashMap<u32, String>>,
}

impl UserRepository for InMemoryUsers {
    fn add(&self, id: u32, name: &str) {
        if let Ok(mut users) = self.users.lock() {
            users.insert(id, name.to_string());
        }
    }

    fn find(&self, id: u32) -> Option<String> {
        self.users.lock().ok()?.get(&id).cloned()
    }
}

struct GreetUser {
    settings: Settings,
    users: Shared<dyn UserRepository>,
}

impl GreetUser {
    fn new(settings: Settings, users: Shared<dyn UserRepository>) -> Self {
        Self { settings, users }
    }

    fn execute(&self, id: u32) -> String {
        match self.users.find(id) {
            Some(name) => format!("{}, {name}!", self.settings.greeting),
            None => format!("No user with id {id}"),
        }
    }
}

fn build() -> Result<Container, Error> {
    container! {
        bind(cached Settings => || Settings { greeting: "Hello".to_string() })
        bind(shared dyn UserRepository => || {
            Shared::new(InMemoryUsers::default()) as Shared<dyn UserRepository>
        })
        bind(type GreetUser => GreetUser::new)
    }
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let container = build()?;
    info!("Container ready: {:?}", container);

    container.call(|users: Shared<dyn UserRepository>| {
        users.add(1, "Ada");
        users.add(2, "Grace");
    })?;

    let use_case = container.resolve::<GreetUser>()?;
    println!("{}", use_case.execute(1));
    println!("{}", use_case.execute(3));

    Ok(())
}
