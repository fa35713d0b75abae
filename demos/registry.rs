use std::collections::HashMap;

use anyhow::{bail, Context, Error};
use wsgi_bridge::{Body, Environ, StartResponse};

use crate::apps;

pub type AppFn = fn(Environ, StartResponse) -> Result<Body, Error>;

/// Applications that can be served by `module:attribute` reference.
#[derive(Default)]
pub struct AppRegistry {
    apps: HashMap<(String, String), AppFn>,
}

impl AppRegistry {
    pub fn with_demos() -> Self {
        let mut registry = Self::default();

        registry.register("hello", "app", apps::hello);
        registry.register("environ", "app", apps::environ);
        registry.register("echo", "app", apps::echo);

        registry
    }

    pub fn register(&mut self, module: &str, attribute: &str, app: AppFn) {
        self.apps
            .insert((module.to_string(), attribute.to_string()), app);
    }

    /// Find the application for a `module:attribute` reference.
    pub fn resolve(&self, reference: &str) -> Result<AppFn, Error> {
        let Some((module, attribute)) = reference.split_once(':') else {
            bail!("application must be given as module:attribute, got \"{}\"", reference);
        };

        let key = (module.to_string(), attribute.to_string());
        let app = self
            .apps
            .get(&key)
            .with_context(|| format!("no application registered as \"{}\"", reference))?;

        Ok(*app)
    }
}
