//! Embedded static resources.
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Dev server live-update client

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// Variables for client.js.
    pub struct ClientVars<'a> {
        /// URL prefix of the server's own endpoints, e.g. `/__pipewright`
        pub prefix: &'a str,
    }

    impl TemplateVars for ClientVars<'_> {
        fn apply(&self, content: &str) -> String {
            content.replace("__PIPEWRIGHT_PREFIX__", self.prefix)
        }
    }

    /// Live-update and ghost-mode client, served from memory.
    pub const CLIENT_JS: Template<ClientVars<'static>> =
        Template::new(include_str!("serve/client.js"));
}
