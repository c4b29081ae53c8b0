//! Builder for [`Resolver`].

use std::ffi::OsString;
use std::fmt;

use camino::Utf8PathBuf;
use clap::Command;

use super::Resolver;
use crate::flags::{DEFAULT_COMMAND_NAME, FlagRegistry};
use crate::secret::{SecretAccessError, SecretAccessor, SecretClient, SecretFactory};

const DEFAULT_DOTENV: &str = ".env";

/// Configures a [`Resolver`].
///
/// # Examples
///
/// ```
/// use tiered_config::{Resolver, StaticSecrets};
///
/// let resolver = Resolver::builder()
///     .args(["app", "--port", "9000"])
///     .without_dotenv()
///     .secret_accessor(StaticSecrets::new().with_secret("api", "k"))
///     .build();
/// # drop(resolver);
/// ```
#[must_use]
pub struct ResolverBuilder {
    args: Option<Vec<OsString>>,
    command: Option<Command>,
    dotenv: Option<Utf8PathBuf>,
    secret_factory: Option<SecretFactory>,
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self {
            args: None,
            command: None,
            dotenv: Some(Utf8PathBuf::from(DEFAULT_DOTENV)),
            secret_factory: None,
        }
    }
}

impl ResolverBuilder {
    /// Arguments to parse, binary name first. Defaults to the process
    /// arguments.
    pub fn args<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Command that generated flags are added to.
    ///
    /// Arguments already on the command are reused for fields whose flag
    /// name matches their id or long name.
    pub fn command(mut self, command: Command) -> Self {
        self.command = Some(command);
        self
    }

    /// Dotenv file loaded before each resolution. Defaults to `.env` in the
    /// working directory.
    pub fn dotenv_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.dotenv = Some(path.into());
        self
    }

    /// Skips dotenv loading.
    pub fn without_dotenv(mut self) -> Self {
        self.dotenv = None;
        self
    }

    /// Factory building the secret accessor on first need.
    pub fn secret_factory<F, A>(mut self, mut factory: F) -> Self
    where
        F: FnMut() -> Result<A, SecretAccessError> + Send + 'static,
        A: SecretAccessor + 'static,
    {
        self.secret_factory = Some(Box::new(move || {
            factory().map(|accessor| Box::new(accessor) as Box<dyn SecretAccessor>)
        }));
        self
    }

    /// Uses clones of `accessor` as the secret client.
    pub fn secret_accessor<A>(self, accessor: A) -> Self
    where
        A: SecretAccessor + Clone + 'static,
    {
        self.secret_factory(move || Ok(accessor.clone()))
    }

    /// Builds the resolver.
    pub fn build(self) -> Resolver {
        let command = self
            .command
            .unwrap_or_else(|| Command::new(DEFAULT_COMMAND_NAME));
        let args = self
            .args
            .unwrap_or_else(|| std::env::args_os().collect());
        Resolver {
            flags: FlagRegistry::new(command, args),
            dotenv: self.dotenv,
            secrets: SecretClient::new(self.secret_factory),
        }
    }
}

impl fmt::Debug for ResolverBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverBuilder")
            .field("args", &self.args)
            .field("command", &self.command.as_ref().map(Command::get_name))
            .field("dotenv", &self.dotenv)
            .field("secret_factory", &self.secret_factory.is_some())
            .finish()
    }
}
