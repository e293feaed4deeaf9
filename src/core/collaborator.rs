//! Traits for the two collaborators the runner delegates to.
//!
//! The runner never looks inside a built config. It asks a
//! [`ConfigBuilder`] to turn an artifact into configs and hands those
//! configs to a [`ValidationEngine`]. Both return `anyhow::Result` so any
//! error type can cross the seam; the executor only keeps its message.

use crate::core::artifact::ArtifactRef;
use crate::core::context::ExecutionContext;
use std::marker::PhantomData;

/// Turns one artifact into executable validation configs.
pub trait ConfigBuilder {
    /// Opaque config type produced by this builder.
    type Config;

    /// Build every config described by `artifact`.
    ///
    /// Called exactly once per resolved artifact.
    fn build(&self, artifact: &ArtifactRef) -> anyhow::Result<Vec<Self::Config>>;
}

/// Executes built configs.
pub trait ValidationEngine<C> {
    /// Run the configs built from the context's artifact.
    ///
    /// Called exactly once per artifact whose build succeeded.
    fn run(&self, ctx: &ExecutionContext, configs: &[C]) -> anyhow::Result<()>;
}

impl<B: ConfigBuilder + ?Sized> ConfigBuilder for &B {
    type Config = B::Config;

    fn build(&self, artifact: &ArtifactRef) -> anyhow::Result<Vec<Self::Config>> {
        (**self).build(artifact)
    }
}

impl<C, E: ValidationEngine<C> + ?Sized> ValidationEngine<C> for &E {
    fn run(&self, ctx: &ExecutionContext, configs: &[C]) -> anyhow::Result<()> {
        (**self).run(ctx, configs)
    }
}

/// Builder backed by a closure.
pub struct FnBuilder<F, C> {
    build: F,
    _config: PhantomData<fn() -> C>,
}

impl<F, C> FnBuilder<F, C>
where
    F: Fn(&ArtifactRef) -> anyhow::Result<Vec<C>>,
{
    /// Wrap a closure.
    pub fn new(build: F) -> Self {
        Self {
            build,
            _config: PhantomData,
        }
    }
}

impl<F, C> ConfigBuilder for FnBuilder<F, C>
where
    F: Fn(&ArtifactRef) -> anyhow::Result<Vec<C>>,
{
    type Config = C;

    fn build(&self, artifact: &ArtifactRef) -> anyhow::Result<Vec<C>> {
        (self.build)(artifact)
    }
}

/// Engine backed by a closure.
pub struct FnEngine<F>(pub F);

impl<F, C> ValidationEngine<C> for FnEngine<F>
where
    F: Fn(&ExecutionContext, &[C]) -> anyhow::Result<()>,
{
    fn run(&self, ctx: &ExecutionContext, configs: &[C]) -> anyhow::Result<()> {
        (self.0)(ctx, configs)
    }
}
