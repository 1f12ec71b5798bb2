#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use super::{CommandContext, HandlerFuture};
use crate::format::PluginVerb;
use tracing::info;

pub(super) fn install<'a>(names: &'a [String], ctx: &'a CommandContext<'a>) -> HandlerFuture<'a> {
    Box::pin(async move {
        info!("installing {} plugin(s)", names.len());
        let plugins = ctx.plugins;
        ctx.runner
            .run(
                names,
                |name| async move { plugins.install(&name).await },
                |name, version: String| {
                    ctx.sink.send(ctx.formatter.install_success(name, &version));
                },
                |name, err| {
                    ctx.sink
                        .send(ctx.formatter.failure(PluginVerb::Install, name, &err));
                },
            )
            .await;
    })
}

pub(super) fn uninstall<'a>(
    names: &'a [String],
    ctx: &'a CommandContext<'a>,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        info!("uninstalling {} plugin(s)", names.len());
        let plugins = ctx.plugins;
        ctx.runner
            .run(
                names,
                |name| async move { plugins.uninstall(&name).await },
                |name, _path| ctx.sink.send(ctx.formatter.uninstall_success(name)),
                |name, err| {
                    ctx.sink
                        .send(ctx.formatter.failure(PluginVerb::Uninstall, name, &err));
                },
            )
            .await;
    })
}

/// With no names, updates every installed plugin. Unchanged plugins stay quiet.
pub(super) fn update<'a>(names: &'a [String], ctx: &'a CommandContext<'a>) -> HandlerFuture<'a> {
    Box::pin(async move {
        let names = if names.is_empty() {
            ctx.plugins.plugin_names()
        } else {
            names.to_vec()
        };
        info!("updating {} plugin(s)", names.len());
        let plugins = ctx.plugins;
        ctx.runner
            .run(
                &names,
                |name| async move { plugins.update(&name).await },
                |name, info: crate::ports::UpdateInfo| {
                    if info.updated() {
                        ctx.sink.send(ctx.formatter.update_success(
                            name,
                            info.before_version(),
                            info.after_version(),
                        ));
                    }
                },
                |name, err| {
                    ctx.sink
                        .send(ctx.formatter.failure(PluginVerb::Update, name, &err));
                },
            )
            .await;
    })
}

pub(super) fn list<'a>(_args: &'a [String], ctx: &'a CommandContext<'a>) -> HandlerFuture<'a> {
    Box::pin(async move {
        ctx.sink.send(ctx.plugins.plugin_names().join("\n"));
    })
}
