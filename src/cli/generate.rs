use std::error::Error;

use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;

use super::{cancel_on_ctrl_c, resolve_backend, stdout_renderer, Args};
use crate::core::session;
use crate::core::splitter::ReasoningSplitter;

/// `ocelot generate`: one prompt, one streamed answer on stdout.
pub async fn run(
    args: &Args,
    client: &reqwest::Client,
    model: &str,
    prompt: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let backend = resolve_backend(args, client, model).await?;

    let prompt = match prompt {
        Some(prompt) => prompt.to_string(),
        None => read_stdin().await?,
    };

    let cancel = CancellationToken::new();
    let watcher = cancel_on_ctrl_c(cancel.clone());

    let mut renderer = stdout_renderer(args.debug);
    let mut splitter = ReasoningSplitter::new(!args.no_show_reasoning);

    let result = session::generate(
        backend.as_ref(),
        &prompt,
        &mut splitter,
        &cancel,
        |fragment, splitter| renderer.update(fragment, splitter),
    )
    .await;
    watcher.abort();

    match result {
        Ok(()) => renderer.finish()?,
        Err(err) => {
            renderer.abort()?;
            return Err(err.into());
        }
    }
    Ok(())
}

async fn read_stdin() -> std::io::Result<String> {
    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    Ok(input.trim().to_string())
}
