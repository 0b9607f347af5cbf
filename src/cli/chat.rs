use std::error::Error;
use std::io::{self, Write};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use super::{cancel_on_ctrl_c, resolve_backend, stdout_renderer, Args};
use crate::commands::{process_input, ChatState, CommandResult};
use crate::core::error::Error as RequestError;
use crate::core::session::ChatSession;

/// `ocelot chat`: a line-editor loop around one [`ChatSession`].
///
/// The line editor is blocking, so the loop runs on the calling thread and
/// enters the runtime only for each request.
pub fn run(
    runtime: &Runtime,
    args: &Args,
    client: &reqwest::Client,
    model: &str,
    initial_prompt: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let backend = runtime.block_on(resolve_backend(args, client, model))?;
    let mut state = ChatState::new(ChatSession::new(backend), !args.no_show_reasoning, args.debug);

    println!("Interactive chat started. Type 'exit' to exit or '/help' for available commands.");

    let mut editor = DefaultEditor::new()?;
    let mut pending = initial_prompt.filter(|prompt| !prompt.trim().is_empty());

    loop {
        let line = match pending.take() {
            Some(prompt) => {
                println!("You: {prompt}");
                prompt
            }
            None => match editor.readline("You: ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => return Err(err.into()),
            },
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") {
            break;
        }
        let _ = editor.add_history_entry(input);

        match process_input(&mut state, input) {
            CommandResult::Continue(message) => println!("{message}"),
            CommandResult::ProcessAsMessage(prompt) => {
                match runtime.block_on(ask(&mut state, &prompt)) {
                    Ok(()) => {}
                    Err(err) if err.is_cancelled() => eprintln!("Keyboard interrupt detected"),
                    Err(err) => eprintln!("ERROR: {err}"),
                }
            }
        }
    }

    Ok(())
}

async fn ask(state: &mut ChatState, prompt: &str) -> Result<(), RequestError> {
    print!("Assistant: ");
    io::stdout().flush()?;

    let cancel = CancellationToken::new();
    let watcher = cancel_on_ctrl_c(cancel.clone());
    let mut renderer = stdout_renderer(state.debug);

    let result = state
        .session
        .ask(prompt, state.show_reasoning, &cancel, |fragment, splitter| {
            renderer.update(fragment, splitter)
        })
        .await;
    watcher.abort();

    match result {
        Ok(_) => renderer.finish()?,
        Err(err) => {
            renderer.abort()?;
            return Err(err);
        }
    }
    Ok(())
}
