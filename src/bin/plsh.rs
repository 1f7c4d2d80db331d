use anyhow::Result;
use promptline::terminal::{spawn_key_reader, RawModeGuard};
use promptline::{
    Interrupted, JsonFileStore, PromptRequest, Prompter, SessionDescriptor, DEFAULT_SESSION,
};
use std::io;

#[tokio::main]
async fn main() -> Result<()> {
    let store = JsonFileStore::new(std::env::current_dir()?);
    let (mut prompter, keys) = Prompter::new(store, io::stdout());
    prompter.load_session(SessionDescriptor::new(DEFAULT_SESSION).with_eager_save(true))?;

    let guard = RawModeGuard::new()?;
    let reader = spawn_key_reader(keys);

    loop {
        match prompter.prompt(PromptRequest::default()).await {
            Ok(line) if line == "exit" => break,
            Ok(line) => print!("you entered: {line}\r\n"),
            Err(error) if error.is::<Interrupted>() => break,
            Err(error) => {
                drop(guard);
                return Err(error);
            }
        }
    }

    prompter.save_all()?;
    reader.abort();
    Ok(())
}
